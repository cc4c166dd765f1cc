pub mod calendar;
pub mod engine;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Percent};
use crate::types::InstallmentStatus;

pub use calendar::add_months;
pub use engine::AmortizationEngine;

/// how much the customer pays up front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DownPayment {
    /// the plan's minimum down payment percentage
    #[default]
    Minimum,
    /// a customer-chosen amount, at least the plan minimum
    Custom(Money),
}

impl From<Option<Money>> for DownPayment {
    fn from(amount: Option<Money>) -> Self {
        amount.map_or(DownPayment::Minimum, DownPayment::Custom)
    }
}

/// result of a flat-rate installment calculation
///
/// `down_payment`, `financed_principal`, `total_interest` and
/// `total_financed_with_interest` are exact. `monthly_payment` and
/// `total_amount` are rounded to the piastre independently, so
/// `monthly_payment * duration_months` can drift from
/// `total_financed_with_interest` by up to half a piastre per installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub purchase_amount: Money,
    pub down_payment: Money,
    pub financed_principal: Money,
    pub total_interest: Money,
    pub total_financed_with_interest: Money,
    pub monthly_payment: Money,
    pub total_amount: Money,
    pub duration_months: u32,
    pub interest_rate: Percent,
}

impl AmortizationResult {
    /// what the schedule actually collects after the down payment
    pub fn scheduled_total(&self) -> Money {
        self.monthly_payment * self.duration_months
    }

    /// rounding difference between the schedule and the financed total
    pub fn rounding_drift(&self) -> Money {
        (self.scheduled_total() - self.total_financed_with_interest).abs()
    }
}

/// one due installment, before it is bound to a contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledInstallment {
    pub installment_number: u32,
    pub due_date: DateTime<Utc>,
    pub amount: Money,
    pub status: InstallmentStatus,
}
