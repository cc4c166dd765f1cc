use chrono::{DateTime, Utc};

use crate::amortization::{
    add_months, AmortizationResult, DownPayment, ScheduledInstallment,
};
use crate::decimal::Money;
use crate::errors::{Result, StoreError};
use crate::plans::FinancingPlan;
use crate::types::InstallmentStatus;

/// flat-rate installment calculator
///
/// Stateless and free of I/O. The checkout preview and order creation both
/// go through this type so the storefront and the backend never disagree
/// on a monthly figure.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmortizationEngine;

impl AmortizationEngine {
    pub fn new() -> Self {
        Self
    }

    /// calculate using the plan's minimum down payment
    pub fn calculate(&self, purchase_amount: Money, plan: &FinancingPlan) -> Result<AmortizationResult> {
        self.calculate_with(purchase_amount, plan, DownPayment::Minimum)
    }

    /// calculate with an explicit down payment choice
    pub fn calculate_with(
        &self,
        purchase_amount: Money,
        plan: &FinancingPlan,
        down_payment: DownPayment,
    ) -> Result<AmortizationResult> {
        if !purchase_amount.is_positive() {
            return Err(StoreError::InvalidAmount {
                amount: purchase_amount,
            });
        }
        plan.ensure_usable()?;

        let overflow = || StoreError::InvalidAmount {
            amount: purchase_amount,
        };

        let minimum = purchase_amount
            .checked_percentage(plan.min_down_payment)
            .ok_or_else(overflow)?;
        let down_payment = match down_payment {
            DownPayment::Minimum => minimum,
            DownPayment::Custom(amount) if amount < minimum => {
                return Err(StoreError::validation(format!(
                    "down payment {amount} is below the plan minimum of {}",
                    minimum.round_cents()
                )));
            }
            DownPayment::Custom(amount) if amount > purchase_amount => {
                return Err(StoreError::validation(format!(
                    "down payment {amount} exceeds the purchase amount {purchase_amount}"
                )));
            }
            DownPayment::Custom(amount) => amount,
        };

        let financed_principal = purchase_amount - down_payment;
        // flat rate: charged once on the financed principal for the whole term
        let total_interest = financed_principal
            .checked_percentage(plan.interest_rate)
            .ok_or_else(overflow)?;
        let total_financed_with_interest = financed_principal
            .checked_add(total_interest)
            .ok_or_else(overflow)?;
        let monthly_payment = (total_financed_with_interest / plan.duration_months).round_cents();
        let total_amount = down_payment
            .checked_add(total_financed_with_interest)
            .ok_or_else(overflow)?
            .round_cents();

        Ok(AmortizationResult {
            purchase_amount,
            down_payment,
            financed_principal,
            total_interest,
            total_financed_with_interest,
            monthly_payment,
            total_amount,
            duration_months: plan.duration_months,
            interest_rate: plan.interest_rate,
        })
    }

    /// build the due schedule: one equal installment per month after `start_date`
    pub fn generate_schedule(
        &self,
        start_date: DateTime<Utc>,
        duration_months: u32,
        monthly_payment: Money,
    ) -> Result<Vec<ScheduledInstallment>> {
        if duration_months == 0 {
            return Err(StoreError::validation(
                "a schedule needs at least one installment",
            ));
        }

        (1..=duration_months)
            .map(|installment_number| {
                Ok(ScheduledInstallment {
                    installment_number,
                    due_date: add_months(start_date, installment_number)?,
                    amount: monthly_payment,
                    status: InstallmentStatus::Pending,
                })
            })
            .collect()
    }
}
