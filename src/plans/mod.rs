pub mod catalog;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Percent;
use crate::errors::{Result, StoreError};
use crate::types::PlanId;

pub use catalog::{InstallmentQuote, PlanCatalog};

/// financing plan offered at checkout
///
/// Interest is flat: `interest_rate` percent of the financed principal,
/// charged once over the whole duration. Plans referenced by a contract
/// are never deleted, only deactivated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingPlan {
    pub id: PlanId,
    pub name: String,
    pub duration_months: u32,
    pub interest_rate: Percent,
    pub min_down_payment: Percent,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl FinancingPlan {
    /// check the numeric terms regardless of activation
    pub fn check_terms(&self) -> Result<()> {
        let reason = if self.duration_months == 0 {
            Some("duration must be at least one month".to_string())
        } else if self.interest_rate.is_negative() {
            Some(format!("interest rate {} is negative", self.interest_rate))
        } else if self.min_down_payment.is_negative() || self.min_down_payment > Percent::HUNDRED {
            Some(format!(
                "minimum down payment {} is outside 0-100%",
                self.min_down_payment
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(StoreError::InvalidPlan {
                plan_id: self.id,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// check the plan can back a new calculation or contract
    pub fn ensure_usable(&self) -> Result<()> {
        if !self.is_active {
            return Err(StoreError::InvalidPlan {
                plan_id: self.id,
                reason: "plan is inactive".to_string(),
            });
        }
        self.check_terms()
    }
}

/// data for a new plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlan {
    pub name: String,
    pub duration_months: u32,
    pub interest_rate: Percent,
    pub min_down_payment: Percent,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewPlan {
    pub fn into_plan(self, created_at: DateTime<Utc>) -> FinancingPlan {
        FinancingPlan {
            id: Uuid::new_v4(),
            name: self.name,
            duration_months: self.duration_months,
            interest_rate: self.interest_rate,
            min_down_payment: self.min_down_payment,
            is_active: self.is_active,
            created_at,
        }
    }
}

/// partial update applied by the admin plan editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanUpdate {
    pub name: Option<String>,
    pub duration_months: Option<u32>,
    pub interest_rate: Option<Percent>,
    pub min_down_payment: Option<Percent>,
    pub is_active: Option<bool>,
}

impl PlanUpdate {
    pub fn apply(self, plan: &mut FinancingPlan) {
        if let Some(name) = self.name {
            plan.name = name;
        }
        if let Some(duration) = self.duration_months {
            plan.duration_months = duration;
        }
        if let Some(rate) = self.interest_rate {
            plan.interest_rate = rate;
        }
        if let Some(down) = self.min_down_payment {
            plan.min_down_payment = down;
        }
        if let Some(active) = self.is_active {
            plan.is_active = active;
        }
    }
}
