use std::sync::Arc;

use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::amortization::{AmortizationEngine, AmortizationResult, DownPayment, ScheduledInstallment};
use crate::decimal::Money;
use crate::errors::{Result, StoreError};
use crate::events::Event;
use crate::plans::{FinancingPlan, NewPlan, PlanUpdate};
use crate::store::{Store, StoreRead, StoreTx};
use crate::types::PlanId;

/// checkout preview: the calculation plus the schedule it would produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentQuote {
    pub plan_id: PlanId,
    pub plan_name: String,
    pub calculation: AmortizationResult,
    pub schedule: Vec<ScheduledInstallment>,
}

/// financing plan lookup and administration
#[derive(Debug)]
pub struct PlanCatalog<S> {
    store: Arc<S>,
    engine: AmortizationEngine,
}

impl<S: Store> PlanCatalog<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            engine: AmortizationEngine::new(),
        }
    }

    /// active plans, shortest first
    pub fn list_active(&self) -> Result<Vec<FinancingPlan>> {
        let mut plans: Vec<FinancingPlan> = self
            .store
            .read(|r| r.plans())?
            .into_iter()
            .filter(|p| p.is_active)
            .collect();
        plans.sort_by(|a, b| {
            a.duration_months
                .cmp(&b.duration_months)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(plans)
    }

    pub fn get(&self, plan_id: PlanId) -> Result<FinancingPlan> {
        self.store
            .read(|r| r.plan(plan_id))?
            .ok_or(StoreError::PlanNotFound { plan_id })
    }

    pub fn create(&self, plan: NewPlan, time_provider: &SafeTimeProvider) -> Result<FinancingPlan> {
        let plan = plan.into_plan(time_provider.now());
        plan.check_terms()?;

        let plan = self.store.transaction(|tx| {
            tx.put_plan(plan.clone());
            Ok(plan)
        })?;
        info!(plan_id = %plan.id, name = plan.name.as_str(), duration = plan.duration_months, "Plan created");
        Ok(plan)
    }

    /// change a plan's terms
    ///
    /// Contracts already originated keep the figures they were created with.
    pub fn update(&self, plan_id: PlanId, update: PlanUpdate) -> Result<FinancingPlan> {
        self.store.transaction(|tx| {
            let mut plan = tx.plan(plan_id).ok_or(StoreError::PlanNotFound { plan_id })?;
            update.apply(&mut plan);
            plan.check_terms()?;
            tx.put_plan(plan.clone());
            Ok(plan)
        })
    }

    pub fn deactivate(&self, plan_id: PlanId) -> Result<FinancingPlan> {
        self.store.transaction(|tx| {
            let mut plan = tx.plan(plan_id).ok_or(StoreError::PlanNotFound { plan_id })?;
            if plan.is_active {
                plan.is_active = false;
                tx.put_plan(plan.clone());
                tx.record(Event::PlanDeactivated { plan_id });
            }
            Ok(plan)
        })
    }

    /// delete a plan no contract refers to; referenced plans can only be deactivated
    pub fn delete(&self, plan_id: PlanId) -> Result<FinancingPlan> {
        self.store.transaction(|tx| {
            let contracts = tx.contracts_for_plan(plan_id);
            if contracts > 0 {
                return Err(StoreError::PlanInUse { plan_id, contracts });
            }
            tx.remove_plan(plan_id)
                .ok_or(StoreError::PlanNotFound { plan_id })
        })
    }

    /// preview what an installment purchase would cost, starting today
    pub fn quote(
        &self,
        amount: Money,
        plan_id: PlanId,
        down_payment: DownPayment,
        time_provider: &SafeTimeProvider,
    ) -> Result<InstallmentQuote> {
        let plan = self.get(plan_id)?;
        let calculation = self.engine.calculate_with(amount, &plan, down_payment)?;
        let schedule = self.engine.generate_schedule(
            time_provider.now(),
            plan.duration_months,
            calculation.monthly_payment,
        )?;

        Ok(InstallmentQuote {
            plan_id: plan.id,
            plan_name: plan.name,
            calculation,
            schedule,
        })
    }
}
