use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amortization::{AmortizationResult, ScheduledInstallment};
use crate::decimal::{Money, Percent};
use crate::errors::{Result, StoreError};
use crate::types::{ContractId, ContractStatus, InstallmentStatus, OrderId, PlanId, UserId};

/// financing agreement created alongside an installment order
///
/// Amortization figures are copied from the calculation at origination and
/// never recomputed, even if the plan changes later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentContract {
    pub id: ContractId,
    pub contract_number: String,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub plan_id: PlanId,

    pub purchase_amount: Money,
    pub down_payment: Money,
    pub financed_principal: Money,
    pub total_interest: Money,
    pub total_financed_with_interest: Money,
    pub monthly_payment: Money,
    pub total_amount: Money,
    pub duration_months: u32,
    pub interest_rate: Percent,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub phone_number: String,
    pub otp_verified: bool,
    pub status: ContractStatus,
}

/// persisted due installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    pub id: Uuid,
    pub contract_id: ContractId,
    pub installment_number: u32,
    pub due_date: DateTime<Utc>,
    pub amount: Money,
    pub status: InstallmentStatus,
}

impl PaymentScheduleEntry {
    pub fn for_contract(contract_id: ContractId, installment: &ScheduledInstallment) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id,
            installment_number: installment.installment_number,
            due_date: installment.due_date,
            amount: installment.amount,
            status: installment.status,
        }
    }
}

/// inputs for originating a contract
pub struct Origination<'a> {
    pub contract_number: String,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub phone_number: String,
    pub start_date: DateTime<Utc>,
    pub calculation: &'a AmortizationResult,
    pub schedule: &'a [ScheduledInstallment],
}

impl InstallmentContract {
    /// build an active contract and its schedule rows
    pub fn originate(o: Origination<'_>) -> Result<(Self, Vec<PaymentScheduleEntry>)> {
        let last = o.schedule.last().ok_or_else(|| {
            StoreError::validation("cannot originate a contract without installments")
        })?;

        let contract = Self {
            id: Uuid::new_v4(),
            contract_number: o.contract_number,
            order_id: o.order_id,
            user_id: o.user_id,
            plan_id: o.plan_id,
            purchase_amount: o.calculation.purchase_amount,
            down_payment: o.calculation.down_payment,
            financed_principal: o.calculation.financed_principal,
            total_interest: o.calculation.total_interest,
            total_financed_with_interest: o.calculation.total_financed_with_interest,
            monthly_payment: o.calculation.monthly_payment,
            total_amount: o.calculation.total_amount,
            duration_months: o.calculation.duration_months,
            interest_rate: o.calculation.interest_rate,
            start_date: o.start_date,
            end_date: last.due_date,
            phone_number: o.phone_number,
            otp_verified: false,
            status: ContractStatus::Active,
        };

        let entries = o
            .schedule
            .iter()
            .map(|installment| PaymentScheduleEntry::for_contract(contract.id, installment))
            .collect();

        Ok((contract, entries))
    }
}
