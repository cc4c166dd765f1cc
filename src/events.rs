use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{ContractId, OrderId, PaymentMethod, PlanId, ProductId, UserId};

/// domain events recorded alongside the writes that caused them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // order events
    OrderPlaced {
        order_id: OrderId,
        order_number: String,
        user_id: UserId,
        total_amount: Money,
        payment_method: PaymentMethod,
        timestamp: DateTime<Utc>,
    },
    StockDecremented {
        product_id: ProductId,
        quantity: u32,
        remaining: u32,
        order_id: OrderId,
    },

    // financing events
    ContractOriginated {
        contract_id: ContractId,
        contract_number: String,
        order_id: OrderId,
        plan_id: PlanId,
        financed_amount: Money,
        monthly_payment: Money,
        timestamp: DateTime<Utc>,
    },
    InstallmentScheduled {
        contract_id: ContractId,
        installment_number: u32,
        amount: Money,
        due_date: DateTime<Utc>,
    },
    CreditReserved {
        user_id: UserId,
        amount: Money,
        remaining_limit: Money,
        timestamp: DateTime<Utc>,
    },

    // credit authority events
    CreditLineApproved {
        user_id: UserId,
        total_limit: Money,
        remaining_limit: Money,
        approved_by: String,
        timestamp: DateTime<Utc>,
    },

    // plan catalog events
    PlanDeactivated {
        plan_id: PlanId,
    },
}

/// append-only event log, committed together with its transaction
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// move every event of `other` to the end of this log
    pub fn append(&mut self, other: &mut EventLog) {
        self.events.append(&mut other.events);
    }
}
