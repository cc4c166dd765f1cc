//! shared fixtures for unit tests

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};

use crate::catalog::{NewProduct, Product};
use crate::credit::{CreditLine, Customer};
use crate::decimal::{Money, Percent};
use crate::plans::{FinancingPlan, NewPlan};
use crate::store::{MemoryStore, Store, StoreRead, StoreTx};
use crate::types::CreditLineStatus;
use crate::Uuid;

pub fn start_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 31, 10, 0, 0).unwrap()
}

pub fn test_time() -> SafeTimeProvider {
    SafeTimeProvider::new(TimeSource::Test(start_date()))
}

pub fn plan(name: &str, duration: u32, rate: u32, down: u32) -> FinancingPlan {
    NewPlan {
        name: name.to_string(),
        duration_months: duration,
        interest_rate: Percent::from_whole(rate),
        min_down_payment: Percent::from_whole(down),
        is_active: true,
    }
    .into_plan(start_date())
}

pub fn product(name: &str, price: i64, stock: u32) -> Product {
    NewProduct {
        name: name.to_string(),
        brand: None,
        cash_price: Money::from_major(price),
        stock_qty: stock,
    }
    .into_product()
}

/// a seeded store: two products, two plans, one customer with credit
pub struct Shop {
    pub store: Arc<MemoryStore>,
    pub tv: Product,
    pub fridge: Product,
    pub zero_interest: FinancingPlan,
    pub twelve_percent: FinancingPlan,
    pub customer: Customer,
}

impl Shop {
    pub fn new() -> Self {
        Self::with_limit(Money::from_major(100_000))
    }

    pub fn with_limit(limit: Money) -> Self {
        let store = Arc::new(MemoryStore::new());
        let tv = product("LG 55\" OLED", 10_000, 5);
        let fridge = product("Sharp Fridge 16ft", 15_000, 2);
        let zero_interest = plan("24 months, no interest", 24, 0, 10);
        let twelve_percent = plan("12 months", 12, 12, 20);
        let customer = Customer {
            id: Uuid::new_v4(),
            full_name: "Ahmed Saber".to_string(),
            phone_number: "01123456789".to_string(),
        };

        store
            .transaction(|tx| {
                tx.put_product(tv.clone());
                tx.put_product(fridge.clone());
                tx.put_plan(zero_interest.clone());
                tx.put_plan(twelve_percent.clone());
                tx.put_customer(customer.clone());
                tx.put_credit_line(CreditLine {
                    user_id: customer.id,
                    total_limit: limit,
                    current_balance: Money::ZERO,
                    remaining_limit: limit,
                    status: CreditLineStatus::Active,
                    approved_by: "admin".to_string(),
                    approved_at: start_date(),
                });
                Ok(())
            })
            .unwrap();

        Self {
            store,
            tv,
            fridge,
            zero_interest,
            twelve_percent,
            customer,
        }
    }

    pub fn stock(&self, product: &Product) -> u32 {
        self.store.read(|r| r.product(product.id).unwrap().stock_qty).unwrap()
    }
}
