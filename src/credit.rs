use std::sync::Arc;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{Result, StoreError};
use crate::events::Event;
use crate::store::{Store, StoreRead, StoreTx};
use crate::types::{CreditLineStatus, UserId};

/// registered storefront customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: UserId,
    pub full_name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    #[serde(default)]
    pub id: Option<UserId>,
    pub full_name: String,
    pub phone_number: String,
}

/// installment credit granted after KYC approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditLine {
    pub user_id: UserId,
    pub total_limit: Money,
    pub current_balance: Money,
    pub remaining_limit: Money,
    pub status: CreditLineStatus,
    pub approved_by: String,
    pub approved_at: DateTime<Utc>,
}

impl CreditLine {
    /// hold `amount` against the line for a new contract
    pub fn reserve(&mut self, amount: Money) -> Result<()> {
        if self.status != CreditLineStatus::Active {
            return Err(StoreError::NoCreditLine {
                user_id: self.user_id,
            });
        }
        if amount > self.remaining_limit {
            return Err(StoreError::CreditLimitExceeded {
                available: self.remaining_limit,
                requested: amount,
            });
        }
        self.current_balance += amount;
        self.remaining_limit -= amount;
        Ok(())
    }
}

/// Egyptian mobile number: 11 digits, `010`, `011`, `012` or `015` prefix
pub fn is_egyptian_mobile(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 11
        && bytes.iter().all(u8::is_ascii_digit)
        && bytes.starts_with(b"01")
        && matches!(bytes[2], b'0' | b'1' | b'2' | b'5')
}

/// customer registry and KYC credit approval
#[derive(Debug)]
pub struct CreditAuthority<S> {
    store: Arc<S>,
}

impl<S: Store> CreditAuthority<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn register_customer(&self, customer: NewCustomer) -> Result<Customer> {
        if customer.full_name.trim().is_empty() {
            return Err(StoreError::validation("customer name is required"));
        }
        if !is_egyptian_mobile(&customer.phone_number) {
            return Err(StoreError::validation(format!(
                "{} is not an Egyptian mobile number",
                customer.phone_number
            )));
        }

        let customer = Customer {
            id: customer.id.unwrap_or_else(Uuid::new_v4),
            full_name: customer.full_name,
            phone_number: customer.phone_number,
        };
        self.store.transaction(|tx| {
            tx.put_customer(customer.clone());
            Ok(customer)
        })
    }

    pub fn customer(&self, user_id: UserId) -> Result<Customer> {
        self.store
            .read(|r| r.customer(user_id))?
            .ok_or(StoreError::CustomerNotFound { user_id })
    }

    /// approve KYC and set the total limit
    ///
    /// An existing balance is carried over: remaining = total - balance.
    /// A limit below that balance is rejected.
    pub fn approve_kyc(
        &self,
        user_id: UserId,
        total_limit: Money,
        approved_by: &str,
        time_provider: &SafeTimeProvider,
    ) -> Result<CreditLine> {
        if total_limit.is_negative() {
            return Err(StoreError::InvalidAmount {
                amount: total_limit,
            });
        }
        let now = time_provider.now();

        let line = self.store.transaction(|tx| {
            if tx.customer(user_id).is_none() {
                return Err(StoreError::CustomerNotFound { user_id });
            }
            let current_balance = tx
                .credit_line(user_id)
                .map_or(Money::ZERO, |existing| existing.current_balance);
            if total_limit < current_balance {
                return Err(StoreError::validation(format!(
                    "total limit {total_limit} is below the outstanding balance {current_balance}"
                )));
            }

            let line = CreditLine {
                user_id,
                total_limit,
                current_balance,
                remaining_limit: total_limit - current_balance,
                status: CreditLineStatus::Active,
                approved_by: approved_by.to_string(),
                approved_at: now,
            };
            tx.put_credit_line(line.clone());
            tx.record(Event::CreditLineApproved {
                user_id,
                total_limit,
                remaining_limit: line.remaining_limit,
                approved_by: approved_by.to_string(),
                timestamp: now,
            });
            Ok(line)
        })?;

        info!(%user_id, total_limit = %line.total_limit, remaining = %line.remaining_limit, "credit line approved");
        Ok(line)
    }

    pub fn credit_line(&self, user_id: UserId) -> Result<Option<CreditLine>> {
        self.store.read(|r| r.credit_line(user_id))
    }

    pub fn set_status(&self, user_id: UserId, status: CreditLineStatus) -> Result<CreditLine> {
        self.store.transaction(|tx| {
            let mut line = tx
                .credit_line(user_id)
                .ok_or(StoreError::NoCreditLine { user_id })?;
            line.status = status;
            tx.put_credit_line(line.clone());
            Ok(line)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()))
    }

    fn customer() -> NewCustomer {
        NewCustomer {
            id: None,
            full_name: "Mona Adel".to_string(),
            phone_number: "01012345678".to_string(),
        }
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_egyptian_mobile("01012345678"));
        assert!(is_egyptian_mobile("01512345678"));
        assert!(!is_egyptian_mobile("01312345678"));
        assert!(!is_egyptian_mobile("0101234567"));
        assert!(!is_egyptian_mobile("+201012345678"));
        assert!(!is_egyptian_mobile("0101234567a"));
    }

    #[test]
    fn test_register_rejects_bad_phone() {
        let authority = CreditAuthority::new(Arc::new(MemoryStore::new()));
        let mut bad = customer();
        bad.phone_number = "12345".to_string();
        assert!(matches!(
            authority.register_customer(bad),
            Err(StoreError::Validation { .. })
        ));
    }

    #[test]
    fn test_approve_sets_limit() {
        let authority = CreditAuthority::new(Arc::new(MemoryStore::new()));
        let c = authority.register_customer(customer()).unwrap();

        let line = authority
            .approve_kyc(c.id, Money::from_major(50_000), "admin-1", &time())
            .unwrap();
        assert_eq!(line.total_limit, Money::from_major(50_000));
        assert_eq!(line.remaining_limit, Money::from_major(50_000));
        assert_eq!(line.current_balance, Money::ZERO);
        assert_eq!(line.status, CreditLineStatus::Active);
    }

    #[test]
    fn test_reapproval_keeps_balance() {
        let store = Arc::new(MemoryStore::new());
        let authority = CreditAuthority::new(store.clone());
        let c = authority.register_customer(customer()).unwrap();
        authority
            .approve_kyc(c.id, Money::from_major(20_000), "admin-1", &time())
            .unwrap();
        store
            .transaction(|tx| {
                let mut line = tx.credit_line(c.id).unwrap();
                line.reserve(Money::from_major(8_000))?;
                tx.put_credit_line(line);
                Ok(())
            })
            .unwrap();

        let raised = authority
            .approve_kyc(c.id, Money::from_major(30_000), "admin-2", &time())
            .unwrap();
        assert_eq!(raised.current_balance, Money::from_major(8_000));
        assert_eq!(raised.remaining_limit, Money::from_major(22_000));
    }

    #[test]
    fn test_limit_below_balance_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let authority = CreditAuthority::new(store.clone());
        let c = authority.register_customer(customer()).unwrap();
        authority
            .approve_kyc(c.id, Money::from_major(20_000), "admin-1", &time())
            .unwrap();
        store
            .transaction(|tx| {
                let mut line = tx.credit_line(c.id).unwrap();
                line.reserve(Money::from_major(8_000))?;
                tx.put_credit_line(line);
                Ok(())
            })
            .unwrap();

        let result = authority.approve_kyc(c.id, Money::from_major(5_000), "admin-2", &time());
        assert!(matches!(result, Err(StoreError::Validation { .. })));

        let line = authority.credit_line(c.id).unwrap().unwrap();
        assert_eq!(line.total_limit, Money::from_major(20_000));
        assert_eq!(line.remaining_limit, Money::from_major(12_000));
        assert_eq!(line.approved_by, "admin-1");

        // exactly the balance is allowed and leaves nothing to spend
        let line = authority
            .approve_kyc(c.id, Money::from_major(8_000), "admin-2", &time())
            .unwrap();
        assert_eq!(line.remaining_limit, Money::ZERO);
    }

    #[test]
    fn test_approve_unknown_customer() {
        let authority = CreditAuthority::new(Arc::new(MemoryStore::new()));
        let result = authority.approve_kyc(Uuid::new_v4(), Money::from_major(1), "admin", &time());
        assert!(matches!(result, Err(StoreError::CustomerNotFound { .. })));
    }

    #[test]
    fn test_reserve() {
        let mut line = CreditLine {
            user_id: Uuid::new_v4(),
            total_limit: Money::from_major(10_000),
            current_balance: Money::ZERO,
            remaining_limit: Money::from_major(10_000),
            status: CreditLineStatus::Active,
            approved_by: "admin".to_string(),
            approved_at: Utc::now(),
        };

        line.reserve(Money::from_major(6_000)).unwrap();
        assert_eq!(line.remaining_limit, Money::from_major(4_000));

        let err = line.reserve(Money::from_major(4_001)).unwrap_err();
        assert_eq!(
            err,
            StoreError::CreditLimitExceeded {
                available: Money::from_major(4_000),
                requested: Money::from_major(4_001),
            }
        );

        line.status = CreditLineStatus::Frozen;
        assert!(matches!(
            line.reserve(Money::ONE),
            Err(StoreError::NoCreditLine { .. })
        ));
    }
}
