use thiserror::Error;

use crate::decimal::Money;
use crate::types::{OrderId, PlanId, ProductId, UserId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("invalid request: {message}")]
    Validation {
        message: String,
    },

    #[error("invalid purchase amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("product not found: {product_id}")]
    ProductNotFound {
        product_id: ProductId,
    },

    #[error("insufficient stock for product {name} ({product_id}): available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        available: u32,
        requested: u32,
    },

    #[error("installment plan id is required for installment payments")]
    MissingPlan,

    #[error("installment plan not found: {plan_id}")]
    PlanNotFound {
        plan_id: PlanId,
    },

    #[error("invalid installment plan {plan_id}: {reason}")]
    InvalidPlan {
        plan_id: PlanId,
        reason: String,
    },

    #[error("installment plan {plan_id} is referenced by {contracts} contract(s)")]
    PlanInUse {
        plan_id: PlanId,
        contracts: usize,
    },

    #[error("order not found: {order_id}")]
    OrderNotFound {
        order_id: OrderId,
    },

    #[error("customer not found: {user_id}")]
    CustomerNotFound {
        user_id: UserId,
    },

    #[error("no active credit line for customer {user_id}")]
    NoCreditLine {
        user_id: UserId,
    },

    #[error("credit limit exceeded: available {available}, requested {requested}")]
    CreditLimitExceeded {
        available: Money,
        requested: Money,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("transaction aborted: {message}")]
    TransactionFailure {
        message: String,
    },

    #[error("storage error: {message}")]
    Storage {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

/// coarse classification used by transports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// malformed or incomplete input
    Validation,
    /// a referenced record does not exist
    NotFound,
    /// the request is well formed but conflicts with current state
    Conflict,
    /// infrastructure or invariant failure
    Internal,
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Validation { .. }
            | StoreError::InvalidAmount { .. }
            | StoreError::MissingPlan
            | StoreError::InvalidPlan { .. }
            | StoreError::InvalidDate { .. } => ErrorKind::Validation,
            StoreError::ProductNotFound { .. }
            | StoreError::PlanNotFound { .. }
            | StoreError::OrderNotFound { .. }
            | StoreError::CustomerNotFound { .. } => ErrorKind::NotFound,
            StoreError::InsufficientStock { .. }
            | StoreError::PlanInUse { .. }
            | StoreError::NoCreditLine { .. }
            | StoreError::CreditLimitExceeded { .. } => ErrorKind::Conflict,
            StoreError::TransactionFailure { .. }
            | StoreError::Storage { .. }
            | StoreError::InvalidConfiguration { .. } => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_messages_name_the_offender() {
        let product_id = Uuid::new_v4();
        let err = StoreError::InsufficientStock {
            product_id,
            name: "Toshiba Fridge 14ft".to_string(),
            available: 1,
            requested: 3,
        };
        let message = err.to_string();
        assert!(message.contains("Toshiba Fridge 14ft"));
        assert!(message.contains(&product_id.to_string()));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_classification() {
        assert_eq!(StoreError::MissingPlan.kind(), ErrorKind::Validation);
        assert_eq!(
            StoreError::OrderNotFound { order_id: Uuid::new_v4() }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            StoreError::TransactionFailure { message: "poisoned".into() }.kind(),
            ErrorKind::Internal
        );
    }
}
