use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a storefront customer
pub type UserId = Uuid;

/// unique identifier for a catalog product
pub type ProductId = Uuid;

/// unique identifier for a financing plan
pub type PlanId = Uuid;

/// unique identifier for an order
pub type OrderId = Uuid;

/// unique identifier for an installment contract
pub type ContractId = Uuid;

/// order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// placed, awaiting confirmation
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// how the customer pays for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Fawry,
    Wallet,
    /// buy now, pay later through a financing plan
    Installment,
}

impl PaymentMethod {
    pub fn is_installment(&self) -> bool {
        matches!(self, PaymentMethod::Installment)
    }
}

/// how the order reaches the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// shipped to the customer's address
    Delivery,
    /// collected from a branch
    Pickup,
}

/// installment contract status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStatus {
    Active,
    Completed,
    Defaulted,
    Cancelled,
}

/// payment schedule entry status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    /// not yet due or due and unpaid within terms
    Pending,
    Paid,
    /// past due date without payment
    Overdue,
    /// paid after the due date
    Late,
}

/// customer credit line status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditLineStatus {
    Active,
    Frozen,
    Suspended,
}

/// counters used for human-readable document numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SequenceKind {
    Order,
    Contract,
}

impl SequenceKind {
    /// document number prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            SequenceKind::Order => "ORD",
            SequenceKind::Contract => "CON",
        }
    }

    /// format a number such as `ORD-2026-0007`
    pub fn format(&self, year: i32, sequence: u32) -> String {
        format!("{}-{}-{:04}", self.prefix(), year, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_numbers() {
        assert_eq!(SequenceKind::Order.format(2026, 7), "ORD-2026-0007");
        assert_eq!(SequenceKind::Contract.format(2026, 12345), "CON-2026-12345");
    }

    #[test]
    fn test_payment_method_wire_format() {
        let method: PaymentMethod = serde_json::from_str("\"installment\"").unwrap();
        assert!(method.is_installment());
        assert_eq!(serde_json::to_string(&PaymentMethod::Fawry).unwrap(), "\"fawry\"");
    }
}
