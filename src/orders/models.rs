use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{Result, StoreError};
use crate::types::{DeliveryMethod, OrderId, OrderStatus, PaymentMethod, PlanId, ProductId, UserId};

/// line item with the price captured when the order was placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_purchase: Money,
    pub warranty_months: u32,
}

impl OrderItem {
    /// `None` if the total does not fit in a `Money`
    pub fn line_total(&self) -> Option<Money> {
        self.price_at_purchase.checked_mul(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub governorate: Option<String>,
    pub pickup_branch: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// one requested cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub warranty_months: u32,
}

/// checkout request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub user_id: UserId,
    pub items: Vec<OrderLine>,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub governorate: Option<String>,
    pub pickup_branch: Option<String>,
    /// sales channel; the configured storefront source when absent
    pub source: Option<String>,
    pub installment_plan_id: Option<PlanId>,
}

impl CreateOrder {
    /// shape checks that need no store access
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(StoreError::validation("an order needs at least one item"));
        }
        if let Some(line) = self.items.iter().find(|line| line.quantity == 0) {
            return Err(StoreError::validation(format!(
                "quantity for product {} must be at least 1",
                line.product_id
            )));
        }

        match self.delivery_method {
            DeliveryMethod::Delivery if is_blank(&self.delivery_address) => {
                Err(StoreError::validation("delivery address is required for delivery"))
            }
            DeliveryMethod::Pickup if is_blank(&self.pickup_branch) => {
                Err(StoreError::validation("pickup branch is required for pickup"))
            }
            _ => Ok(()),
        }
    }

    /// requested quantity per product, in first-seen order
    pub fn quantities(&self) -> Vec<(ProductId, u32)> {
        let mut totals: Vec<(ProductId, u32)> = Vec::new();
        let mut index: HashMap<ProductId, usize> = HashMap::new();
        for line in &self.items {
            match index.get(&line.product_id) {
                Some(&i) => totals[i].1 = totals[i].1.saturating_add(line.quantity),
                None => {
                    index.insert(line.product_id, totals.len());
                    totals.push((line.product_id, line.quantity));
                }
            }
        }
        totals
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn request(lines: Vec<OrderLine>) -> CreateOrder {
        CreateOrder {
            user_id: Uuid::new_v4(),
            items: lines,
            payment_method: PaymentMethod::Card,
            delivery_method: DeliveryMethod::Delivery,
            delivery_address: Some("12 Tahrir St".to_string()),
            governorate: Some("Cairo".to_string()),
            pickup_branch: None,
            source: None,
            installment_plan_id: None,
        }
    }

    fn line(product_id: ProductId, quantity: u32) -> OrderLine {
        OrderLine {
            product_id,
            quantity,
            warranty_months: 0,
        }
    }

    #[test]
    fn test_validate_shape() {
        assert!(request(vec![line(Uuid::new_v4(), 1)]).validate().is_ok());
        assert!(request(vec![]).validate().is_err());
        assert!(request(vec![line(Uuid::new_v4(), 0)]).validate().is_err());

        let mut no_address = request(vec![line(Uuid::new_v4(), 1)]);
        no_address.delivery_address = Some("   ".to_string());
        assert!(no_address.validate().is_err());

        let mut pickup = request(vec![line(Uuid::new_v4(), 1)]);
        pickup.delivery_method = DeliveryMethod::Pickup;
        pickup.delivery_address = None;
        assert!(pickup.validate().is_err());
        pickup.pickup_branch = Some("Nasr City".to_string());
        assert!(pickup.validate().is_ok());
    }

    #[test]
    fn test_quantities_merge_repeated_products() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let req = request(vec![line(a, 2), line(b, 1), line(a, 3)]);
        assert_eq!(req.quantities(), vec![(a, 5), (b, 1)]);
    }

    #[test]
    fn test_line_total() {
        let item = OrderItem {
            product_id: Uuid::new_v4(),
            quantity: 3,
            price_at_purchase: Money::from_minor(1_999_950),
            warranty_months: 12,
        };
        assert_eq!(item.line_total(), Some(Money::from_minor(5_999_850)));

        let oversized = OrderItem {
            quantity: u32::MAX,
            price_at_purchase: Money::from_decimal(rust_decimal::Decimal::MAX),
            ..item
        };
        assert_eq!(oversized.line_total(), None);
    }
}
