//! serializable views for API responses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amortization::ScheduledInstallment;
use crate::decimal::{Money, Percent};
use crate::orders::{ContractDetails, OrderDetails, OrderItem, PaymentScheduleEntry};
use crate::plans::{FinancingPlan, InstallmentQuote};
use crate::types::{
    ContractId, ContractStatus, DeliveryMethod, InstallmentStatus, OrderId, OrderStatus,
    PaymentMethod, PlanId, ProductId, UserId,
};

/// order as returned to the storefront
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub governorate: Option<String>,
    pub pickup_branch: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
    pub contract: Option<ContractView>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_purchase: Money,
    pub warranty_months: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractView {
    pub id: ContractId,
    pub contract_number: String,
    pub plan_id: PlanId,
    pub status: ContractStatus,
    pub down_payment_amount: Money,
    pub financed_principal: Money,
    pub total_interest: Money,
    pub total_financed_amount: Money,
    pub monthly_payment_amount: Money,
    pub total_amount: Money,
    pub duration_months: u32,
    pub interest_rate: Percent,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub phone_number: String,
    pub otp_verified: bool,
    pub payment_schedule: Vec<InstallmentView>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentView {
    pub installment_number: u32,
    pub due_date: DateTime<Utc>,
    pub amount: Money,
    pub status: InstallmentStatus,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    pub id: PlanId,
    pub name: String,
    pub duration_months: u32,
    pub interest_rate: Percent,
    pub min_down_payment: Percent,
    pub is_active: bool,
}

/// checkout calculator result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationView {
    pub plan_id: PlanId,
    pub plan_name: String,
    pub purchase_amount: Money,
    pub down_payment: Money,
    pub financed_principal: Money,
    pub total_interest: Money,
    pub total_financed_with_interest: Money,
    pub monthly_payment: Money,
    pub total_amount: Money,
    pub duration_months: u32,
    pub interest_rate: Percent,
    pub schedule: Vec<InstallmentView>,
}

impl OrderView {
    pub fn from_details(details: &OrderDetails) -> Self {
        let order = &details.order;
        OrderView {
            id: order.id,
            order_number: order.order_number.clone(),
            user_id: order.user_id,
            status: order.status,
            total_amount: order.total_amount,
            payment_method: order.payment_method,
            delivery_method: order.delivery_method,
            delivery_address: order.delivery_address.clone(),
            governorate: order.governorate.clone(),
            pickup_branch: order.pickup_branch.clone(),
            source: order.source.clone(),
            created_at: order.created_at,
            items: order.items.iter().map(OrderItemView::from_item).collect(),
            contract: details.contract.as_ref().map(ContractView::from_details),
        }
    }
}

impl OrderItemView {
    pub fn from_item(item: &OrderItem) -> Self {
        OrderItemView {
            product_id: item.product_id,
            quantity: item.quantity,
            price_at_purchase: item.price_at_purchase,
            warranty_months: item.warranty_months,
        }
    }
}

impl ContractView {
    pub fn from_details(details: &ContractDetails) -> Self {
        let c = &details.contract;
        ContractView {
            id: c.id,
            contract_number: c.contract_number.clone(),
            plan_id: c.plan_id,
            status: c.status,
            down_payment_amount: c.down_payment,
            financed_principal: c.financed_principal,
            total_interest: c.total_interest,
            total_financed_amount: c.total_financed_with_interest,
            monthly_payment_amount: c.monthly_payment,
            total_amount: c.total_amount,
            duration_months: c.duration_months,
            interest_rate: c.interest_rate,
            start_date: c.start_date,
            end_date: c.end_date,
            phone_number: c.phone_number.clone(),
            otp_verified: c.otp_verified,
            payment_schedule: details.schedule.iter().map(InstallmentView::from_entry).collect(),
        }
    }
}

impl InstallmentView {
    pub fn from_entry(entry: &PaymentScheduleEntry) -> Self {
        InstallmentView {
            installment_number: entry.installment_number,
            due_date: entry.due_date,
            amount: entry.amount,
            status: entry.status,
        }
    }

    pub fn from_scheduled(installment: &ScheduledInstallment) -> Self {
        InstallmentView {
            installment_number: installment.installment_number,
            due_date: installment.due_date,
            amount: installment.amount,
            status: installment.status,
        }
    }
}

impl PlanView {
    pub fn from_plan(plan: &FinancingPlan) -> Self {
        PlanView {
            id: plan.id,
            name: plan.name.clone(),
            duration_months: plan.duration_months,
            interest_rate: plan.interest_rate,
            min_down_payment: plan.min_down_payment,
            is_active: plan.is_active,
        }
    }
}

impl CalculationView {
    pub fn from_quote(quote: &InstallmentQuote) -> Self {
        let calc = &quote.calculation;
        CalculationView {
            plan_id: quote.plan_id,
            plan_name: quote.plan_name.clone(),
            purchase_amount: calc.purchase_amount,
            down_payment: calc.down_payment.round_cents(),
            financed_principal: calc.financed_principal.round_cents(),
            total_interest: calc.total_interest.round_cents(),
            total_financed_with_interest: calc.total_financed_with_interest.round_cents(),
            monthly_payment: calc.monthly_payment,
            total_amount: calc.total_amount,
            duration_months: calc.duration_months,
            interest_rate: calc.interest_rate,
            schedule: quote.schedule.iter().map(InstallmentView::from_scheduled).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::DownPayment;
    use crate::plans::PlanCatalog;
    use crate::testing::{test_time, Shop};
    use rust_decimal_macros::dec;

    #[test]
    fn test_calculation_view_wire_shape() {
        let shop = Shop::new();
        let quote = PlanCatalog::new(shop.store.clone())
            .quote(
                Money::from_decimal(dec!(9999.99)),
                shop.twelve_percent.id,
                DownPayment::Minimum,
                &test_time(),
            )
            .unwrap();

        let json = serde_json::to_value(CalculationView::from_quote(&quote)).unwrap();
        assert_eq!(json["planName"], "12 months");
        // 9999.99 * 20% = 1999.998, shown to the piastre
        let down: rust_decimal::Decimal = json["downPayment"].as_str().unwrap().parse().unwrap();
        assert_eq!(down, dec!(2000.00));
        assert_eq!(json["durationMonths"], 12);
        assert_eq!(json["schedule"].as_array().unwrap().len(), 12);
        assert_eq!(json["schedule"][0]["installmentNumber"], 1);
        assert_eq!(json["schedule"][0]["status"], "Pending");
    }
}
