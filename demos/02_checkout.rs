/// checkout - customer onboarding, credit approval and an installment order
use std::sync::Arc;

use saberstore_installments::chrono::{TimeZone, Utc};
use saberstore_installments::{
    CreateOrder, CreditAuthority, DeliveryMethod, MemoryStore, Money, NewCustomer, NewPlan,
    NewProduct, OrderLine, OrderOrchestrator, OrderSettings, PaymentMethod, Percent, PlanCatalog,
    ProductCatalog, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap()));
    let store = Arc::new(MemoryStore::new());

    let products = ProductCatalog::new(store.clone());
    let washer = products.add_product(NewProduct {
        name: "Zanussi Washer 8kg".to_string(),
        brand: Some("Zanussi".to_string()),
        cash_price: Money::from_major(16_500),
        stock_qty: 10,
    })?;

    let plan = PlanCatalog::new(store.clone()).create(
        NewPlan {
            name: "24 months, no interest".to_string(),
            duration_months: 24,
            interest_rate: Percent::ZERO,
            min_down_payment: Percent::from_whole(10),
            is_active: true,
        },
        &time,
    )?;

    let credit = CreditAuthority::new(store.clone());
    let customer = credit.register_customer(NewCustomer {
        id: None,
        full_name: "Nour Ibrahim".to_string(),
        phone_number: "01098765432".to_string(),
    })?;
    credit.approve_kyc(customer.id, Money::from_major(40_000), "kyc-officer", &time)?;

    let orders = OrderOrchestrator::new(store.clone(), OrderSettings::default());
    let details = orders.create_order(
        CreateOrder {
            user_id: customer.id,
            items: vec![OrderLine {
                product_id: washer.id,
                quantity: 1,
                warranty_months: 24,
            }],
            payment_method: PaymentMethod::Installment,
            delivery_method: DeliveryMethod::Pickup,
            delivery_address: None,
            governorate: Some("Alexandria".to_string()),
            pickup_branch: Some("Smouha".to_string()),
            source: None,
            installment_plan_id: Some(plan.id),
        },
        &time,
    )?;

    println!("order {} for {}", details.order.order_number, details.order.total_amount);
    if let Some(financing) = &details.contract {
        let contract = &financing.contract;
        println!(
            "contract {}: {} down, {} x {} until {}",
            contract.contract_number,
            contract.down_payment,
            contract.duration_months,
            contract.monthly_payment,
            contract.end_date.date_naive()
        );
    }

    if let Some(line) = credit.credit_line(customer.id)? {
        println!("credit remaining: {} of {}", line.remaining_limit, line.total_limit);
    }
    println!("washers left: {}", products.get_product(washer.id)?.stock_qty);

    Ok(())
}
