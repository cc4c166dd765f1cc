/// rollback - a failed checkout leaves stock, orders and credit untouched
use std::sync::Arc;

use saberstore_installments::chrono::{TimeZone, Utc};
use saberstore_installments::{
    CreateOrder, CreditAuthority, DeliveryMethod, MemoryStore, Money, NewCustomer, NewPlan,
    NewProduct, OrderLine, OrderOrchestrator, OrderSettings, PaymentMethod, Percent, PlanCatalog,
    ProductCatalog, SafeTimeProvider, Store, StoreRead, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()));
    let store = Arc::new(MemoryStore::new());

    let products = ProductCatalog::new(store.clone());
    let phone = products.add_product(NewProduct {
        name: "Oppo Reno 12".to_string(),
        brand: Some("Oppo".to_string()),
        cash_price: Money::from_major(21_000),
        stock_qty: 5,
    })?;
    let plan = PlanCatalog::new(store.clone()).create(
        NewPlan {
            name: "12 months".to_string(),
            duration_months: 12,
            interest_rate: Percent::from_whole(15),
            min_down_payment: Percent::from_whole(15),
            is_active: true,
        },
        &time,
    )?;

    let credit = CreditAuthority::new(store.clone());
    let customer = credit.register_customer(NewCustomer {
        id: None,
        full_name: "Karim Fathy".to_string(),
        phone_number: "01511122233".to_string(),
    })?;
    // enough for one phone, not two
    credit.approve_kyc(customer.id, Money::from_major(25_000), "kyc-officer", &time)?;

    let orders = OrderOrchestrator::new(store.clone(), OrderSettings::default());
    let result = orders.create_order(
        CreateOrder {
            user_id: customer.id,
            items: vec![OrderLine {
                product_id: phone.id,
                quantity: 2,
                warranty_months: 0,
            }],
            payment_method: PaymentMethod::Installment,
            delivery_method: DeliveryMethod::Delivery,
            delivery_address: Some("7 Road 9, Maadi".to_string()),
            governorate: Some("Cairo".to_string()),
            pickup_branch: None,
            source: None,
            installment_plan_id: Some(plan.id),
        },
        &time,
    );

    match result {
        Ok(details) => println!("unexpectedly placed {}", details.order.order_number),
        Err(err) => println!("rejected: {err}"),
    }

    let stock = products.get_product(phone.id)?.stock_qty;
    let placed = store.read(|r| r.orders_for_user(customer.id).len())?;
    let events = store.take_events()?.len();
    println!("stock {stock}, orders {placed}, outbox events {events}");
    if let Some(line) = credit.credit_line(customer.id)? {
        println!("credit remaining: {}", line.remaining_limit);
    }

    Ok(())
}
