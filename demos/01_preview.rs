/// preview - what the checkout calculator shows before an order is placed
use std::sync::Arc;

use saberstore_installments::chrono::{TimeZone, Utc};
use saberstore_installments::{
    DownPayment, MemoryStore, Money, NewPlan, Percent, PlanCatalog, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2026, 1, 31, 10, 0, 0).unwrap()));
    let plans = PlanCatalog::new(Arc::new(MemoryStore::new()));

    let plan = plans.create(
        NewPlan {
            name: "12 months".to_string(),
            duration_months: 12,
            interest_rate: Percent::from_whole(12),
            min_down_payment: Percent::from_whole(20),
            is_active: true,
        },
        &time,
    )?;

    // a 10,000 EGP fridge on the plan minimum down payment
    let quote = plans.quote(Money::from_major(10_000), plan.id, DownPayment::Minimum, &time)?;
    let calc = &quote.calculation;
    println!("{}: {} down, {} x {}", quote.plan_name, calc.down_payment, calc.duration_months, calc.monthly_payment);
    println!("total {} (schedule drift {})", calc.total_amount, calc.rounding_drift());
    for installment in &quote.schedule {
        println!("  #{:>2} {} {}", installment.installment_number, installment.due_date.date_naive(), installment.amount);
    }

    // paying more up front lowers the monthly figure
    let quote = plans.quote(
        Money::from_major(10_000),
        plan.id,
        DownPayment::Custom(Money::from_major(5_000)),
        &time,
    )?;
    println!("with 5000 down: {} per month", quote.calculation.monthly_payment);

    Ok(())
}
