pub mod memory;

use crate::catalog::Product;
use crate::credit::{CreditLine, Customer};
use crate::errors::Result;
use crate::events::Event;
use crate::orders::{InstallmentContract, Order, PaymentScheduleEntry};
use crate::plans::FinancingPlan;
use crate::types::{ContractId, OrderId, PlanId, ProductId, SequenceKind, UserId};

pub use memory::MemoryStore;

/// read access to a consistent view of the store
pub trait StoreRead {
    fn product(&self, id: ProductId) -> Option<Product>;
    fn plan(&self, id: PlanId) -> Option<FinancingPlan>;
    fn plans(&self) -> Vec<FinancingPlan>;
    fn customer(&self, id: UserId) -> Option<Customer>;
    fn credit_line(&self, user_id: UserId) -> Option<CreditLine>;
    fn order(&self, id: OrderId) -> Option<Order>;
    /// newest first
    fn orders_for_user(&self, user_id: UserId) -> Vec<Order>;
    fn contract_for_order(&self, order_id: OrderId) -> Option<InstallmentContract>;
    /// ordered by installment number
    fn schedule_for_contract(&self, contract_id: ContractId) -> Vec<PaymentScheduleEntry>;
    fn contracts_for_plan(&self, plan_id: PlanId) -> usize;
}

/// writes staged inside one transaction
pub trait StoreTx: StoreRead {
    fn put_product(&mut self, product: Product);

    /// decrement if at least `quantity` is on hand, else fail with
    /// `InsufficientStock`; returns the remaining quantity
    fn decrement_stock(&mut self, id: ProductId, quantity: u32) -> Result<u32>;

    fn put_plan(&mut self, plan: FinancingPlan);
    fn remove_plan(&mut self, id: PlanId) -> Option<FinancingPlan>;
    fn put_customer(&mut self, customer: Customer);
    fn put_credit_line(&mut self, line: CreditLine);

    /// reserve the next number for `kind` in `year`, starting at 1
    fn next_sequence(&mut self, kind: SequenceKind, year: i32) -> u32;

    fn insert_order(&mut self, order: Order);
    fn insert_contract(&mut self, contract: InstallmentContract);
    fn insert_schedule(&mut self, entries: Vec<PaymentScheduleEntry>);
    fn record(&mut self, event: Event);
}

/// persistence boundary
///
/// `transaction` is all-or-nothing: writes made through the `StoreTx`
/// become visible only when the closure returns `Ok`, and an `Err`
/// discards every one of them. Transactions on the same store do not
/// interleave.
pub trait Store: Send + Sync {
    fn read<T>(&self, f: impl FnOnce(&dyn StoreRead) -> T) -> Result<T>;

    fn transaction<T>(&self, f: impl FnOnce(&mut dyn StoreTx) -> Result<T>) -> Result<T>;

    /// drain committed events, oldest first
    fn take_events(&self) -> Result<Vec<Event>>;
}
