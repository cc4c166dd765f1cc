use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::catalog::Product;
use crate::credit::{CreditLine, Customer};
use crate::errors::{Result, StoreError};
use crate::events::{Event, EventLog};
use crate::orders::{InstallmentContract, Order, PaymentScheduleEntry};
use crate::plans::FinancingPlan;
use crate::store::{Store, StoreRead, StoreTx};
use crate::types::{ContractId, OrderId, PlanId, ProductId, SequenceKind, UserId};

/// trailing counter of an `ORD-<year>-<seq>` style number
fn number_sequence(number: &str) -> u32 {
    number
        .rsplit('-')
        .next()
        .and_then(|seq| seq.parse().ok())
        .unwrap_or(0)
}

#[derive(Debug, Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    plans: HashMap<PlanId, FinancingPlan>,
    customers: HashMap<UserId, Customer>,
    credit_lines: HashMap<UserId, CreditLine>,
    orders: HashMap<OrderId, Order>,
    contracts: HashMap<ContractId, InstallmentContract>,
    schedules: HashMap<ContractId, Vec<PaymentScheduleEntry>>,
    sequences: HashMap<(SequenceKind, i32), u32>,
    outbox: EventLog,
}

impl Tables {
    /// working copy for one transaction; its outbox starts empty
    fn begin(&self) -> Tables {
        Tables {
            products: self.products.clone(),
            plans: self.plans.clone(),
            customers: self.customers.clone(),
            credit_lines: self.credit_lines.clone(),
            orders: self.orders.clone(),
            contracts: self.contracts.clone(),
            schedules: self.schedules.clone(),
            sequences: self.sequences.clone(),
            outbox: EventLog::new(),
        }
    }

    fn commit(&mut self, mut working: Tables) {
        let mut outbox = std::mem::take(&mut self.outbox);
        outbox.append(&mut working.outbox);
        working.outbox = outbox;
        *self = working;
    }
}

/// in-process store with serialized, all-or-nothing transactions
///
/// Each transaction runs against a private copy of the tables which
/// replaces the committed state only on success.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn read<T>(&self, f: impl FnOnce(&dyn StoreRead) -> T) -> Result<T> {
        let tables = self.tables.lock().map_err(|_| StoreError::Storage {
            message: "store lock poisoned".to_string(),
        })?;
        Ok(f(&*tables))
    }

    fn transaction<T>(&self, f: impl FnOnce(&mut dyn StoreTx) -> Result<T>) -> Result<T> {
        let mut committed = self.tables.lock().map_err(|_| StoreError::TransactionFailure {
            message: "store lock poisoned".to_string(),
        })?;

        let mut working = committed.begin();
        match f(&mut working) {
            Ok(value) => {
                committed.commit(working);
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }

    fn take_events(&self) -> Result<Vec<Event>> {
        let mut tables = self.tables.lock().map_err(|_| StoreError::Storage {
            message: "store lock poisoned".to_string(),
        })?;
        Ok(tables.outbox.take_events())
    }
}

impl StoreRead for Tables {
    fn product(&self, id: ProductId) -> Option<Product> {
        self.products.get(&id).cloned()
    }

    fn plan(&self, id: PlanId) -> Option<FinancingPlan> {
        self.plans.get(&id).cloned()
    }

    fn plans(&self) -> Vec<FinancingPlan> {
        self.plans.values().cloned().collect()
    }

    fn customer(&self, id: UserId) -> Option<Customer> {
        self.customers.get(&id).cloned()
    }

    fn credit_line(&self, user_id: UserId) -> Option<CreditLine> {
        self.credit_lines.get(&user_id).cloned()
    }

    fn order(&self, id: OrderId) -> Option<Order> {
        self.orders.get(&id).cloned()
    }

    fn orders_for_user(&self, user_id: UserId) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| Reverse((o.created_at, number_sequence(&o.order_number))));
        orders
    }

    fn contract_for_order(&self, order_id: OrderId) -> Option<InstallmentContract> {
        self.contracts
            .values()
            .find(|c| c.order_id == order_id)
            .cloned()
    }

    fn schedule_for_contract(&self, contract_id: ContractId) -> Vec<PaymentScheduleEntry> {
        let mut entries = self.schedules.get(&contract_id).cloned().unwrap_or_default();
        entries.sort_by_key(|e| e.installment_number);
        entries
    }

    fn contracts_for_plan(&self, plan_id: PlanId) -> usize {
        self.contracts.values().filter(|c| c.plan_id == plan_id).count()
    }
}

impl StoreTx for Tables {
    fn put_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    fn decrement_stock(&mut self, id: ProductId, quantity: u32) -> Result<u32> {
        let product = self
            .products
            .get_mut(&id)
            .ok_or(StoreError::ProductNotFound { product_id: id })?;

        let remaining = product
            .stock_qty
            .checked_sub(quantity)
            .ok_or_else(|| StoreError::InsufficientStock {
                product_id: id,
                name: product.name.clone(),
                available: product.stock_qty,
                requested: quantity,
            })?;
        product.stock_qty = remaining;
        Ok(remaining)
    }

    fn put_plan(&mut self, plan: FinancingPlan) {
        self.plans.insert(plan.id, plan);
    }

    fn remove_plan(&mut self, id: PlanId) -> Option<FinancingPlan> {
        self.plans.remove(&id)
    }

    fn put_customer(&mut self, customer: Customer) {
        self.customers.insert(customer.id, customer);
    }

    fn put_credit_line(&mut self, line: CreditLine) {
        self.credit_lines.insert(line.user_id, line);
    }

    fn next_sequence(&mut self, kind: SequenceKind, year: i32) -> u32 {
        let counter = self.sequences.entry((kind, year)).or_insert(0);
        *counter += 1;
        *counter
    }

    fn insert_order(&mut self, order: Order) {
        self.orders.insert(order.id, order);
    }

    fn insert_contract(&mut self, contract: InstallmentContract) {
        self.contracts.insert(contract.id, contract);
    }

    fn insert_schedule(&mut self, entries: Vec<PaymentScheduleEntry>) {
        for entry in entries {
            self.schedules.entry(entry.contract_id).or_default().push(entry);
        }
    }

    fn record(&mut self, event: Event) {
        self.outbox.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NewProduct;
    use crate::decimal::Money;
    use std::sync::Arc;
    use std::thread;

    fn store_with_stock(qty: u32) -> (MemoryStore, ProductId) {
        let store = MemoryStore::new();
        let product = NewProduct {
            name: "Samsung Galaxy A55".to_string(),
            brand: Some("Samsung".to_string()),
            cash_price: Money::from_major(17_999),
            stock_qty: qty,
        }
        .into_product();
        let id = product.id;
        store
            .transaction(|tx| {
                tx.put_product(product);
                Ok(())
            })
            .unwrap();
        (store, id)
    }

    fn stock(store: &MemoryStore, id: ProductId) -> u32 {
        store.read(|r| r.product(id).unwrap().stock_qty).unwrap()
    }

    #[test]
    fn test_commit_makes_writes_visible() {
        let (store, id) = store_with_stock(5);
        let remaining = store.transaction(|tx| tx.decrement_stock(id, 2)).unwrap();
        assert_eq!(remaining, 3);
        assert_eq!(stock(&store, id), 3);
    }

    #[test]
    fn test_error_discards_all_writes() {
        let (store, id) = store_with_stock(5);
        let result: Result<()> = store.transaction(|tx| {
            tx.decrement_stock(id, 2)?;
            tx.record(Event::PlanDeactivated { plan_id: id });
            let n = tx.next_sequence(SequenceKind::Order, 2026);
            assert_eq!(n, 1);
            tx.decrement_stock(id, 10)?;
            Ok(())
        });

        assert!(matches!(result, Err(StoreError::InsufficientStock { available: 3, requested: 10, .. })));
        assert_eq!(stock(&store, id), 5);
        assert!(store.take_events().unwrap().is_empty());

        // the rolled back number is handed out again
        let n = store
            .transaction(|tx| Ok(tx.next_sequence(SequenceKind::Order, 2026)))
            .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn test_events_accumulate_until_drained() {
        let (store, id) = store_with_stock(5);
        store
            .transaction(|tx| {
                tx.record(Event::PlanDeactivated { plan_id: id });
                Ok(())
            })
            .unwrap();
        store
            .transaction(|tx| {
                tx.record(Event::StockDecremented {
                    product_id: id,
                    quantity: 1,
                    remaining: 4,
                    order_id: id,
                });
                Ok(())
            })
            .unwrap();

        let drained = store.take_events().unwrap();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], Event::PlanDeactivated { .. }));
        assert!(matches!(drained[1], Event::StockDecremented { .. }));
        assert!(store.take_events().unwrap().is_empty());

        store
            .transaction(|tx| {
                tx.record(Event::PlanDeactivated { plan_id: id });
                Ok(())
            })
            .unwrap();
        assert_eq!(store.take_events().unwrap().len(), 1);
    }

    #[test]
    fn test_orders_sort_by_numeric_sequence() {
        use crate::types::{DeliveryMethod, OrderStatus, PaymentMethod};
        use chrono::{TimeZone, Utc};
        use uuid::Uuid;

        let user_id = Uuid::new_v4();
        let placed_at = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let order = |order_number: &str| Order {
            id: Uuid::new_v4(),
            order_number: order_number.to_string(),
            user_id,
            items: Vec::new(),
            total_amount: Money::from_major(100),
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::Card,
            delivery_method: DeliveryMethod::Pickup,
            delivery_address: None,
            governorate: None,
            pickup_branch: Some("Nasr City".to_string()),
            source: "saberstore".to_string(),
            created_at: placed_at,
        };

        let store = MemoryStore::new();
        store
            .transaction(|tx| {
                tx.insert_order(order("ORD-2026-9999"));
                tx.insert_order(order("ORD-2026-10000"));
                tx.insert_order(order("ORD-2026-0998"));
                Ok(())
            })
            .unwrap();

        let numbers: Vec<String> = store
            .read(|r| r.orders_for_user(user_id))
            .unwrap()
            .into_iter()
            .map(|o| o.order_number)
            .collect();
        assert_eq!(numbers, vec!["ORD-2026-10000", "ORD-2026-9999", "ORD-2026-0998"]);
    }

    #[test]
    fn test_conditional_decrement() {
        let (store, id) = store_with_stock(1);
        assert!(store.transaction(|tx| tx.decrement_stock(id, 2)).is_err());
        assert_eq!(store.transaction(|tx| tx.decrement_stock(id, 1)).unwrap(), 0);
        assert!(store.transaction(|tx| tx.decrement_stock(id, 1)).is_err());
    }

    #[test]
    fn test_sequences_are_per_kind_and_year() {
        let store = MemoryStore::new();
        let numbers = store
            .transaction(|tx| {
                Ok((
                    tx.next_sequence(SequenceKind::Order, 2026),
                    tx.next_sequence(SequenceKind::Order, 2026),
                    tx.next_sequence(SequenceKind::Contract, 2026),
                    tx.next_sequence(SequenceKind::Order, 2027),
                ))
            })
            .unwrap();
        assert_eq!(numbers, (1, 2, 1, 1));
    }

    #[test]
    fn test_concurrent_decrements_never_oversell() {
        let (store, id) = store_with_stock(10);
        let store = Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.transaction(|tx| tx.decrement_stock(id, 1)).is_ok())
            })
            .collect();
        let sold = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(sold, 10);
        assert_eq!(stock(&store, id), 0);
    }
}
