pub mod amortization;
pub mod api;
pub mod catalog;
pub mod config;
pub mod credit;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod orders;
pub mod plans;
pub mod store;
pub mod types;
pub mod views;

#[cfg(test)]
mod testing;

// re-export key types
pub use amortization::{AmortizationEngine, AmortizationResult, DownPayment, ScheduledInstallment};
pub use catalog::{NewProduct, Product, ProductCatalog};
pub use config::{SeedData, StoreConfig};
pub use credit::{CreditAuthority, CreditLine, Customer, NewCustomer};
pub use decimal::{Money, Percent};
pub use errors::{ErrorKind, Result, StoreError};
pub use events::{Event, EventLog};
pub use orders::{
    ContractDetails, CreateOrder, InstallmentContract, Order, OrderDetails, OrderItem, OrderLine,
    OrderOrchestrator, OrderSettings, PaymentScheduleEntry,
};
pub use plans::{FinancingPlan, InstallmentQuote, NewPlan, PlanCatalog, PlanUpdate};
pub use store::{MemoryStore, Store, StoreRead, StoreTx};
pub use types::{
    ContractId, ContractStatus, CreditLineStatus, DeliveryMethod, InstallmentStatus, OrderId,
    OrderStatus, PaymentMethod, PlanId, ProductId, SequenceKind, UserId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
