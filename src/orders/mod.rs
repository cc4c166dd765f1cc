pub mod contract;
pub mod models;
pub mod orchestrator;

pub use contract::{InstallmentContract, PaymentScheduleEntry};
pub use models::{CreateOrder, Order, OrderItem, OrderLine};
pub use orchestrator::{ContractDetails, OrderDetails, OrderOrchestrator, OrderSettings};
