pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use tower_http::trace::TraceLayer;

use crate::orders::{OrderOrchestrator, OrderSettings};
use crate::plans::PlanCatalog;
use crate::store::Store;

pub use error::ApiError;
pub use handlers::{ApiResponse, USER_ID_HEADER};

/// where request handlers take "now" from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    System,
    /// pinned instant, for tests and demos
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn provider(&self) -> SafeTimeProvider {
        match self {
            Clock::System => SafeTimeProvider::new(TimeSource::System),
            Clock::Fixed(at) => SafeTimeProvider::new(TimeSource::Test(*at)),
        }
    }
}

/// services shared by every handler
pub struct AppState<S> {
    pub orders: Arc<OrderOrchestrator<S>>,
    pub plans: Arc<PlanCatalog<S>>,
    pub clock: Clock,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            orders: Arc::clone(&self.orders),
            plans: Arc::clone(&self.plans),
            clock: self.clock,
        }
    }
}

impl<S: Store> AppState<S> {
    pub fn new(store: Arc<S>, settings: OrderSettings, clock: Clock) -> Self {
        Self {
            orders: Arc::new(OrderOrchestrator::new(Arc::clone(&store), settings)),
            plans: Arc::new(PlanCatalog::new(store)),
            clock,
        }
    }
}

pub fn router<S: Store + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/orders",
            get(handlers::list_orders::<S>).post(handlers::create_order::<S>),
        )
        .route("/orders/:id", get(handlers::get_order::<S>))
        .route("/installments/plans", get(handlers::list_plans::<S>))
        .route("/installments/calculate", post(handlers::calculate::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
