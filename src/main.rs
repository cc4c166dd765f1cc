//! SaberStore installment checkout service

use std::error::Error;
use std::sync::Arc;

use hourglass_rs::{SafeTimeProvider, TimeSource};
use saberstore_installments::api::{self, AppState, Clock};
use saberstore_installments::config::{SeedData, StoreConfig};
use saberstore_installments::store::MemoryStore;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = StoreConfig::from_env()?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = Arc::new(MemoryStore::new());
    if let Some(path) = &config.seed_file {
        SeedData::from_path(path)?.apply(&store, &SafeTimeProvider::new(TimeSource::System))?;
    }

    let state = AppState::new(store, config.order_settings(), Clock::System);
    let app = api::router(state);

    tracing::info!(
        addr = config.bind_addr.as_str(),
        enforce_credit_limit = config.enforce_credit_limit,
        "SaberStore installments listening"
    );
    axum::serve(TcpListener::bind(&config.bind_addr).await?, app).await?;
    Ok(())
}
