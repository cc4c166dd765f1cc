use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::NewProduct;
use crate::credit::{CreditAuthority, NewCustomer};
use crate::decimal::Money;
use crate::errors::{Result, StoreError};
use crate::orders::OrderSettings;
use crate::plans::NewPlan;
use crate::store::{Store, StoreTx};
use crate::types::{PlanId, ProductId, UserId};

pub const BIND_ADDR_VAR: &str = "SABERSTORE_BIND_ADDR";
pub const ENFORCE_CREDIT_LIMIT_VAR: &str = "SABERSTORE_ENFORCE_CREDIT_LIMIT";
pub const ORDER_SOURCE_VAR: &str = "SABERSTORE_ORDER_SOURCE";
pub const SEED_FILE_VAR: &str = "SABERSTORE_SEED_FILE";

/// service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub bind_addr: String,
    pub enforce_credit_limit: bool,
    pub order_source: String,
    pub seed_file: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            enforce_credit_limit: true,
            order_source: "saberstore".to_string(),
            seed_file: None,
        }
    }
}

impl StoreConfig {
    /// read from the process environment, after loading `.env` if present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// build from any key lookup; unset keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup(BIND_ADDR_VAR) {
            config.bind_addr = addr;
        }
        if let Some(flag) = lookup(ENFORCE_CREDIT_LIMIT_VAR) {
            config.enforce_credit_limit = parse_flag(ENFORCE_CREDIT_LIMIT_VAR, &flag)?;
        }
        if let Some(source) = lookup(ORDER_SOURCE_VAR) {
            config.order_source = source;
        }
        config.seed_file = lookup(SEED_FILE_VAR)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.trim().is_empty() {
            return Err(invalid(format!("{BIND_ADDR_VAR} must not be empty")));
        }
        if self.order_source.trim().is_empty() {
            return Err(invalid(format!("{ORDER_SOURCE_VAR} must not be empty")));
        }
        Ok(())
    }

    pub fn order_settings(&self) -> OrderSettings {
        OrderSettings {
            enforce_credit_limit: self.enforce_credit_limit,
            default_source: self.order_source.clone(),
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(invalid(format!("{key}: expected a boolean, got {other:?}"))),
    }
}

fn invalid(message: String) -> StoreError {
    StoreError::InvalidConfiguration { message }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPlan {
    #[serde(default)]
    pub id: Option<PlanId>,
    #[serde(flatten)]
    pub plan: NewPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(flatten)]
    pub product: NewProduct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedCreditLine {
    pub user_id: UserId,
    pub total_limit: Money,
    #[serde(default = "default_approver")]
    pub approved_by: String,
}

fn default_approver() -> String {
    "seed".to_string()
}

/// initial plans, products, customers and credit lines for a fresh store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub plans: Vec<SeedPlan>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub customers: Vec<NewCustomer>,
    #[serde(default)]
    pub credit_lines: Vec<SeedCreditLine>,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| invalid(format!("seed data: {e}")))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| invalid(format!("seed file {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// load everything into `store`; nothing is written if a plan or product is invalid
    pub fn apply<S: Store>(self, store: &Arc<S>, time_provider: &SafeTimeProvider) -> Result<()> {
        let now = time_provider.now();
        let mut plans = Vec::with_capacity(self.plans.len());
        for seed in self.plans {
            let mut plan = seed.plan.into_plan(now);
            if let Some(id) = seed.id {
                plan.id = id;
            }
            plan.check_terms()?;
            plans.push(plan);
        }
        let mut products = Vec::with_capacity(self.products.len());
        for seed in self.products {
            if !seed.product.cash_price.is_positive() {
                return Err(StoreError::InvalidAmount {
                    amount: seed.product.cash_price,
                });
            }
            let mut product = seed.product.into_product();
            if let Some(id) = seed.id {
                product.id = id;
            }
            products.push(product);
        }

        let (plan_count, product_count) = (plans.len(), products.len());
        store.transaction(|tx| {
            for plan in plans {
                tx.put_plan(plan);
            }
            for product in products {
                tx.put_product(product);
            }
            Ok(())
        })?;

        let authority = CreditAuthority::new(Arc::clone(store));
        let customer_count = self.customers.len();
        for customer in self.customers {
            authority.register_customer(customer)?;
        }
        for line in &self.credit_lines {
            authority.approve_kyc(line.user_id, line.total_limit, &line.approved_by, time_provider)?;
        }

        info!(
            plans = plan_count,
            products = product_count,
            customers = customer_count,
            credit_lines = self.credit_lines.len(),
            "Seed data loaded"
        );
        Ok(())
    }
}
