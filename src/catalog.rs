use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{Result, StoreError};
use crate::store::{Store, StoreRead, StoreTx};
use crate::types::ProductId;

/// catalog product as seen by checkout
///
/// Only price and stock matter to order creation; the rest of the
/// catalog record lives with the product service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub cash_price: Money,
    pub stock_qty: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub cash_price: Money,
    pub stock_qty: u32,
}

impl NewProduct {
    pub fn into_product(self) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: self.name,
            brand: self.brand,
            cash_price: self.cash_price,
            stock_qty: self.stock_qty,
            is_active: true,
        }
    }
}

/// price lookup and stock maintenance over the shared store
#[derive(Debug)]
pub struct ProductCatalog<S> {
    store: Arc<S>,
}

impl<S: Store> ProductCatalog<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn add_product(&self, product: NewProduct) -> Result<Product> {
        if !product.cash_price.is_positive() {
            return Err(StoreError::InvalidAmount {
                amount: product.cash_price,
            });
        }
        let product = product.into_product();
        self.store.transaction(|tx| {
            tx.put_product(product.clone());
            Ok(product)
        })
    }

    pub fn get_product(&self, id: ProductId) -> Result<Product> {
        self.store
            .read(|r| r.product(id))?
            .ok_or(StoreError::ProductNotFound { product_id: id })
    }

    /// change the cash price; existing orders keep their captured price
    pub fn set_price(&self, id: ProductId, price: Money) -> Result<Product> {
        if !price.is_positive() {
            return Err(StoreError::InvalidAmount { amount: price });
        }
        self.modify(id, |p| p.cash_price = price)
    }

    pub fn restock(&self, id: ProductId, quantity: u32) -> Result<Product> {
        self.modify(id, |p| p.stock_qty = p.stock_qty.saturating_add(quantity))
    }

    pub fn set_active(&self, id: ProductId, active: bool) -> Result<Product> {
        self.modify(id, |p| p.is_active = active)
    }

    fn modify(&self, id: ProductId, change: impl FnOnce(&mut Product)) -> Result<Product> {
        self.store.transaction(|tx| {
            let mut product = tx
                .product(id)
                .ok_or(StoreError::ProductNotFound { product_id: id })?;
            change(&mut product);
            tx.put_product(product.clone());
            Ok(product)
        })
    }
}
