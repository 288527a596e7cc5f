use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crm_core::{DomainError, DomainResult, Entity, ProductId};

/// A product row as held by the inventory store.
///
/// Rows are created and destroyed by collaborators; the low-stock updater only
/// rewrites `stock` of rows it selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    stock: i64,
}

impl Product {
    /// Build a product snapshot, validating name and stock.
    pub fn new(id: ProductId, name: impl Into<String>, stock: i64) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if stock < 0 {
            return Err(DomainError::invariant("stock cannot go negative"));
        }
        Ok(Self { id, name, stock })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    /// Whether this product's stock is strictly below `threshold`.
    pub fn is_below(&self, threshold: i64) -> bool {
        self.stock < threshold
    }

    /// Add `delta` units to stock.
    ///
    /// Rejects non-positive deltas and overflow; leaves the product untouched on error.
    pub fn increment_stock(&mut self, delta: i64) -> DomainResult<()> {
        if delta <= 0 {
            return Err(DomainError::validation("increment must be positive"));
        }
        self.stock = self
            .stock
            .checked_add(delta)
            .ok_or_else(|| DomainError::invariant("stock overflow"))?;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Failure reported by an inventory store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Selecting rows failed.
    #[error("store query failed: {0}")]
    Query(String),

    /// Writing a row failed.
    #[error("store persist failed for product {id}: {reason}")]
    Persist { id: ProductId, reason: String },

    /// The row to persist no longer exists.
    #[error("product not found: {0}")]
    NotFound(ProductId),
}

impl StoreError {
    pub fn query(reason: impl Into<String>) -> Self {
        Self::Query(reason.into())
    }

    pub fn persist(id: ProductId, reason: impl Into<String>) -> Self {
        Self::Persist {
            id,
            reason: reason.into(),
        }
    }
}

/// Inventory store capability.
///
/// Implementations must yield rows in a stable order (the order the updater
/// reports them in). Locking discipline on concurrent writers belongs to the
/// implementation; callers assume last-write-wins unless told otherwise.
pub trait ProductStore: Send + Sync {
    /// All rows with `stock < threshold`, in store order.
    fn find_below(&self, threshold: i64) -> Result<Vec<Product>, StoreError>;

    /// Persist the current `stock` of an existing row.
    fn save(&self, product: &Product) -> Result<(), StoreError>;

    /// Create a new row.
    fn insert(&self, product: Product) -> Result<(), StoreError>;

    /// All rows, in store order.
    fn list(&self) -> Result<Vec<Product>, StoreError>;
}

impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    fn find_below(&self, threshold: i64) -> Result<Vec<Product>, StoreError> {
        (**self).find_below(threshold)
    }

    fn save(&self, product: &Product) -> Result<(), StoreError> {
        (**self).save(product)
    }

    fn insert(&self, product: Product) -> Result<(), StoreError> {
        (**self).insert(product)
    }

    fn list(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list()
    }
}
