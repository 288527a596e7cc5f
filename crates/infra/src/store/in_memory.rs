use std::sync::RwLock;

use crm_core::ProductId;
use crm_products::{Product, ProductStore, StoreError};

/// In-memory product store for tests/dev.
///
/// Iteration order is insertion order.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    rows: RwLock<Vec<Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `rows`.
    pub fn seeded(rows: impl IntoIterator<Item = Product>) -> Result<Self, StoreError> {
        let store = Self::new();
        for row in rows {
            store.insert(row)?;
        }
        Ok(store)
    }

    pub fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::query("product store lock poisoned"))?;
        Ok(rows.iter().find(|p| p.id_typed() == id).cloned())
    }
}

impl ProductStore for InMemoryProductStore {
    fn find_below(&self, threshold: i64) -> Result<Vec<Product>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::query("product store lock poisoned"))?;
        Ok(rows.iter().filter(|p| p.is_below(threshold)).cloned().collect())
    }

    fn save(&self, product: &Product) -> Result<(), StoreError> {
        let id = product.id_typed();
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::persist(id, "product store lock poisoned"))?;
        let row = rows
            .iter_mut()
            .find(|p| p.id_typed() == id)
            .ok_or(StoreError::NotFound(id))?;
        *row = product.clone();
        Ok(())
    }

    fn insert(&self, product: Product) -> Result<(), StoreError> {
        let id = product.id_typed();
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::persist(id, "product store lock poisoned"))?;
        if rows.iter().any(|p| p.id_typed() == id) {
            return Err(StoreError::persist(id, "product already exists"));
        }
        rows.push(product);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::query("product store lock poisoned"))?;
        Ok(rows.clone())
    }
}
