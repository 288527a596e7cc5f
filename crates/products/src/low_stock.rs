//! Low-stock replenishment.
//!
//! Selects every product below a threshold, bumps its stock by a fixed amount,
//! persists each row as it goes and reports the post-update snapshots.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crm_core::{DomainError, DomainResult};

use crate::product::{Product, ProductStore, StoreError};

/// Products with stock strictly below this are considered low.
pub const DEFAULT_THRESHOLD: i64 = 10;

/// Units added to each low product when the caller does not say otherwise.
pub const DEFAULT_INCREMENT: i64 = 10;

/// Parameters for one low-stock update.
///
/// `threshold` and `increment_by` are independent; the matching defaults are
/// not a derived relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockPolicy {
    pub threshold: i64,
    pub increment_by: i64,
}

impl Default for LowStockPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            increment_by: DEFAULT_INCREMENT,
        }
    }
}

impl LowStockPolicy {
    /// Default threshold with a caller-supplied increment (must be positive).
    pub fn with_increment(increment_by: i64) -> DomainResult<Self> {
        Self::default().increment(increment_by)
    }

    pub fn increment(mut self, increment_by: i64) -> DomainResult<Self> {
        self.increment_by = increment_by;
        self.validate()?;
        Ok(self)
    }

    pub fn threshold(mut self, threshold: i64) -> DomainResult<Self> {
        self.threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.increment_by <= 0 {
            return Err(DomainError::validation(format!(
                "increment_by must be a positive integer (got {})",
                self.increment_by
            )));
        }
        if self.threshold < 0 {
            return Err(DomainError::validation(format!(
                "threshold cannot be negative (got {})",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Outcome of one low-stock update invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub success: bool,
    pub message: String,
    /// Snapshots taken after the increment, in store order.
    pub updated_products: Vec<Product>,
}

impl UpdateResult {
    fn succeeded(updated_products: Vec<Product>) -> Self {
        Self {
            success: true,
            message: format!("Updated {} low-stock products", updated_products.len()),
            updated_products,
        }
    }
}

/// Why an update invocation failed as a whole.
///
/// Rows persisted before the failure stay persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Raise the stock of every product below `policy.threshold` by `policy.increment_by`.
///
/// Each row is persisted immediately after it is incremented; there is no
/// batching and no rollback.
pub fn update_low_stock<S>(store: &S, policy: &LowStockPolicy) -> Result<UpdateResult, UpdateError>
where
    S: ProductStore + ?Sized,
{
    policy.validate()?;

    let low = store.find_below(policy.threshold).map_err(|e| {
        warn!(error = %e, threshold = policy.threshold, "low-stock query failed");
        e
    })?;

    let mut updated = Vec::with_capacity(low.len());
    for mut product in low {
        let before = product.stock();
        product.increment_stock(policy.increment_by)?;

        if let Err(e) = store.save(&product) {
            warn!(
                product_id = %product.id_typed(),
                persisted = updated.len(),
                error = %e,
                "low-stock persist failed"
            );
            return Err(e.into());
        }

        debug!(
            product_id = %product.id_typed(),
            before,
            after = product.stock(),
            "restocked product"
        );
        updated.push(product);
    }

    info!(
        count = updated.len(),
        threshold = policy.threshold,
        increment_by = policy.increment_by,
        "low-stock update complete"
    );

    Ok(UpdateResult::succeeded(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core::ProductId;
    use std::sync::Mutex;

    /// Vec-backed store with failure injection.
    #[derive(Default)]
    struct TestStore {
        rows: Mutex<Vec<Product>>,
        fail_query: bool,
        /// Fail the n-th save (0-based).
        fail_save_at: Option<usize>,
        saves: Mutex<usize>,
    }

    impl TestStore {
        fn with(rows: Vec<Product>) -> Self {
            Self {
                rows: Mutex::new(rows),
                ..Default::default()
            }
        }

        fn stock_of(&self, name: &str) -> i64 {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.name() == name)
                .map(|p| p.stock())
                .unwrap()
        }
    }

    impl ProductStore for TestStore {
        fn find_below(&self, threshold: i64) -> Result<Vec<Product>, StoreError> {
            if self.fail_query {
                return Err(StoreError::query("connection refused"));
            }
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.is_below(threshold))
                .cloned()
                .collect())
        }

        fn save(&self, product: &Product) -> Result<(), StoreError> {
            let mut saves = self.saves.lock().unwrap();
            if self.fail_save_at == Some(*saves) {
                return Err(StoreError::persist(product.id_typed(), "disk full"));
            }
            *saves += 1;

            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|p| p.id_typed() == product.id_typed())
                .ok_or(StoreError::NotFound(product.id_typed()))?;
            *row = product.clone();
            Ok(())
        }

        fn insert(&self, product: Product) -> Result<(), StoreError> {
            self.rows.lock().unwrap().push(product);
            Ok(())
        }

        fn list(&self) -> Result<Vec<Product>, StoreError> {
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    fn product(name: &str, stock: i64) -> Product {
        Product::new(ProductId::new(), name, stock).unwrap()
    }

    #[test]
    fn restocks_low_products_in_store_order() {
        let store = TestStore::with(vec![product("A", 3), product("B", 15), product("C", 0)]);

        let result = update_low_stock(&store, &LowStockPolicy::default()).unwrap();

        assert!(result.success);
        assert_eq!(result.message, "Updated 2 low-stock products");
        let got: Vec<_> = result
            .updated_products
            .iter()
            .map(|p| (p.name(), p.stock()))
            .collect();
        assert_eq!(got, vec![("A", 13), ("C", 10)]);
        assert_eq!(store.stock_of("B"), 15);
        assert_eq!(store.stock_of("A"), 13);
        assert_eq!(store.stock_of("C"), 10);
    }

    #[test]
    fn empty_store_is_a_successful_no_op() {
        let store = TestStore::default();
        let result = update_low_stock(&store, &LowStockPolicy::default()).unwrap();

        assert!(result.success);
        assert_eq!(result.message, "Updated 0 low-stock products");
        assert!(result.updated_products.is_empty());
    }

    #[test]
    fn second_run_is_a_no_op_once_everything_is_restocked() {
        let store = TestStore::with(vec![product("A", 3), product("C", 0)]);
        let policy = LowStockPolicy::default();

        update_low_stock(&store, &policy).unwrap();
        let second = update_low_stock(&store, &policy).unwrap();

        assert!(second.success);
        assert!(second.updated_products.is_empty());
    }

    #[test]
    fn custom_increment_is_applied() {
        let store = TestStore::with(vec![product("A", 9)]);
        let policy = LowStockPolicy::with_increment(25).unwrap();

        let result = update_low_stock(&store, &policy).unwrap();
        assert_eq!(result.updated_products[0].stock(), 34);
    }

    #[test]
    fn threshold_is_independent_of_increment() {
        let store = TestStore::with(vec![product("A", 4), product("B", 6)]);
        let policy = LowStockPolicy::default().threshold(5).unwrap();

        let result = update_low_stock(&store, &policy).unwrap();
        assert_eq!(result.updated_products.len(), 1);
        assert_eq!(store.stock_of("A"), 14);
        assert_eq!(store.stock_of("B"), 6);
    }

    #[test]
    fn non_positive_increment_is_rejected_before_touching_the_store() {
        assert!(LowStockPolicy::with_increment(0).is_err());
        assert!(LowStockPolicy::with_increment(-3).is_err());

        let store = TestStore::with(vec![product("A", 1)]);
        let policy = LowStockPolicy {
            threshold: DEFAULT_THRESHOLD,
            increment_by: 0,
        };
        let err = update_low_stock(&store, &policy).unwrap_err();
        assert!(matches!(err, UpdateError::Domain(DomainError::Validation(_))));
        assert_eq!(store.stock_of("A"), 1);
    }

    #[test]
    fn query_failure_surfaces_and_modifies_nothing() {
        let store = TestStore {
            fail_query: true,
            ..TestStore::with(vec![product("A", 3)])
        };

        let err = update_low_stock(&store, &LowStockPolicy::default()).unwrap_err();
        assert!(matches!(err, UpdateError::Store(StoreError::Query(_))));
        assert_eq!(store.stock_of("A"), 3);
    }

    #[test]
    fn persist_failure_keeps_earlier_writes() {
        let store = TestStore {
            fail_save_at: Some(1),
            ..TestStore::with(vec![product("A", 3), product("B", 4), product("C", 5)])
        };

        let err = update_low_stock(&store, &LowStockPolicy::default()).unwrap_err();
        assert!(matches!(err, UpdateError::Store(StoreError::Persist { .. })));
        assert_eq!(store.stock_of("A"), 13);
        assert_eq!(store.stock_of("B"), 4);
        assert_eq!(store.stock_of("C"), 5);
    }

    #[test]
    fn result_serializes_with_wire_field_names() {
        let result = UpdateResult::succeeded(vec![product("A", 13)]);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Updated 1 low-stock products");
        assert_eq!(json["updated_products"][0]["name"], "A");
        assert_eq!(json["updated_products"][0]["stock"], 13);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Low rows gain exactly `increment_by` and appear once; other rows are untouched.
            #[test]
            fn low_rows_gain_increment_and_others_are_untouched(
                stocks in proptest::collection::vec(0i64..40, 0..30),
                increment in 1i64..50,
            ) {
                let rows: Vec<Product> = stocks
                    .iter()
                    .enumerate()
                    .map(|(i, s)| product(&format!("P{i}"), *s))
                    .collect();
                let store = TestStore::with(rows.clone());
                let policy = LowStockPolicy::with_increment(increment).unwrap();

                let result = update_low_stock(&store, &policy).unwrap();
                prop_assert!(result.success);

                let after = store.list().unwrap();
                for (before, now) in rows.iter().zip(after.iter()) {
                    let reported: Vec<_> = result
                        .updated_products
                        .iter()
                        .filter(|p| p.id_typed() == before.id_typed())
                        .collect();
                    if before.stock() < DEFAULT_THRESHOLD {
                        prop_assert_eq!(now.stock(), before.stock() + increment);
                        prop_assert_eq!(reported.len(), 1);
                        prop_assert_eq!(reported[0].stock(), now.stock());
                    } else {
                        prop_assert_eq!(now.stock(), before.stock());
                        prop_assert!(reported.is_empty());
                    }
                }
            }

            /// With an increment at least the threshold, a rerun finds nothing.
            #[test]
            fn rerun_after_full_restock_is_a_no_op(
                stocks in proptest::collection::vec(0i64..40, 0..30),
                increment in DEFAULT_THRESHOLD..50,
            ) {
                let rows: Vec<Product> = stocks
                    .iter()
                    .enumerate()
                    .map(|(i, s)| product(&format!("P{i}"), *s))
                    .collect();
                let store = TestStore::with(rows);
                let policy = LowStockPolicy::with_increment(increment).unwrap();

                update_low_stock(&store, &policy).unwrap();
                let second = update_low_stock(&store, &policy).unwrap();
                prop_assert!(second.updated_products.is_empty());
            }
        }
    }
}
