use std::sync::Arc;

use thiserror::Error;

use crm_core::DomainError;
use crm_infra::CrmConfig;
use crm_infra::store::{InMemoryProductStore, PostgresProductStore};
use crm_products::{
    LowStockPolicy, Product, ProductStore, StoreError, UpdateError, UpdateResult,
    update_low_stock,
};

/// Failure of a service call, before mapping to a GraphQL error.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Update(#[from] UpdateError),

    /// The blocking worker panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Shared handles for request handlers.
///
/// Store calls are synchronous (the Postgres adapter blocks on its runtime
/// handle), so every call is moved onto a blocking thread.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn ProductStore>,
    policy: LowStockPolicy,
}

impl AppServices {
    pub fn new(store: Arc<dyn ProductStore>, policy: LowStockPolicy) -> Self {
        Self { store, policy }
    }

    /// In-memory store with the default policy (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProductStore::new()), LowStockPolicy::default())
    }

    /// Server-side policy; requests may override only the increment.
    pub fn policy(&self) -> LowStockPolicy {
        self.policy
    }

    pub async fn update_low_stock(
        &self,
        policy: LowStockPolicy,
    ) -> Result<UpdateResult, ServiceError> {
        let store = self.store.clone();
        blocking(move || update_low_stock(store.as_ref(), &policy).map_err(ServiceError::from))
            .await
    }

    pub async fn list_products(&self, low_stock_only: bool) -> Result<Vec<Product>, ServiceError> {
        let store = self.store.clone();
        let threshold = self.policy.threshold;
        blocking(move || {
            let rows = if low_stock_only {
                store.find_below(threshold)?
            } else {
                store.list()?
            };
            Ok(rows)
        })
        .await
    }

    pub async fn create_product(&self, product: Product) -> Result<Product, ServiceError> {
        let store = self.store.clone();
        blocking(move || {
            store.insert(product.clone())?;
            Ok(product)
        })
        .await
    }
}

async fn blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?
}

/// Wire services from configuration: Postgres when `DATABASE_URL` is set,
/// otherwise an in-memory store.
pub async fn build_services(cfg: &CrmConfig) -> anyhow::Result<AppServices> {
    let policy = cfg.low_stock_policy()?;

    let store: Arc<dyn ProductStore> = match cfg.database_url.as_deref() {
        Some(url) => {
            let store = PostgresProductStore::connect(url).await?;
            store.ensure_schema().await?;
            tracing::info!("using postgres product store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory product store");
            Arc::new(InMemoryProductStore::new())
        }
    };

    Ok(AppServices::new(store, policy))
}
