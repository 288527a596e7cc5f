//! Postgres-backed product store.
//!
//! `ProductStore` is synchronous, so every call drives its query to completion
//! on the runtime handle captured at construction. Call it from a blocking
//! thread (`tokio::task::spawn_blocking`), never from inside an async task.

use std::future::Future;

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tokio::runtime::Handle;
use tracing::Span;

use crm_core::ProductId;
use crm_products::{Product, ProductStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    stock BIGINT NOT NULL CHECK (stock >= 0),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Product store over a `products` table.
///
/// Rows are yielded ordered by id; ids are UUIDv7 so that is creation order.
/// Each `save` is its own statement, so concurrent writers get last-write-wins.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
    handle: Handle,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool, handle: Handle) -> Self {
        Self { pool, handle }
    }

    /// Connect using the current runtime's handle.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::query(format!("connect: {e}")))?;
        Ok(Self::new(pool, Handle::current()))
    }

    /// Create the `products` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::query(format!("ensure schema: {e}")))?;
        Ok(())
    }

    fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.handle.block_on(fut)
    }
}

fn row_to_product(row: &PgRow) -> Result<Product, StoreError> {
    let id: uuid::Uuid = row
        .try_get("id")
        .map_err(|e| StoreError::query(e.to_string()))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| StoreError::query(e.to_string()))?;
    let stock: i64 = row
        .try_get("stock")
        .map_err(|e| StoreError::query(e.to_string()))?;

    Product::new(ProductId::from_uuid(id), name, stock)
        .map_err(|e| StoreError::query(format!("row {id}: {e}")))
}

impl ProductStore for PostgresProductStore {
    fn find_below(&self, threshold: i64) -> Result<Vec<Product>, StoreError> {
        self.block_on(async {
            Span::current().record("operation", "find_low_stock_products");

            let rows = sqlx::query(
                r#"
                SELECT id, name, stock
                FROM products
                WHERE stock < $1
                ORDER BY id
                "#,
            )
            .bind(threshold)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::query(e.to_string()))?;

            rows.iter().map(row_to_product).collect()
        })
    }

    fn save(&self, product: &Product) -> Result<(), StoreError> {
        let id = product.id_typed();
        self.block_on(async {
            Span::current().record("operation", "save_product_stock");

            let done = sqlx::query(
                r#"
                UPDATE products
                SET stock = $2, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(id.as_uuid())
            .bind(product.stock())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::persist(id, e.to_string()))?;

            if done.rows_affected() == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
    }

    fn insert(&self, product: Product) -> Result<(), StoreError> {
        let id = product.id_typed();
        self.block_on(async {
            Span::current().record("operation", "insert_product");

            sqlx::query(
                r#"
                INSERT INTO products (id, name, stock)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(id.as_uuid())
            .bind(product.name())
            .bind(product.stock())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::persist(id, e.to_string()))?;
            Ok(())
        })
    }

    fn list(&self) -> Result<Vec<Product>, StoreError> {
        self.block_on(async {
            Span::current().record("operation", "list_products");

            let rows = sqlx::query("SELECT id, name, stock FROM products ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::query(e.to_string()))?;

            rows.iter().map(row_to_product).collect()
        })
    }
}
