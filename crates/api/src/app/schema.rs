use async_graphql::{Context, EmptySubscription, Object, Result, Schema};
use tracing::info;

use crm_core::ProductId;
use crm_products::{DEFAULT_INCREMENT, Product};

use crate::app::dto::{ProductType, UpdateLowStockProducts};
use crate::app::errors::service_error_to_graphql;
use crate::app::services::{AppServices, ServiceError};

pub type CrmSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(services: AppServices) -> CrmSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(services)
        .finish()
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Liveness probe used by the heartbeat job.
    async fn hello(&self) -> &'static str {
        "Hello, GraphQL!"
    }

    /// Products in store order; `lowStockOnly` keeps those below the threshold.
    async fn products(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = false)] low_stock_only: bool,
    ) -> Result<Vec<ProductType>> {
        let services = ctx.data::<AppServices>()?;
        let rows = services
            .list_products(low_stock_only)
            .await
            .map_err(service_error_to_graphql)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Raise every product below the threshold by `incrementBy`.
    async fn update_low_stock_products(
        &self,
        ctx: &Context<'_>,
        #[graphql(default_with = "DEFAULT_INCREMENT")] increment_by: i64,
    ) -> Result<UpdateLowStockProducts> {
        let services = ctx.data::<AppServices>()?;
        let policy = services
            .policy()
            .increment(increment_by)
            .map_err(|e| service_error_to_graphql(ServiceError::Domain(e)))?;

        let result = services
            .update_low_stock(policy)
            .await
            .map_err(service_error_to_graphql)?;

        info!(
            updated = result.updated_products.len(),
            increment_by,
            "updateLowStockProducts"
        );
        Ok(result.into())
    }

    async fn create_product(
        &self,
        ctx: &Context<'_>,
        name: String,
        #[graphql(default = 0)] stock: i64,
    ) -> Result<ProductType> {
        let services = ctx.data::<AppServices>()?;
        let product = Product::new(ProductId::new(), name, stock)
            .map_err(|e| service_error_to_graphql(ServiceError::Domain(e)))?;
        let created = services
            .create_product(product)
            .await
            .map_err(service_error_to_graphql)?;
        Ok(created.into())
    }
}
