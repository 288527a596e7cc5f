use async_graphql::{ID, SimpleObject};

use crm_core::Entity;
use crm_products::{Product, UpdateResult};

// -------------------------
// Output types
// -------------------------

#[derive(Debug, Clone, SimpleObject)]
pub struct ProductType {
    pub id: ID,
    pub name: String,
    pub stock: i64,
}

impl From<Product> for ProductType {
    fn from(p: Product) -> Self {
        Self {
            id: ID(p.id().to_string()),
            name: p.name().to_string(),
            stock: p.stock(),
        }
    }
}

/// Payload of `updateLowStockProducts`.
#[derive(Debug, Clone, SimpleObject)]
pub struct UpdateLowStockProducts {
    pub success: bool,
    pub message: String,
    pub updated_products: Vec<ProductType>,
}

impl From<UpdateResult> for UpdateLowStockProducts {
    fn from(r: UpdateResult) -> Self {
        Self {
            success: r.success,
            message: r.message,
            updated_products: r.updated_products.into_iter().map(Into::into).collect(),
        }
    }
}
