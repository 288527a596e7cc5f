//! Products domain module.
//!
//! Business rules for product stock, implemented as deterministic domain logic
//! over a storage capability (`ProductStore`). No IO, no HTTP, no SQL here.

pub mod low_stock;
pub mod product;

pub use low_stock::{
    DEFAULT_INCREMENT, DEFAULT_THRESHOLD, LowStockPolicy, UpdateError, UpdateResult,
    update_low_stock,
};
pub use product::{Product, ProductStore, StoreError};
