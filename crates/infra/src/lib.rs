//! Infrastructure layer: product stores, configuration, cron jobs.

pub mod config;
pub mod jobs;
pub mod store;

pub use config::{ConfigError, CrmConfig};
