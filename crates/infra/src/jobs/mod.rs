//! One-shot cron jobs.
//!
//! Each job does its work once and returns a report or a typed error; when and
//! how often it runs is decided by whatever invokes it (the system crontab via
//! the `crm-cron` binary).
//!
//! - `HeartbeatJob`: liveness line + optional GraphQL `hello` probe
//! - `LowStockJob`: calls `updateLowStockProducts` and logs what changed

pub mod graphql_client;
pub mod heartbeat;
pub mod log_sink;
pub mod low_stock;
pub mod types;

pub use graphql_client::GraphqlClient;
pub use heartbeat::{GraphqlCheck, HeartbeatJob, HeartbeatReport};
pub use log_sink::{LogSink, TIMESTAMP_FORMAT, timestamp_now};
pub use low_stock::{LowStockJob, LowStockReport, RestockedProduct};
pub use types::{CronJob, JobError};

#[cfg(test)]
mod test_support;
