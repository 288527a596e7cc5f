//! Core job abstraction and error type.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ConfigError;

/// A unit of scheduled work.
#[async_trait]
pub trait CronJob: Send + Sync {
    type Report: Send;

    /// Stable name used in logs and on the command line.
    fn name(&self) -> &'static str;

    /// Run the job once.
    async fn run(&self) -> Result<Self::Report, JobError>;
}

/// Why a job run failed.
///
/// Variants separate the log sink, the HTTP transport, and the GraphQL layer
/// so callers can tell them apart.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job could not be built from configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Writing to the local log file failed.
    #[error("log write failed: {0}")]
    Log(#[from] std::io::Error),

    /// The HTTP request could not be completed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("unexpected status {0}: {1}")]
    Status(u16, String),

    /// The GraphQL response carried errors.
    #[error("graphql errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// The response did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The mutation ran but reported `success = false`.
    #[error("update rejected: {0}")]
    Rejected(String),
}
