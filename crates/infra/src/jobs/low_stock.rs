//! Scheduled low-stock restock via the GraphQL mutation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config::CrmConfig;

use super::graphql_client::GraphqlClient;
use super::log_sink::{LogSink, timestamp_now};
use super::types::{CronJob, JobError};

const UPDATE_LOW_STOCK_MUTATION: &str = r#"
mutation UpdateLowStock($incrementBy: Int!) {
  updateLowStockProducts(incrementBy: $incrementBy) {
    success
    message
    updatedProducts { id name stock }
  }
}
"#;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RestockedProduct {
    pub id: String,
    pub name: String,
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockReport {
    pub success: bool,
    pub message: String,
    pub updated_products: Vec<RestockedProduct>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutationData {
    update_low_stock_products: LowStockReport,
}

/// Runs `updateLowStockProducts` and appends the outcome to the low-stock log.
#[derive(Debug, Clone)]
pub struct LowStockJob {
    sink: LogSink,
    client: GraphqlClient,
    increment_by: i64,
}

impl LowStockJob {
    pub fn new(sink: LogSink, client: GraphqlClient, increment_by: i64) -> Self {
        Self {
            sink,
            client,
            increment_by,
        }
    }

    pub fn from_config(cfg: &CrmConfig) -> Result<Self, JobError> {
        let policy = cfg.low_stock_policy()?;
        let client = GraphqlClient::new(&cfg.graphql_url, cfg.request_timeout)?;
        Ok(Self::new(
            LogSink::new(&cfg.low_stock_log),
            client,
            policy.increment_by,
        ))
    }

    async fn call(&self) -> Result<LowStockReport, JobError> {
        let data = self
            .client
            .execute(
                UPDATE_LOW_STOCK_MUTATION,
                json!({ "incrementBy": self.increment_by }),
            )
            .await?;

        let parsed: MutationData =
            serde_json::from_value(data).map_err(|e| JobError::Decode(e.to_string()))?;
        let report = parsed.update_low_stock_products;

        if !report.success {
            return Err(JobError::Rejected(report.message));
        }
        Ok(report)
    }
}

#[async_trait]
impl CronJob for LowStockJob {
    type Report = LowStockReport;

    fn name(&self) -> &'static str {
        "low-stock"
    }

    async fn run(&self) -> Result<LowStockReport, JobError> {
        let ts = timestamp_now();

        match self.call().await {
            Ok(report) => {
                for p in &report.updated_products {
                    self.sink.append(
                        &ts,
                        &format!("- Updated {}, new stock: {}", p.name, p.stock),
                    )?;
                }
                self.sink.append(&ts, &format!("- {}", report.message))?;

                info!(
                    updated = report.updated_products.len(),
                    increment_by = self.increment_by,
                    "low-stock job complete"
                );
                Ok(report)
            }
            Err(e) => {
                warn!(url = %self.client.url(), error = %e, "low-stock job failed");
                self.sink
                    .append(&ts, &format!("- Low-stock update failed: {e}"))?;
                Err(e)
            }
        }
    }
}
