//! CRM liveness heartbeat.

use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};
use tracing::{info, warn};

use crate::config::CrmConfig;

use super::graphql_client::GraphqlClient;
use super::log_sink::{LogSink, timestamp_now};
use super::types::{CronJob, JobError};

const HELLO_QUERY: &str = "query { hello }";

/// Outcome of the optional GraphQL probe.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphqlCheck {
    /// Probe disabled.
    Skipped,
    /// `hello` answered with this value.
    Responsive(String),
    /// The endpoint answered without a `hello` field.
    Unexpected(JsonValue),
    /// The request or the GraphQL layer failed.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatReport {
    pub timestamp: String,
    pub graphql: GraphqlCheck,
}

/// Writes `"<ts> CRM is alive"` and, when enabled, probes `hello`.
///
/// Only a failure to write the liveness line fails the job; probe failures
/// are logged to the same file and reported in `GraphqlCheck::Failed`.
#[derive(Debug, Clone)]
pub struct HeartbeatJob {
    sink: LogSink,
    client: Option<GraphqlClient>,
}

impl HeartbeatJob {
    pub fn new(sink: LogSink, client: Option<GraphqlClient>) -> Self {
        Self { sink, client }
    }

    pub fn from_config(cfg: &CrmConfig) -> Result<Self, JobError> {
        let client = if cfg.heartbeat_graphql_check {
            Some(GraphqlClient::new(&cfg.graphql_url, cfg.request_timeout)?)
        } else {
            None
        };
        Ok(Self::new(LogSink::new(&cfg.heartbeat_log), client))
    }

    async fn probe(&self, client: &GraphqlClient, ts: &str) -> Result<GraphqlCheck, JobError> {
        let check = match client.execute(HELLO_QUERY, json!({})).await {
            Ok(data) => match data.get("hello") {
                Some(v) => {
                    let hello = v.as_str().map(str::to_owned).unwrap_or_else(|| v.to_string());
                    self.sink
                        .append(ts, &format!("GraphQL endpoint responsive: {hello}"))?;
                    GraphqlCheck::Responsive(hello)
                }
                None => {
                    self.sink
                        .append(ts, &format!("GraphQL returned unexpected data: {data}"))?;
                    GraphqlCheck::Unexpected(data)
                }
            },
            Err(e) => {
                warn!(url = %client.url(), error = %e, "heartbeat graphql check failed");
                self.sink.append(ts, &format!("GraphQL check failed: {e}"))?;
                GraphqlCheck::Failed(e.to_string())
            }
        };
        Ok(check)
    }
}

#[async_trait]
impl CronJob for HeartbeatJob {
    type Report = HeartbeatReport;

    fn name(&self) -> &'static str {
        "heartbeat"
    }

    async fn run(&self) -> Result<HeartbeatReport, JobError> {
        let ts = timestamp_now();
        self.sink.append(&ts, "CRM is alive")?;

        let graphql = match &self.client {
            Some(client) => self.probe(client, &ts).await?,
            None => GraphqlCheck::Skipped,
        };

        info!(
            log = %self.sink.path().display(),
            graphql = ?graphql,
            "heartbeat logged"
        );

        Ok(HeartbeatReport {
            timestamp: ts,
            graphql,
        })
    }
}
