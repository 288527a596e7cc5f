//! Minimal GraphQL-over-HTTP client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use super::types::JobError;

/// A GraphQL query ready to be executed.
#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: JsonValue,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<JsonValue>,
    #[serde(default)]
    errors: Vec<GraphQlErrorBody>,
}

#[derive(Deserialize)]
struct GraphQlErrorBody {
    message: String,
}

/// Posts queries to a single GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    url: String,
}

impl GraphqlClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, JobError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Execute `query` and return its `data` object.
    ///
    /// A response with a non-empty `errors` list fails with `JobError::GraphQl`.
    pub async fn execute(&self, query: &str, variables: JsonValue) -> Result<JsonValue, JobError> {
        debug!(url = %self.url, "posting graphql request");

        let res = self
            .http
            .post(&self.url)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(JobError::Status(status.as_u16(), body));
        }

        let body: GraphQlResponse = res
            .json()
            .await
            .map_err(|e| JobError::Decode(e.to_string()))?;

        if !body.errors.is_empty() {
            return Err(JobError::GraphQl(
                body.errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        body.data
            .ok_or_else(|| JobError::Decode("response has neither data nor errors".to_string()))
    }
}
