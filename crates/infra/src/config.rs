//! Configuration loading and representation.
//!
//! Everything the API server and the cron jobs need is carried in an explicit
//! [`CrmConfig`] value. `from_env` reads `CRM_*` variables and falls back to the
//! documented defaults for anything unset.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crm_products::{DEFAULT_INCREMENT, DEFAULT_THRESHOLD, LowStockPolicy};

pub const DEFAULT_GRAPHQL_URL: &str = "http://localhost:8000/graphql/";
pub const DEFAULT_HEARTBEAT_LOG: &str = "/tmp/crm_heartbeat_log.txt";
pub const DEFAULT_LOW_STOCK_LOG: &str = "/tmp/low_stock_updates_log.txt";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

/// Runtime configuration for the CRM services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmConfig {
    /// GraphQL endpoint the cron jobs talk to.
    pub graphql_url: String,
    pub heartbeat_log: PathBuf,
    pub low_stock_log: PathBuf,
    /// Whether the heartbeat also queries `hello` on the GraphQL endpoint.
    pub heartbeat_graphql_check: bool,
    pub low_stock_threshold: i64,
    pub low_stock_increment: i64,
    pub request_timeout: Duration,
    pub bind_addr: SocketAddr,
    /// Postgres connection string; `None` selects the in-memory store.
    pub database_url: Option<String>,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            heartbeat_log: PathBuf::from(DEFAULT_HEARTBEAT_LOG),
            low_stock_log: PathBuf::from(DEFAULT_LOW_STOCK_LOG),
            heartbeat_graphql_check: true,
            low_stock_threshold: DEFAULT_THRESHOLD,
            low_stock_increment: DEFAULT_INCREMENT,
            request_timeout: Duration::from_secs(10),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            database_url: None,
        }
    }
}

impl CrmConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("CRM_GRAPHQL_URL") {
            cfg.graphql_url = v;
        }
        if let Some(v) = get("CRM_HEARTBEAT_LOG") {
            cfg.heartbeat_log = PathBuf::from(v);
        }
        if let Some(v) = get("CRM_LOW_STOCK_LOG") {
            cfg.low_stock_log = PathBuf::from(v);
        }
        if let Some(v) = get("CRM_HEARTBEAT_GRAPHQL_CHECK") {
            cfg.heartbeat_graphql_check = parse_bool("CRM_HEARTBEAT_GRAPHQL_CHECK", &v)?;
        }
        if let Some(v) = get("CRM_LOW_STOCK_THRESHOLD") {
            cfg.low_stock_threshold = parse_int("CRM_LOW_STOCK_THRESHOLD", &v)?;
        }
        if let Some(v) = get("CRM_LOW_STOCK_INCREMENT") {
            cfg.low_stock_increment = parse_int("CRM_LOW_STOCK_INCREMENT", &v)?;
        }
        if let Some(v) = get("CRM_REQUEST_TIMEOUT_SECS") {
            let secs = v
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid("CRM_REQUEST_TIMEOUT_SECS", e.to_string()))?;
            cfg.request_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = get("CRM_BIND_ADDR") {
            cfg.bind_addr = v.trim().parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::invalid("CRM_BIND_ADDR", e.to_string())
            })?;
        }
        cfg.database_url = get("DATABASE_URL");

        cfg.low_stock_policy()?;
        Ok(cfg)
    }

    /// Threshold/increment pair as a validated policy.
    pub fn low_stock_policy(&self) -> Result<LowStockPolicy, ConfigError> {
        let policy = LowStockPolicy {
            threshold: self.low_stock_threshold,
            increment_by: self.low_stock_increment,
        };
        policy
            .validate()
            .map_err(|e| ConfigError::invalid("CRM_LOW_STOCK_*", e.to_string()))?;
        Ok(policy)
    }
}

fn parse_int(var: &'static str, raw: &str) -> Result<i64, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| ConfigError::invalid(var, e.to_string()))
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(var, format!("not a boolean: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = CrmConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, CrmConfig::default());
        assert_eq!(cfg.graphql_url, "http://localhost:8000/graphql/");
        assert_eq!(cfg.heartbeat_log, PathBuf::from("/tmp/crm_heartbeat_log.txt"));
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.low_stock_policy().unwrap(), LowStockPolicy::default());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = CrmConfig::from_lookup(lookup(&[
            ("CRM_GRAPHQL_URL", "http://crm:9000/graphql"),
            ("CRM_HEARTBEAT_GRAPHQL_CHECK", "off"),
            ("CRM_LOW_STOCK_INCREMENT", "25"),
            ("CRM_REQUEST_TIMEOUT_SECS", "3"),
            ("DATABASE_URL", "postgres://localhost/crm"),
        ]))
        .unwrap();

        assert_eq!(cfg.graphql_url, "http://crm:9000/graphql");
        assert!(!cfg.heartbeat_graphql_check);
        assert_eq!(cfg.low_stock_increment, 25);
        assert_eq!(cfg.low_stock_threshold, 10);
        assert_eq!(cfg.request_timeout, Duration::from_secs(3));
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/crm"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = CrmConfig::from_lookup(lookup(&[("CRM_GRAPHQL_URL", "  ")])).unwrap();
        assert_eq!(cfg.graphql_url, DEFAULT_GRAPHQL_URL);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(CrmConfig::from_lookup(lookup(&[("CRM_LOW_STOCK_INCREMENT", "0")])).is_err());
        assert!(CrmConfig::from_lookup(lookup(&[("CRM_LOW_STOCK_THRESHOLD", "ten")])).is_err());
        assert!(
            CrmConfig::from_lookup(lookup(&[("CRM_HEARTBEAT_GRAPHQL_CHECK", "maybe")])).is_err()
        );
        assert!(CrmConfig::from_lookup(lookup(&[("CRM_BIND_ADDR", "nowhere")])).is_err());
    }
}
