//! Process configuration from `STOCKLEDGER_*` environment variables.

use std::collections::HashMap;
use std::net::SocketAddr;

use config::{Config, Environment};
use serde::Deserialize;
use thiserror::Error;

use stockledger_inventory::alerts::DEFAULT_LOW_STOCK_THRESHOLD;
use stockledger_inventory::LowStockPolicy;

const ENV_PREFIX: &str = "STOCKLEDGER";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://stockledger.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_QUERY_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub log_format: LogFormat,
    pub low_stock_threshold: f64,
    pub query_history_limit: usize,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, AppConfigError> {
        Self::build(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load from an explicit variable map instead of the process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, AppConfigError> {
        Self::build(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn build(env: Environment) -> Result<Self, AppConfigError> {
        let config: AppConfig = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_addr", DEFAULT_BIND_ADDR)?
            .set_default("log_format", "json")?
            .set_default("low_stock_threshold", DEFAULT_LOW_STOCK_THRESHOLD)?
            .set_default("query_history_limit", DEFAULT_QUERY_HISTORY_LIMIT as u64)?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(AppConfigError::Invalid("database_url is empty".to_string()));
        }
        self.socket_addr()?;
        self.low_stock_policy()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppConfigError> {
        self.bind_addr.parse().map_err(|_| {
            AppConfigError::Invalid(format!("bind_addr '{}' is not a socket address", self.bind_addr))
        })
    }

    pub fn low_stock_policy(&self) -> Result<LowStockPolicy, AppConfigError> {
        LowStockPolicy::new(self.low_stock_threshold)
            .map_err(|e| AppConfigError::Invalid(e.to_string()))
    }

    /// Defaults with an in-memory database (tests, demos).
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            log_format: LogFormat::Pretty,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            query_history_limit: DEFAULT_QUERY_HISTORY_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_vars(HashMap::new()).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.low_stock_threshold, 0.20);
        assert_eq!(config.query_history_limit, 20);
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let config = AppConfig::from_vars(vars(&[
            ("STOCKLEDGER_DATABASE_URL", "sqlite::memory:"),
            ("STOCKLEDGER_LOG_FORMAT", "pretty"),
            ("STOCKLEDGER_LOW_STOCK_THRESHOLD", "0.35"),
            ("STOCKLEDGER_QUERY_HISTORY_LIMIT", "5"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.low_stock_threshold, 0.35);
        assert_eq!(config.query_history_limit, 5);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = AppConfig::from_vars(vars(&[("STOCKLEDGER_LOW_STOCK_THRESHOLD", "1.5")]))
            .unwrap_err();
        assert!(matches!(err, AppConfigError::Invalid(_)));
    }

    #[test]
    fn bad_bind_addr_is_rejected() {
        let err = AppConfig::from_vars(vars(&[("STOCKLEDGER_BIND_ADDR", "not-an-addr")]))
            .unwrap_err();
        assert!(matches!(err, AppConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_log_format_fails_to_load() {
        let err = AppConfig::from_vars(vars(&[("STOCKLEDGER_LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, AppConfigError::Load(_)));
    }
}
