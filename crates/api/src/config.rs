//! Process configuration from command-line flags or environment variables.

use std::net::SocketAddr;

use clap::{builder::BoolishValueParser, ArgAction, Parser};
use codecamp_observability::LogFormat;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is required when {reason}")]
    Missing { var: &'static str, reason: &'static str },
}

/// Where camps, talks and speakers are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "codecamp-api", about = "Code camp REST API", version)]
pub struct AppConfig {
    #[arg(
        long,
        env = "BIND_ADDR",
        value_name = "ADDR",
        default_value = DEFAULT_BIND_ADDR,
        help = "Address the HTTP server listens on"
    )]
    pub bind_addr: SocketAddr,

    #[arg(
        long,
        env = "USE_PERSISTENT_STORES",
        value_name = "BOOL",
        action = ArgAction::Set,
        default_value_t = false,
        value_parser = BoolishValueParser::new(),
        help = "Keep data in PostgreSQL instead of memory"
    )]
    pub use_persistent_stores: bool,

    #[arg(
        long,
        env = "DATABASE_URL",
        value_name = "URL",
        hide_env_values = true,
        help = "PostgreSQL connection string, required with persistent stores"
    )]
    pub database_url: Option<String>,

    #[arg(
        long,
        env = "DATABASE_MAX_CONNECTIONS",
        value_name = "N",
        default_value_t = DEFAULT_MAX_CONNECTIONS,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "PostgreSQL pool size"
    )]
    pub database_max_connections: u32,

    #[arg(
        long,
        env = "SEED_SAMPLE_DATA",
        value_name = "BOOL",
        action = ArgAction::Set,
        default_value_t = true,
        value_parser = BoolishValueParser::new(),
        help = "Load the sample camp into an empty store at startup"
    )]
    pub seed_sample_data: bool,

    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        ignore_case = true,
        default_value_t = LogFormat::Json,
        help = "Log output format"
    )]
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Read flags and environment, exiting with usage on malformed values.
    pub fn from_env() -> Self {
        Self::parse()
    }

    /// The store these settings select.
    pub fn store(&self) -> Result<StoreConfig, ConfigError> {
        if !self.use_persistent_stores {
            return Ok(StoreConfig::InMemory);
        }
        let database_url = self
            .database_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing {
                var: "DATABASE_URL",
                reason: "USE_PERSISTENT_STORES is on",
            })?;
        Ok(StoreConfig::Postgres {
            database_url,
            max_connections: self.database_max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Result<AppConfig, clap::Error> {
        AppConfig::try_parse_from(std::iter::once("codecamp-api").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_select_seeded_memory_store() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert!(cfg.seed_sample_data);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.store().unwrap(), StoreConfig::InMemory);
    }

    #[test]
    fn persistent_store_needs_database_url() {
        let cfg = config(&["--use-persistent-stores", "true"]).unwrap();
        let err = cfg.store().unwrap_err();
        assert!(matches!(err, ConfigError::Missing { var: "DATABASE_URL", .. }));
    }

    #[test]
    fn persistent_store_reads_pool_size() {
        let cfg = config(&[
            "--use-persistent-stores",
            "True",
            "--database-url",
            "postgres://localhost/codecamp",
            "--database-max-connections",
            "12",
        ])
        .unwrap();
        assert_eq!(
            cfg.store().unwrap(),
            StoreConfig::Postgres {
                database_url: "postgres://localhost/codecamp".to_string(),
                max_connections: 12,
            }
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(config(&["--bind-addr", "not-an-addr"]).is_err());
        assert!(config(&["--seed-sample-data", "maybe"]).is_err());
        assert!(config(&["--log-format", "xml"]).is_err());
        assert!(config(&["--database-max-connections", "0"]).is_err());
    }

    #[test]
    fn pretty_logs_and_no_seed() {
        let cfg = config(&[
            "--log-format",
            "Pretty",
            "--seed-sample-data",
            "no",
            "--bind-addr",
            "127.0.0.1:9000",
        ])
        .unwrap();
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(!cfg.seed_sample_data);
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000".parse().unwrap());
    }
}
