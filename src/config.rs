//! Service configuration, read from the command line or the environment.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing::Level;

use crate::query::ExecutionConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid listen address {0}: {1}")]
    InvalidListenAddr(String, std::net::AddrParseError),
    #[error("{0} must be at least 1")]
    MustBePositive(&'static str),
}

#[derive(Debug, Clone, Parser)]
#[command(name = "buncher")]
#[command(about = "HTTP query service over the advertising performance dataset")]
pub struct Config {
    /// Connection string of the SQLite database holding the `dataset` table
    #[arg(long, env = "DB_URL", default_value = "sqlite://data.db")]
    pub db_url: String,

    /// Host to bind to
    #[arg(long, env = "SERVICE_HOST", default_value = "127.0.0.1")]
    pub service_host: String,

    /// Port to listen on
    #[arg(long, env = "SERVICE_PORT", default_value_t = 3520)]
    pub service_port: u16,

    /// Upper bound on pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Seconds a single query may take
    #[arg(long, env = "QUERY_TIMEOUT_SECS", default_value_t = 30)]
    pub query_timeout_secs: u64,

    /// Address for the Prometheus exporter; disabled when unset
    #[arg(long, env = "METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: Level,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::MustBePositive("max_connections"));
        }
        if self.query_timeout_secs == 0 {
            return Err(ConfigError::MustBePositive("query_timeout_secs"));
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.service_host, self.service_port);
        addr.parse()
            .map_err(|e| ConfigError::InvalidListenAddr(addr, e))
    }

    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            timeout: Duration::from_secs(self.query_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["buncher"]).unwrap();
        assert_eq!(config.service_port, 3520);
        assert_eq!(config.listen_addr().unwrap(), "127.0.0.1:3520".parse().unwrap());
        assert_eq!(config.execution_config().timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "buncher",
            "--db-url",
            "sqlite:///tmp/ads.db",
            "--service-port",
            "8080",
            "--query-timeout-secs",
            "5",
            "--metrics-addr",
            "127.0.0.1:9090",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(config.db_url, "sqlite:///tmp/ads.db");
        assert_eq!(config.service_port, 8080);
        assert_eq!(config.execution_config().timeout, Duration::from_secs(5));
        assert_eq!(config.metrics_addr, Some("127.0.0.1:9090".parse().unwrap()));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_invalid_values() {
        let config = Config::try_parse_from(["buncher", "--max-connections", "0"]).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MustBePositive("max_connections"))
        ));

        let config = Config::try_parse_from(["buncher", "--service-host", "not a host"]).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidListenAddr(_, _))
        ));
    }
}
