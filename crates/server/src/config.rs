//! Server configuration.
//!
//! Every option is a CLI flag with an environment variable fallback. A `.env`
//! file in the working directory is loaded into the environment before
//! parsing, and flags take precedence over both.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::{Parser, ValueEnum};
use cryptovote_store::MongoConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text.
    Text,
    /// One JSON object per event.
    Json,
    /// JSON when stdout is not a terminal, text otherwise.
    #[default]
    Auto,
}

/// Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "cryptovote-server", version, about = "Crypto vote gRPC server")]
pub struct Config {
    /// Port to listen on for gRPC.
    #[arg(long, env = "API_PORT")]
    pub api_port: u16,

    /// Address to bind the gRPC listener to.
    #[arg(long, env = "API_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub listen_host: IpAddr,

    /// MongoDB host.
    #[arg(long, env = "DB_HOST")]
    pub db_host: String,

    /// MongoDB port.
    #[arg(long, env = "DB_PORT")]
    pub db_port: u16,

    /// Database name.
    #[arg(long, env = "DB_NAME")]
    pub db_name: String,

    /// Collection holding crypto records.
    #[arg(long, env = "DB_COLLECTION")]
    pub db_collection: String,

    /// Address to expose Prometheus metrics (e.g., "0.0.0.0:9090").
    /// If not set, the metrics endpoint is disabled.
    #[arg(long, env = "METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Auto)]
    pub log_format: LogFormat,

    /// Maximum concurrent requests per connection.
    #[arg(long, env = "MAX_CONCURRENT", default_value_t = 100)]
    pub max_concurrent: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl Config {
    /// Socket address the gRPC server binds.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_host, self.api_port)
    }

    /// MongoDB connection string.
    #[must_use]
    pub fn mongo_uri(&self) -> String {
        self.mongo_config().uri()
    }

    /// Store connection settings.
    #[must_use]
    pub fn mongo_config(&self) -> MongoConfig {
        MongoConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            database: self.db_name.clone(),
            collection: self.db_collection.clone(),
        }
    }
}
