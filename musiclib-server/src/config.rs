//! Server configuration
//!
//! Parsed once in `main` from CLI flags and environment variables and then
//! handed to the pieces that need it; nothing reads the environment later.

use clap::{Parser, ValueEnum};
use musiclib_common::config::DatabaseConfig;
use musiclib_common::{Error, Result};

/// Deployment environment; selects log format and default level
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AppEnv {
    /// Human-readable logs at debug level
    Local,
    /// JSON logs at debug level
    Dev,
    /// JSON logs at info level
    Prod,
}

impl AppEnv {
    /// Default tracing level for this environment
    pub fn default_level(self) -> &'static str {
        match self {
            AppEnv::Local | AppEnv::Dev => "debug",
            AppEnv::Prod => "info",
        }
    }

    /// Whether logs are emitted as JSON lines
    pub fn json_logs(self) -> bool {
        !matches!(self, AppEnv::Local)
    }
}

/// Command-line arguments for the musiclib server
#[derive(Parser, Debug, Clone)]
#[command(name = "musiclib")]
#[command(about = "Music catalog HTTP API")]
#[command(version)]
pub struct ServerConfig {
    /// Deployment environment
    #[arg(long, env = "APP_ENV", value_enum, default_value = "dev")]
    pub app_env: AppEnv,

    /// Host or address to bind
    #[arg(long, env = "APP_URL", default_value = "0.0.0.0")]
    pub app_url: String,

    /// Port to listen on (takes precedence over PORT)
    #[arg(long, env = "APP_PORT")]
    pub app_port: Option<u16>,

    /// Fallback port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log level override (trace, debug, info, warn, error); RUST_LOG wins over this
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub database: DatabaseConfig,
}

impl ServerConfig {
    /// Effective listen port
    pub fn listen_port(&self) -> u16 {
        self.app_port.unwrap_or(self.port)
    }

    /// `host:port` to bind; hostnames are resolved by the listener
    pub fn listen_addr(&self) -> String {
        let host = match self.app_url.trim() {
            "" => "0.0.0.0",
            other => other,
        };
        if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, self.listen_port())
        } else {
            format!("{}:{}", host, self.listen_port())
        }
    }

    /// Level directive used when RUST_LOG is not set
    pub fn log_directive(&self) -> &str {
        self.log_level
            .as_deref()
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| self.app_env.default_level())
    }

    /// Validate everything that can be checked before touching the network
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = &self.log_level {
            if tracing_subscriber::EnvFilter::try_new(level).is_err() {
                return Err(Error::Config(format!("Invalid LOG_LEVEL '{}'", level)));
            }
        }
        self.database.validate()
    }
}
