//! Database configuration shared by the server and the migrator
//!
//! Values come from CLI flags or environment variables (`DB_HOST`, `DB_PORT`,
//! `DB_USER`, `DB_PASSWORD`, `DB_NAME`, `DB_SSLMODE`, `DB_MAX_CONNECTIONS`),
//! optionally seeded from a `.env` file.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Args;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::{Error, Result};

/// Load `.env` from the working directory or its parents
///
/// Returns the file that was loaded, or `None` when there is none; a missing
/// file is not an error since every value can come from the environment.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// PostgreSQL connection settings
#[derive(Args, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database host
    #[arg(long = "db-host", env = "DB_HOST", default_value = "localhost")]
    pub host: String,

    /// Database port
    #[arg(id = "db_port", long = "db-port", env = "DB_PORT", default_value_t = 5432)]
    pub port: u16,

    /// Database user (required)
    #[arg(long = "db-user", env = "DB_USER", default_value = "")]
    pub user: String,

    /// Database password (required)
    #[arg(
        long = "db-password",
        env = "DB_PASSWORD",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub password: String,

    /// Database name (required)
    #[arg(long = "db-name", env = "DB_NAME", default_value = "")]
    pub name: String,

    /// libpq SSL mode: disable, allow, prefer, require, verify-ca, verify-full
    #[arg(long = "db-sslmode", env = "DB_SSLMODE", default_value = "disable")]
    pub ssl_mode: String,

    /// Maximum pooled connections
    #[arg(long = "db-max-connections", env = "DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DatabaseConfig {
    /// Reject empty required settings, naming every missing variable
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("DB_HOST", &self.host),
            ("DB_USER", &self.user),
            ("DB_PASSWORD", &self.password),
            ("DB_NAME", &self.name),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "Missing required database settings: {}",
                missing.join(", ")
            )));
        }

        if self.max_connections == 0 {
            return Err(Error::Config(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        self.parsed_ssl_mode().map(|_| ())
    }

    fn parsed_ssl_mode(&self) -> Result<PgSslMode> {
        PgSslMode::from_str(&self.ssl_mode).map_err(|_| {
            Error::Config(format!(
                "Invalid DB_SSLMODE '{}' (expected disable, allow, prefer, require, verify-ca or verify-full)",
                self.ssl_mode
            ))
        })
    }

    /// Connection options for sqlx; sessions run in UTC
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        self.validate()?;
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(self.parsed_ssl_mode()?)
            .options([("TimeZone", "UTC")]))
    }
}
