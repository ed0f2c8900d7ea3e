use crate::core::{AppError, Currency, Result, SYSTEM_ACTOR};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Offsets beyond this are not real timezones
const MAX_UTC_OFFSET_HOURS: i32 = 14;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub ledger: LedgerConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Business timezone used for due dates and audit timestamps
    pub utc_offset_hours: i32,
    pub audit_actor: String,
    pub currency: Currency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub backend: LedgerBackend,
    /// Present when `backend` is MySQL
    pub database: Option<DatabaseConfig>,
}

/// Where the loan ledger lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    Mysql,
    Memory,
}

impl std::str::FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::configuration(format!(
                "Invalid LOG_FORMAT: {} (expected text or json)",
                other
            ))),
        }
    }
}

impl std::str::FromStr for LedgerBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(LedgerBackend::Mysql),
            "memory" => Ok(LedgerBackend::Memory),
            other => Err(AppError::configuration(format!(
                "Invalid LEDGER_BACKEND: {} (expected mysql or memory)",
                other
            ))),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let backend: LedgerBackend = env::var("LEDGER_BACKEND")
            .unwrap_or_else(|_| "mysql".to_string())
            .parse()?;

        let database = match backend {
            LedgerBackend::Mysql => Some(DatabaseConfig::from_env()?),
            LedgerBackend::Memory => None,
        };

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env::var("LOG_FORMAT")
                    .unwrap_or_else(|_| "text".to_string())
                    .parse()?,
                utc_offset_hours: env::var("BUSINESS_UTC_OFFSET_HOURS")
                    .unwrap_or_else(|_| "7".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid BUSINESS_UTC_OFFSET_HOURS".to_string())
                    })?,
                audit_actor: env::var("AUDIT_ACTOR").unwrap_or_else(|_| SYSTEM_ACTOR.to_string()),
                currency: env::var("LEDGER_CURRENCY")
                    .unwrap_or_else(|_| Currency::default().to_string())
                    .parse()
                    .map_err(AppError::Configuration)?,
            },
            ledger: LedgerConfig { backend, database },
            server: ServerConfig::from_env()?,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.app.utc_offset_hours.abs() > MAX_UTC_OFFSET_HOURS {
            return Err(AppError::Configuration(format!(
                "BUSINESS_UTC_OFFSET_HOURS must be within ±{}",
                MAX_UTC_OFFSET_HOURS
            )));
        }

        if self.app.audit_actor.trim().is_empty() {
            return Err(AppError::Configuration(
                "AUDIT_ACTOR must not be empty".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(AppError::Configuration(
                "APP_PORT must be greater than 0".to_string(),
            ));
        }

        if self.server.workers == 0 {
            return Err(AppError::Configuration(
                "APP_WORKERS must be greater than 0".to_string(),
            ));
        }

        match (&self.ledger.backend, &self.ledger.database) {
            (LedgerBackend::Mysql, None) => {
                return Err(AppError::Configuration(
                    "DATABASE_URL is required for the mysql ledger".to_string(),
                ));
            }
            (_, Some(db)) if db.pool_size > db.max_connections => {
                return Err(AppError::Configuration(
                    "DATABASE_POOL_SIZE must not exceed DATABASE_MAX_CONNECTIONS".to_string(),
                ));
            }
            _ => {}
        }

        Ok(())
    }
}
