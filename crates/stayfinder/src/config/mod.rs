use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::booking::{Horizon, HorizonError};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub booking: BookingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            booking: BookingConfig::load()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Data locations and the booking horizon injected into the engine.
///
/// The horizon is explicit configuration, never a process-wide constant:
/// the reference date sits one day before the first bookable night.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub catalog_path: PathBuf,
    pub ledger_path: PathBuf,
    pub audit_log_path: PathBuf,
    pub horizon: Horizon,
}

impl BookingConfig {
    fn load() -> Result<Self, ConfigError> {
        let catalog_path =
            PathBuf::from(env::var("APP_CATALOG_PATH").unwrap_or_else(|_| "listings.csv".to_string()));
        let ledger_path =
            PathBuf::from(env::var("APP_LEDGER_PATH").unwrap_or_else(|_| "booking.csv".to_string()));
        let audit_log_path = PathBuf::from(
            env::var("APP_AUDIT_LOG_PATH").unwrap_or_else(|_| "log.txt".to_string()),
        );

        let horizon_start = env::var("APP_HORIZON_START")
            .unwrap_or_else(|_| "2020-12-17".to_string());
        let reference_date = NaiveDate::parse_from_str(horizon_start.trim(), "%Y-%m-%d")
            .map_err(|source| ConfigError::InvalidHorizonStart { source })?;

        let horizon_days = env::var("APP_HORIZON_DAYS")
            .unwrap_or_else(|_| "90".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidHorizonLength)?;

        let horizon =
            Horizon::new(reference_date, horizon_days).map_err(ConfigError::EmptyHorizon)?;

        Ok(Self {
            catalog_path,
            ledger_path,
            audit_log_path,
            horizon,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidHorizonStart { source: chrono::ParseError },
    InvalidHorizonLength,
    EmptyHorizon(HorizonError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidHorizonStart { .. } => {
                write!(f, "APP_HORIZON_START must be a YYYY-MM-DD date")
            }
            ConfigError::InvalidHorizonLength => {
                write!(f, "APP_HORIZON_DAYS must be a positive integer")
            }
            ConfigError::EmptyHorizon(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidHorizonLength => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidHorizonStart { source } => Some(source),
            ConfigError::EmptyHorizon(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_CATALOG_PATH");
        env::remove_var("APP_LEDGER_PATH");
        env::remove_var("APP_AUDIT_LOG_PATH");
        env::remove_var("APP_HORIZON_START");
        env::remove_var("APP_HORIZON_DAYS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.booking.ledger_path, PathBuf::from("booking.csv"));
        assert_eq!(config.booking.horizon.length_days(), 90);
        assert_eq!(
            config.booking.horizon.reference_date(),
            NaiveDate::from_ymd_opt(2020, 12, 17).expect("valid date")
        );
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn horizon_overrides_are_honored() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HORIZON_START", "2021-06-01");
        env::set_var("APP_HORIZON_DAYS", "30");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.booking.horizon.length_days(), 30);
        assert_eq!(
            config.booking.horizon.reference_date(),
            NaiveDate::from_ymd_opt(2021, 6, 1).expect("valid date")
        );
        reset_env();
    }

    #[test]
    fn malformed_horizon_values_fail_loudly() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HORIZON_START", "June 1st");
        assert!(AppConfig::load().is_err());
        reset_env();

        env::set_var("APP_HORIZON_DAYS", "0");
        assert!(AppConfig::load().is_err());
        reset_env();
    }
}
