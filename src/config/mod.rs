//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SHUTTLE_BOOKING` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use shuttle_booking::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod booking;
mod database;
mod error;
mod features;
mod server;

pub use booking::BookingConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// in-memory setup. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Listener and logging settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration; `None` keeps all state in memory
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Booking rules
    #[serde(default)]
    pub booking: BookingConfig,

    /// Feature flags
    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SHUTTLE_BOOKING` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SHUTTLE_BOOKING__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SHUTTLE_BOOKING__DATABASE__URL=...` -> `database.url = ...`
    /// - `SHUTTLE_BOOKING__BOOKING__DEFAULT_MAX_RIDERS=40`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SHUTTLE_BOOKING")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.booking.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "SHUTTLE_BOOKING__DATABASE__URL",
        "SHUTTLE_BOOKING__SERVER__PORT",
        "SHUTTLE_BOOKING__SERVER__REQUEST_TIMEOUT_SECS",
        "SHUTTLE_BOOKING__BOOKING__DEFAULT_MAX_RIDERS",
        "SHUTTLE_BOOKING__BOOKING__ONE_BOOKING_PER_CHAT",
        "SHUTTLE_BOOKING__FEATURES__JSON_LOGS",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_empty_environment_loads_in_memory_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert!(config.database.is_none());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.booking.default_max_riders, 40);
        assert!(config.booking.one_booking_per_chat);
        assert!(!config.features.json_logs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SHUTTLE_BOOKING__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("SHUTTLE_BOOKING__SERVER__PORT", "3000");
        env::set_var("SHUTTLE_BOOKING__BOOKING__DEFAULT_MAX_RIDERS", "12");
        env::set_var("SHUTTLE_BOOKING__BOOKING__ONE_BOOKING_PER_CHAT", "false");
        env::set_var("SHUTTLE_BOOKING__FEATURES__JSON_LOGS", "true");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(
            config.database.as_ref().map(|d| d.url.as_str()),
            Some("postgresql://test@localhost/test")
        );
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.booking.default_max_riders, 12);
        assert!(!config.booking.one_booking_per_chat);
        assert!(config.features.json_logs);
    }

    #[test]
    fn test_out_of_range_timeout_loads_but_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SHUTTLE_BOOKING__SERVER__REQUEST_TIMEOUT_SECS", "0");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
    }

    #[test]
    fn test_invalid_database_section_fails_validation() {
        let config = AppConfig {
            database: Some(DatabaseConfig {
                url: "mysql://localhost/bus".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidDatabaseUrl));
    }
}
