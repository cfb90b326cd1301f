//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from `.env` and environment variables.
//! It provides thread-safe access and mutation for tests or runtime overrides
//! (for example values passed on the command line).

use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

/// Represents the complete client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub access_token: Option<String>,
    pub warning_threshold_secs: u64,
    pub tick_interval_ms: u64,
    pub expiry_highlight_ms: u64,
    pub expiry_fade_ms: u64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

/// Reads `key` and parses it, falling back to `default` when unset or malformed.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every field has a default, so this never panics.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "attendance-client".into()),
            log_level: env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "attendance=info,lecturer=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "lecturer.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000/api".into()),
            api_timeout_secs: env_parse("API_TIMEOUT_SECS", 15),
            access_token: env::var("ACCESS_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            warning_threshold_secs: env_parse("WARNING_THRESHOLD_SECS", 10),
            tick_interval_ms: env_parse("TICK_INTERVAL_MS", 1000),
            expiry_highlight_ms: env_parse("EXPIRY_HIGHLIGHT_MS", 500),
            expiry_fade_ms: env_parse("EXPIRY_FADE_MS", 2000),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Returns an owned copy of the global configuration.
    pub fn snapshot() -> AppConfig {
        Self::global().clone()
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock
                .write()
                .expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_api_base_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.api_base_url = value.into());
    }

    pub fn set_api_timeout_secs(value: u64) {
        AppConfig::set_field(|cfg| cfg.api_timeout_secs = value);
    }

    /// Override the bearer token. Blank values clear it.
    pub fn set_access_token(value: impl Into<String>) {
        let value = value.into();
        AppConfig::set_field(|cfg| {
            cfg.access_token = Some(value).filter(|t| !t.trim().is_empty())
        });
    }

    pub fn set_warning_threshold_secs(value: u64) {
        AppConfig::set_field(|cfg| cfg.warning_threshold_secs = value);
    }

    pub fn set_tick_interval_ms(value: u64) {
        AppConfig::set_field(|cfg| cfg.tick_interval_ms = value);
    }

    pub fn set_expiry_highlight_ms(value: u64) {
        AppConfig::set_field(|cfg| cfg.expiry_highlight_ms = value);
    }

    pub fn set_expiry_fade_ms(value: u64) {
        AppConfig::set_field(|cfg| cfg.expiry_fade_ms = value);
    }
}
