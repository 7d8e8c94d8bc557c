//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_to_stdout: bool,
    pub storage_root: String,
    pub default_step_budget: u64,
    pub max_concurrent_evaluations: usize,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every value has a default, so loading never fails; a missing or
    /// malformed variable falls back rather than panicking.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "script-grader".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "grader=info".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            storage_root: env::var("STORAGE_ROOT").unwrap_or_else(|_| "data".into()),
            default_step_budget: env::var("DEFAULT_STEP_BUDGET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1_000_000),
            max_concurrent_evaluations: env::var("MAX_CONCURRENT_EVALUATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8),
        }
    }

    /// Returns a clone of the current global configuration, initializing it
    /// from the environment on first access.
    pub fn global() -> AppConfig {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("AppConfig lock poisoned")
            .clone()
    }

    /// Replaces the global configuration. Intended for tests and runtime overrides.
    pub fn set_global(config: AppConfig) {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        *lock.write().expect("AppConfig lock poisoned") = config;
    }
}
