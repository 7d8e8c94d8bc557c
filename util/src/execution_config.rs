//! Per-grading-run execution limits.
//!
//! An [`ExecutionConfig`] bounds a single grading run: the interpreter step
//! budget applied to every test-case execution, and how many case
//! evaluations may run at once. Exercises may ship their own `config.json`
//! under the storage root; otherwise the environment-derived defaults apply.

use crate::config::AppConfig;
use serde::Deserialize;
use std::{fs, path::PathBuf};

/// Limits applied to one grading run.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// Maximum number of interpreter steps one execution may take before it
    /// is aborted. Must be greater than zero.
    pub step_budget: u64,
    /// Upper bound on concurrently running case evaluations.
    pub max_concurrent_cases: usize,
}

impl ExecutionConfig {
    /// Builds the default configuration from the global [`AppConfig`].
    pub fn default_config() -> Self {
        let app = AppConfig::global();
        Self {
            step_budget: app.default_step_budget,
            max_concurrent_cases: app.max_concurrent_evaluations,
        }
    }

    /// Attempts to load a config from a `config.json` file for the given exercise.
    /// Returns `None` if the file does not exist or cannot be parsed.
    pub fn from_exercise_id(exercise_id: &str) -> Option<Self> {
        let base_path = std::env::var("STORAGE_ROOT").ok()?;
        let file_path = PathBuf::from(base_path)
            .join("exercises")
            .join(exercise_id)
            .join("config.json");

        let file_contents = fs::read_to_string(file_path).ok()?;
        serde_json::from_str(&file_contents).ok()
    }

    /// Checks the configuration invariants. A zero step budget is a caller
    /// error, not a runtime grading fault.
    pub fn validate(&self) -> Result<(), String> {
        if self.step_budget == 0 {
            return Err("step_budget must be greater than 0".to_string());
        }
        if self.max_concurrent_cases == 0 {
            return Err("max_concurrent_cases must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Replaces the step budget, keeping the other limits.
    pub fn with_step_budget(mut self, step_budget: u64) -> Self {
        self.step_budget = step_budget;
        self
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
