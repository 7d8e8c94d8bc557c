//! # Grader Library
//!
//! This crate turns N independent sandboxed executions into a single
//! pass/partial/fail verdict. It runs one two-phase evaluation per hidden
//! test case, concurrently, compares each extracted value against the
//! expected answer, and aggregates the per-case booleans into a
//! [`types::Verdict`] inside an immutable [`report::GradingReport`].
//!
//! ## Key Concepts
//! - **GradingJob**: the main struct representing one grading run of a
//!   single submission, built up with the builder methods and consumed by
//!   [`GradingJob::grade`].
//! - **Fail-soft**: guest-code failures of any kind (infinite loops, thrown
//!   errors, bad syntax, exhausted inputs) are represented as data in the
//!   report; `grade` returns `Err` only for caller configuration errors.
//! - **Isolation**: every case evaluation owns its interpreter context, its
//!   step counter and its input queue; nothing is shared between the
//!   concurrent tasks.

pub mod error;
pub mod exercise;
pub mod registry;
pub mod report;
pub mod submission;
pub mod types;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use sandbox::ScriptSandbox;
use sandbox::context::ContextFactory;
use sandbox::outcome::{ExecutionOutcome, Fault};
use sandbox::protocol::ExecutionProtocol;
use util::execution_config::ExecutionConfig;

use crate::error::GraderError;
use crate::report::GradingReport;
use crate::types::{TestCase, Verdict};

/// Represents one grading run: a program text, its hidden test cases, and
/// the execution limits.
pub struct GradingJob {
    program_text: String,
    test_cases: Vec<TestCase>,
    config: ExecutionConfig,
    sandbox: ScriptSandbox,
}

impl GradingJob {
    /// Creates a grading job running on the built-in script engine.
    pub fn new(
        program_text: impl Into<String>,
        test_cases: Vec<TestCase>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            program_text: program_text.into(),
            test_cases,
            config,
            sandbox: ScriptSandbox::new(),
        }
    }

    /// Substitutes a custom isolated-context factory (e.g. a supervised
    /// out-of-process engine).
    pub fn with_factory(mut self, factory: Arc<dyn ContextFactory>) -> Self {
        self.sandbox = ScriptSandbox::with_factory(factory);
        self
    }

    /// Overrides the step budget for this run.
    pub fn with_budget(mut self, step_budget: u64) -> Self {
        self.config.step_budget = step_budget;
        self
    }

    /// Runs every test case concurrently and aggregates the results.
    ///
    /// # Errors
    /// Returns `Err` only for configuration errors (a zero step budget or a
    /// configuration failing [`ExecutionConfig::validate`]). Guest-code
    /// failures are reported as data in the returned [`GradingReport`],
    /// never as `Err`.
    pub async fn grade(self) -> Result<GradingReport, GraderError> {
        if self.config.step_budget == 0 {
            return Err(GraderError::InvalidBudget(self.config.step_budget));
        }
        self.config
            .validate()
            .map_err(GraderError::InvalidConfiguration)?;
        let budget = self.config.step_budget;
        let case_count = self.test_cases.len();
        let limiter = Arc::new(Semaphore::new(self.config.max_concurrent_cases));

        tracing::info!("Grading {} test case(s)", case_count);

        let mut tasks = JoinSet::new();
        for (index, case) in self.test_cases.into_iter().enumerate() {
            let program_text = self.program_text.clone();
            let protocol = ExecutionProtocol::new(self.sandbox.clone());
            let limiter = Arc::clone(&limiter);
            tasks.spawn(async move {
                // The semaphore is never closed, so acquire cannot fail.
                let _permit = limiter.acquire_owned().await.ok();
                let TestCase { inputs, expected } = case;
                let joined = tokio::task::spawn_blocking(move || {
                    protocol.run(&program_text, &inputs, budget)
                })
                .await;
                let outcome = joined.unwrap_or_else(|err| {
                    ExecutionOutcome::faulted(
                        0,
                        Fault::ScriptRuntimeError(format!("evaluation task failed: {err}")),
                    )
                });
                (index, expected, outcome)
            });
        }

        let mut passed = vec![false; case_count];
        let mut primary_value = None;
        let mut primary_steps = 0;
        let mut fault: Option<Fault> = None;

        // Joined in completion order: the recorded fault is the first one
        // observed, not the first-indexed one.
        while let Some(joined) = tasks.join_next().await {
            let Ok((index, expected, outcome)) = joined else {
                tracing::error!("a grading task was aborted before completion");
                continue;
            };
            passed[index] = answers_match(&expected, outcome.value.as_ref());
            if fault.is_none() {
                fault = outcome.fault.clone();
            }
            if index == 0 {
                primary_value = outcome.value;
                primary_steps = outcome.steps;
            }
        }

        let verdict = Verdict::from_results(&passed);
        tracing::info!("Grading complete: verdict {:?}", verdict);

        Ok(GradingReport {
            primary_value,
            primary_steps,
            verdict,
            fault,
            passed,
            created_at: Utc::now().to_rfc3339(),
        })
    }
}

/// Grades `program_text` against `test_cases` with the given step budget.
///
/// Convenience wrapper over [`GradingJob`] using the default limits for
/// everything but the budget.
pub async fn grade_all(
    program_text: &str,
    test_cases: Vec<TestCase>,
    budget: u64,
) -> Result<GradingReport, GraderError> {
    GradingJob::new(
        program_text,
        test_cases,
        ExecutionConfig::default_config().with_step_budget(budget),
    )
    .grade()
    .await
}

/// Compares an extracted value against the expected answer.
///
/// Structured values (arrays/objects) compare by canonical serialized form;
/// scalars compare strictly, with numbers compared by numeric value and no
/// cross-type coercion. A missing value never passes.
fn answers_match(expected: &serde_json::Value, produced: Option<&serde_json::Value>) -> bool {
    let Some(produced) = produced else {
        return false;
    };
    let structured = |v: &serde_json::Value| v.is_array() || v.is_object();
    if structured(expected) || structured(produced) {
        expected.to_string() == produced.to_string()
    } else if let (Some(a), Some(b)) = (expected.as_f64(), produced.as_f64()) {
        a == b
    } else {
        expected == produced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_values_compare_deeply() {
        let expected = json!({ "a": 1 });
        let produced = json!({ "a": 1 });
        assert!(answers_match(&expected, Some(&produced)));
    }

    #[test]
    fn test_structured_mismatch() {
        assert!(!answers_match(&json!({ "a": 1 }), Some(&json!({ "a": 2 }))));
        assert!(!answers_match(&json!([1, 2]), Some(&json!([2, 1]))));
    }

    #[test]
    fn test_scalars_do_not_coerce() {
        assert!(!answers_match(&json!(1), Some(&json!("1"))));
        assert!(!answers_match(&json!(0), Some(&json!(false))));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(answers_match(&json!(1), Some(&json!(1.0))));
        assert!(!answers_match(&json!(1), Some(&json!(1.5))));
    }

    #[test]
    fn test_structured_against_scalar_fails() {
        assert!(!answers_match(&json!([1]), Some(&json!(1))));
    }

    #[test]
    fn test_missing_value_never_passes() {
        assert!(!answers_match(&json!(null), None));
    }

    #[test]
    fn test_null_matches_null() {
        assert!(answers_match(&json!(null), Some(&json!(null))));
    }
}
