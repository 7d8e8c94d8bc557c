//! # Grading Report Module
//!
//! The immutable value returned from a grading run. The core pushes nothing
//! into stores or UI state; callers receive a [`GradingReport`] and decide
//! themselves how to propagate or persist it.
//!
//! Two reporting choices are fixed, documented behavior:
//! - `primary_value` and `primary_steps` are taken from test case index 0,
//!   independent of whether that case passed.
//! - `fault` is the first fault observed in completion order across the
//!   concurrently running cases, which is nondeterministic when several
//!   cases fault.

use serde::Serialize;

use sandbox::outcome::Fault;

use crate::types::Verdict;

/// The result of grading one submission against all of its test cases.
#[derive(Debug, Clone, Serialize)]
pub struct GradingReport {
    /// The value produced by test case 0, if it was extracted.
    pub primary_value: Option<serde_json::Value>,
    /// The step count measured for test case 0.
    pub primary_steps: u64,
    /// The aggregated tri-state verdict.
    pub verdict: Verdict,
    /// The first fault observed in completion order, if any case faulted.
    pub fault: Option<Fault>,
    /// Per-case pass results, in test-case order.
    pub passed: Vec<bool>,
    /// RFC 3339 timestamp of when the report was produced.
    pub created_at: String,
}

impl GradingReport {
    /// Whether every test case passed.
    pub fn all_passed(&self) -> bool {
        self.verdict == Verdict::All
    }
}
