//! # Types Module
//!
//! Core data structures shared across the grading system: the hidden test
//! cases a submission is graded against and the tri-state verdict derived
//! from the per-case results.

use serde::{Deserialize, Serialize};

/// One hidden test case: the inputs fed to the guest program's input
/// provider, and the answer its produced value is compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Values returned by the input provider, in FIFO order.
    pub inputs: Vec<String>,
    /// The expected answer; scalar or structured.
    pub expected: serde_json::Value,
}

impl TestCase {
    pub fn new(inputs: Vec<String>, expected: serde_json::Value) -> Self {
        Self { inputs, expected }
    }
}

/// The aggregated tri-state grading outcome across all test cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// No test case passed.
    None,
    /// Some but not all test cases passed.
    Partial,
    /// Every test case passed (vacuously true for zero cases).
    All,
}

impl Verdict {
    /// Derives the verdict from the per-case pass results.
    pub fn from_results(passed: &[bool]) -> Self {
        if passed.iter().all(|p| *p) {
            Verdict::All
        } else if passed.iter().any(|p| *p) {
            Verdict::Partial
        } else {
            Verdict::None
        }
    }
}
