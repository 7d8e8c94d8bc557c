//! Execution outcomes and the grading fault taxonomy.
//!
//! Every failure a guest program can cause is represented as data in a
//! [`Fault`], never as a Rust error propagating out of the sandbox. The
//! grading layer treats a faulted execution as a failed test case and keeps
//! going.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The terminal state of one sandboxed execution.
///
/// At most one of `value` / `fault` is populated: a successful extraction
/// run carries a value, a failed run of either phase carries a fault, and a
/// successful measurement-only run carries neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// The decoded result value, when the extraction phase produced one.
    pub value: Option<serde_json::Value>,
    /// Number of interpreter steps taken (authoritative from the
    /// measurement phase in a combined run).
    pub steps: u64,
    /// The fault that terminated the execution, if any.
    pub fault: Option<Fault>,
}

impl ExecutionOutcome {
    /// An outcome carrying only a fault.
    pub fn faulted(steps: u64, fault: Fault) -> Self {
        Self {
            value: None,
            steps,
            fault: Some(fault),
        }
    }
}

/// A failure caused by the guest program or the extraction machinery.
///
/// Serialized across isolation boundaries as a plain `kind` discriminator
/// plus message, never as a rich in-process error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Fault {
    /// The step budget was consumed before completion; treated as a
    /// probable infinite loop.
    ThresholdExceeded,
    /// The guest program raised an error during evaluation; the payload is
    /// preserved for diagnostics.
    ScriptRuntimeError(String),
    /// The guest program failed to parse. Graded exactly like a runtime
    /// error.
    ScriptSyntaxError(String),
    /// The extraction phase's rewritten program did not yield a decodable
    /// value.
    ExtractionFailure(String),
    /// The guest program requested more inputs than the test case provides.
    InputExhausted,
}

impl Fault {
    /// Stable discriminator used across serialization boundaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Fault::ThresholdExceeded => "threshold_exceeded",
            Fault::ScriptRuntimeError(_) => "script_runtime_error",
            Fault::ScriptSyntaxError(_) => "script_syntax_error",
            Fault::ExtractionFailure(_) => "extraction_failure",
            Fault::InputExhausted => "input_exhausted",
        }
    }

    /// Human-readable detail for diagnostics.
    pub fn message(&self) -> String {
        match self {
            Fault::ThresholdExceeded => "step budget exceeded".to_string(),
            Fault::ScriptRuntimeError(msg)
            | Fault::ScriptSyntaxError(msg)
            | Fault::ExtractionFailure(msg) => msg.clone(),
            Fault::InputExhausted => "input queue exhausted".to_string(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}
