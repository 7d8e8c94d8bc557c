//! The two-phase evaluation protocol.
//!
//! Grading needs two things from one submission: how much work it does, and
//! what value it produces. Measuring steps must not be perturbed by the cost
//! of serializing the result, and extraction must work for programs whose
//! last statement is an implicit value rather than an explicit return. So
//! every grading execution runs twice, each time in a fresh context:
//!
//! 1. **Measurement**: the unmodified program; only `steps` and `fault` are
//!    reported.
//! 2. **Extraction** (skipped if measurement faulted): the program is
//!    rewritten so its final action serializes the tail expression, and the
//!    serialized string is decoded back into a value.
//!
//! The combined outcome takes `steps` from the measurement run (the
//! unmodified program is authoritative), `value` from the extraction run,
//! and the measurement fault when both exist.

use std::collections::VecDeque;
use std::sync::OnceLock;

use regex::Regex;

use crate::outcome::{ExecutionOutcome, Fault};
use crate::{STRINGIFY_BUILTIN, ScriptSandbox};

/// Strips a trailing `//` line comment from the value expression.
fn line_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"//.*").expect("line comment regex is valid"))
}

/// Rewrites `source` so that its final action serializes the tail
/// expression.
///
/// The last non-blank line is split on `;`; the final statement becomes the
/// value expression (with any trailing line comment stripped), and a
/// `stringify(<expr>)` call is appended after the remaining program text.
///
/// This is a deliberate line-level heuristic, preserved exactly: statement
/// separators hidden inside string literals or compound statements on the
/// last line mis-split, producing incorrect extraction rather than a clean
/// fault. Callers get whatever the mis-split program yields.
pub fn rewrite_tail_expression(source: &str) -> String {
    let mut lines: Vec<&str> = source.trim().split('\n').collect();
    let last_line = lines.pop().unwrap_or("");
    let mut statements: Vec<&str> = last_line.split(';').collect();
    let response = statements.pop().unwrap_or("");
    let response = line_comment_re().replace_all(response, "");
    let response = response.trim_end();
    format!(
        "{}{}\n{}({})",
        lines.join("\n"),
        statements.join(";"),
        STRINGIFY_BUILTIN,
        response
    )
}

/// Runs the two-phase evaluation over a [`ScriptSandbox`].
#[derive(Clone, Default)]
pub struct ExecutionProtocol {
    sandbox: ScriptSandbox,
}

impl ExecutionProtocol {
    pub fn new(sandbox: ScriptSandbox) -> Self {
        Self { sandbox }
    }

    /// Runs a single phase.
    ///
    /// With `measure_only` the program runs unmodified and only `steps` and
    /// `fault` are reported. Otherwise the program is rewritten, run with
    /// fresh state, and its serialized result decoded; a result that is not
    /// a decodable string becomes [`Fault::ExtractionFailure`].
    pub fn evaluate(
        &self,
        program_text: &str,
        inputs: &[String],
        measure_only: bool,
        budget: u64,
    ) -> ExecutionOutcome {
        let queue: VecDeque<String> = inputs.to_vec().into();

        if measure_only {
            let outcome = self.sandbox.run(program_text, queue, budget);
            return ExecutionOutcome {
                value: None,
                steps: outcome.steps,
                fault: outcome.fault,
            };
        }

        let rewritten = rewrite_tail_expression(program_text);
        let outcome = self.sandbox.run(&rewritten, queue, budget);

        if let Some(fault) = outcome.fault {
            // The original program parsed in phase 1, so a syntax error here
            // can only come from the rewrite itself.
            let fault = match fault {
                Fault::ScriptSyntaxError(msg) => Fault::ExtractionFailure(msg),
                other => other,
            };
            return ExecutionOutcome::faulted(outcome.steps, fault);
        }

        let decoded = match outcome.value {
            Some(serde_json::Value::String(encoded)) => {
                serde_json::from_str::<serde_json::Value>(&encoded).map_err(|e| {
                    Fault::ExtractionFailure(format!("undecodable result: {e}"))
                })
            }
            other => Err(Fault::ExtractionFailure(format!(
                "expected a serialized string result, got {other:?}"
            ))),
        };

        match decoded {
            Ok(value) => ExecutionOutcome {
                value: Some(value),
                steps: outcome.steps,
                fault: None,
            },
            Err(fault) => ExecutionOutcome::faulted(outcome.steps, fault),
        }
    }

    /// Runs both phases and combines their outcomes.
    ///
    /// If the measurement phase faults, extraction is skipped entirely and
    /// the fault is returned with the measured steps. Otherwise `steps`
    /// still comes from the measurement run and `value`/`fault` from the
    /// extraction run.
    pub fn run(&self, program_text: &str, inputs: &[String], budget: u64) -> ExecutionOutcome {
        let measured = self.evaluate(program_text, inputs, true, budget);
        if measured.fault.is_some() {
            return measured;
        }

        let extracted = self.evaluate(program_text, inputs, false, budget);
        ExecutionOutcome {
            value: extracted.value,
            steps: measured.steps,
            fault: extracted.fault,
        }
    }
}
