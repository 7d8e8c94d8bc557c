//! # Sandbox
//!
//! This crate provides the core logic for safely executing one learner
//! submission: a [`ScriptSandbox`] that wraps a single execution of guest
//! code in a fresh, resource-bounded interpreter context, and an
//! [`protocol::ExecutionProtocol`] implementing the two-phase evaluation
//! (step measurement, then value extraction via the tail-expression
//! rewrite).
//!
//! ## Key Concepts
//! - **ScriptSandbox**: one execution = one brand-new context, a
//!   step-counting hook enforcing the budget, and a FIFO input provider.
//!   Interpreter-level outcomes are converted into a uniform
//!   [`outcome::ExecutionOutcome`].
//! - **Faults are data**: anything the guest program does wrong (infinite
//!   loops, thrown errors, bad syntax, exhausted inputs) becomes an
//!   [`outcome::Fault`] inside the outcome, never an error raised at the
//!   caller.
//! - **Boundary messages**: [`boundary::EvalRequest`] /
//!   [`boundary::EvalResponse`] are plain serializable records suitable for
//!   a cross-thread or cross-process channel.
//!
//! The step hook is cooperative: it preempts guest-level loops but cannot
//! interrupt a single pathological host-level dispatch step. A production
//! deployment should supervise executions with a wall-clock timeout from
//! outside; the no-shared-state design lets a supervisor abandon one
//! execution without corrupting concurrent ones.

pub mod boundary;
pub mod context;
pub mod outcome;
pub mod protocol;

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use script_engine::{EngineError, HookAbort, HostFault, Value};

use crate::context::{ContextFactory, EngineContextFactory};
use crate::outcome::{ExecutionOutcome, Fault};

/// Host-fault kind raised by the input provider on an empty queue.
const INPUT_EXHAUSTED_KIND: &str = "input_exhausted";
/// Host-fault kind raised when the result serializer cannot encode a value.
const UNSERIALIZABLE_KIND: &str = "unserializable";

/// Name under which the guest's input provider is registered.
pub const INPUT_BUILTIN: &str = "prompt";
/// Name under which the result serializer is registered; the tail-expression
/// rewrite appends a call to it.
pub const STRINGIFY_BUILTIN: &str = "stringify";

/// Wraps one execution of guest code in an isolated, budgeted context.
#[derive(Clone)]
pub struct ScriptSandbox {
    factory: Arc<dyn ContextFactory>,
}

impl Default for ScriptSandbox {
    fn default() -> Self {
        Self {
            factory: Arc::new(EngineContextFactory),
        }
    }
}

impl ScriptSandbox {
    /// A sandbox executing on the built-in script engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sandbox executing on contexts from a custom factory.
    pub fn with_factory(factory: Arc<dyn ContextFactory>) -> Self {
        Self { factory }
    }

    /// Runs `program_text` in a brand-new context with the given FIFO input
    /// queue and step budget.
    ///
    /// The step counter and the input queue are owned exclusively by this
    /// run; concurrent runs cannot observe each other's state. Exactly one
    /// of `value` / `fault` is populated in the returned outcome.
    pub fn run(
        &self,
        program_text: &str,
        inputs: VecDeque<String>,
        budget: u64,
    ) -> ExecutionOutcome {
        let mut context = self.factory.create();

        let counter = Arc::new(AtomicU64::new(0));
        let hook_counter = Arc::clone(&counter);
        context.set_step_hook(Box::new(move || {
            let taken = hook_counter.fetch_add(1, Ordering::Relaxed) + 1;
            if taken > budget { Err(HookAbort) } else { Ok(()) }
        }));

        let mut queue = inputs;
        context.register_builtin(
            INPUT_BUILTIN,
            Box::new(move |_args| {
                queue.pop_front().map(Value::Str).ok_or_else(|| {
                    HostFault::new(INPUT_EXHAUSTED_KIND, "input queue exhausted")
                })
            }),
        );

        context.register_builtin(
            STRINGIFY_BUILTIN,
            Box::new(|args| {
                let value = args.into_iter().next().unwrap_or(Value::Null);
                serde_json::to_string(&value.to_json())
                    .map(Value::Str)
                    .map_err(|e| HostFault::new(UNSERIALIZABLE_KIND, e.to_string()))
            }),
        );

        let result = context.run(program_text);
        let steps = counter.load(Ordering::Relaxed);

        match result {
            Ok(value) => ExecutionOutcome {
                value: Some(value.to_json()),
                steps,
                fault: None,
            },
            Err(err) => {
                let fault = Self::fault_from(err);
                tracing::debug!("execution faulted after {} steps: {}", steps, fault);
                ExecutionOutcome::faulted(steps, fault)
            }
        }
    }

    fn fault_from(err: EngineError) -> Fault {
        match err {
            EngineError::Syntax(msg) => Fault::ScriptSyntaxError(msg),
            EngineError::Runtime(msg) => Fault::ScriptRuntimeError(msg),
            EngineError::HookAbort => Fault::ThresholdExceeded,
            EngineError::Host { kind, message } => match kind.as_str() {
                INPUT_EXHAUSTED_KIND => Fault::InputExhausted,
                UNSERIALIZABLE_KIND => Fault::ExtractionFailure(message),
                _ => Fault::ScriptRuntimeError(format!("{kind}: {message}")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(inputs: &[&str]) -> VecDeque<String> {
        inputs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normal_completion_carries_value() {
        let outcome = ScriptSandbox::new().run("1 + 1", queue(&[]), 1000);
        assert_eq!(outcome.value, Some(serde_json::json!(2)));
        assert!(outcome.fault.is_none());
        assert!(outcome.steps > 0);
    }

    #[test]
    fn test_inputs_are_fifo_and_consumed_once() {
        let source = "let a = prompt()\nlet b = prompt()\na + b";
        let outcome = ScriptSandbox::new().run(source, queue(&["x", "y"]), 1000);
        assert_eq!(outcome.value, Some(serde_json::json!("xy")));
    }

    #[test]
    fn test_exhausted_inputs_fault() {
        let source = "prompt()\nprompt()\nprompt()";
        let outcome = ScriptSandbox::new().run(source, queue(&["a", "b"]), 1000);
        assert_eq!(outcome.fault, Some(Fault::InputExhausted));
        assert!(outcome.value.is_none());
    }

    #[test]
    fn test_budget_exhaustion_faults() {
        let source = "let i = 0\nwhile (true) { i = i + 1 }";
        let outcome = ScriptSandbox::new().run(source, queue(&[]), 100);
        assert_eq!(outcome.fault, Some(Fault::ThresholdExceeded));
        assert!(outcome.steps > 100);
    }

    #[test]
    fn test_syntax_error_faults() {
        let outcome = ScriptSandbox::new().run("let = nope", queue(&[]), 1000);
        assert!(matches!(outcome.fault, Some(Fault::ScriptSyntaxError(_))));
    }

    #[test]
    fn test_runtime_error_preserves_payload() {
        let outcome = ScriptSandbox::new().run("missing_var", queue(&[]), 1000);
        let Some(Fault::ScriptRuntimeError(msg)) = outcome.fault else {
            panic!("expected runtime fault");
        };
        assert!(msg.contains("missing_var"));
    }

    #[test]
    fn test_runs_are_isolated() {
        let sandbox = ScriptSandbox::new();
        sandbox.run("let x = 1", queue(&[]), 1000);
        let outcome = sandbox.run("x", queue(&[]), 1000);
        assert!(matches!(outcome.fault, Some(Fault::ScriptRuntimeError(_))));
    }
}
