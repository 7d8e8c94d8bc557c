//! The isolated-context boundary.
//!
//! The sandbox does not depend on a particular interpreter: it consumes any
//! context offering the two hook-registration points (a per-step callback
//! and host builtins) behind [`IsolatedContext`], produced fresh per
//! execution by a [`ContextFactory`]. The default factory hands out
//! `script-engine` contexts; an embedder supervising executions in a
//! separate process can substitute its own.

use script_engine::{BuiltinFn, Engine, EngineError, StepHook, Value};

/// One fresh, fully isolated interpreter context. A context is used for at
/// most one `run` and shares no state with any other context.
pub trait IsolatedContext {
    /// Installs the per-evaluation-step callback.
    fn set_step_hook(&mut self, hook: StepHook);
    /// Exposes a host function to the guest program.
    fn register_builtin(&mut self, name: &str, f: BuiltinFn);
    /// Interprets `source`, returning its completion value.
    fn run(&mut self, source: &str) -> Result<Value, EngineError>;
}

impl IsolatedContext for Engine {
    fn set_step_hook(&mut self, hook: StepHook) {
        Engine::set_step_hook(self, hook);
    }

    fn register_builtin(&mut self, name: &str, f: BuiltinFn) {
        Engine::register_builtin(self, name, f);
    }

    fn run(&mut self, source: &str) -> Result<Value, EngineError> {
        Engine::run(self, source)
    }
}

/// Produces one brand-new [`IsolatedContext`] per execution.
pub trait ContextFactory: Send + Sync {
    fn create(&self) -> Box<dyn IsolatedContext>;
}

/// The default factory: fresh `script-engine` instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineContextFactory;

impl ContextFactory for EngineContextFactory {
    fn create(&self) -> Box<dyn IsolatedContext> {
        Box::new(Engine::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_produces_independent_contexts() {
        let factory = EngineContextFactory;
        let mut first = factory.create();
        let mut second = factory.create();
        first.run("let x = 1").unwrap();
        assert!(second.run("x").is_err());
    }
}
