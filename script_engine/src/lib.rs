//! # Script Engine
//!
//! A small tree-walking interpreter for a JavaScript-flavoured scripting
//! language, used as the isolated execution substrate for grading learner
//! submissions. One [`Engine`] is one fully isolated context: it owns its
//! variables, its registered builtin functions and its step hook, and shares
//! nothing with any other instance.
//!
//! The host integrates through two registration points:
//! - [`Engine::set_step_hook`]: a callback invoked on every unit of
//!   evaluation work, which may abort the run (used for step budgets).
//! - [`Engine::register_builtin`]: host functions exposed to the guest
//!   program (used for input provision and result serialization).
//!
//! The language covers literals (numbers, strings, booleans, null, arrays,
//! objects), `let` declarations, assignment, `if`/`else`, `while`, the usual
//! arithmetic/comparison/logical operators, indexing, and calls to
//! registered builtins. Statements are separated by `;` or line breaks and
//! `//` starts a line comment. A program's result is the value of its last
//! evaluated statement.

pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod value;

pub use error::{EngineError, HookAbort, HostFault};
pub use interpreter::{BuiltinFn, Engine, StepHook};
pub use value::Value;
