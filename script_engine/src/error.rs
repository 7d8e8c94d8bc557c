//! Engine error types.
//!
//! [`EngineError`] is the single error surface of [`crate::Engine::run`].
//! Host-originated conditions keep their identity: a step-hook abort becomes
//! [`EngineError::HookAbort`] and a builtin's [`HostFault`] becomes
//! [`EngineError::Host`] with its kind and message preserved verbatim, so the
//! embedding layer can map them back onto its own fault taxonomy.

use std::fmt;

/// Signal returned by a step hook to abort the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookAbort;

/// A fault raised by a host-registered builtin function.
///
/// The `kind` is an opaque discriminator owned by the host; the engine
/// propagates it without interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFault {
    pub kind: String,
    pub message: String,
}

impl HostFault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Represents all error types that can terminate a script run.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The source text failed to tokenize or parse.
    Syntax(String),
    /// The guest program raised an error during evaluation.
    Runtime(String),
    /// The step hook aborted the run.
    HookAbort,
    /// A host builtin raised a fault; kind and message are host-defined.
    Host { kind: String, message: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Syntax(msg) => write!(f, "syntax error: {msg}"),
            EngineError::Runtime(msg) => write!(f, "runtime error: {msg}"),
            EngineError::HookAbort => write!(f, "execution aborted by step hook"),
            EngineError::Host { kind, message } => write!(f, "host fault ({kind}): {message}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<HostFault> for EngineError {
    fn from(fault: HostFault) -> Self {
        EngineError::Host {
            kind: fault.kind,
            message: fault.message,
        }
    }
}
