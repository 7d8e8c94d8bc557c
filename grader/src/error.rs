//! Grader Error Types
//!
//! This module defines [`GraderError`], the configuration-tier error enum.
//! These are caller errors raised at the point of misuse, distinct from the
//! grading faults in `sandbox::outcome::Fault`, which are always returned as
//! data: a learner's broken program can never produce a `GraderError`.

use std::fmt;

/// Represents all caller/configuration errors in the grading system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraderError {
    /// The step budget is not a positive integer.
    InvalidBudget(u64),
    /// The execution configuration failed validation.
    InvalidConfiguration(String),
    /// The submission's segment structure is invalid.
    InvalidSubmission(String),
    /// The number of input sets and expected answers differ.
    CaseCountMismatch { inputs: usize, answers: usize },
    /// An exercise identifier is not a valid UUID.
    InvalidIdentifier(String),
    /// An exercise identifier was registered twice.
    DuplicateIdentifier(String),
    /// An exercise lookup failed.
    ExerciseNotFound(String),
    /// An attempt to mutate a fixed (author-provided) segment.
    ReadOnlySegment(usize),
}

impl fmt::Display for GraderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraderError::InvalidBudget(budget) => {
                write!(f, "step budget must be greater than 0, got {budget}")
            }
            GraderError::InvalidConfiguration(msg) => {
                write!(f, "invalid execution configuration: {msg}")
            }
            GraderError::InvalidSubmission(msg) => write!(f, "invalid submission: {msg}"),
            GraderError::CaseCountMismatch { inputs, answers } => write!(
                f,
                "exercise must have the same number of input sets ({inputs}) and answers ({answers})"
            ),
            GraderError::InvalidIdentifier(id) => {
                write!(f, "exercise identifier is not a valid UUID: {id}")
            }
            GraderError::DuplicateIdentifier(id) => {
                write!(f, "exercise identifier already registered: {id}")
            }
            GraderError::ExerciseNotFound(id) => write!(f, "exercise not found: {id}"),
            GraderError::ReadOnlySegment(index) => {
                write!(f, "cannot set read-only segment at index {index}")
            }
        }
    }
}

impl std::error::Error for GraderError {}
