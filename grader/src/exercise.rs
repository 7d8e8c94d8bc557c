//! Exercise metadata and validation.
//!
//! An exercise pairs a segmented submission scaffold with its hidden test
//! cases. Construction validates everything a caller can get wrong (the
//! identifier, the segment structure, the input/answer pairing) and
//! registers the identifier, so a constructed exercise is always gradable.

use uuid::Uuid;

use util::execution_config::ExecutionConfig;

use crate::GradingJob;
use crate::error::GraderError;
use crate::registry::ExerciseRegistry;
use crate::report::GradingReport;
use crate::submission::Submission;
use crate::types::TestCase;

/// One gradable exercise.
#[derive(Debug)]
pub struct Exercise {
    id: Uuid,
    title: String,
    submission: Submission,
    test_cases: Vec<TestCase>,
}

impl Exercise {
    /// Creates and registers an exercise.
    ///
    /// # Errors
    /// - `InvalidIdentifier` if `id` is not a UUID.
    /// - `InvalidSubmission` if fewer than two segments are given.
    /// - `CaseCountMismatch` if `inputs` and `answers` differ in length.
    /// - `DuplicateIdentifier` if `id` is already in `registry`.
    pub fn new(
        registry: &mut ExerciseRegistry,
        id: &str,
        title: impl Into<String>,
        segments: Vec<String>,
        inputs: Vec<Vec<String>>,
        answers: Vec<serde_json::Value>,
    ) -> Result<Self, GraderError> {
        let id = Uuid::parse_str(id).map_err(|_| GraderError::InvalidIdentifier(id.to_string()))?;
        let submission = Submission::new(segments)?;
        if inputs.len() != answers.len() {
            return Err(GraderError::CaseCountMismatch {
                inputs: inputs.len(),
                answers: answers.len(),
            });
        }
        registry.register(id)?;

        let test_cases = inputs
            .into_iter()
            .zip(answers)
            .map(|(inputs, expected)| TestCase::new(inputs, expected))
            .collect();

        Ok(Self {
            id,
            title: title.into(),
            submission,
            test_cases,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn submission_mut(&mut self) -> &mut Submission {
        &mut self.submission
    }

    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    /// Grades the current state of the submission against all test cases.
    pub async fn grade(&self, config: ExecutionConfig) -> Result<GradingReport, GraderError> {
        GradingJob::new(self.submission.source(), self.test_cases.to_vec(), config)
            .grade()
            .await
    }
}
