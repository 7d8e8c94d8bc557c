//! Segmented submissions.
//!
//! A submission alternates fixed scaffolding written by the exercise author
//! with editable regions written by the learner: segments at even indices
//! are immutable, odd indices are the only mutable surface. The effective
//! program text is the in-order concatenation of all segments.

use crate::error::GraderError;

/// A learner submission as an ordered sequence of segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    segments: Vec<String>,
}

impl Submission {
    /// Creates a submission. At least two segments are required: one for the
    /// author's setup and one for the learner's code.
    pub fn new(segments: Vec<String>) -> Result<Self, GraderError> {
        if segments.len() < 2 {
            return Err(GraderError::InvalidSubmission(format!(
                "expected at least 2 segments, got {}",
                segments.len()
            )));
        }
        Ok(Self { segments })
    }

    /// The effective program text: all segments concatenated in order.
    pub fn source(&self) -> String {
        self.segments.concat()
    }

    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Replaces an editable segment. Even indices are author-owned and
    /// read-only.
    pub fn set_segment(&mut self, index: usize, text: String) -> Result<(), GraderError> {
        if index % 2 == 0 {
            return Err(GraderError::ReadOnlySegment(index));
        }
        let Some(segment) = self.segments.get_mut(index) else {
            return Err(GraderError::InvalidSubmission(format!(
                "segment index {index} out of range"
            )));
        };
        *segment = text;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_requires_two_segments() {
        assert!(Submission::new(segments(&["only one"])).is_err());
        assert!(Submission::new(segments(&["a", "b"])).is_ok());
    }

    #[test]
    fn test_source_concatenates_in_order() {
        let submission = Submission::new(segments(&["let x = 2\n", "x + 1"])).unwrap();
        assert_eq!(submission.source(), "let x = 2\nx + 1");
    }

    #[test]
    fn test_set_editable_segment() {
        let mut submission = Submission::new(segments(&["let x = 2\n", ""])).unwrap();
        submission.set_segment(1, "x * 10".to_string()).unwrap();
        assert_eq!(submission.source(), "let x = 2\nx * 10");
    }

    #[test]
    fn test_set_fixed_segment_is_rejected() {
        let mut submission = Submission::new(segments(&["fixed", "editable"])).unwrap();
        let err = submission.set_segment(0, "hacked".to_string()).unwrap_err();
        assert_eq!(err, GraderError::ReadOnlySegment(0));
        assert_eq!(submission.segment(0), Some("fixed"));
    }

    #[test]
    fn test_set_out_of_range_segment() {
        let mut submission = Submission::new(segments(&["a", "b"])).unwrap();
        assert!(submission.set_segment(3, "c".to_string()).is_err());
    }
}
