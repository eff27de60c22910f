//! Error types for the booking flow core.

use std::fmt;

/// A validation failure on a single answer field.
///
/// `field` carries the wire-format key (e.g. `"email"`, `"guestCount"`) so a
/// host UI can attach the message to the offending input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// One or more field-level validation failures for a single step.
///
/// Validation errors are local to the step that produced them. They block
/// progression until corrected and never cross component boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(FieldError::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors from the booking submission service.
///
/// A `Rejected` message comes from the server and is shown to the user
/// verbatim on the review screen. Submission errors never mutate session
/// state; retry is a manual user action.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("booking service unreachable: {0}")]
    Network(String),

    #[error("{message}")]
    Rejected { message: String },

    #[error("invalid response from booking service: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by the flow orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("invalid answer: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("input is not accepted in the current flow state")]
    NotAcceptingInput,

    #[error("no interstitial is active")]
    NoInterstitial,

    #[error("booking can only be submitted from the review step")]
    NotAtReview,

    #[error("booking is already completed")]
    AlreadyCompleted,

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_display_joins_fields() {
        let errs = ValidationErrors(vec![
            FieldError::new("name", "is required"),
            FieldError::new("email", "does not look like an email address"),
        ]);
        let shown = errs.to_string();
        assert!(shown.contains("name: is required"));
        assert!(shown.contains("; email:"));
    }

    #[test]
    fn rejected_message_is_verbatim() {
        let err = SubmissionError::Rejected {
            message: "That date is no longer available".to_string(),
        };
        assert_eq!(err.to_string(), "That date is no longer available");
    }

    #[test]
    fn flow_error_wraps_validation() {
        let err: FlowError = ValidationErrors::single("phone", "too short").into();
        assert!(matches!(err, FlowError::Invalid(ref v) if v.len() == 1));
    }
}
