//! crates/prompt2learn_core/src/error.rs
//!
//! Error types for the plan pipeline and the course services.

use crate::ports::PortError;

/// Failures of the pure pipeline stages (recovery and validation).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// No parseable JSON object could be recovered from the model's text.
    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),
    /// A JSON object was recovered but it does not describe a usable plan.
    #[error("Invalid plan shape: {0}")]
    InvalidPlanShape(String),
}

/// The coarse category of a failure, used by callers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidInput,
    NotFound,
    /// The model answered, but not with a usable plan.
    BadUpstream,
    /// The model could not be reached.
    UpstreamUnavailable,
    StorageFailure,
}

/// Errors surfaced by [`crate::CourseGenerator`] and [`crate::CourseReader`].
#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,
    #[error("User {0} not found")]
    UnknownUser(i64),
    #[error("Plan generation request failed: {0}")]
    UpstreamFailure(String),
    /// Covers both model refusals and malformed output; the two cannot be told apart.
    #[error("Plan generation was rejected: {0}")]
    GenerationRejected(String),
    #[error("Invalid plan structure from model: {0}")]
    InvalidPlanShape(String),
    #[error("Storage constraint violated: {0}")]
    PersistenceConstraintViolation(String),
    #[error("Storage failure: {0}")]
    PersistenceFailure(String),
    #[error("Course {0} not found")]
    CourseNotFound(i64),
}

impl CourseError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CourseError::EmptyPrompt => ErrorClass::InvalidInput,
            CourseError::UnknownUser(_) | CourseError::CourseNotFound(_) => ErrorClass::NotFound,
            CourseError::UpstreamFailure(_) => ErrorClass::UpstreamUnavailable,
            CourseError::GenerationRejected(_) | CourseError::InvalidPlanShape(_) => {
                ErrorClass::BadUpstream
            }
            CourseError::PersistenceConstraintViolation(_) | CourseError::PersistenceFailure(_) => {
                ErrorClass::StorageFailure
            }
        }
    }

    /// Maps a storage port error that is not a "not found" into the persistence variants.
    pub(crate) fn from_storage(err: PortError) -> Self {
        match err {
            PortError::Conflict(msg) | PortError::ConstraintViolation(msg) => {
                CourseError::PersistenceConstraintViolation(msg)
            }
            other => CourseError::PersistenceFailure(other.to_string()),
        }
    }
}

impl From<PlanError> for CourseError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::MalformedModelOutput(msg) => CourseError::GenerationRejected(msg),
            PlanError::InvalidPlanShape(msg) => CourseError::InvalidPlanShape(msg),
        }
    }
}
