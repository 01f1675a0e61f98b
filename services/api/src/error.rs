//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! variant is rendered as an HTTP response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;
use prompt2learn_core::{CourseError, ErrorClass, PortError};

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A failure reported by the course generator or reader.
    #[error("{0}")]
    Course(#[from] CourseError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request was missing a field or carried a malformed one.
    #[error("{0}")]
    BadRequest(String),

    /// An axum extractor refused the request body or a parameter.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Course(e) => match e.class() {
                ErrorClass::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorClass::NotFound => StatusCode::NOT_FOUND,
                ErrorClass::BadUpstream => StatusCode::BAD_GATEWAY,
                ErrorClass::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorClass::StorageFailure => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Port(PortError::Conflict(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {}", self);
            match &self {
                ApiError::Course(e) => e.to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_errors_map_to_distinct_statuses() {
        let cases = [
            (CourseError::EmptyPrompt, StatusCode::BAD_REQUEST),
            (CourseError::UnknownUser(1), StatusCode::NOT_FOUND),
            (CourseError::CourseNotFound(1), StatusCode::NOT_FOUND),
            (CourseError::GenerationRejected("x".into()), StatusCode::BAD_GATEWAY),
            (CourseError::InvalidPlanShape("x".into()), StatusCode::BAD_GATEWAY),
            (CourseError::UpstreamFailure("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (
                CourseError::PersistenceConstraintViolation("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (CourseError::PersistenceFailure("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn boundary_errors_map_to_client_statuses() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        let rejected = ApiError::Rejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "bad field".into(),
        };
        assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(rejected.to_string(), "bad field");
        assert_eq!(
            ApiError::Port(PortError::Unexpected("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
