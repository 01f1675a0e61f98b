//! crates/prompt2learn_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use crate::domain::{Course, Lesson, StudyPlan, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Any other integrity constraint (foreign key, not-null, check) rejected the write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user(&self, username: &str, password_hash: &str) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: i64) -> PortResult<User>;

    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials>;

    // --- Course Management ---

    /// Stores the course row and every lesson row of `plan` as one atomic unit.
    ///
    /// Either the course and all of its lessons become visible, or nothing does.
    async fn persist_plan(
        &self,
        user_id: i64,
        prompt: &str,
        plan: &StudyPlan,
    ) -> PortResult<Course>;

    /// Lists a user's courses, newest first.
    async fn list_courses(&self, user_id: i64) -> PortResult<Vec<Course>>;

    async fn get_course(&self, course_id: i64) -> PortResult<Course>;

    /// Returns lesson rows ordered by `(day_index, lesson_index)`.
    async fn get_lessons_for_course(&self, course_id: i64) -> PortResult<Vec<Lesson>>;

    async fn delete_course(&self, course_id: i64) -> PortResult<()>;
}

#[async_trait]
pub trait PlanGenerationService: Send + Sync {
    /// Runs one completion and returns the model's raw text.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> PortResult<String>;
}
