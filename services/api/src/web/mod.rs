pub mod auth;
pub mod extract;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use auth::{login_handler, register_handler};
pub use rest::{
    delete_course_handler, generate_course_handler, get_course_handler, list_courses_handler,
};
pub use state::AppState;

/// Builds the API routes. Cross-cutting layers (CORS, tracing) are added by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/courses/generate", post(generate_course_handler))
        .route("/api/courses", get(list_courses_handler))
        .route(
            "/api/courses/{course_id}",
            get(get_course_handler).delete(delete_course_handler),
        )
        .with_state(state)
}
