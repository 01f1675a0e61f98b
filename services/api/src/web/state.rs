//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use prompt2learn_core::{
    CourseGenerator, CourseReader, DatabaseService, PlanGenerationService, ValidationPolicy,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub generator: CourseGenerator,
    pub reader: CourseReader,
}

impl AppState {
    /// Wires the core services to the given storage and model adapters.
    pub fn new(
        db: Arc<dyn DatabaseService>,
        model: Arc<dyn PlanGenerationService>,
        policy: ValidationPolicy,
    ) -> Self {
        Self {
            generator: CourseGenerator::new(db.clone(), model, policy),
            reader: CourseReader::new(db.clone()),
            db,
        }
    }
}
