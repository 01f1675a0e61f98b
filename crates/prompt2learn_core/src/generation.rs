//! crates/prompt2learn_core/src/generation.rs
//!
//! End-to-end handling of one plan generation request: check the owner,
//! call the model once, recover and validate its output, then persist the
//! plan in a single storage transaction.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::GeneratedCourse;
use crate::error::CourseError;
use crate::ports::{DatabaseService, PlanGenerationService, PortError};
use crate::prompt::{build_user_prompt, SYSTEM_INSTRUCTIONS};
use crate::recovery::recover_plan_value;
use crate::validator::{validate_plan, ValidationPolicy};

/// Coordinates plan generation. Holds its collaborators explicitly.
#[derive(Clone)]
pub struct CourseGenerator {
    db: Arc<dyn DatabaseService>,
    model: Arc<dyn PlanGenerationService>,
    policy: ValidationPolicy,
}

impl CourseGenerator {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        model: Arc<dyn PlanGenerationService>,
        policy: ValidationPolicy,
    ) -> Self {
        Self { db, model, policy }
    }

    /// Generates and stores a study plan for `user_id`.
    ///
    /// Nothing is written unless the model output recovers and validates.
    /// There is no retry: a failed or malformed model call is reported as is.
    pub async fn generate(&self, user_id: i64, prompt: &str) -> Result<GeneratedCourse, CourseError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(CourseError::EmptyPrompt);
        }

        match self.db.get_user_by_id(user_id).await {
            Ok(_) => {}
            Err(PortError::NotFound(_)) => return Err(CourseError::UnknownUser(user_id)),
            Err(e) => return Err(CourseError::PersistenceFailure(e.to_string())),
        }

        let raw = self
            .model
            .generate(SYSTEM_INSTRUCTIONS, &build_user_prompt(prompt))
            .await
            .map_err(|e| CourseError::UpstreamFailure(e.to_string()))?;
        info!(user_id, response_len = raw.len(), "Received plan from model");

        let value = recover_plan_value(&raw).map_err(|e| {
            warn!(user_id, error = %e, "Model response held no recoverable plan");
            CourseError::from(e)
        })?;
        let plan = validate_plan(&value, &self.policy).map_err(|e| {
            warn!(user_id, error = %e, "Model plan failed validation");
            CourseError::from(e)
        })?;

        let course = self
            .db
            .persist_plan(user_id, prompt, &plan)
            .await
            .map_err(CourseError::from_storage)?;
        info!(
            user_id,
            course_id = course.id,
            days = plan.days.len(),
            lessons = plan.lesson_count(),
            "Stored generated course"
        );

        Ok(GeneratedCourse {
            course_id: course.id,
            title: course.title,
            days: plan.days,
        })
    }
}
