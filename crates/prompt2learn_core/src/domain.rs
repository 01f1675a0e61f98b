//! crates/prompt2learn_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! Stored entities are independent of any database driver; the plan types
//! double as the JSON shape exchanged with the generation model and callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
}

// Only used internally for login/registration - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// A stored course: the prompt a user submitted and the title of the plan
/// generated for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: i64,
    pub user_id: i64,
    pub prompt: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// A stored lesson row. The day title is copied onto every lesson of the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    pub day_index: i32,
    pub day_title: String,
    pub lesson_index: i32,
    pub lesson_title: String,
    pub lesson_description: String,
}

/// A lesson row ready to be inserted, before storage assigns ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLesson {
    pub day_index: i32,
    pub day_title: String,
    pub lesson_index: i32,
    pub lesson_title: String,
    pub lesson_description: String,
}

//=========================================================================================
// Study Plan (normalized)
//=========================================================================================

/// A normalized study plan, as produced by the validator and read back by
/// the course reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub course_title: String,
    pub days: Vec<PlanDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDay {
    pub day_index: i32,
    pub day_title: String,
    pub lessons: Vec<PlanLesson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLesson {
    pub title: String,
    pub description: String,
}

impl StudyPlan {
    /// Total number of lessons across all days.
    pub fn lesson_count(&self) -> usize {
        self.days.iter().map(|d| d.lessons.len()).sum()
    }

    /// Flattens the plan into insertable lesson rows.
    ///
    /// Rows follow the plan's day order, then lesson order. `lesson_index` is
    /// the lesson's 1-based position within its day.
    pub fn lesson_rows(&self) -> Vec<NewLesson> {
        let mut rows = Vec::with_capacity(self.lesson_count());
        for day in &self.days {
            for (position, lesson) in day.lessons.iter().enumerate() {
                rows.push(NewLesson {
                    day_index: day.day_index,
                    day_title: day.day_title.clone(),
                    lesson_index: position as i32 + 1,
                    lesson_title: lesson.title.clone(),
                    lesson_description: lesson.description.clone(),
                });
            }
        }
        rows
    }
}

/// The result of a successful generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCourse {
    pub course_id: i64,
    pub title: String,
    pub days: Vec<PlanDay>,
}

/// A stored course merged with its reconstructed days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetail {
    pub course: Course,
    pub days: Vec<PlanDay>,
}
