//! crates/prompt2learn_core/src/reader.rs
//!
//! Read side of the course store: rebuilds the nested day/lesson shape from
//! flat lesson rows.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::domain::{Course, CourseDetail, Lesson, PlanDay, PlanLesson};
use crate::error::CourseError;
use crate::ports::{DatabaseService, PortError};

#[derive(Clone)]
pub struct CourseReader {
    db: Arc<dyn DatabaseService>,
}

impl CourseReader {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Loads a course and its days, sorted by day index then lesson index.
    pub async fn get_course(&self, course_id: i64) -> Result<CourseDetail, CourseError> {
        let course = self
            .db
            .get_course(course_id)
            .await
            .map_err(|e| not_found_or_storage(e, course_id))?;
        let lessons = self
            .db
            .get_lessons_for_course(course_id)
            .await
            .map_err(CourseError::from_storage)?;

        Ok(CourseDetail {
            course,
            days: assemble_days(lessons),
        })
    }

    pub async fn list_courses(&self, user_id: i64) -> Result<Vec<Course>, CourseError> {
        self.db
            .list_courses(user_id)
            .await
            .map_err(CourseError::from_storage)
    }

    /// Removes a course together with all of its lessons.
    pub async fn delete_course(&self, course_id: i64) -> Result<(), CourseError> {
        self.db
            .delete_course(course_id)
            .await
            .map_err(|e| not_found_or_storage(e, course_id))?;
        info!(course_id, "Deleted course");
        Ok(())
    }
}

/// Groups lesson rows into days.
///
/// Grouping is by `day_index` equality, so the input order does not matter;
/// days come out ascending by index and lessons ascending by lesson index.
pub fn assemble_days(lessons: Vec<Lesson>) -> Vec<PlanDay> {
    let mut by_day: BTreeMap<i32, (String, Vec<Lesson>)> = BTreeMap::new();
    for lesson in lessons {
        by_day
            .entry(lesson.day_index)
            .or_insert_with(|| (lesson.day_title.clone(), Vec::new()))
            .1
            .push(lesson);
    }

    by_day
        .into_iter()
        .map(|(day_index, (day_title, mut rows))| {
            rows.sort_by_key(|l| l.lesson_index);
            PlanDay {
                day_index,
                day_title,
                lessons: rows
                    .into_iter()
                    .map(|l| PlanLesson {
                        title: l.lesson_title,
                        description: l.lesson_description,
                    })
                    .collect(),
            }
        })
        .collect()
}

fn not_found_or_storage(err: PortError, course_id: i64) -> CourseError {
    match err {
        PortError::NotFound(_) => CourseError::CourseNotFound(course_id),
        other => CourseError::from_storage(other),
    }
}
