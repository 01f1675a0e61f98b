//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prompt2learn_core::domain::{Course, Lesson, StudyPlan, User, UserCredentials};
use prompt2learn_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;

/// Migrations embedded at compile time from `services/api/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        MIGRATOR.run(&self.pool).await
    }
}

/// Classifies a `sqlx` error into the port's error kinds.
fn map_sqlx_error(err: sqlx::Error) -> PortError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            PortError::Conflict(db_err.message().to_string())
        }
        // SQLSTATE class 23 covers every integrity constraint violation.
        sqlx::Error::Database(db_err)
            if db_err.is_foreign_key_violation()
                || db_err.code().is_some_and(|code| code.starts_with("23")) =>
        {
            PortError::ConstraintViolation(db_err.message().to_string())
        }
        _ => PortError::Unexpected(err.to_string()),
    }
}

fn not_found_or(err: sqlx::Error, what: String) -> PortError {
    match err {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        other => map_sqlx_error(other),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    password_hash: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
        }
    }

    fn to_credentials(self) -> UserCredentials {
        UserCredentials {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct CourseRecord {
    id: i64,
    user_id: i64,
    prompt: String,
    title: String,
    created_at: DateTime<Utc>,
}
impl CourseRecord {
    fn to_domain(self) -> Course {
        Course {
            id: self.id,
            user_id: self.user_id,
            prompt: self.prompt,
            title: self.title,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct LessonRecord {
    id: i64,
    course_id: i64,
    day_index: i32,
    day_title: String,
    lesson_index: i32,
    lesson_title: String,
    lesson_description: String,
}
impl LessonRecord {
    fn to_domain(self) -> Lesson {
        Lesson {
            id: self.id,
            course_id: self.course_id,
            day_index: self.day_index,
            day_title: self.day_title,
            lesson_index: self.lesson_index,
            lesson_title: self.lesson_title,
            lesson_description: self.lesson_description,
        }
    }
}

const COURSE_COLUMNS: &str = "id, user_id, prompt, title, created_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, username: &str, password_hash: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) \
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: i64) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or(e, format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or(e, format!("User {} not found", username)))?;
        Ok(record.to_credentials())
    }

    async fn persist_plan(
        &self,
        user_id: i64,
        prompt: &str,
        plan: &StudyPlan,
    ) -> PortResult<Course> {
        // Dropping `tx` on any early return rolls the whole write back.
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let course = sqlx::query_as::<_, CourseRecord>(&format!(
            "INSERT INTO courses (user_id, prompt, title) VALUES ($1, $2, $3) \
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(prompt)
        .bind(&plan.course_title)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let rows = plan.lesson_rows();
        if !rows.is_empty() {
            let mut insert = QueryBuilder::<Postgres>::new(
                "INSERT INTO lessons \
                 (course_id, day_index, day_title, lesson_index, lesson_title, lesson_description) ",
            );
            insert.push_values(&rows, |mut b, row| {
                b.push_bind(course.id)
                    .push_bind(row.day_index)
                    .push_bind(&row.day_title)
                    .push_bind(row.lesson_index)
                    .push_bind(&row.lesson_title)
                    .push_bind(&row.lesson_description);
            });
            insert
                .build()
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(course_id = course.id, lessons = rows.len(), "Committed course");
        Ok(course.to_domain())
    }

    async fn list_courses(&self, user_id: i64) -> PortResult<Vec<Course>> {
        let records = sqlx::query_as::<_, CourseRecord>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_course(&self, course_id: i64) -> PortResult<Course> {
        let record = sqlx::query_as::<_, CourseRecord>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or(e, format!("Course {} not found", course_id)))?;
        Ok(record.to_domain())
    }

    async fn get_lessons_for_course(&self, course_id: i64) -> PortResult<Vec<Lesson>> {
        let records = sqlx::query_as::<_, LessonRecord>(
            "SELECT id, course_id, day_index, day_title, lesson_index, lesson_title, lesson_description \
             FROM lessons WHERE course_id = $1 \
             ORDER BY day_index ASC, lesson_index ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_course(&self, course_id: i64) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM lessons WHERE course_id = $1")
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let deleted = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        if deleted.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Course {} not found", course_id)));
        }
        Ok(())
    }
}
