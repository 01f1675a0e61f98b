//! In-memory implementations of the core ports.
//!
//! [`InMemoryDb`] stages every write of `persist_plan` and only publishes it
//! once all rows are built, so a failure injected between the course row and
//! the lesson rows leaves nothing behind, like a rolled back transaction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use prompt2learn_core::{
    Course, DatabaseService, Lesson, PlanGenerationService, PortError, PortResult, StudyPlan,
    User, UserCredentials,
};

#[derive(Default)]
struct Store {
    users: Vec<UserCredentials>,
    courses: Vec<Course>,
    lessons: Vec<Lesson>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A [`DatabaseService`] backed by vectors behind a mutex.
#[derive(Default)]
pub struct InMemoryDb {
    store: Mutex<Store>,
    fail_lesson_inserts: AtomicBool,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `persist_plan` fail after its course row is staged.
    pub fn fail_lesson_inserts(&self, fail: bool) {
        self.fail_lesson_inserts.store(fail, Ordering::SeqCst);
    }

    /// Inserts a user directly, bypassing password hashing.
    pub fn seed_user(&self, username: &str) -> User {
        let mut store = self.lock();
        let id = store.next_id();
        store.users.push(UserCredentials {
            id,
            username: username.to_string(),
            password_hash: "not-a-hash".to_string(),
        });
        User {
            id,
            username: username.to_string(),
        }
    }

    pub fn course_count(&self) -> usize {
        self.lock().courses.len()
    }

    pub fn lesson_count(&self) -> usize {
        self.lock().lessons.len()
    }

    /// Raw lesson rows of a course in insertion order.
    pub fn lesson_rows(&self, course_id: i64) -> Vec<Lesson> {
        self.lock()
            .lessons
            .iter()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user(&self, username: &str, password_hash: &str) -> PortResult<User> {
        let mut store = self.lock();
        if store.users.iter().any(|u| u.username == username) {
            return Err(PortError::Conflict(format!("username {username} already exists")));
        }
        let id = store.next_id();
        store.users.push(UserCredentials {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        });
        Ok(User {
            id,
            username: username.to_string(),
        })
    }

    async fn get_user_by_id(&self, user_id: i64) -> PortResult<User> {
        self.lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| User {
                id: u.id,
                username: u.username.clone(),
            })
            .ok_or_else(|| PortError::NotFound(format!("User {user_id} not found")))
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        self.lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {username} not found")))
    }

    async fn persist_plan(
        &self,
        user_id: i64,
        prompt: &str,
        plan: &StudyPlan,
    ) -> PortResult<Course> {
        let mut store = self.lock();
        if !store.users.iter().any(|u| u.id == user_id) {
            return Err(PortError::ConstraintViolation(format!(
                "courses.user_id {user_id} references no user"
            )));
        }

        let saved_next_id = store.next_id;
        let course = Course {
            id: store.next_id(),
            user_id,
            prompt: prompt.to_string(),
            title: plan.course_title.clone(),
            created_at: Utc::now(),
        };

        if self.fail_lesson_inserts.load(Ordering::SeqCst) {
            store.next_id = saved_next_id;
            return Err(PortError::Unexpected("injected lesson insert failure".to_string()));
        }

        let mut staged = Vec::new();
        for row in plan.lesson_rows() {
            staged.push(Lesson {
                id: store.next_id(),
                course_id: course.id,
                day_index: row.day_index,
                day_title: row.day_title,
                lesson_index: row.lesson_index,
                lesson_title: row.lesson_title,
                lesson_description: row.lesson_description,
            });
        }

        store.courses.push(course.clone());
        store.lessons.extend(staged);
        Ok(course)
    }

    async fn list_courses(&self, user_id: i64) -> PortResult<Vec<Course>> {
        let mut courses: Vec<Course> = self
            .lock()
            .courses
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(courses)
    }

    async fn get_course(&self, course_id: i64) -> PortResult<Course> {
        self.lock()
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Course {course_id} not found")))
    }

    async fn get_lessons_for_course(&self, course_id: i64) -> PortResult<Vec<Lesson>> {
        let mut lessons = self.lesson_rows(course_id);
        lessons.sort_by_key(|l| (l.day_index, l.lesson_index));
        Ok(lessons)
    }

    async fn delete_course(&self, course_id: i64) -> PortResult<()> {
        let mut store = self.lock();
        store.lessons.retain(|l| l.course_id != course_id);
        let before = store.courses.len();
        store.courses.retain(|c| c.id != course_id);
        if store.courses.len() == before {
            return Err(PortError::NotFound(format!("Course {course_id} not found")));
        }
        Ok(())
    }
}

/// A [`PlanGenerationService`] that replays a canned answer and records prompts.
pub struct ScriptedModel {
    response: Result<String, String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    /// Always answers with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fails as if the endpoint were unreachable.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The `(system_prompt, user_prompt)` pairs received so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl PlanGenerationService for ScriptedModel {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> PortResult<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((system_prompt.to_string(), user_prompt.to_string()));
        self.response.clone().map_err(PortError::Unexpected)
    }
}
