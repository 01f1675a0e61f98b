//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the course endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::auth::{self, AuthResponse, CredentialsRequest};
use crate::web::extract::{JsonBody, PathParam, QueryParams};
use crate::web::state::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use prompt2learn_core::{Course, CourseDetail, GeneratedCourse, PlanDay, PlanLesson};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        generate_course_handler,
        list_courses_handler,
        get_course_handler,
        delete_course_handler,
    ),
    components(
        schemas(
            CredentialsRequest,
            AuthResponse,
            GenerateCourseRequest,
            GeneratedCourseResponse,
            CourseSummaryResponse,
            CourseDetailResponse,
            DayResponse,
            LessonResponse,
            DeleteCourseResponse,
        )
    ),
    tags(
        (name = "Prompt2Learn API", description = "Generate, browse and delete AI-written study plans.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCourseRequest {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListCoursesQuery {
    /// Owner of the courses to list.
    pub user_id: Option<i64>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LessonResponse {
    pub title: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayResponse {
    pub day_index: i32,
    pub day_title: String,
    pub lessons: Vec<LessonResponse>,
}

/// The response payload sent after a plan was generated and stored.
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCourseResponse {
    pub course_id: i64,
    pub title: String,
    pub days: Vec<DayResponse>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummaryResponse {
    pub id: i64,
    pub title: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailResponse {
    pub id: i64,
    pub title: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub days: Vec<DayResponse>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DeleteCourseResponse {
    pub deleted: bool,
}

impl From<PlanLesson> for LessonResponse {
    fn from(lesson: PlanLesson) -> Self {
        Self {
            title: lesson.title,
            description: lesson.description,
        }
    }
}

impl From<PlanDay> for DayResponse {
    fn from(day: PlanDay) -> Self {
        Self {
            day_index: day.day_index,
            day_title: day.day_title,
            lessons: day.lessons.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<GeneratedCourse> for GeneratedCourseResponse {
    fn from(generated: GeneratedCourse) -> Self {
        Self {
            course_id: generated.course_id,
            title: generated.title,
            days: generated.days.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Course> for CourseSummaryResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            prompt: course.prompt,
            created_at: course.created_at,
        }
    }
}

impl From<CourseDetail> for CourseDetailResponse {
    fn from(detail: CourseDetail) -> Self {
        Self {
            id: detail.course.id,
            title: detail.course.title,
            prompt: detail.course.prompt,
            created_at: detail.course.created_at,
            days: detail.days.into_iter().map(Into::into).collect(),
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate a study plan for a user from a free-text learning goal.
#[utoipa::path(
    post,
    path = "/api/courses/generate",
    request_body = GenerateCourseRequest,
    responses(
        (status = 200, description = "Plan generated and stored", body = GeneratedCourseResponse),
        (status = 400, description = "Missing userId or prompt"),
        (status = 404, description = "User not found"),
        (status = 502, description = "The model refused or returned an unusable plan"),
        (status = 503, description = "The model could not be reached"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn generate_course_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<GenerateCourseRequest>,
) -> Result<Json<GeneratedCourseResponse>, ApiError> {
    let (user_id, prompt) = match (req.user_id, req.prompt) {
        (Some(user_id), Some(prompt)) => (user_id, prompt),
        _ => {
            return Err(ApiError::BadRequest(
                "userId and prompt required".to_string(),
            ))
        }
    };

    let generated = state.generator.generate(user_id, &prompt).await?;
    Ok(Json(generated.into()))
}

/// List a user's courses, newest first.
#[utoipa::path(
    get,
    path = "/api/courses",
    params(ListCoursesQuery),
    responses(
        (status = 200, description = "The user's courses", body = [CourseSummaryResponse]),
        (status = 400, description = "Missing userId")
    )
)]
pub async fn list_courses_handler(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<ListCoursesQuery>,
) -> Result<Json<Vec<CourseSummaryResponse>>, ApiError> {
    let user_id = query
        .user_id
        .ok_or_else(|| ApiError::BadRequest("userId query required".to_string()))?;

    let courses = state.reader.list_courses(user_id).await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

/// Fetch one course with its days and lessons.
#[utoipa::path(
    get,
    path = "/api/courses/{courseId}",
    params(("courseId" = i64, Path, description = "The course id.")),
    responses(
        (status = 200, description = "The course", body = CourseDetailResponse),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course_handler(
    State(state): State<Arc<AppState>>,
    PathParam(course_id): PathParam<i64>,
) -> Result<Json<CourseDetailResponse>, ApiError> {
    let detail = state.reader.get_course(course_id).await?;
    Ok(Json(detail.into()))
}

/// Delete a course and all of its lessons.
#[utoipa::path(
    delete,
    path = "/api/courses/{courseId}",
    params(("courseId" = i64, Path, description = "The course id.")),
    responses(
        (status = 200, description = "Course deleted", body = DeleteCourseResponse),
        (status = 404, description = "Course not found")
    )
)]
pub async fn delete_course_handler(
    State(state): State<Arc<AppState>>,
    PathParam(course_id): PathParam<i64>,
) -> Result<Json<DeleteCourseResponse>, ApiError> {
    state.reader.delete_course(course_id).await?;
    Ok(Json(DeleteCourseResponse { deleted: true }))
}
