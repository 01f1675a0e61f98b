//! HTTP-level tests for the API router, backed by in-memory ports.

use std::sync::Arc;

use api_lib::web::{router, AppState};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use prompt2learn_core::ValidationPolicy;
use prompt2learn_test_utils::{InMemoryDb, ScriptedModel};
use serde_json::{json, Value};
use tower::ServiceExt;

const PLAN: &str = r#"{"courseTitle":"Knots","days":[
  {"dayIndex":1,"dayTitle":"Basics","lessons":[
    {"title":"Square knot","description":"Right over left."},
    {"title":"Bowline","description":"The rabbit and the tree."},
    {"title":"Clove hitch"}
  ]}
]}"#;

fn app(db: &Arc<InMemoryDb>, model: ScriptedModel) -> Router {
    let state = AppState::new(db.clone(), Arc::new(model), ValidationPolicy::default());
    router(Arc::new(state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn register_then_login() {
    let db = Arc::new(InMemoryDb::new());
    let app = app(&db, ScriptedModel::replying(PLAN));
    let creds = json!({"username": "ada", "password": "hunter2"});

    let (status, body) = send(&app, Method::POST, "/api/auth/register", Some(creds.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ada");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::POST, "/api/auth/login", Some(creds.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);

    let (status, _) = send(&app, Method::POST, "/api/auth/register", Some(creds)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_failures_are_unauthorized() {
    let db = Arc::new(InMemoryDb::new());
    let app = app(&db, ScriptedModel::replying(PLAN));
    send(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({"username": "ada", "password": "right"})),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({"username": "ada", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid Credentials");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({"username": "nobody", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "User not registered");
}

#[tokio::test]
async fn missing_fields_are_bad_requests() {
    let db = Arc::new(InMemoryDb::new());
    let app = app(&db, ScriptedModel::replying(PLAN));

    let (status, _) = send(&app, Method::POST, "/api/auth/register", Some(json!({"username": "ada"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::POST, "/api/courses/generate", Some(json!({"prompt": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "userId and prompt required");

    let (status, _) = send(&app, Method::GET, "/api/courses", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generate_read_list_delete() {
    let db = Arc::new(InMemoryDb::new());
    let user = db.seed_user("ada");
    let app = app(&db, ScriptedModel::replying(PLAN));

    let (status, generated) = send(
        &app,
        Method::POST,
        "/api/courses/generate",
        Some(json!({"userId": user.id, "prompt": "learn knots"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generated["title"], "Knots");
    assert_eq!(generated["days"][0]["lessons"][2]["description"], "");
    let course_id = generated["courseId"].as_i64().unwrap();

    let (status, detail) = send(&app, Method::GET, &format!("/api/courses/{course_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["prompt"], "learn knots");
    assert!(detail["createdAt"].is_string());
    assert_eq!(detail["days"], generated["days"]);

    let (status, list) = send(&app, Method::GET, &format!("/api/courses?userId={}", user.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], course_id);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/courses/{course_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"deleted": true}));

    let (status, _) = send(&app, Method::GET, &format!("/api/courses/{course_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/courses/{course_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = send(&app, Method::GET, &format!("/api/courses?userId={}", user.id), None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn generation_failures_map_to_statuses() {
    let db = Arc::new(InMemoryDb::new());
    let user = db.seed_user("ada");
    let request = json!({"userId": user.id, "prompt": "learn knots"});

    let denied = app(&db, ScriptedModel::replying("I cannot help with that request."));
    let (status, _) = send(&denied, Method::POST, "/api/courses/generate", Some(request.clone())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let unreachable = app(&db, ScriptedModel::failing("dns failure"));
    let (status, _) = send(&unreachable, Method::POST, "/api/courses/generate", Some(request.clone())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let ok = app(&db, ScriptedModel::replying(PLAN));
    let (status, _) = send(
        &ok,
        Method::POST,
        "/api/courses/generate",
        Some(json!({"userId": user.id + 1000, "prompt": "learn knots"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    db.fail_lesson_inserts(true);
    let (status, body) = send(&ok, Method::POST, "/api/courses/generate", Some(request)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    assert_eq!(db.course_count(), 0);
}

#[tokio::test]
async fn extractor_rejections_use_json_error_bodies() {
    let db = Arc::new(InMemoryDb::new());
    let app = app(&db, ScriptedModel::replying(PLAN));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header("content-type", "application/json")
        .body(Body::from("{\"username\": \"ada\","))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/courses/generate",
        Some(json!({"userId": "one", "prompt": "learn knots"})),
    )
    .await;
    assert!(status.is_client_error());
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::GET, "/api/courses/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::GET, "/api/courses?userId=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
