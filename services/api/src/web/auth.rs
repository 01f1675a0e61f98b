//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user registration and login. There are no
//! server-side sessions: a successful call returns the user's id, which the
//! client passes to the course endpoints.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use prompt2learn_core::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::extract::JsonBody;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub id: i64,
    pub username: String,
}

impl CredentialsRequest {
    /// Both fields must be present and non-empty.
    fn into_parts(self) -> Result<(String, String), ApiError> {
        match (self.username, self.password) {
            (Some(username), Some(password))
                if !username.trim().is_empty() && !password.is_empty() =>
            {
                Ok((username.trim().to_string(), password))
            }
            _ => Err(ApiError::BadRequest(
                "username and password required".to_string(),
            )),
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Missing username or password"),
        (status = 409, description = "Username already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (username, password) = req.into_parts()?;

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiError::Internal("Failed to hash password".to_string())
        })?
        .to_string();

    // 2. Create user in database
    let user = state
        .db
        .create_user(&username, &password_hash)
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => ApiError::Conflict("username already exists".to_string()),
            other => ApiError::Port(other),
        })?;

    info!(user_id = user.id, "Registered user");
    Ok(Json(AuthResponse {
        id: user.id,
        username: user.username,
    }))
}

/// POST /api/auth/login - Check credentials of an existing account
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Unknown user or wrong password"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (username, password) = req.into_parts()?;

    // 1. Get user by username
    let creds = state
        .db
        .get_user_by_username(&username)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => ApiError::Unauthorized("User not registered".to_string()),
            other => ApiError::Port(other),
        })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&creds.password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ApiError::Internal("Authentication error".to_string())
    })?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(ApiError::Unauthorized("Invalid Credentials".to_string()));
    }

    Ok(Json(AuthResponse {
        id: creds.id,
        username: creds.username,
    }))
}
