use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use service::notification::{self, welcome_email};
use service::user::{CreateUserRequest, LoginUserRequest, User};
use tracing::info;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::state::AppState;

/// Public view of an account plus a freshly issued token.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub token: String,
}

impl UserResponse {
    /// Copies the public fields only; credential material stays behind.
    pub fn from_user(user: &User, token: String) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            token,
        }
    }
}

/// Decode a JSON body; any parse failure is an unclassified fault.
fn decode<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::MalformedRequest(e.to_string()))
}

#[utoipa::path(post, path = "/users", tag = "users", request_body = crate::openapi::CreateUserRequestDoc, responses((status = 201, description = "Account created", body = crate::openapi::UserResponseDoc, headers(("Location" = String, description = "/users/{id}"))), (status = 500, description = "Account could not be created")))]
pub async fn signup(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let request: CreateUserRequest = decode(&body)?;
    let user = state.users.create_user(request).await?;

    let location = format!("/users/{}", user.id);
    let token = state.tokens.issue_token(user.id)?;
    let response = UserResponse::from_user(&user, token);

    notification::dispatch(state.notifier.clone(), welcome_email(&user), state.notify_timeout);
    info!(user_id = %user.id, "signup_completed");

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(response)))
}

#[utoipa::path(post, path = "/users/login", tag = "users", request_body = crate::openapi::LoginUserRequestDoc, responses((status = 200, description = "Logged in", body = crate::openapi::UserResponseDoc), (status = 401, description = "Invalid credentials", body = crate::openapi::ErrorResponseDoc), (status = 404, description = "User not found", body = crate::openapi::ErrorResponseDoc)))]
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Json<UserResponse>, ApiError> {
    let request: LoginUserRequest = decode(&body)?;
    let user = state.users.login_user(&request.username, &request.password).await?;
    let token = state.tokens.issue_token(user.id)?;
    Ok(Json(UserResponse::from_user(&user, token)))
}
