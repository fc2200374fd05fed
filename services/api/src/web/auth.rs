//! services/api/src/web/auth.rs
//!
//! Demo authentication endpoints. Any non-empty username and password are
//! accepted; the returned token only identifies an entry in the session store.

use crate::error::{ApiError, ErrorBody};
use crate::web::{extract::ApiJson, state::AppState};
use alumni_map_core::domain::SessionUser;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionUserDto {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<SessionUser> for SessionUserDto {
    fn from(user: SessionUser) -> Self {
        Self {
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub user: SessionUserDto,
}

#[derive(Default, Deserialize, ToSchema)]
pub struct SessionRequest {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifySessionResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUserDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Token from `Authorization: Bearer <token>`, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The body's `sessionId` wins over the bearer header. The body itself is optional.
fn session_token(headers: &HeaderMap, body: Option<ApiJson<SessionRequest>>) -> Option<String> {
    let ApiJson(req) = body.unwrap_or_default();
    req.session_id
        .filter(|id| !id.is_empty())
        .or_else(|| bearer_token(headers).map(str::to_string))
}

async fn open_session(state: &AppState, req: CredentialsRequest) -> Result<AuthResponse, ApiError> {
    let username = req.username.filter(|u| !u.is_empty());
    let password = req.password.filter(|p| !p.is_empty());
    let (Some(username), Some(_password)) = (username, password) else {
        return Err(ApiError::Validation(
            "Username and password are required".to_string(),
        ));
    };

    let user = SessionUser {
        username,
        email: req.email.filter(|e| !e.is_empty()),
    };
    let session_id = Uuid::new_v4().simple().to_string();

    state
        .sessions
        .put(&session_id, user.clone())
        .await
        .map_err(|e| {
            error!("Failed to store session: {:?}", e);
            ApiError::Internal("Failed to create session".to_string())
        })?;
    info!(username = %user.username, "Session opened");

    Ok(AuthResponse {
        success: true,
        session_id,
        user: user.into(),
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/register - Open a session for a new user
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Session opened", body = AuthResponse),
        (status = 400, description = "Missing username or password", body = ErrorBody)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    open_session(&state, req).await.map(Json)
}

/// POST /api/login - Open a session for any credentials
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Session opened", body = AuthResponse),
        (status = 400, description = "Missing username or password", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    open_session(&state, req).await.map(Json)
}

/// POST /api/logout - Forget a session
#[utoipa::path(
    post,
    path = "/api/logout",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session removed (or never existed)", body = SuccessResponse)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<ApiJson<SessionRequest>>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if let Some(token) = session_token(&headers, body) {
        state.sessions.remove(&token).await.map_err(|e| {
            error!("Failed to delete session: {:?}", e);
            ApiError::Internal("Failed to logout".to_string())
        })?;
    }
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/verify-session - Check whether a token is live
#[utoipa::path(
    post,
    path = "/api/verify-session",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Whether the session exists, and its user", body = VerifySessionResponse)
    ),
    params(
        ("Authorization" = Option<String>, Header, description = "Bearer token, used when the body has no sessionId.")
    )
)]
pub async fn verify_session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<ApiJson<SessionRequest>>,
) -> Result<Json<VerifySessionResponse>, ApiError> {
    let user = match session_token(&headers, body) {
        Some(token) => state.sessions.get(&token).await.map_err(|e| {
            error!("Failed to read session: {:?}", e);
            ApiError::Internal("Failed to verify session".to_string())
        })?,
        None => None,
    };

    Ok(Json(VerifySessionResponse {
        valid: user.is_some(),
        user: user.map(SessionUserDto::from),
    }))
}
