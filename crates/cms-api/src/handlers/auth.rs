// ============================================================================
// CMS API - Auth Handlers
// File: crates/cms-api/src/handlers/auth.rs
// ============================================================================
//! Authentication HTTP handlers (login, logout, current session)

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use cms_core::domain::User;
use serde::{Deserialize, Serialize};

use crate::cookie::{expired_cookie, read_cookie, session_cookie};
use crate::error::{ApiError, ResultExt, INVALID_CREDENTIALS, NOT_AUTHENTICATED};
use crate::handlers::json_body;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Login request payload
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// User DTO for responses
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserSummary,
}

/// Login handler - POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(payload)?;

    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    if email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required".into()));
    }

    let outcome = state
        .auth
        .login(email.trim(), &password)
        .await
        .or_fail("Internal server error")?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    let session = &state.config.session;
    let cookie = session_cookie(
        &session.cookie_name,
        &outcome.session.token,
        outcome.session.claims.expires,
        session.secure_cookie,
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Login successful".into(),
            user: UserSummary::from(&outcome.user),
        }),
    ))
}

/// Logout handler - POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let session = &state.config.session;
    (
        [(header::SET_COOKIE, expired_cookie(&session.cookie_name, session.secure_cookie))],
        Json(MessageResponse::new("Logged out")),
    )
}

/// Current session - GET /api/auth/me
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<SessionResponse>, ApiError> {
    let token = read_cookie(&headers, &state.config.session.cookie_name)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized(NOT_AUTHENTICATED.into()))?;

    let user = state
        .auth
        .current_user(&token)
        .await
        .or_fail("Internal server error")?
        .ok_or_else(|| ApiError::Unauthorized(NOT_AUTHENTICATED.into()))?;

    Ok(Json(SessionResponse {
        user: UserSummary::from(&user),
    }))
}
