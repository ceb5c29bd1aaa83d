//! Admin area access middleware
//!
//! Requests under the admin prefix (other than the login page) need a valid,
//! unexpired admin session cookie. Anything else is redirected to the login
//! page. Public API routes pass through untouched.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use cms_security::gate::{evaluate, AccessDecision};
use tracing::{debug, warn};

use crate::cookie::read_cookie;
use crate::state::AppState;

/// True when `path` is the admin prefix or below it, excluding the login page.
pub fn is_guarded(path: &str, prefix: &str, login_path: &str) -> bool {
    if path == login_path || path.strip_suffix('/') == Some(login_path) {
        return false;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub async fn admin_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let admin = &state.config.admin;
    let path = request.uri().path().to_string();

    if !is_guarded(&path, &admin.prefix, &admin.login_path) {
        return next.run(request).await;
    }

    let cookie = read_cookie(request.headers(), &state.config.session.cookie_name);
    match evaluate(cookie.as_deref(), &state.codec, Utc::now()) {
        AccessDecision::Allowed(claims) => {
            debug!("Admin access granted to {} for {}", claims.email, path);
            next.run(request).await
        }
        AccessDecision::Denied(reason) => {
            warn!("Admin access denied for {}: {}", path, reason.as_str());
            Redirect::temporary(&admin.login_path).into_response()
        }
    }
}
