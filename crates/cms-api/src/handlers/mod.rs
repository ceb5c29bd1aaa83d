//! HTTP handlers

pub mod admin;
pub mod articles;
pub mod auth;
pub mod health;
pub mod menus;
pub mod navigation;
pub mod pages;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::ApiError;

/// Unwraps a JSON body, reporting malformed input as a 400 `{error}` body.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Lenient `limit` parsing: anything unparsable falls back to the default.
pub(crate) fn parse_limit(raw: Option<&str>, default: usize) -> usize {
    let requested = raw.and_then(|value| value.trim().parse::<usize>().ok());
    cms_shared::utils::clamp_limit(requested, default, cms_shared::constants::MAX_LIST_LIMIT)
}
