use axum::{extract::State, Json};
use cms_core::domain::NavigationEntry;
use serde::Serialize;

use crate::error::{ApiError, ResultExt};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Navigation {
    pub menus: Vec<NavigationEntry>,
}

/// GET /api/navigation - sidebar data
pub async fn navigation(State(state): State<AppState>) -> Result<Json<Navigation>, ApiError> {
    let menus = state.menus.navigation().await.or_fail("Failed to fetch navigation")?;
    Ok(Json(Navigation { menus }))
}
