//! Menu endpoints, including single-page attach and detach

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use cms_core::domain::{Menu, MenuPatch, NewMenu};
use serde::Serialize;

use crate::error::{ApiError, ResultExt};
use crate::handlers::json_body;
use crate::response::MessageResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MenuList {
    pub menus: Vec<Menu>,
}

#[derive(Debug, Serialize)]
pub struct MenuBody {
    pub menu: Menu,
}

fn menu_not_found() -> ApiError {
    ApiError::NotFound("Menu not found".into())
}

/// GET /api/menu
pub async fn list_menus(State(state): State<AppState>) -> Result<Json<MenuList>, ApiError> {
    let menus = state.repos.menus.find_all().await.or_fail("Failed to fetch menus")?;
    Ok(Json(MenuList { menus }))
}

/// POST /api/menu
pub async fn create_menu(
    State(state): State<AppState>,
    payload: Result<Json<NewMenu>, JsonRejection>,
) -> Result<(StatusCode, Json<MenuBody>), ApiError> {
    let menu = state
        .repos
        .menus
        .create(json_body(payload)?)
        .await
        .or_fail("Failed to create menu")?;

    Ok((StatusCode::CREATED, Json(MenuBody { menu })))
}

/// GET /api/menu/{id}
pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MenuBody>, ApiError> {
    let menu = state
        .repos
        .menus
        .find_by_id(&id)
        .await
        .or_fail("Failed to fetch menu")?
        .ok_or_else(menu_not_found)?;

    Ok(Json(MenuBody { menu }))
}

/// PUT /api/menu/{id}
pub async fn update_menu(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MenuPatch>, JsonRejection>,
) -> Result<Json<MenuBody>, ApiError> {
    let menu = state
        .repos
        .menus
        .update(&id, json_body(payload)?)
        .await
        .or_fail("Failed to update menu")?
        .ok_or_else(menu_not_found)?;

    Ok(Json(MenuBody { menu }))
}

/// DELETE /api/menu/{id}
pub async fn delete_menu(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.menus.delete_menu(&id).await.or_fail("Failed to delete menu")? {
        return Err(menu_not_found());
    }
    Ok(Json(MessageResponse::new("Menu deleted successfully")))
}

/// POST /api/menu/{id}/pages/{page_id}
pub async fn attach_page(
    State(state): State<AppState>,
    Path((id, page_id)): Path<(String, String)>,
) -> Result<Json<MenuBody>, ApiError> {
    let menu = state
        .menus
        .add_page_to_menu(&id, &page_id)
        .await
        .or_fail("Failed to update menu")?;

    Ok(Json(MenuBody { menu }))
}

/// DELETE /api/menu/{id}/pages/{page_id}
pub async fn detach_page(
    State(state): State<AppState>,
    Path((id, page_id)): Path<(String, String)>,
) -> Result<Json<MenuBody>, ApiError> {
    let menu = state
        .menus
        .remove_page_from_menu(&id, &page_id)
        .await
        .or_fail("Failed to update menu")?;

    Ok(Json(MenuBody { menu }))
}
