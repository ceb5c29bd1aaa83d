//! Page endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use cms_core::domain::{NewPage, Page, PagePatch};
use cms_shared::constants::DEFAULT_PAGE_LIST_LIMIT;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ResultExt};
use crate::handlers::{json_body, parse_limit};
use crate::response::MessageResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageListQuery {
    pub menu_id: Option<String>,
    pub slug: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PageList {
    pub pages: Vec<Page>,
}

#[derive(Debug, Serialize)]
pub struct PageBody {
    pub page: Page,
}

fn page_not_found() -> ApiError {
    ApiError::NotFound("Page not found".into())
}

/// GET /api/pages
pub async fn list_pages(
    State(state): State<AppState>,
    Query(query): Query<PageListQuery>,
) -> Result<Json<PageList>, ApiError> {
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_PAGE_LIST_LIMIT);
    let repo = &state.repos.pages;

    let mut pages: Vec<Page> = if let Some(slug) = query.slug.as_deref() {
        repo.find_by_slug(slug).await.or_fail("Failed to fetch pages")?.into_iter().collect()
    } else if let Some(menu_id) = query.menu_id.as_deref() {
        repo.find_by_menu_id(menu_id).await.or_fail("Failed to fetch pages")?
    } else {
        repo.find_all().await.or_fail("Failed to fetch pages")?
    };
    pages.truncate(limit);

    Ok(Json(PageList { pages }))
}

/// POST /api/pages
pub async fn create_page(
    State(state): State<AppState>,
    payload: Result<Json<NewPage>, JsonRejection>,
) -> Result<(StatusCode, Json<PageBody>), ApiError> {
    let page = state
        .repos
        .pages
        .create(json_body(payload)?)
        .await
        .or_fail("Failed to create page")?;

    Ok((StatusCode::CREATED, Json(PageBody { page })))
}

/// GET /api/pages/{id}
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PageBody>, ApiError> {
    let page = state
        .pages
        .open_page(&id)
        .await
        .or_fail("Failed to fetch page")?
        .ok_or_else(page_not_found)?;

    Ok(Json(PageBody { page }))
}

/// PUT /api/pages/{id}
pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PagePatch>, JsonRejection>,
) -> Result<Json<PageBody>, ApiError> {
    let page = state
        .repos
        .pages
        .update(&id, json_body(payload)?)
        .await
        .or_fail("Failed to update page")?
        .ok_or_else(page_not_found)?;

    Ok(Json(PageBody { page }))
}

/// DELETE /api/pages/{id}
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.pages.delete_page(&id).await.or_fail("Failed to delete page")? {
        return Err(page_not_found());
    }
    Ok(Json(MessageResponse::new("Page deleted successfully")))
}
