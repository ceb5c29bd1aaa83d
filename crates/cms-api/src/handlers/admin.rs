//! Admin area endpoints

use axum::{extract::State, Json};
use cms_core::domain::Page;
use cms_shared::constants::DEFAULT_POPULAR_LIMIT;
use serde::Serialize;

use crate::error::{ApiError, ResultExt};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginHint {
    pub message: String,
    pub login_endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct ContentCounts {
    pub pages: usize,
    pub published: usize,
    pub menus: usize,
    pub articles: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub counts: ContentCounts,
    pub popular_pages: Vec<Page>,
}

/// GET /admin/login - reachable without a session
pub async fn login_hint() -> Json<LoginHint> {
    Json(LoginHint {
        message: "Sign in with an admin account to manage content".into(),
        login_endpoint: "/api/auth/login".into(),
    })
}

/// GET /admin - dashboard figures
pub async fn overview(State(state): State<AppState>) -> Result<Json<Overview>, ApiError> {
    let repos = &state.repos;
    let pages = repos.pages.find_all().await.or_fail("Failed to load dashboard")?;
    let menus = repos.menus.find_all().await.or_fail("Failed to load dashboard")?;
    let articles = repos.articles.find_all().await.or_fail("Failed to load dashboard")?;
    let popular_pages = repos
        .pages
        .popular(DEFAULT_POPULAR_LIMIT)
        .await
        .or_fail("Failed to load dashboard")?;

    Ok(Json(Overview {
        counts: ContentCounts {
            pages: pages.len(),
            published: pages.iter().filter(|p| p.published).count(),
            menus: menus.len(),
            articles: articles.len(),
        },
        popular_pages,
    }))
}
