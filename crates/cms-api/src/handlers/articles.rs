//! Article endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use cms_core::domain::{Article, NewArticle};
use cms_shared::constants::DEFAULT_ARTICLE_LIST_LIMIT;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{ApiError, ResultExt};
use crate::handlers::{json_body, parse_limit};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ArticleListQuery {
    pub category: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArticleList {
    pub articles: Vec<Article>,
}

#[derive(Debug, Serialize)]
pub struct ArticleBody {
    pub article: Article,
}

/// GET /api/articles
///
/// With `category`: newest published articles in it. Without: most viewed.
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ArticleListQuery>,
) -> Result<Json<ArticleList>, ApiError> {
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_ARTICLE_LIST_LIMIT);
    let repo = &state.repos.articles;

    let articles = match query.category.as_deref().filter(|c| !c.is_empty()) {
        Some(category) => repo.find_by_category(category, limit).await,
        None => repo.popular(limit).await,
    }
    .or_fail("Failed to fetch articles")?;

    Ok(Json(ArticleList { articles }))
}

/// POST /api/articles
pub async fn create_article(
    State(state): State<AppState>,
    payload: Result<Json<NewArticle>, JsonRejection>,
) -> Result<(StatusCode, Json<ArticleBody>), ApiError> {
    let article = state
        .repos
        .articles
        .create(json_body(payload)?)
        .await
        .or_fail("Failed to create article")?;

    Ok((StatusCode::CREATED, Json(ArticleBody { article })))
}

/// GET /api/articles/{slug}
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ArticleBody>, ApiError> {
    let repo = &state.repos.articles;
    let article = repo
        .find_by_slug(&slug)
        .await
        .or_fail("Failed to fetch article")?
        .ok_or_else(|| ApiError::NotFound("Article not found".into()))?;

    if let Err(e) = repo.increment_views(&article.id).await {
        error!("Failed to count view for article {}: {}", article.id, e);
    }

    Ok(Json(ArticleBody { article }))
}
