// ============================================================================
// CMS Infrastructure - PostgreSQL Article Repository
// File: crates/cms-infrastructure/src/database/postgres/article_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;

use cms_core::domain::validation::ensure_valid;
use cms_core::domain::{Article, ArticlePatch, NewArticle};
use cms_core::error::DomainError;
use cms_core::repositories::ArticleRepository;

use super::map_db_error;

const ARTICLE_COLUMNS: &str = "record_id, id, title, slug, content, category, tags, author, \
                               published, views, created_at, updated_at";

pub struct PgArticleRepository {
    pool: PgPool,
}

impl PgArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ArticleRow {
    pub record_id: i64,
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub published: bool,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            record_id: row.record_id,
            id: row.id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            category: row.category,
            tags: row.tags,
            author: row.author,
            published: row.published,
            views: row.views,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn create(&self, article: NewArticle) -> Result<Article, DomainError> {
        ensure_valid(&article)?;
        let draft = article.into_article(0, Utc::now());

        let row: ArticleRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO articles (id, title, slug, content, category, tags, author, published, views, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9, $9)
            RETURNING {}
            "#,
            ARTICLE_COLUMNS
        ))
        .bind(&draft.id)
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.content)
        .bind(&draft.category)
        .bind(&draft.tags)
        .bind(&draft.author)
        .bind(draft.published)
        .bind(draft.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Article", "creating", e))?;

        info!("Article created: {} ({})", row.id, row.slug);
        Ok(row.into())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Article>, DomainError> {
        let row: Option<ArticleRow> =
            sqlx::query_as(&format!("SELECT {} FROM articles WHERE id = $1", ARTICLE_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_db_error("Article", "finding", e))?;

        Ok(row.map(Article::from))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, DomainError> {
        let row: Option<ArticleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM articles WHERE slug = $1 AND published = TRUE",
            ARTICLE_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Article", "finding", e))?;

        Ok(row.map(Article::from))
    }

    async fn find_all(&self) -> Result<Vec<Article>, DomainError> {
        let rows: Vec<ArticleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM articles ORDER BY created_at DESC, record_id DESC",
            ARTICLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Article", "listing", e))?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn find_by_category(&self, category: &str, limit: usize) -> Result<Vec<Article>, DomainError> {
        let rows: Vec<ArticleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM articles WHERE category = $1 AND published = TRUE \
             ORDER BY created_at DESC, record_id DESC LIMIT $2",
            ARTICLE_COLUMNS
        ))
        .bind(category)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Article", "listing", e))?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn popular(&self, limit: usize) -> Result<Vec<Article>, DomainError> {
        let rows: Vec<ArticleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM articles WHERE published = TRUE \
             ORDER BY views DESC, record_id ASC LIMIT $1",
            ARTICLE_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Article", "listing", e))?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn update(&self, id: &str, patch: ArticlePatch) -> Result<Option<Article>, DomainError> {
        ensure_valid(&patch)?;

        let row: Option<ArticleRow> = sqlx::query_as(&format!(
            r#"
            UPDATE articles
            SET title      = COALESCE($2, title),
                slug       = COALESCE($3, slug),
                content    = COALESCE($4, content),
                category   = COALESCE($5, category),
                tags       = COALESCE($6, tags),
                author     = COALESCE($7, author),
                published  = COALESCE($8, published),
                updated_at = $9
            WHERE id = $1
            RETURNING {}
            "#,
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .bind(patch.title.as_deref().map(str::trim))
        .bind(&patch.slug)
        .bind(&patch.content)
        .bind(&patch.category)
        .bind(&patch.tags)
        .bind(&patch.author)
        .bind(patch.published)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Article", "updating", e))?;

        Ok(row.map(Article::from))
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Article", "deleting", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_views(&self, id: &str) -> Result<(), DomainError> {
        sqlx::query("UPDATE articles SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Article", "counting views for", e))?;

        Ok(())
    }
}
