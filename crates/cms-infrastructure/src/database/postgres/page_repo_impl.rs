// ============================================================================
// CMS Infrastructure - PostgreSQL Page Repository
// File: crates/cms-infrastructure/src/database/postgres/page_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{debug, info};

use cms_core::domain::validation::ensure_valid;
use cms_core::domain::{NewPage, Page, PagePatch};
use cms_core::error::DomainError;
use cms_core::repositories::PageRepository;

use super::links::{link_page, lock_links, unlink_page};
use super::map_db_error;

const PAGE_COLUMNS: &str = "record_id, id, title, slug, content, menu_id, published, \
                            sort_order, views, created_at, updated_at";

pub struct PgPageRepository {
    pool: PgPool,
}

impl PgPageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PageRow {
    pub record_id: i64,
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub menu_id: Option<String>,
    pub published: bool,
    pub sort_order: i32,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PageRow> for Page {
    fn from(row: PageRow) -> Self {
        Page {
            record_id: row.record_id,
            id: row.id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            menu_id: row.menu_id,
            published: row.published,
            order: row.sort_order,
            views: row.views,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

async fn reload(conn: &mut PgConnection, id: &str) -> Result<Page, DomainError> {
    let row: Option<PageRow> =
        sqlx::query_as(&format!("SELECT {} FROM pages WHERE id = $1", PAGE_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_db_error("Page", "reloading", e))?;

    row.map(Page::from)
        .ok_or_else(|| DomainError::PageNotFound(id.to_string()))
}

#[async_trait]
impl PageRepository for PgPageRepository {
    async fn create(&self, page: NewPage) -> Result<Page, DomainError> {
        ensure_valid(&page)?;
        let menu_id = page.menu_id.clone();
        let draft = page.into_page(0, Utc::now());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Page", "creating", e))?;

        if menu_id.is_some() {
            lock_links(&mut tx).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO pages (id, title, slug, content, published, sort_order, views, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $7)
            "#,
        )
        .bind(&draft.id)
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.content)
        .bind(draft.published)
        .bind(draft.order)
        .bind(draft.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Page", "creating", e))?;

        if let Some(menu_id) = menu_id.as_deref() {
            link_page(&mut tx, menu_id, &draft.id).await?;
        }

        let created = reload(&mut tx, &draft.id).await?;
        tx.commit()
            .await
            .map_err(|e| map_db_error("Page", "creating", e))?;

        info!("Page created: {} ({})", created.id, created.slug);
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Page>, DomainError> {
        let row: Option<PageRow> =
            sqlx::query_as(&format!("SELECT {} FROM pages WHERE id = $1", PAGE_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_db_error("Page", "finding", e))?;

        Ok(row.map(Page::from))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, DomainError> {
        let row: Option<PageRow> = sqlx::query_as(&format!(
            "SELECT {} FROM pages WHERE slug = $1 AND published = TRUE",
            PAGE_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Page", "finding", e))?;

        Ok(row.map(Page::from))
    }

    async fn find_all(&self) -> Result<Vec<Page>, DomainError> {
        let rows: Vec<PageRow> = sqlx::query_as(&format!(
            "SELECT {} FROM pages ORDER BY sort_order ASC, created_at DESC, record_id DESC",
            PAGE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Page", "listing", e))?;

        Ok(rows.into_iter().map(Page::from).collect())
    }

    async fn find_by_menu_id(&self, menu_id: &str) -> Result<Vec<Page>, DomainError> {
        let rows: Vec<PageRow> = sqlx::query_as(&format!(
            "SELECT {} FROM pages WHERE menu_id = $1 AND published = TRUE \
             ORDER BY sort_order ASC, record_id ASC",
            PAGE_COLUMNS
        ))
        .bind(menu_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Page", "listing", e))?;

        Ok(rows.into_iter().map(Page::from).collect())
    }

    async fn popular(&self, limit: usize) -> Result<Vec<Page>, DomainError> {
        let rows: Vec<PageRow> = sqlx::query_as(&format!(
            "SELECT {} FROM pages WHERE published = TRUE \
             ORDER BY views DESC, record_id ASC LIMIT $1",
            PAGE_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Page", "listing", e))?;

        Ok(rows.into_iter().map(Page::from).collect())
    }

    async fn update(&self, id: &str, patch: PagePatch) -> Result<Option<Page>, DomainError> {
        ensure_valid(&patch)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Page", "updating", e))?;

        if patch.menu_id.is_some() {
            lock_links(&mut tx).await?;
        }

        let current: Option<(Option<String>,)> =
            sqlx::query_as("SELECT menu_id FROM pages WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_db_error("Page", "updating", e))?;

        let Some((current_menu,)) = current else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE pages
            SET title      = COALESCE($2, title),
                slug       = COALESCE($3, slug),
                content    = COALESCE($4, content),
                published  = COALESCE($5, published),
                sort_order = COALESCE($6, sort_order),
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.title.as_deref().map(str::trim))
        .bind(&patch.slug)
        .bind(&patch.content)
        .bind(patch.published)
        .bind(patch.order)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Page", "updating", e))?;

        if patch.changes_menu(current_menu.as_deref()) {
            match patch.menu_id.as_ref().and_then(|target| target.as_deref()) {
                Some(target) => link_page(&mut tx, target, id).await?,
                None => unlink_page(&mut tx, id).await?,
            }
            debug!("Page {} moved from {:?}", id, current_menu);
        }

        let updated = reload(&mut tx, id).await?;
        tx.commit()
            .await
            .map_err(|e| map_db_error("Page", "updating", e))?;

        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Page", "deleting", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_views(&self, id: &str) -> Result<(), DomainError> {
        sqlx::query("UPDATE pages SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Page", "counting views for", e))?;

        Ok(())
    }
}
