// ============================================================================
// CMS Infrastructure - PostgreSQL Menu Repositories
// File: crates/cms-infrastructure/src/database/postgres/menu_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::info;

use cms_core::domain::validation::{dedup_ids, ensure_valid};
use cms_core::domain::{Menu, MenuPatch, NewMenu};
use cms_core::error::DomainError;
use cms_core::repositories::{MenuLinkRepository, MenuRepository};

use super::links::{
    delete_menu_detaching, delete_page_detaching, detach_page, link_page, lock_links,
    replace_menu_pages,
};
use super::map_db_error;

const MENU_COLUMNS: &str = "record_id, id, label, pages, sort_order, created_at, updated_at";

#[derive(Debug, FromRow)]
struct MenuRow {
    pub record_id: i64,
    pub id: String,
    pub label: String,
    pub pages: Vec<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MenuRow> for Menu {
    fn from(row: MenuRow) -> Self {
        Menu {
            record_id: row.record_id,
            id: row.id,
            label: row.label,
            pages: row.pages,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

async fn reload(conn: &mut PgConnection, id: &str) -> Result<Menu, DomainError> {
    let row: Option<MenuRow> =
        sqlx::query_as(&format!("SELECT {} FROM menus WHERE id = $1", MENU_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_db_error("Menu", "reloading", e))?;

    row.map(Menu::from)
        .ok_or_else(|| DomainError::MenuNotFound(id.to_string()))
}

pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn create(&self, menu: NewMenu) -> Result<Menu, DomainError> {
        ensure_valid(&menu)?;
        let page_ids = menu.page_ids();
        let draft = menu.into_menu(0, Utc::now());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Menu", "creating", e))?;

        if !page_ids.is_empty() {
            lock_links(&mut tx).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO menus (id, label, pages, sort_order, created_at, updated_at)
            VALUES ($1, $2, '{}', $3, $4, $4)
            "#,
        )
        .bind(&draft.id)
        .bind(&draft.label)
        .bind(draft.order)
        .bind(draft.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Menu", "creating", e))?;

        if !page_ids.is_empty() {
            replace_menu_pages(&mut tx, &draft.id, &page_ids).await?;
        }

        let created = reload(&mut tx, &draft.id).await?;
        tx.commit()
            .await
            .map_err(|e| map_db_error("Menu", "creating", e))?;

        info!("Menu created: {} ({})", created.id, created.label);
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Menu>, DomainError> {
        let row: Option<MenuRow> =
            sqlx::query_as(&format!("SELECT {} FROM menus WHERE id = $1", MENU_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_db_error("Menu", "finding", e))?;

        Ok(row.map(Menu::from))
    }

    async fn find_all(&self) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> = sqlx::query_as(&format!(
            "SELECT {} FROM menus ORDER BY sort_order ASC, created_at ASC, record_id ASC",
            MENU_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Menu", "listing", e))?;

        Ok(rows.into_iter().map(Menu::from).collect())
    }

    async fn update(&self, id: &str, patch: MenuPatch) -> Result<Option<Menu>, DomainError> {
        ensure_valid(&patch)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Menu", "updating", e))?;

        if patch.pages.is_some() {
            lock_links(&mut tx).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE menus
            SET label      = COALESCE($2, label),
                sort_order = COALESCE($3, sort_order),
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.label.as_deref().map(str::trim))
        .bind(patch.order)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Menu", "updating", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(pages) = &patch.pages {
            replace_menu_pages(&mut tx, id, &dedup_ids(pages)).await?;
        }

        let updated = reload(&mut tx, id).await?;
        tx.commit()
            .await
            .map_err(|e| map_db_error("Menu", "updating", e))?;

        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Menu", "deleting", e))?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct PgMenuLinkRepository {
    pool: PgPool,
}

impl PgMenuLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuLinkRepository for PgMenuLinkRepository {
    async fn attach_page(&self, menu_id: &str, page_id: &str) -> Result<Menu, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Menu", "linking", e))?;

        lock_links(&mut tx).await?;
        link_page(&mut tx, menu_id, page_id).await?;
        let menu = reload(&mut tx, menu_id).await?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Menu", "linking", e))?;
        Ok(menu)
    }

    async fn detach_page(&self, menu_id: &str, page_id: &str) -> Result<Menu, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Menu", "unlinking", e))?;

        lock_links(&mut tx).await?;
        detach_page(&mut tx, menu_id, page_id).await?;
        let menu = reload(&mut tx, menu_id).await?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Menu", "unlinking", e))?;
        Ok(menu)
    }

    async fn delete_page_detaching(&self, page_id: &str) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Page", "deleting", e))?;

        lock_links(&mut tx).await?;
        let deleted = delete_page_detaching(&mut tx, page_id).await?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Page", "deleting", e))?;
        Ok(deleted)
    }

    async fn delete_menu_detaching(&self, menu_id: &str) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Menu", "deleting", e))?;

        lock_links(&mut tx).await?;
        let deleted = delete_menu_detaching(&mut tx, menu_id).await?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Menu", "deleting", e))?;
        Ok(deleted)
    }
}
