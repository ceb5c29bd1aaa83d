//! PostgreSQL repository implementations

use std::sync::Arc;

use async_trait::async_trait;
use cms_core::error::DomainError;
use cms_core::repositories::{Repositories, StoreProbe};
use sqlx::PgPool;
use tracing::error;

pub mod user_repo_impl;
pub mod page_repo_impl;
pub mod menu_repo_impl;
pub mod article_repo_impl;
mod links;

pub use user_repo_impl::PgUserRepository;
pub use page_repo_impl::PgPageRepository;
pub use menu_repo_impl::{PgMenuLinkRepository, PgMenuRepository};
pub use article_repo_impl::PgArticleRepository;

/// Wires every repository to the same pool.
pub fn postgres_repositories(pool: PgPool) -> Repositories {
    Repositories {
        users: Arc::new(PgUserRepository::new(pool.clone())),
        pages: Arc::new(PgPageRepository::new(pool.clone())),
        menus: Arc::new(PgMenuRepository::new(pool.clone())),
        links: Arc::new(PgMenuLinkRepository::new(pool.clone())),
        articles: Arc::new(PgArticleRepository::new(pool.clone())),
        probe: Arc::new(PgProbe { pool }),
    }
}

struct PgProbe {
    pool: PgPool,
}

#[async_trait]
impl StoreProbe for PgProbe {
    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Database", "pinging", e))?;
        Ok(())
    }
}

/// Maps a driver error, turning unique violations into `Conflict`.
///
/// Constraint names follow `<table>_<column>_key`, so the column can be read
/// back from the violated constraint.
pub(crate) fn map_db_error(entity: &str, action: &str, e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            let field = db
                .constraint()
                .and_then(|c| c.strip_suffix("_key"))
                .and_then(|c| c.split_once('_'))
                .map(|(_, column)| column.to_string())
                .unwrap_or_else(|| "record".to_string());
            return DomainError::Conflict(format!("{} with this {} already exists", entity, field));
        }
    }

    error!("Database error {} {}: {}", action, entity.to_lowercase(), e);
    DomainError::DatabaseError(e.to_string())
}
