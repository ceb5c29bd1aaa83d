//! Repository traits (ports)

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DomainError;

pub mod user_repository;
pub mod page_repository;
pub mod menu_repository;
pub mod article_repository;

pub use user_repository::UserRepository;
pub use page_repository::PageRepository;
pub use menu_repository::{MenuLinkRepository, MenuRepository};
pub use article_repository::ArticleRepository;

#[cfg(test)]
pub use user_repository::MockUserRepository;

/// Cheap round trip used by the readiness endpoint.
#[async_trait]
pub trait StoreProbe: Send + Sync {
    async fn ping(&self) -> Result<(), DomainError>;
}

/// Every store the application talks to, built once at startup.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub pages: Arc<dyn PageRepository>,
    pub menus: Arc<dyn MenuRepository>,
    pub links: Arc<dyn MenuLinkRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    pub probe: Arc<dyn StoreProbe>,
}
