//! Page repository trait (port)

use async_trait::async_trait;

use crate::domain::{NewPage, Page, PagePatch};
use crate::error::DomainError;

#[async_trait]
pub trait PageRepository: Send + Sync {
    /// Stores a new page. A `menu_id` in the payload links the page on both sides.
    async fn create(&self, page: NewPage) -> Result<Page, DomainError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Page>, DomainError>;
    /// Published pages only.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, DomainError>;
    /// Sorted by `order` ascending, then newest first.
    async fn find_all(&self) -> Result<Vec<Page>, DomainError>;
    /// Published pages pointing at `menu_id`, sorted by `order`.
    async fn find_by_menu_id(&self, menu_id: &str) -> Result<Vec<Page>, DomainError>;
    /// Published pages, most viewed first.
    async fn popular(&self, limit: usize) -> Result<Vec<Page>, DomainError>;
    /// Merges `patch`; a menu change relinks the page in the same unit of work.
    async fn update(&self, id: &str, patch: PagePatch) -> Result<Option<Page>, DomainError>;
    /// Removes the page only; menu lists are left untouched.
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
    async fn increment_views(&self, id: &str) -> Result<(), DomainError>;
}
