//! Menu repository traits (ports)

use async_trait::async_trait;

use crate::domain::{Menu, MenuPatch, NewMenu};
use crate::error::DomainError;

#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// Stores a new menu and links any listed pages to it.
    async fn create(&self, menu: NewMenu) -> Result<Menu, DomainError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Menu>, DomainError>;
    /// Sorted by `order` ascending, then oldest first.
    async fn find_all(&self) -> Result<Vec<Menu>, DomainError>;
    /// Merges `patch`; a new page list is applied to both sides in the same unit of work.
    async fn update(&self, id: &str, patch: MenuPatch) -> Result<Option<Menu>, DomainError>;
    /// Removes the menu only; pages keep their `menu_id`.
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
}

/// Single-step edits of the menu/page link.
///
/// Each call updates the menu list and the page's `menu_id` atomically.
#[async_trait]
pub trait MenuLinkRepository: Send + Sync {
    /// Appends the page to the menu (no duplicates), removing it from any
    /// other menu list, and points the page at the menu.
    async fn attach_page(&self, menu_id: &str, page_id: &str) -> Result<Menu, DomainError>;
    /// Removes the page from the menu list and clears its `menu_id` when it
    /// pointed at this menu. Works for dangling ids of deleted pages.
    async fn detach_page(&self, menu_id: &str, page_id: &str) -> Result<Menu, DomainError>;
    /// Deletes the page and takes it out of every menu list in one step.
    /// `false` when the page does not exist.
    async fn delete_page_detaching(&self, page_id: &str) -> Result<bool, DomainError>;
    /// Deletes the menu and clears `menu_id` on its pages in one step.
    /// `false` when the menu does not exist.
    async fn delete_menu_detaching(&self, menu_id: &str) -> Result<bool, DomainError>;
}
