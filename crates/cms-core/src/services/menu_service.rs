// ============================================================================
// CMS Core - Menu Service
// File: crates/cms-core/src/services/menu_service.rs
// ============================================================================
//! Menu/page association management
//!
//! Every operation here is a single store call, so the menu list and the
//! page's `menu_id` change together or not at all.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::domain::{Menu, NavigationEntry, Page, PagePatch};
use crate::error::DomainError;
use crate::repositories::{MenuLinkRepository, MenuRepository, PageRepository};

pub struct MenuService {
    menus: Arc<dyn MenuRepository>,
    pages: Arc<dyn PageRepository>,
    links: Arc<dyn MenuLinkRepository>,
}

impl MenuService {
    pub fn new(
        menus: Arc<dyn MenuRepository>,
        pages: Arc<dyn PageRepository>,
        links: Arc<dyn MenuLinkRepository>,
    ) -> Self {
        Self { menus, pages, links }
    }

    /// Puts `page_id` into `menu_id`, pulling it out of any other menu first.
    pub async fn add_page_to_menu(&self, menu_id: &str, page_id: &str) -> Result<Menu, DomainError> {
        let menu = self.links.attach_page(menu_id, page_id).await?;
        info!("Page {} linked to menu {}", page_id, menu_id);
        Ok(menu)
    }

    pub async fn remove_page_from_menu(&self, menu_id: &str, page_id: &str) -> Result<Menu, DomainError> {
        let menu = self.links.detach_page(menu_id, page_id).await?;
        info!("Page {} unlinked from menu {}", page_id, menu_id);
        Ok(menu)
    }

    /// Moves a page to `target`, or out of every menu when `target` is `None`.
    pub async fn move_page(&self, page_id: &str, target: Option<&str>) -> Result<Page, DomainError> {
        let patch = PagePatch::with_menu(target.map(str::to_string));
        self.pages
            .update(page_id, patch)
            .await?
            .ok_or_else(|| DomainError::PageNotFound(page_id.to_string()))
    }

    /// Removes the menu, clearing `menu_id` on its pages in the same step.
    pub async fn delete_menu(&self, menu_id: &str) -> Result<bool, DomainError> {
        let deleted = self.links.delete_menu_detaching(menu_id).await?;
        if deleted {
            info!("Menu deleted: {}", menu_id);
        }
        Ok(deleted)
    }

    /// Menus in display order, each with its published pages in list order.
    pub async fn navigation(&self) -> Result<Vec<NavigationEntry>, DomainError> {
        let menus = self.menus.find_all().await?;
        let mut entries = Vec::with_capacity(menus.len());

        for menu in menus {
            let mut pages = self.pages.find_by_menu_id(&menu.id).await?;
            let position: HashMap<&str, usize> = menu
                .pages
                .iter()
                .enumerate()
                .map(|(index, id)| (id.as_str(), index))
                .collect();
            pages.sort_by_key(|page| position.get(page.id.as_str()).copied().unwrap_or(usize::MAX));
            entries.push(NavigationEntry { menu, pages });
        }

        Ok(entries)
    }
}
