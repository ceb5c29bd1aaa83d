// ============================================================================
// CMS Core - Page Service
// File: crates/cms-core/src/services/page_service.rs
// ============================================================================

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::Page;
use crate::error::DomainError;
use crate::repositories::{MenuLinkRepository, PageRepository};

pub struct PageService {
    pages: Arc<dyn PageRepository>,
    links: Arc<dyn MenuLinkRepository>,
}

impl PageService {
    pub fn new(pages: Arc<dyn PageRepository>, links: Arc<dyn MenuLinkRepository>) -> Self {
        Self { pages, links }
    }

    /// Fetches a page for reading. Published pages get their view counter
    /// bumped; the returned copy carries the count from before the visit.
    pub async fn open_page(&self, id: &str) -> Result<Option<Page>, DomainError> {
        let Some(page) = self.pages.find_by_id(id).await? else {
            return Ok(None);
        };

        if page.published {
            if let Err(e) = self.pages.increment_views(&page.id).await {
                error!("Failed to count view for page {}: {}", page.id, e);
            }
        }

        Ok(Some(page))
    }

    /// Deletes the page, taking it out of its menu in the same step.
    pub async fn delete_page(&self, id: &str) -> Result<bool, DomainError> {
        let deleted = self.links.delete_page_detaching(id).await?;
        if deleted {
            info!("Page deleted: {}", id);
        }
        Ok(deleted)
    }
}
