//! Menu entity

use chrono::{DateTime, Utc};
use cms_shared::RecordId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{dedup_ids, validate_not_blank};
use super::Page;

/// Named, ordered list of page references shown in site navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    #[serde(rename = "_id")]
    pub record_id: RecordId,
    pub id: String,
    pub label: String,
    pub pages: Vec<String>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMenu {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub label: String,

    #[serde(default)]
    pub pages: Vec<String>,

    #[serde(default)]
    pub order: i32,
}

impl NewMenu {
    /// Builds the menu with an empty page list; pages are linked separately.
    pub fn into_menu(self, record_id: RecordId, now: DateTime<Utc>) -> Menu {
        Menu {
            record_id,
            id: self.id.unwrap_or_else(cms_shared::new_content_id),
            label: self.label.trim().to_string(),
            pages: Vec::new(),
            order: self.order,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn page_ids(&self) -> Vec<String> {
        dedup_ids(&self.pages)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuPatch {
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub label: Option<String>,

    pub pages: Option<Vec<String>>,

    pub order: Option<i32>,
}

impl MenuPatch {
    pub fn with_pages(pages: Vec<String>) -> Self {
        Self {
            pages: Some(pages),
            ..Self::default()
        }
    }
}

impl Menu {
    pub fn contains_page(&self, page_id: &str) -> bool {
        self.pages.iter().any(|p| p == page_id)
    }

    /// Appends `page_id` unless already listed. Returns whether the list changed.
    pub fn add_page(&mut self, page_id: &str) -> bool {
        if self.contains_page(page_id) {
            return false;
        }
        self.pages.push(page_id.to_string());
        true
    }

    pub fn remove_page(&mut self, page_id: &str) -> bool {
        let before = self.pages.len();
        self.pages.retain(|p| p != page_id);
        before != self.pages.len()
    }

    /// Merges label and order; the page list is handled by the link logic.
    pub fn apply(&mut self, patch: &MenuPatch, now: DateTime<Utc>) {
        if let Some(label) = &patch.label {
            self.label = label.trim().to_string();
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        self.updated_at = now;
    }
}

/// A menu with its published pages resolved in list order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEntry {
    pub menu: Menu,
    pub pages: Vec<Page>,
}
