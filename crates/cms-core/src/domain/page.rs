//! Page entity

use chrono::{DateTime, Utc};
use cms_shared::{double_option, RecordId};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{validate_not_blank, validate_slug};

/// A routable documentation page. `menu_id` mirrors the owning menu's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(rename = "_id")]
    pub record_id: RecordId,
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub menu_id: Option<String>,
    pub published: bool,
    pub order: i32,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a page. `id` is generated when omitted.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPage {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    #[validate(length(max = 200), custom(function = "validate_not_blank"))]
    pub title: String,

    #[serde(default)]
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub menu_id: Option<String>,

    #[serde(default)]
    pub published: bool,

    #[serde(default)]
    pub order: i32,
}

impl NewPage {
    pub fn into_page(self, record_id: RecordId, now: DateTime<Utc>) -> Page {
        Page {
            record_id,
            id: self.id.unwrap_or_else(cms_shared::new_content_id),
            title: self.title.trim().to_string(),
            slug: self.slug,
            content: self.content,
            menu_id: None,
            published: self.published,
            order: self.order,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `menu_id: Some(None)` detaches the page from its menu.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PagePatch {
    #[validate(length(max = 200), custom(function = "validate_not_blank"))]
    pub title: Option<String>,

    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,

    pub content: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub menu_id: Option<Option<String>>,

    pub published: Option<bool>,

    pub order: Option<i32>,
}

impl PagePatch {
    pub fn with_menu(menu_id: Option<String>) -> Self {
        Self {
            menu_id: Some(menu_id),
            ..Self::default()
        }
    }

    /// True when the patch asks for a different menu than `current`.
    pub fn changes_menu(&self, current: Option<&str>) -> bool {
        match &self.menu_id {
            Some(target) => target.as_deref() != current,
            None => false,
        }
    }
}

impl Page {
    /// Merges every field except the menu link and refreshes `updated_at`.
    pub fn apply(&mut self, patch: &PagePatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(slug) = &patch.slug {
            self.slug = slug.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(published) = patch.published {
            self.published = published;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_page() -> NewPage {
        NewPage {
            title: "SQLi".into(),
            slug: "sqli".into(),
            content: "<p>union select</p>".into(),
            ..NewPage::default()
        }
    }

    #[test]
    fn test_valid_new_page() {
        assert!(new_page().validate().is_ok());
    }

    #[test]
    fn test_missing_title_and_slug_rejected() {
        let errors = NewPage::default().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("slug"));
    }

    #[test]
    fn test_into_page_initializes_counters() {
        let now = Utc::now();
        let page = new_page().into_page(7, now);
        assert_eq!(page.record_id, 7);
        assert_eq!(page.views, 0);
        assert_eq!(page.created_at, now);
        assert_eq!(page.updated_at, now);
        assert!(!page.id.is_empty());
        assert!(page.menu_id.is_none());
    }

    #[test]
    fn test_patch_parses_menu_states() {
        let detach: PagePatch = serde_json::from_str(r#"{"menuId": null}"#).unwrap();
        assert!(detach.changes_menu(Some("hacking")));
        assert!(!detach.changes_menu(None));

        let untouched: PagePatch = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        assert!(!untouched.changes_menu(Some("hacking")));
    }

    #[test]
    fn test_apply_merges_fields() {
        let mut page = new_page().into_page(1, Utc::now());
        let later = page.updated_at + chrono::Duration::seconds(5);
        let patch = PagePatch {
            title: Some("Blind SQLi".into()),
            published: Some(true),
            ..PagePatch::default()
        };
        page.apply(&patch, later);
        assert_eq!(page.title, "Blind SQLi");
        assert_eq!(page.slug, "sqli");
        assert!(page.published);
        assert_eq!(page.updated_at, later);
    }

    #[test]
    fn test_serialized_shape() {
        let page = new_page().into_page(3, Utc::now());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["_id"], 3);
        assert!(json.get("menuId").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
