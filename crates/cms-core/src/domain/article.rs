//! Article entity

use chrono::{DateTime, Utc};
use cms_shared::RecordId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{validate_not_blank, validate_slug};

/// Stand-alone content item, not part of any menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id")]
    pub record_id: RecordId,
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub published: bool,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
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
    #[validate(length(max = 100))]
    pub category: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub published: bool,
}

impl NewArticle {
    pub fn into_article(self, record_id: RecordId, now: DateTime<Utc>) -> Article {
        Article {
            record_id,
            id: self.id.unwrap_or_else(cms_shared::new_content_id),
            title: self.title.trim().to_string(),
            slug: self.slug,
            content: self.content,
            category: self.category.trim().to_string(),
            tags: self.tags,
            author: self.author,
            published: self.published,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePatch {
    #[validate(length(max = 200), custom(function = "validate_not_blank"))]
    pub title: Option<String>,

    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,

    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub author: Option<String>,
    pub published: Option<bool>,
}

impl Article {
    pub fn apply(&mut self, patch: &ArticlePatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(slug) = &patch.slug {
            self.slug = slug.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.trim().to_string();
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        if let Some(author) = &patch.author {
            self.author = author.clone();
        }
        if let Some(published) = patch.published {
            self.published = published;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_article_defaults() {
        let article = NewArticle {
            title: "XSS basics".into(),
            slug: "xss-basics".into(),
            category: " web ".into(),
            tags: vec!["xss".into()],
            ..NewArticle::default()
        };
        assert!(article.validate().is_ok());

        let stored = article.into_article(2, Utc::now());
        assert_eq!(stored.category, "web");
        assert_eq!(stored.views, 0);
    }

    #[test]
    fn test_bad_slug_rejected() {
        let article = NewArticle {
            title: "XSS".into(),
            slug: "x s s".into(),
            ..NewArticle::default()
        };
        let errors = article.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("slug"));
    }
}
