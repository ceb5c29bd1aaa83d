//! Article repository trait (port)

use async_trait::async_trait;

use crate::domain::{Article, ArticlePatch, NewArticle};
use crate::error::DomainError;

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn create(&self, article: NewArticle) -> Result<Article, DomainError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Article>, DomainError>;
    /// Published articles only.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, DomainError>;
    /// Newest first.
    async fn find_all(&self) -> Result<Vec<Article>, DomainError>;
    /// Published articles in `category`, newest first.
    async fn find_by_category(&self, category: &str, limit: usize) -> Result<Vec<Article>, DomainError>;
    /// Published articles, most viewed first.
    async fn popular(&self, limit: usize) -> Result<Vec<Article>, DomainError>;
    async fn update(&self, id: &str, patch: ArticlePatch) -> Result<Option<Article>, DomainError>;
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
    async fn increment_views(&self, id: &str) -> Result<(), DomainError>;
}
