//! In-memory content store
//!
//! All collections sit behind one `RwLock`, so an operation that touches a
//! menu and its pages holds a single write guard for the whole edit.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use cms_core::domain::validation::{dedup_ids, ensure_valid};
use cms_core::domain::{
    Article, ArticlePatch, Menu, MenuPatch, NewArticle, NewMenu, NewPage, Page, PagePatch, User,
};
use cms_core::error::DomainError;
use cms_core::repositories::{
    ArticleRepository, MenuLinkRepository, MenuRepository, PageRepository, Repositories,
    StoreProbe, UserRepository,
};
use cms_shared::RecordId;

#[derive(Debug, Default)]
struct Collections {
    seq: RecordId,
    users: Vec<User>,
    pages: Vec<Page>,
    menus: Vec<Menu>,
    articles: Vec<Article>,
}

impl Collections {
    fn next_record_id(&mut self) -> RecordId {
        self.seq += 1;
        self.seq
    }

    fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    fn page_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    fn menu(&self, id: &str) -> Option<&Menu> {
        self.menus.iter().find(|m| m.id == id)
    }

    fn menu_mut(&mut self, id: &str) -> Option<&mut Menu> {
        self.menus.iter_mut().find(|m| m.id == id)
    }

    fn require_page(&self, id: &str) -> Result<(), DomainError> {
        self.page(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::PageNotFound(id.to_string()))
    }

    fn require_menu(&self, id: &str) -> Result<(), DomainError> {
        self.menu(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::MenuNotFound(id.to_string()))
    }

    fn ensure_page_unique(&self, id: Option<&str>, slug: &str, except: Option<&str>) -> Result<(), DomainError> {
        let others = self.pages.iter().filter(|p| Some(p.id.as_str()) != except);
        for page in others {
            if id == Some(page.id.as_str()) {
                return Err(DomainError::Conflict("Page with this id already exists".into()));
            }
            if page.slug == slug {
                return Err(DomainError::Conflict("Page with this slug already exists".into()));
            }
        }
        Ok(())
    }

    fn ensure_article_unique(&self, id: Option<&str>, slug: &str, except: Option<&str>) -> Result<(), DomainError> {
        let others = self.articles.iter().filter(|a| Some(a.id.as_str()) != except);
        for article in others {
            if id == Some(article.id.as_str()) {
                return Err(DomainError::Conflict("Article with this id already exists".into()));
            }
            if article.slug == slug {
                return Err(DomainError::Conflict("Article with this slug already exists".into()));
            }
        }
        Ok(())
    }

    /// Removes the page from every menu list except `keep`.
    fn strip_from_menus(&mut self, page_id: &str, keep: Option<&str>, now: DateTime<Utc>) {
        for menu in self.menus.iter_mut().filter(|m| Some(m.id.as_str()) != keep) {
            if menu.remove_page(page_id) {
                menu.updated_at = now;
            }
        }
    }

    fn link(&mut self, menu_id: &str, page_id: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.require_page(page_id)?;
        self.require_menu(menu_id)?;

        self.strip_from_menus(page_id, Some(menu_id), now);
        if let Some(menu) = self.menu_mut(menu_id) {
            if menu.add_page(page_id) {
                menu.updated_at = now;
            }
        }
        if let Some(page) = self.page_mut(page_id) {
            page.menu_id = Some(menu_id.to_string());
            page.updated_at = now;
        }
        Ok(())
    }

    fn unlink(&mut self, page_id: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.require_page(page_id)?;

        self.strip_from_menus(page_id, None, now);
        if let Some(page) = self.page_mut(page_id) {
            page.menu_id = None;
            page.updated_at = now;
        }
        Ok(())
    }

    fn detach(&mut self, menu_id: &str, page_id: &str, now: DateTime<Utc>) -> Result<Menu, DomainError> {
        let menu = self
            .menu_mut(menu_id)
            .ok_or_else(|| DomainError::MenuNotFound(menu_id.to_string()))?;
        if menu.remove_page(page_id) {
            menu.updated_at = now;
        }
        let menu = menu.clone();

        if let Some(page) = self.page_mut(page_id) {
            if page.menu_id.as_deref() == Some(menu_id) {
                page.menu_id = None;
                page.updated_at = now;
            }
        }
        Ok(menu)
    }

    /// Makes `page_ids` the menu's list and brings every affected page in line.
    fn replace_menu_pages(&mut self, menu_id: &str, page_ids: &[String], now: DateTime<Utc>) -> Result<(), DomainError> {
        self.require_menu(menu_id)?;
        for page_id in page_ids {
            self.require_page(page_id)?;
        }

        for page in self.pages.iter_mut() {
            let listed = page_ids.contains(&page.id);
            if listed {
                if page.menu_id.as_deref() != Some(menu_id) {
                    page.menu_id = Some(menu_id.to_string());
                    page.updated_at = now;
                }
            } else if page.menu_id.as_deref() == Some(menu_id) {
                page.menu_id = None;
                page.updated_at = now;
            }
        }

        for menu in self.menus.iter_mut() {
            if menu.id == menu_id {
                menu.pages = page_ids.to_vec();
                menu.updated_at = now;
            } else {
                let before = menu.pages.len();
                menu.pages.retain(|p| !page_ids.contains(p));
                if menu.pages.len() != before {
                    menu.updated_at = now;
                }
            }
        }
        Ok(())
    }
}

/// Process-local store backing every repository trait.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            pages: Arc::new(self.clone()),
            menus: Arc::new(self.clone()),
            links: Arc::new(self.clone()),
            articles: Arc::new(self.clone()),
            probe: Arc::new(self.clone()),
        }
    }
}

#[async_trait]
impl StoreProbe for InMemoryStore {
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email = email.trim();
        let data = self.inner.read().await;
        Ok(data
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let mut data = self.inner.write().await;
        if data.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(DomainError::Conflict("User with this email already exists".into()));
        }
        data.users.push(user.clone());
        info!("User created successfully: {}", user.id);
        Ok(user.clone())
    }

    async fn record_login(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut data = self.inner.write().await;
        if let Some(user) = data.users.iter_mut().find(|u| u.id == *id) {
            user.record_login(at);
        }
        Ok(())
    }
}

#[async_trait]
impl PageRepository for InMemoryStore {
    async fn create(&self, page: NewPage) -> Result<Page, DomainError> {
        ensure_valid(&page)?;

        let mut data = self.inner.write().await;
        data.ensure_page_unique(page.id.as_deref(), &page.slug, None)?;
        if let Some(menu_id) = page.menu_id.as_deref() {
            data.require_menu(menu_id)?;
        }

        let now = Utc::now();
        let menu_id = page.menu_id.clone();
        let record_id = data.next_record_id();
        let created = page.into_page(record_id, now);
        let id = created.id.clone();
        data.pages.push(created);

        if let Some(menu_id) = menu_id.as_deref() {
            data.link(menu_id, &id, now)?;
        }

        info!("Page created: {}", id);
        data.page(&id)
            .cloned()
            .ok_or_else(|| DomainError::PageNotFound(id.clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Page>, DomainError> {
        let data = self.inner.read().await;
        Ok(data.page(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, DomainError> {
        let data = self.inner.read().await;
        Ok(data
            .pages
            .iter()
            .find(|p| p.slug == slug && p.published)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Page>, DomainError> {
        let data = self.inner.read().await;
        let mut pages = data.pages.clone();
        pages.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.record_id.cmp(&a.record_id))
        });
        Ok(pages)
    }

    async fn find_by_menu_id(&self, menu_id: &str) -> Result<Vec<Page>, DomainError> {
        let data = self.inner.read().await;
        let mut pages: Vec<Page> = data
            .pages
            .iter()
            .filter(|p| p.published && p.menu_id.as_deref() == Some(menu_id))
            .cloned()
            .collect();
        pages.sort_by(|a, b| a.order.cmp(&b.order).then(a.record_id.cmp(&b.record_id)));
        Ok(pages)
    }

    async fn popular(&self, limit: usize) -> Result<Vec<Page>, DomainError> {
        let data = self.inner.read().await;
        let mut pages: Vec<Page> = data.pages.iter().filter(|p| p.published).cloned().collect();
        pages.sort_by(|a, b| b.views.cmp(&a.views).then(a.record_id.cmp(&b.record_id)));
        pages.truncate(limit);
        Ok(pages)
    }

    async fn update(&self, id: &str, patch: PagePatch) -> Result<Option<Page>, DomainError> {
        ensure_valid(&patch)?;

        let mut data = self.inner.write().await;
        let Some(current) = data.page(id).cloned() else {
            return Ok(None);
        };

        if let Some(slug) = patch.slug.as_deref() {
            data.ensure_page_unique(None, slug, Some(id))?;
        }
        let relink = patch.changes_menu(current.menu_id.as_deref());
        let target = patch.menu_id.clone().flatten();
        if relink {
            if let Some(menu_id) = target.as_deref() {
                data.require_menu(menu_id)?;
            }
        }

        let now = Utc::now();
        if let Some(page) = data.page_mut(id) {
            page.apply(&patch, now);
        }

        if relink {
            match target.as_deref() {
                Some(menu_id) => data.link(menu_id, id, now)?,
                None => data.unlink(id, now)?,
            }
        }

        Ok(data.page(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let mut data = self.inner.write().await;
        let before = data.pages.len();
        data.pages.retain(|p| p.id != id);
        Ok(data.pages.len() != before)
    }

    async fn increment_views(&self, id: &str) -> Result<(), DomainError> {
        let mut data = self.inner.write().await;
        if let Some(page) = data.page_mut(id) {
            page.views += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl MenuRepository for InMemoryStore {
    async fn create(&self, menu: NewMenu) -> Result<Menu, DomainError> {
        ensure_valid(&menu)?;
        let page_ids = menu.page_ids();

        let mut data = self.inner.write().await;
        if let Some(id) = menu.id.as_deref() {
            if data.menu(id).is_some() {
                return Err(DomainError::Conflict("Menu with this id already exists".into()));
            }
        }
        for page_id in &page_ids {
            data.require_page(page_id)?;
        }

        let now = Utc::now();
        let record_id = data.next_record_id();
        let created = menu.into_menu(record_id, now);
        let id = created.id.clone();
        data.menus.push(created);
        if !page_ids.is_empty() {
            data.replace_menu_pages(&id, &page_ids, now)?;
        }

        info!("Menu created: {}", id);
        data.menu(&id)
            .cloned()
            .ok_or_else(|| DomainError::MenuNotFound(id.clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Menu>, DomainError> {
        let data = self.inner.read().await;
        Ok(data.menu(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Menu>, DomainError> {
        let data = self.inner.read().await;
        let mut menus = data.menus.clone();
        menus.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.record_id.cmp(&b.record_id))
        });
        Ok(menus)
    }

    async fn update(&self, id: &str, patch: MenuPatch) -> Result<Option<Menu>, DomainError> {
        ensure_valid(&patch)?;

        let mut data = self.inner.write().await;
        if data.menu(id).is_none() {
            return Ok(None);
        }

        let pages = patch.pages.as_deref().map(dedup_ids);
        if let Some(pages) = &pages {
            for page_id in pages {
                data.require_page(page_id)?;
            }
        }

        let now = Utc::now();
        if let Some(menu) = data.menu_mut(id) {
            menu.apply(&patch, now);
        }
        if let Some(pages) = &pages {
            data.replace_menu_pages(id, pages, now)?;
        }

        Ok(data.menu(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let mut data = self.inner.write().await;
        let before = data.menus.len();
        data.menus.retain(|m| m.id != id);
        Ok(data.menus.len() != before)
    }
}

#[async_trait]
impl MenuLinkRepository for InMemoryStore {
    async fn attach_page(&self, menu_id: &str, page_id: &str) -> Result<Menu, DomainError> {
        let mut data = self.inner.write().await;
        data.link(menu_id, page_id, Utc::now())?;
        data.menu(menu_id)
            .cloned()
            .ok_or_else(|| DomainError::MenuNotFound(menu_id.to_string()))
    }

    async fn detach_page(&self, menu_id: &str, page_id: &str) -> Result<Menu, DomainError> {
        let mut data = self.inner.write().await;
        data.detach(menu_id, page_id, Utc::now())
    }

    async fn delete_page_detaching(&self, page_id: &str) -> Result<bool, DomainError> {
        let mut data = self.inner.write().await;
        if data.page(page_id).is_none() {
            return Ok(false);
        }

        data.strip_from_menus(page_id, None, Utc::now());
        data.pages.retain(|p| p.id != page_id);
        Ok(true)
    }

    async fn delete_menu_detaching(&self, menu_id: &str) -> Result<bool, DomainError> {
        let mut data = self.inner.write().await;
        if data.menu(menu_id).is_none() {
            return Ok(false);
        }

        let now = Utc::now();
        for page in data.pages.iter_mut().filter(|p| p.menu_id.as_deref() == Some(menu_id)) {
            page.menu_id = None;
            page.updated_at = now;
        }
        data.menus.retain(|m| m.id != menu_id);
        Ok(true)
    }
}

#[async_trait]
impl ArticleRepository for InMemoryStore {
    async fn create(&self, article: NewArticle) -> Result<Article, DomainError> {
        ensure_valid(&article)?;

        let mut data = self.inner.write().await;
        data.ensure_article_unique(article.id.as_deref(), &article.slug, None)?;

        let record_id = data.next_record_id();
        let created = article.into_article(record_id, Utc::now());
        data.articles.push(created.clone());

        info!("Article created: {}", created.id);
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Article>, DomainError> {
        let data = self.inner.read().await;
        Ok(data.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, DomainError> {
        let data = self.inner.read().await;
        Ok(data
            .articles
            .iter()
            .find(|a| a.slug == slug && a.published)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Article>, DomainError> {
        let data = self.inner.read().await;
        let mut articles = data.articles.clone();
        articles.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.record_id.cmp(&a.record_id))
        });
        Ok(articles)
    }

    async fn find_by_category(&self, category: &str, limit: usize) -> Result<Vec<Article>, DomainError> {
        let mut articles: Vec<Article> = ArticleRepository::find_all(self)
            .await?
            .into_iter()
            .filter(|a| a.published && a.category == category)
            .collect();
        articles.truncate(limit);
        Ok(articles)
    }

    async fn popular(&self, limit: usize) -> Result<Vec<Article>, DomainError> {
        let data = self.inner.read().await;
        let mut articles: Vec<Article> = data.articles.iter().filter(|a| a.published).cloned().collect();
        articles.sort_by(|a, b| b.views.cmp(&a.views).then(a.record_id.cmp(&b.record_id)));
        articles.truncate(limit);
        Ok(articles)
    }

    async fn update(&self, id: &str, patch: ArticlePatch) -> Result<Option<Article>, DomainError> {
        ensure_valid(&patch)?;

        let mut data = self.inner.write().await;
        if let Some(slug) = patch.slug.as_deref() {
            data.ensure_article_unique(None, slug, Some(id))?;
        }

        let now = Utc::now();
        Ok(data.articles.iter_mut().find(|a| a.id == id).map(|article| {
            article.apply(&patch, now);
            article.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let mut data = self.inner.write().await;
        let before = data.articles.len();
        data.articles.retain(|a| a.id != id);
        Ok(data.articles.len() != before)
    }

    async fn increment_views(&self, id: &str) -> Result<(), DomainError> {
        let mut data = self.inner.write().await;
        if let Some(article) = data.articles.iter_mut().find(|a| a.id == id) {
            article.views += 1;
        }
        Ok(())
    }
}
