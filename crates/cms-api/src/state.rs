use std::sync::Arc;

use chrono::Duration;
use cms_core::repositories::Repositories;
use cms_core::services::{AuthService, MenuService, PageService};
use cms_security::SessionCodec;
use cms_shared::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repos: Repositories,
    pub codec: Arc<SessionCodec>,
    pub auth: Arc<AuthService>,
    pub menus: Arc<MenuService>,
    pub pages: Arc<PageService>,
}

impl AppState {
    pub fn new(config: AppConfig, repos: Repositories) -> Self {
        let codec = Arc::new(SessionCodec::new(&config.session.secret));
        let auth = AuthService::new(
            repos.users.clone(),
            codec.clone(),
            Duration::hours(config.session.ttl_hours),
            config.auth.password_check,
        );
        let menus = MenuService::new(repos.menus.clone(), repos.pages.clone(), repos.links.clone());
        let pages = PageService::new(repos.pages.clone(), repos.links.clone());

        Self {
            config: Arc::new(config),
            repos,
            codec,
            auth: Arc::new(auth),
            menus: Arc::new(menus),
            pages: Arc::new(pages),
        }
    }
}
