//! # CMS Core - Domain Module
//! 
//! Domain entities for the CMS backend.

pub mod user;
pub mod page;
pub mod menu;
pub mod article;
pub mod validation;

// Re-export all entities and enums
pub use user::{User, Role};
pub use page::{Page, NewPage, PagePatch};
pub use menu::{Menu, NewMenu, MenuPatch, NavigationEntry};
pub use article::{Article, NewArticle, ArticlePatch};
