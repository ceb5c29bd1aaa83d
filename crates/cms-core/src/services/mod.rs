//! Domain services (business logic)

pub mod auth_service;
pub mod menu_service;
pub mod page_service;

pub use auth_service::{AuthService, LoginOutcome, ProvisionOutcome};
pub use menu_service::MenuService;
pub use page_service::PageService;
