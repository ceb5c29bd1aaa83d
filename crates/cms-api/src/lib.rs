//! # CMS API
//!
//! HTTP handlers, the admin access middleware, cookies, and error mapping.

pub mod cookie;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
