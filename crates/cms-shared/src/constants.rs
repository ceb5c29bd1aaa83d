//! Application-wide constants

pub const DEFAULT_PAGE_LIST_LIMIT: usize = 50;
pub const DEFAULT_ARTICLE_LIST_LIMIT: usize = 10;
pub const DEFAULT_POPULAR_LIMIT: usize = 5;
pub const MAX_LIST_LIMIT: usize = 100;

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
pub const DEFAULT_SESSION_COOKIE: &str = "session";

/// Used when neither `JWT_SECRET` nor `session.secret` is configured.
pub const INSECURE_DEFAULT_SECRET: &str = "your-secret-key-change-in-production";

pub const DEFAULT_ADMIN_PREFIX: &str = "/admin";
pub const DEFAULT_ADMIN_LOGIN_PATH: &str = "/admin/login";

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
