//! Session cookie encoding
//!
//! Only the single session cookie is ever written, so `Set-Cookie` values
//! are built directly rather than through a cookie jar.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// `Set-Cookie` value carrying a session token until `expires`.
pub fn session_cookie(name: &str, token: &str, expires: DateTime<Utc>, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Expires={}",
        name,
        token,
        expires.format(HTTP_DATE)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that empties the session and expires it at the epoch.
pub fn expired_cookie(name: &str, secure: bool) -> String {
    session_cookie(name, "", DateTime::<Utc>::UNIX_EPOCH, secure)
}

/// Reads one cookie value from every `Cookie` header on the request.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
