//! Admin access decision
//!
//! Pure function over the session cookie value; the HTTP layer turns a
//! denial into a redirect to the login page.

use chrono::{DateTime, Utc};
use cms_shared::constants::ROLE_ADMIN;

use crate::session::{SessionClaims, SessionCodec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    MissingSession,
    InvalidSession,
    NotAdmin,
    Expired,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::MissingSession => "missing_session",
            DenialReason::InvalidSession => "invalid_session",
            DenialReason::NotAdmin => "not_admin",
            DenialReason::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed(SessionClaims),
    Denied(DenialReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed(_))
    }
}

/// Decides whether a request carrying `cookie` may enter the admin area.
///
/// Checks run in order: presence, signature, role, expiry.
pub fn evaluate(cookie: Option<&str>, codec: &SessionCodec, now: DateTime<Utc>) -> AccessDecision {
    let token = match cookie {
        Some(value) if !value.is_empty() => value,
        _ => return AccessDecision::Denied(DenialReason::MissingSession),
    };

    let claims = match codec.verify(token) {
        Ok(claims) => claims,
        Err(_) => return AccessDecision::Denied(DenialReason::InvalidSession),
    };

    if claims.role != ROLE_ADMIN {
        return AccessDecision::Denied(DenialReason::NotAdmin);
    }

    if claims.is_expired_at(now) {
        return AccessDecision::Denied(DenialReason::Expired);
    }

    AccessDecision::Allowed(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionIdentity;
    use chrono::Duration;

    fn codec() -> SessionCodec {
        SessionCodec::new("gate-secret")
    }

    fn token(codec: &SessionCodec, role: &str, ttl: Duration) -> String {
        codec
            .issue(
                SessionIdentity {
                    user_id: "u-1".to_string(),
                    email: "admin@hacktricks.com".to_string(),
                    role: role.to_string(),
                },
                ttl,
            )
            .unwrap()
            .token
    }

    #[test]
    fn test_missing_cookie_denied() {
        let codec = codec();
        assert_eq!(
            evaluate(None, &codec, Utc::now()),
            AccessDecision::Denied(DenialReason::MissingSession)
        );
        assert_eq!(
            evaluate(Some(""), &codec, Utc::now()),
            AccessDecision::Denied(DenialReason::MissingSession)
        );
    }

    #[test]
    fn test_foreign_signature_denied() {
        let codec = codec();
        let foreign = token(&SessionCodec::new("other"), "admin", Duration::hours(1));
        assert_eq!(
            evaluate(Some(&foreign), &codec, Utc::now()),
            AccessDecision::Denied(DenialReason::InvalidSession)
        );
        assert_eq!(
            evaluate(Some("garbage"), &codec, Utc::now()),
            AccessDecision::Denied(DenialReason::InvalidSession)
        );
    }

    #[test]
    fn test_non_admin_denied() {
        let codec = codec();
        let user = token(&codec, "user", Duration::hours(1));
        assert_eq!(
            evaluate(Some(&user), &codec, Utc::now()),
            AccessDecision::Denied(DenialReason::NotAdmin)
        );
    }

    #[test]
    fn test_expired_admin_denied_despite_valid_signature() {
        let codec = codec();
        let admin = token(&codec, "admin", Duration::hours(24));
        let later = Utc::now() + Duration::hours(25);
        assert_eq!(
            evaluate(Some(&admin), &codec, later),
            AccessDecision::Denied(DenialReason::Expired)
        );
    }

    #[test]
    fn test_valid_admin_allowed() {
        let codec = codec();
        let admin = token(&codec, "admin", Duration::hours(24));
        let decision = evaluate(Some(&admin), &codec, Utc::now());
        assert!(decision.is_allowed());
    }
}
