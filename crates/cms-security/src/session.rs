//! Signed session tokens
//!
//! A session is an HS256 JWT carrying the user's identity and an absolute
//! `expires` instant. Nothing is stored server-side.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session signing failed: {0}")]
    Signing(String),
    #[error("Invalid session signature")]
    InvalidSignature,
    #[error("Malformed session token: {0}")]
    Malformed(String),
}

/// Who the session is issued to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub expires: DateTime<Utc>,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires
    }

    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub claims: SessionClaims,
}

pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, identity: SessionIdentity, ttl: Duration) -> Result<IssuedSession, SessionError> {
        let now = Utc::now();
        let expires = now + ttl;
        let claims = SessionClaims {
            user_id: identity.user_id,
            email: identity.email,
            role: identity.role,
            expires,
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionError::Signing(e.to_string()))?;

        Ok(IssuedSession { token, claims })
    }

    /// Checks the signature and decodes the claims.
    ///
    /// Expiry is not enforced here; callers compare `claims.expires` with the
    /// current time themselves.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => SessionError::InvalidSignature,
                _ => SessionError::Malformed(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> SessionIdentity {
        SessionIdentity {
            user_id: "6650f1c2a4".to_string(),
            email: "admin@hacktricks.com".to_string(),
            role: "admin".to_string(),
        }
    }

    #[test]
    fn test_issue_then_verify_returns_same_claims() {
        let codec = SessionCodec::new("test-secret");
        let issued = codec.issue(identity(), Duration::hours(24)).unwrap();

        let claims = codec.verify(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.identity(), identity());
        assert!(!claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let issued = SessionCodec::new("secret-a")
            .issue(identity(), Duration::hours(1))
            .unwrap();

        let err = SessionCodec::new("secret-b").verify(&issued.token).unwrap_err();
        assert_eq!(err, SessionError::InvalidSignature);
    }

    #[test]
    fn test_swapped_payload_is_invalid_signature() {
        let codec = SessionCodec::new("test-secret");
        let admin = codec.issue(identity(), Duration::hours(1)).unwrap();
        let mut other_identity = identity();
        other_identity.role = "user".to_string();
        let other = codec.issue(other_identity, Duration::hours(1)).unwrap();

        let admin_parts: Vec<&str> = admin.token.split('.').collect();
        let other_parts: Vec<&str> = other.token.split('.').collect();
        let forged = format!("{}.{}.{}", admin_parts[0], other_parts[1], admin_parts[2]);

        assert_eq!(codec.verify(&forged).unwrap_err(), SessionError::InvalidSignature);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = SessionCodec::new("test-secret");
        assert!(matches!(codec.verify("not-a-token"), Err(SessionError::Malformed(_))));
        assert!(matches!(codec.verify(""), Err(SessionError::Malformed(_))));
    }

    #[test]
    fn test_expired_token_still_verifies_but_reports_expiry() {
        let codec = SessionCodec::new("test-secret");
        let issued = codec.issue(identity(), Duration::hours(-1)).unwrap();

        let claims = codec.verify(&issued.token).unwrap();
        assert!(claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_claims_use_camel_case_keys() {
        let codec = SessionCodec::new("test-secret");
        let issued = codec.issue(identity(), Duration::hours(1)).unwrap();
        let json = serde_json::to_value(&issued.claims).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("expires").is_some());
    }
}
