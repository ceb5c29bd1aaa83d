// ============================================================================
// CMS Core - Authentication Service
// File: crates/cms-core/src/services/auth_service.rs
// ============================================================================
//! Credential gate: admin login, session lookup, and admin provisioning

use std::sync::Arc;

use chrono::{Duration, Utc};
use cms_security::{IssuedSession, PasswordService, SessionCodec, SessionIdentity};
use cms_shared::config::PasswordCheck;
use cms_shared::utils::mask_email;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{Role, User};
use crate::error::DomainError;
use crate::repositories::UserRepository;

/// Authentication service for the admin login flow
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    codec: Arc<SessionCodec>,
    session_ttl: Duration,
    password_check: PasswordCheck,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        codec: Arc<SessionCodec>,
        session_ttl: Duration,
        password_check: PasswordCheck,
    ) -> Self {
        Self {
            user_repo,
            codec,
            session_ttl,
            password_check,
        }
    }

    /// Login with email and password.
    ///
    /// Returns `None` for an unknown email, a non-admin account, or (with
    /// `PasswordCheck::Argon2`) a password that does not match. With the
    /// default `PasswordCheck::Disabled` the password is not inspected.
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<LoginOutcome>, DomainError> {
        let masked = mask_email(email);
        info!("Login attempt for email: {}", masked);

        // 1. Find user by email
        let mut user = match self.user_repo.find_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("Login failed: email not found: {}", masked);
                return Ok(None);
            }
        };

        // 2. Role gate
        if !user.is_admin() {
            warn!("Login failed: {} is not an admin", masked);
            return Ok(None);
        }

        // 3. Password, only when enabled
        if self.password_check == PasswordCheck::Argon2 && !self.password_matches(&user, password) {
            warn!("Login failed: password rejected for: {}", masked);
            return Ok(None);
        }

        // 4. Update last login
        let now = Utc::now();
        if let Err(e) = self.user_repo.record_login(&user.id, now).await {
            error!("Failed to update last login: {}", e);
            // Don't fail login for this
        }
        user.record_login(now);

        // 5. Issue session
        let session = self
            .codec
            .issue(
                SessionIdentity {
                    user_id: user.id.to_string(),
                    email: user.email.clone(),
                    role: user.role.as_str().to_string(),
                },
                self.session_ttl,
            )
            .map_err(|e| DomainError::SessionError(e.to_string()))?;

        info!("Login successful for: {}", masked);
        Ok(Some(LoginOutcome { user, session }))
    }

    fn password_matches(&self, user: &User, password: &str) -> bool {
        let Some(hash) = user.password_hash.as_deref() else {
            return false;
        };
        match PasswordService::verify(password, hash) {
            Ok(valid) => valid,
            Err(e) => {
                error!("Stored password hash for {} is unreadable: {}", user.id, e);
                false
            }
        }
    }

    /// Resolves a session token to a fresh user record.
    ///
    /// Invalid, expired, or orphaned sessions yield `None`.
    pub async fn current_user(&self, token: &str) -> Result<Option<User>, DomainError> {
        let claims = match self.codec.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Rejected session: {}", e);
                return Ok(None);
            }
        };

        if claims.is_expired_at(Utc::now()) {
            return Ok(None);
        }

        let Ok(user_id) = Uuid::parse_str(&claims.user_id) else {
            warn!("Session carries a non-uuid user id");
            return Ok(None);
        };

        self.user_repo.find_by_id(&user_id).await
    }

    /// Creates an admin account unless the email is already registered.
    pub async fn create_admin(
        &self,
        username: &str,
        email: &str,
        password: Option<&str>,
    ) -> Result<ProvisionOutcome, DomainError> {
        if let Some(existing) = self.user_repo.find_by_email(email).await? {
            return Ok(ProvisionOutcome::AlreadyExists(existing));
        }

        let password_hash = password
            .map(PasswordService::hash)
            .transpose()
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;

        let user = User::new(username.to_string(), email.to_string(), Role::Admin, password_hash)?;
        let created = self.user_repo.create(&user).await?;

        info!("Admin user created: {}", created.id);
        Ok(ProvisionOutcome::Created(created))
    }
}

/// Result of successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub session: IssuedSession,
}

#[derive(Debug, Clone)]
pub enum ProvisionOutcome {
    Created(User),
    AlreadyExists(User),
}
