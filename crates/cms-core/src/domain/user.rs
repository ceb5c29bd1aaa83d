//! User domain entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use cms_shared::constants::{ROLE_ADMIN, ROLE_USER};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainError;

/// Role is the only authorization signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::User => ROLE_USER,
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_USER => Ok(Role::User),
            other => Err(DomainError::ValidationError(format!("Unknown role: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Username must be between 1 and 100 characters"))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    pub role: Role,

    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        username: String,
        email: String,
        role: Role,
        password_hash: Option<String>,
    ) -> Result<Self, validator::ValidationErrors> {
        let user = Self {
            id: cms_shared::new_id(),
            username: username.trim().to_string(),
            email: email.trim().to_lowercase(),
            role,
            password_hash,
            created_at: Utc::now(),
            last_login: None,
        };

        user.validate()?;
        Ok(user)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login = Some(at);
    }
}
