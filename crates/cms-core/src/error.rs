//! Domain errors

use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Menu not found: {0}")]
    MenuNotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        DomainError::ValidationError(format!("Missing or invalid fields: {}", fields.join(", ")))
    }
}
