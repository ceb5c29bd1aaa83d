//! Field validators shared by the content entities

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidationError};

use crate::error::DomainError;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+(?:[-_][A-Za-z0-9]+)*$").expect("slug pattern is valid"));

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_PATTERN.is_match(slug) {
        Ok(())
    } else {
        let mut error = ValidationError::new("slug");
        error.message = Some("slug must be URL-safe (letters, digits, '-' or '_')".into());
        Err(error)
    }
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

/// Runs derive-based validation and converts failures into `DomainError`.
pub fn ensure_valid<T: Validate>(input: &T) -> Result<(), DomainError> {
    input.validate().map_err(DomainError::from)
}

/// Removes repeated page ids while keeping first-seen order.
pub fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_pattern() {
        assert!(validate_slug("sqli").is_ok());
        assert!(validate_slug("pentesting-web").is_ok());
        assert!(validate_slug("linux_hardening-2").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("with space").is_err());
        assert!(validate_slug("../etc/passwd").is_err());
        assert!(validate_slug("trailing-").is_err());
    }

    #[test]
    fn test_dedup_ids_keeps_order() {
        let ids = vec!["b".to_string(), "a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(dedup_ids(&ids), vec!["b", "a", "c"]);
    }
}
