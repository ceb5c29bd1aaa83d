//! Common types

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

pub type EntityId = Uuid;

/// Internal record identity assigned by the store.
pub type RecordId = i64;

pub fn new_id() -> EntityId {
    Uuid::new_v4()
}

/// Application-level string id for content documents.
pub fn new_content_id() -> String {
    Uuid::new_v4().to_string()
}

/// Distinguishes an absent field from an explicit `null` in partial updates:
/// absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
/// Pair with `#[serde(default)]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
