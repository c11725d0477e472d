//! Data models for listsync
//!
//! Defines the to-do `Item` exchanged between clients and persisted locally.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Identifier for a to-do item.
///
/// Derived from the creation timestamp in milliseconds and kept strictly
/// increasing within a process. Two clients creating items in the same
/// millisecond can still collide, an accepted risk of the protocol.
pub type ItemId = i64;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Next timestamp-derived id, bumped past the previous one when two items
/// are created within the same millisecond
fn next_id() -> ItemId {
    let now = Utc::now().timestamp_millis();
    LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .map(|last| now.max(last + 1))
        .unwrap_or(now)
}

/// A single to-do entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    /// Unique identifier (creation time in Unix milliseconds)
    pub id: ItemId,
    /// The to-do text
    pub text: String,
}

impl Item {
    /// Create a new item with a timestamp-derived id
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            text: text.into(),
        }
    }

    /// Create an item with a specific id (for loading from storage)
    pub fn with_id(id: ItemId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_new() {
        let item = Item::new("buy milk");
        assert_eq!(item.text, "buy milk");
        assert!(item.id > 0);
    }

    #[test]
    fn test_ids_increase_within_process() {
        let a = Item::new("a");
        let b = Item::new("b");
        let c = Item::new("c");
        assert!(a.id < b.id);
        assert!(b.id < c.id);
    }

    #[test]
    fn test_item_with_id() {
        let item = Item::with_id(42, "walk dog");
        assert_eq!(item.id, 42);
        assert_eq!(item.text, "walk dog");
    }

    #[test]
    fn test_item_serialization() {
        let item = Item::with_id(1700000000000, "buy milk");
        let json = serde_json::to_string(&item).unwrap();
        let deserialized: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(item, deserialized);
    }

    #[test]
    fn test_item_json_shape() {
        let item = Item::with_id(7, "x");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value, serde_json::json!({ "id": 7, "text": "x" }));
    }
}
