//! Wire protocol for list synchronization
//!
//! Every mutation crosses the wire as one JSON text frame tagged by an
//! `action` field:
//!
//! - `{"action":"add","todoItem":{"id":...,"text":"..."}}`
//! - `{"action":"remove","id":...}`
//! - `{"action":"reorder","drid":...,"aeid":...}`
//!
//! `drid` is the id of the dragged (moved) item; `aeid` is the id of the
//! item it now follows, or `null` for end-of-list. Ids are accepted as JSON
//! numbers or as decimal strings, since some peers stringify them.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::models::{Item, ItemId};

/// A synchronization message exchanged between clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum SyncMessage {
    /// A new item was appended to the sender's list
    Add {
        #[serde(rename = "todoItem")]
        todo_item: Item,
    },

    /// An item was deleted from the sender's list
    Remove {
        #[serde(deserialize_with = "id_from_int_or_string")]
        id: ItemId,
    },

    /// An item was relocated within the sender's list
    Reorder {
        /// Id of the moved item
        #[serde(rename = "drid", deserialize_with = "id_from_int_or_string")]
        moved_id: ItemId,
        /// Id of the item it now follows; `None` means end of list
        #[serde(
            rename = "aeid",
            default,
            deserialize_with = "opt_id_from_int_or_string"
        )]
        after_id: Option<ItemId>,
    },
}

impl SyncMessage {
    /// Build an add message for a new item
    pub fn add(item: Item) -> Self {
        SyncMessage::Add { todo_item: item }
    }

    /// Build a remove message for an item id
    pub fn remove(id: ItemId) -> Self {
        SyncMessage::Remove { id }
    }

    /// Build a reorder message placing `moved_id` after `after_id`
    pub fn reorder(moved_id: ItemId, after_id: Option<ItemId>) -> Self {
        SyncMessage::Reorder { moved_id, after_id }
    }

    /// Encode to the JSON wire format
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("JSON encoding failed")
    }

    /// Decode from the JSON wire format
    ///
    /// Fails on malformed JSON, a missing field, or an unknown `action`;
    /// receivers ignore frames that fail to decode.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Accepted encodings of an item id on the wire
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(i64),
    Text(String),
}

impl RawId {
    fn resolve<E: de::Error>(self) -> Result<ItemId, E> {
        match self {
            RawId::Num(n) => Ok(n),
            RawId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid item id: {s:?}"))),
        }
    }
}

fn id_from_int_or_string<'de, D>(deserializer: D) -> Result<ItemId, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer)?.resolve()
}

fn opt_id_from_int_or_string<'de, D>(deserializer: D) -> Result<Option<ItemId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawId>::deserialize(deserializer)? {
        Some(raw) => raw.resolve().map(Some),
        None => Ok(None),
    }
}
