//! Client sync state machine
//!
//! Owns the visible list and the local store, and applies the mutation
//! rules for both local actions (persist, then broadcast) and remote
//! messages (apply to the visible list only; the sender already owns
//! persistence of its own actions).

use tokio::sync::mpsc;

use crate::list::TodoList;
use crate::models::{Item, ItemId};
use crate::protocol::SyncMessage;
use crate::store::LocalStore;

/// Whether a broadcast channel is currently attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No channel attached; local actions mutate and persist only
    Disconnected,
    /// Channel attached; local actions are also broadcast
    Connected,
}

/// Per-client synchronization state machine
///
/// Local mutations go through `add_local` / `remove_local` /
/// `reorder_local`; frames arriving from peers go through `apply_remote`.
/// After any sequence of local operations the visible list and the store
/// contain the same items.
pub struct SyncClient {
    list: TodoList,
    store: LocalStore,
    outbound: Option<mpsc::UnboundedSender<SyncMessage>>,
}

impl SyncClient {
    /// Create a client, loading the visible list from the store
    pub fn new(store: LocalStore) -> Self {
        let list = TodoList::from_items(store.load());
        Self {
            list,
            store,
            outbound: None,
        }
    }

    pub fn status(&self) -> SyncStatus {
        if self.outbound.is_some() {
            SyncStatus::Connected
        } else {
            SyncStatus::Disconnected
        }
    }

    /// The visible list in order
    pub fn items(&self) -> &[Item] {
        self.list.items()
    }

    /// Attach a broadcast channel; subsequent local actions are sent on it
    pub fn attach(&mut self, outbound: mpsc::UnboundedSender<SyncMessage>) {
        self.outbound = Some(outbound);
    }

    /// Detach the broadcast channel; local actions stop being sent
    pub fn detach(&mut self) {
        self.outbound = None;
    }

    /// Add an item with the given text
    ///
    /// Whitespace-only text is rejected and nothing happens. Returns the
    /// created item otherwise.
    pub fn add_local(&mut self, text: &str) -> Option<Item> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let item = Item::new(text);
        self.list.push(item.clone());
        if let Err(err) = self.store.append(&item) {
            tracing::warn!(error = %err, "Failed to persist added item");
        }
        self.broadcast(SyncMessage::add(item.clone()));
        Some(item)
    }

    /// Remove the item with the given id
    ///
    /// The remove is broadcast even when the id is not in the visible list,
    /// so peers that still hold the item drop it too.
    pub fn remove_local(&mut self, id: ItemId) -> Option<Item> {
        let removed = self.list.remove(id);
        if let Err(err) = self.store.remove_by_id(id) {
            tracing::warn!(error = %err, "Failed to persist removal");
        }
        self.broadcast(SyncMessage::remove(id));
        removed
    }

    /// Relocate an item to follow `after_id` (`None` = end of list)
    ///
    /// A reorder of an absent item does nothing and sends nothing.
    pub fn reorder_local(&mut self, moved_id: ItemId, after_id: Option<ItemId>) -> bool {
        if !self.list.reorder(moved_id, after_id) {
            return false;
        }
        if let Err(err) = self.store.save_all(self.list.items()) {
            tracing::warn!(error = %err, "Failed to persist reorder");
        }
        self.broadcast(SyncMessage::reorder(moved_id, after_id));
        true
    }

    /// Apply a message received from a peer
    ///
    /// Remote mutations change the visible list only; they are never
    /// persisted here and never re-broadcast.
    pub fn apply_remote(&mut self, msg: SyncMessage) {
        match msg {
            SyncMessage::Add { todo_item } => {
                self.list.push(todo_item);
            }
            SyncMessage::Remove { id } => {
                self.list.remove(id);
            }
            SyncMessage::Reorder { moved_id, after_id } => {
                self.list.reorder(moved_id, after_id);
            }
        }
    }

    fn broadcast(&mut self, msg: SyncMessage) {
        if let Some(tx) = &self.outbound {
            if tx.send(msg).is_err() {
                // Channel task is gone; fall back to offline behavior
                self.outbound = None;
            }
        }
    }
}
