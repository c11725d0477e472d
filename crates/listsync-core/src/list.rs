//! The visible list
//!
//! Ordered in-memory collection of items for one client. Order is the
//! user-manipulable sort order; identity is the item id. Mutated by local
//! actions and by remote messages applied through the sync client.

use crate::models::{Item, ItemId};

/// Per-client ordered collection of items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoList {
    items: Vec<Item>,
}

impl TodoList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list from items loaded out of storage
    pub fn from_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// The items in visible order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids in visible order
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|i| i.id).collect()
    }

    /// Position of an item, if present
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Append an item at the end
    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Remove the first item with the given id; `None` when absent (no-op)
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let pos = self.position(id)?;
        Some(self.items.remove(pos))
    }

    /// Relocate `moved_id` to immediately follow `after_id`.
    ///
    /// `after_id = None` means move to the end. Returns `false` without
    /// changes when `moved_id` is absent. An `after_id` that is not in the
    /// list also moves the item to the end (defined policy for a
    /// target-not-found reorder).
    pub fn reorder(&mut self, moved_id: ItemId, after_id: Option<ItemId>) -> bool {
        let Some(pos) = self.position(moved_id) else {
            return false;
        };
        let item = self.items.remove(pos);
        match after_id.and_then(|a| self.position(a)) {
            Some(after_pos) => self.items.insert(after_pos + 1, item),
            None => self.items.push(item),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> TodoList {
        TodoList::from_items(vec![
            Item::with_id(1, "A"),
            Item::with_id(2, "B"),
            Item::with_id(3, "C"),
        ])
    }

    #[test]
    fn test_push_and_remove() {
        let mut list = TodoList::new();
        list.push(Item::with_id(1, "A"));
        list.push(Item::with_id(2, "B"));
        assert_eq!(list.ids(), vec![1, 2]);

        let removed = list.remove(1).unwrap();
        assert_eq!(removed.text, "A");
        assert_eq!(list.ids(), vec![2]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut list = abc();
        assert!(list.remove(99).is_none());
        assert_eq!(list.ids(), vec![1, 2, 3]);
        // twice as well
        assert!(list.remove(99).is_none());
        assert_eq!(list.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_reorder_after_item() {
        // [A,B,C], move C after A -> [A,C,B]
        let mut list = abc();
        assert!(list.reorder(3, Some(1)));
        assert_eq!(list.ids(), vec![1, 3, 2]);
    }

    #[test]
    fn test_reorder_to_end() {
        // [A,B,C], move A to end -> [B,C,A]
        let mut list = abc();
        assert!(list.reorder(1, None));
        assert_eq!(list.ids(), vec![2, 3, 1]);
    }

    #[test]
    fn test_reorder_missing_moved_is_noop() {
        let mut list = abc();
        assert!(!list.reorder(99, Some(1)));
        assert_eq!(list.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_reorder_unknown_after_moves_to_end() {
        let mut list = abc();
        assert!(list.reorder(1, Some(99)));
        assert_eq!(list.ids(), vec![2, 3, 1]);
    }

    #[test]
    fn test_reorder_is_stable_for_others() {
        let mut list = TodoList::from_items(vec![
            Item::with_id(1, "A"),
            Item::with_id(2, "B"),
            Item::with_id(3, "C"),
            Item::with_id(4, "D"),
        ]);
        list.reorder(4, Some(1));
        assert_eq!(list.ids(), vec![1, 4, 2, 3]);
    }
}
