//! Drag-and-drop reorder planning
//!
//! Maps a pointer position during a drag onto the reorder action the
//! protocol can express. Front-ends report the vertical geometry of the
//! rendered rows; this module picks the row the dragged item should land
//! before, then translates that into the wire's "insert after" form.

use crate::models::{Item, ItemId};

/// Vertical geometry of one rendered list row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBox {
    pub id: ItemId,
    /// Top edge in the list's coordinate space
    pub top: f64,
    pub height: f64,
}

impl ItemBox {
    pub fn new(id: ItemId, top: f64, height: f64) -> Self {
        Self { id, top, height }
    }
}

/// The reorder a completed drop translates to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPlan {
    /// Relocate the dragged item after `after` (`None` = end of list)
    Move { after: Option<ItemId> },
    /// The drop does not change the visible order; send nothing
    Stay,
}

/// Pick the row the dragged item should be inserted before.
///
/// A row is a candidate when the pointer is above its vertical midpoint;
/// among candidates, the closest one wins. The dragged item's own row is
/// skipped. `None` means the pointer is below every midpoint and the item
/// goes to the end.
pub fn drop_target(dragging: ItemId, pointer_y: f64, boxes: &[ItemBox]) -> Option<ItemId> {
    let mut best: Option<(f64, ItemId)> = None;
    for b in boxes {
        if b.id == dragging {
            continue;
        }
        let offset = pointer_y - b.top - b.height / 2.0;
        if offset >= 0.0 {
            continue;
        }
        match best {
            Some((best_offset, _)) if offset <= best_offset => {}
            _ => best = Some((offset, b.id)),
        }
    }
    best.map(|(_, id)| id)
}

/// Translate an insert-before target into the protocol's insert-after form.
///
/// `before` is the row the item should land in front of, as chosen by
/// [`drop_target`]; the wire instead names the item that precedes the new
/// position. A drop that leaves the order unchanged, and a drop at the very
/// front when nothing precedes the target, both plan as [`DropPlan::Stay`]
/// (the latter has no insert-after encoding).
pub fn plan_drop(items: &[Item], moved_id: ItemId, before: Option<ItemId>) -> DropPlan {
    let Some(moved_pos) = items.iter().position(|i| i.id == moved_id) else {
        return DropPlan::Stay;
    };

    let Some(before_id) = before else {
        // Dropping past the last row
        if moved_pos == items.len() - 1 {
            return DropPlan::Stay;
        }
        return DropPlan::Move { after: None };
    };

    let Some(before_pos) = items.iter().position(|i| i.id == before_id) else {
        return DropPlan::Stay;
    };

    // Already directly above the target row
    if moved_pos + 1 == before_pos {
        return DropPlan::Stay;
    }

    match items[..before_pos].iter().rev().find(|i| i.id != moved_id) {
        Some(prev) => DropPlan::Move {
            after: Some(prev.id),
        },
        None => DropPlan::Stay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<ItemBox> {
        // Three 40px rows stacked from y=0
        vec![
            ItemBox::new(1, 0.0, 40.0),
            ItemBox::new(2, 40.0, 40.0),
            ItemBox::new(3, 80.0, 40.0),
        ]
    }

    fn items() -> Vec<Item> {
        vec![
            Item::with_id(1, "A"),
            Item::with_id(2, "B"),
            Item::with_id(3, "C"),
        ]
    }

    #[test]
    fn test_drop_target_above_first_midpoint() {
        // Pointer near the top: insert before the first row
        assert_eq!(drop_target(3, 5.0, &rows()), Some(1));
    }

    #[test]
    fn test_drop_target_between_rows() {
        // Pointer just below row 1's midpoint: insert before row 2
        assert_eq!(drop_target(3, 30.0, &rows()), Some(2));
    }

    #[test]
    fn test_drop_target_below_all_midpoints() {
        assert_eq!(drop_target(1, 150.0, &rows()), None);
    }

    #[test]
    fn test_drop_target_skips_dragged_row() {
        // Pointer over row 2's upper half while dragging row 2 itself:
        // the nearest other candidate is row 3
        assert_eq!(drop_target(2, 45.0, &rows()), Some(3));
    }

    #[test]
    fn test_drop_target_empty_list() {
        assert_eq!(drop_target(1, 10.0, &[]), None);
    }

    #[test]
    fn test_plan_drop_to_end() {
        assert_eq!(plan_drop(&items(), 1, None), DropPlan::Move { after: None });
    }

    #[test]
    fn test_plan_drop_already_last() {
        assert_eq!(plan_drop(&items(), 3, None), DropPlan::Stay);
    }

    #[test]
    fn test_plan_drop_before_row_names_predecessor() {
        // Move C before B: the wire says "after A"
        assert_eq!(
            plan_drop(&items(), 3, Some(2)),
            DropPlan::Move { after: Some(1) }
        );
    }

    #[test]
    fn test_plan_drop_no_position_change() {
        // B dropped right where it already sits
        assert_eq!(plan_drop(&items(), 2, Some(3)), DropPlan::Stay);
    }

    #[test]
    fn test_plan_drop_front_is_unrepresentable() {
        // Moving C before A would need "after nothing at the front",
        // which the wire cannot say
        assert_eq!(plan_drop(&items(), 3, Some(1)), DropPlan::Stay);
    }

    #[test]
    fn test_plan_drop_front_from_second_slot() {
        // B before A: only B itself precedes A, so there is no predecessor
        assert_eq!(plan_drop(&items(), 2, Some(1)), DropPlan::Stay);
    }

    #[test]
    fn test_plan_drop_unknown_ids() {
        assert_eq!(plan_drop(&items(), 99, Some(1)), DropPlan::Stay);
        assert_eq!(plan_drop(&items(), 1, Some(99)), DropPlan::Stay);
    }

    #[test]
    fn test_plan_drop_skips_moved_when_finding_predecessor() {
        // [A,B,C,D]: move B before D; C precedes D, not B itself
        let items = vec![
            Item::with_id(1, "A"),
            Item::with_id(2, "B"),
            Item::with_id(3, "C"),
            Item::with_id(4, "D"),
        ];
        assert_eq!(
            plan_drop(&items, 2, Some(4)),
            DropPlan::Move { after: Some(3) }
        );
    }
}
