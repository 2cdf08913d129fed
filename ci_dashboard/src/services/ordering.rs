//! "Most recently active first" ordering of the repository list.

use serde::Serialize;

/// Where an item ended up relative to where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Not in the list before; now at the head.
    Inserted,
    /// Moved from `from` to the head.
    Moved { from: usize },
    /// Already at the head, or updated where it stands.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reordered<T> {
    pub order: Vec<T>,
    pub placement: Placement,
}

/// Returns `order` with `active` at the head, keeping everything else in place.
pub fn most_recent_first<T: Copy + PartialEq>(order: &[T], active: T) -> Reordered<T> {
    let previous = order.iter().position(|item| *item == active);
    let mut reordered = Vec::with_capacity(order.len() + usize::from(previous.is_none()));
    reordered.push(active);
    reordered.extend(order.iter().copied().filter(|item| *item != active));
    Reordered {
        order: reordered,
        placement: placement_of(previous),
    }
}

/// Placement of an item that was surfaced to the head from `previous`.
pub fn placement_of(previous: Option<usize>) -> Placement {
    match previous {
        None => Placement::Inserted,
        Some(0) => Placement::Unchanged,
        Some(from) => Placement::Moved { from },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_item_is_inserted_at_head() {
        let result = most_recent_first(&[1, 2, 3], 9);
        assert_eq!(result.order, vec![9, 1, 2, 3]);
        assert_eq!(result.placement, Placement::Inserted);
    }

    #[test]
    fn known_item_moves_to_head_preserving_the_rest() {
        let result = most_recent_first(&[1, 2, 3, 4], 3);
        assert_eq!(result.order, vec![3, 1, 2, 4]);
        assert_eq!(result.placement, Placement::Moved { from: 2 });
    }

    #[test]
    fn head_item_stays() {
        let result = most_recent_first(&[1, 2], 1);
        assert_eq!(result.order, vec![1, 2]);
        assert_eq!(result.placement, Placement::Unchanged);
    }

    #[test]
    fn empty_list() {
        let result = most_recent_first(&[], 5);
        assert_eq!(result.order, vec![5]);
        assert_eq!(result.placement, Placement::Inserted);
    }
}
