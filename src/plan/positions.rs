//! New positions for the records of a change set.
//!
//! Every moved record is centred between its neighbours in the new
//! ordering, reading the neighbours' positions from a snapshot taken before
//! any write. Neighbours that are themselves moving have no meaningful
//! snapshot position, so consecutive moved records are handled as one run
//! and spread across the gap between the nearest records that stay put.
//!
//! At the ends there is only one stationary neighbour. The gap is then
//! extended by one step per moved record past that neighbour: beyond the
//! last record at the tail, before the first one at the head. A lone moved
//! record therefore lands half a step past the end of the list, and the
//! head is treated exactly like the tail, which also covers two-item lists.

use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::config::Direction;
use crate::error::SortError;
use crate::plan::center::spread;

/// Compute `(id, position)` updates for the members of `changes`, in
/// `new_order` order.
///
/// `snapshot` must hold the current position of every record adjacent to
/// a moved one. Members of `changes` absent from `new_order` are ignored.
pub fn plan_positions<T>(
    new_order: &[T],
    changes: &[T],
    snapshot: &FxHashMap<T, i64>,
    step: i64,
    order: Direction,
) -> Result<Vec<(T, i64)>, SortError>
where
    T: Clone + Eq + Hash + Debug,
{
    let moving: FxHashSet<&T> = changes.iter().collect();
    let position_of = |id: &T| -> Result<i64, SortError> {
        return snapshot.get(id).copied().ok_or_else(|| SortError::MissingPosition {
            id: format!("{:?}", id),
        });
    };

    let mut updates = Vec::with_capacity(changes.len());
    let mut runs = 0usize;
    let mut index = 0;
    while index < new_order.len() {
        if !moving.contains(&new_order[index]) {
            index += 1;
            continue;
        }

        let start = index;
        while index < new_order.len() && moving.contains(&new_order[index]) {
            index += 1;
        }
        let run = &new_order[start..index];
        runs += 1;

        let before = match start {
            0 => None,
            _ => Some(position_of(&new_order[start - 1])?),
        };
        let after = match new_order.get(index) {
            Some(id) => Some(position_of(id)?),
            None => None,
        };
        let extent = i64::try_from(run.len())
            .ok()
            .and_then(|len| len.checked_mul(step))
            .ok_or(SortError::PositionOverflow)?;

        let (from, to) = match (before, after) {
            (Some(before), Some(after)) => (before, after),
            (Some(before), None) => {
                let to = order.advance(before, extent).ok_or(SortError::PositionOverflow)?;
                (before, to)
            }
            (None, Some(after)) => {
                let from = order.retreat(after, extent).ok_or(SortError::PositionOverflow)?;
                (from, after)
            }
            (None, None) => {
                // Nothing stays put: lay the whole list out afresh.
                let to = step
                    .checked_add(extent)
                    .and_then(|end| order.advance(0, end))
                    .ok_or(SortError::PositionOverflow)?;
                (0, to)
            }
        };

        let positions = spread(from, to, run.len())?;
        updates.extend(run.iter().cloned().zip(positions));
    }

    debug!(moved = updates.len(), runs, "planned positions");
    return Ok(updates);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Positions `step, 2 * step, ...` for ids `1..=n`, as freshly created.
    fn fresh(n: u32, step: i64) -> FxHashMap<u32, i64> {
        return (1..=n).map(|id| (id, id as i64 * step)).collect();
    }

    fn apply(snapshot: &FxHashMap<u32, i64>, updates: &[(u32, i64)], order: Direction) -> Vec<u32> {
        let mut positions = snapshot.clone();
        for (id, p) in updates {
            positions.insert(*id, *p);
        }
        let mut ids: Vec<(i64, u32)> = positions.into_iter().map(|(id, p)| (p, id)).collect();
        ids.sort_unstable();
        if order == Direction::Desc {
            ids.reverse();
        }
        return ids.into_iter().map(|(_, id)| id).collect();
    }

    #[test]
    fn moves_into_the_middle() {
        let snapshot = fresh(7, 500);
        let new = [1, 3, 5, 4, 6, 2, 7];
        let updates = plan_positions(&new, &[2, 4], &snapshot, 500, Direction::Asc).unwrap();
        assert_eq!(updates, vec![(4, 2750), (2, 3250)]);
        assert_eq!(apply(&snapshot, &updates, Direction::Asc), new.to_vec());
    }

    #[test]
    fn moves_to_the_tail() {
        let snapshot = fresh(4, 100);
        let new = [2, 3, 4, 1];
        let updates = plan_positions(&new, &[1], &snapshot, 100, Direction::Asc).unwrap();
        assert_eq!(updates, vec![(1, 450)]);
    }

    #[test]
    fn moves_to_the_head() {
        let snapshot = fresh(4, 100);
        let new = [4, 1, 2, 3];
        let updates = plan_positions(&new, &[4], &snapshot, 100, Direction::Asc).unwrap();
        assert_eq!(updates, vec![(4, 50)]);
        assert_eq!(apply(&snapshot, &updates, Direction::Asc), new.to_vec());
    }

    #[test]
    fn two_item_list() {
        let snapshot = fresh(2, 500);
        let updates = plan_positions(&[2, 1], &[2], &snapshot, 500, Direction::Asc).unwrap();
        assert_eq!(updates, vec![(2, 250)]);

        let updates = plan_positions(&[2, 1], &[1], &snapshot, 500, Direction::Asc).unwrap();
        assert_eq!(updates, vec![(1, 1250)]);
    }

    #[test]
    fn adjacent_moves_share_the_gap() {
        let snapshot = fresh(6, 300);
        let new = [1, 5, 6, 2, 3, 4];
        let updates = plan_positions(&new, &[5, 6], &snapshot, 300, Direction::Asc).unwrap();
        assert_eq!(updates, vec![(5, 400), (6, 500)]);
        assert_eq!(apply(&snapshot, &updates, Direction::Asc), new.to_vec());
    }

    #[test]
    fn adjacent_moves_at_both_ends() {
        let snapshot = fresh(6, 300);
        let new = [5, 6, 3, 4, 1, 2];
        let updates = plan_positions(&new, &[5, 6, 1, 2], &snapshot, 300, Direction::Asc).unwrap();
        assert_eq!(updates, vec![(5, 500), (6, 700), (1, 1400), (2, 1600)]);
        assert_eq!(apply(&snapshot, &updates, Direction::Asc), new.to_vec());
    }

    #[test]
    fn descending_order_extends_downwards() {
        // Highest first: ids 3, 2, 1 at 1500, 1000, 500.
        let snapshot = fresh(3, 500);
        let new = [2, 1, 3];
        let updates = plan_positions(&new, &[3], &snapshot, 500, Direction::Desc).unwrap();
        assert_eq!(updates, vec![(3, 250)]);
        assert_eq!(apply(&snapshot, &updates, Direction::Desc), new.to_vec());

        let new = [1, 3, 2];
        let updates = plan_positions(&new, &[1], &snapshot, 500, Direction::Desc).unwrap();
        assert_eq!(updates, vec![(1, 1750)]);
        assert_eq!(apply(&snapshot, &updates, Direction::Desc), new.to_vec());
    }

    #[test]
    fn everything_moving_is_laid_out_afresh() {
        let snapshot = fresh(3, 10);
        let updates = plan_positions(&[3, 1, 2], &[3, 1, 2], &snapshot, 10, Direction::Asc).unwrap();
        assert_eq!(updates, vec![(3, 10), (1, 20), (2, 30)]);
    }

    #[test]
    fn duplicate_neighbours_are_degenerate() {
        let mut snapshot = fresh(3, 500);
        snapshot.insert(3, 500);
        let err = plan_positions(&[1, 2, 3], &[2], &snapshot, 500, Direction::Asc).unwrap_err();
        assert!(matches!(err, SortError::DegenerateGap { position: 500 }));
    }

    #[test]
    fn adjacent_neighbours_exhaust_the_gap() {
        let mut snapshot = fresh(3, 500);
        snapshot.insert(1, 999);
        snapshot.insert(3, 1000);
        let updates = plan_positions(&[1, 2, 3], &[2], &snapshot, 500, Direction::Asc).unwrap();
        assert_eq!(updates, vec![(2, 1000)]);
    }

    #[test]
    fn missing_neighbour_position() {
        let mut snapshot = fresh(3, 500);
        snapshot.remove(&1);
        let err = plan_positions(&[1, 3, 2], &[3], &snapshot, 500, Direction::Asc).unwrap_err();
        assert!(matches!(err, SortError::MissingPosition { .. }));
    }

    #[test]
    fn overflow_past_the_tail() {
        let mut snapshot = FxHashMap::default();
        snapshot.insert(1u32, i64::MAX - 10);
        snapshot.insert(2u32, 0);
        let err = plan_positions(&[1, 2], &[2], &snapshot, 500, Direction::Asc).unwrap_err();
        assert!(matches!(err, SortError::PositionOverflow));
    }

    #[test]
    fn empty_change_set_plans_nothing() {
        let snapshot = fresh(3, 500);
        let updates = plan_positions(&[1, 2, 3], &[], &snapshot, 500, Direction::Asc).unwrap();
        assert!(updates.is_empty());
    }
}
