//! Which records have to move to turn one ordering into another.
//!
//! The search is greedy: walk both orderings together and, at the first
//! index where they disagree, declare the item the new ordering holds
//! there to be the one that moved. Drop it from both orderings and keep
//! walking. Whatever survives is in the same relative order in both lists
//! and keeps its stored position.
//!
//! A single relocation costs one change when scanned from the side it
//! moved away from, but many when scanned from the other side (moving the
//! first item to the end looks like everything else moving up by one). So
//! when the forward pass finds a noticeable number of changes the reversed
//! orderings are scanned too and the shorter answer wins.
//!
//! This is a heuristic, not a minimum edit distance. Swapping the first and
//! last item costs `n - 1` changes in both directions rather than two.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::SortError;

/// Identifiers whose positions must change to realise `new` from `old`,
/// in the order they were discovered.
///
/// Fails with `SizeMismatch` when the orderings differ in length.
pub fn required_changes<T>(old: &[T], new: &[T]) -> Result<Vec<T>, SortError>
where
    T: Clone + Eq + Hash,
{
    if old.len() != new.len() {
        return Err(SortError::SizeMismatch {
            old: old.len(),
            new: new.len(),
        });
    }

    let forward = calculate_changes(old.iter(), new.iter());
    if forward.len() < new.len() / 4 {
        trace!(forward = forward.len(), "forward pass is cheap enough");
        return Ok(forward);
    }

    let backward = calculate_changes(old.iter().rev(), new.iter().rev());
    trace!(forward = forward.len(), backward = backward.len(), "compared both scan directions");
    // Ties keep the forward proposal.
    if backward.len() < forward.len() {
        return Ok(backward);
    }
    return Ok(forward);
}

/// One greedy pass of first-mismatch removal over `old` and `new`.
///
/// Removing the first mismatching item and rescanning from the start never
/// disturbs the prefix that already matched: the removed item comes from
/// `new` at the mismatch index, and since identifiers are unique it cannot
/// appear in the matched part of `old` either. So the rescan can resume at
/// the mismatch index, and the whole pass is a single walk with a cursor
/// into each ordering plus a tombstone per `old` slot.
pub fn calculate_changes<'a, T, O, N>(old: O, new: N) -> Vec<T>
where
    T: Clone + Eq + Hash + 'a,
    O: IntoIterator<Item = &'a T>,
    N: IntoIterator<Item = &'a T>,
{
    let old: Vec<&T> = old.into_iter().collect();
    let mut slot_of: FxHashMap<&T, usize> = FxHashMap::default();
    slot_of.reserve(old.len());
    for (slot, id) in old.iter().enumerate() {
        slot_of.insert(*id, slot);
    }
    let mut removed = vec![false; old.len()];

    let mut changes = Vec::new();
    let mut cursor = 0;
    for id in new {
        while cursor < old.len() && removed[cursor] {
            cursor += 1;
        }
        if cursor < old.len() && old[cursor] == id {
            cursor += 1;
            continue;
        }

        // Mismatch (or `old` ran out): this item moved.
        changes.push(id.clone());
        if let Some(&slot) = slot_of.get(id) {
            removed[slot] = true;
        }
    }
    return changes;
}
