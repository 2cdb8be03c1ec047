//! The ordering policy of one collection.
//!
//! A [`SortPolicy`] owns a validated [`SortConfig`] and exposes the two
//! halves of keeping a collection ordered: numbering records as they are
//! created, and rewriting the fewest positions needed to reorder them.
//!
//! The policy holds no other state; every call reads the store afresh.

use std::fmt::Debug;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::assign::{next_position, Positioned};
use crate::config::{Direction, SortConfig};
use crate::error::SortError;
use crate::plan::{plan_positions, required_changes};
use crate::scope::Scope;
use crate::store::OrderedStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortPolicy {
    config: SortConfig,
}

impl SortPolicy {
    /// Validate `config` and build a policy from it.
    pub fn new(config: SortConfig) -> Result<SortPolicy, SortError> {
        config.validate()?;
        return Ok(SortPolicy { config });
    }

    pub fn config(&self) -> &SortConfig {
        return &self.config;
    }

    /// Name of the position field.
    pub fn field(&self) -> &str {
        return &self.config.name;
    }

    pub fn step(&self) -> i64 {
        return self.config.step;
    }

    pub fn order(&self) -> Direction {
        return self.config.order;
    }

    /// The scope a record belongs to, from the configured scope fields.
    pub fn scope_of<R: Positioned>(&self, record: &R) -> Scope {
        return Scope::from_fields(&self.config.scope, |field| record.scope_value(field));
    }

    /// Position for the next record created in `scope`.
    pub fn next_position<S: OrderedStore>(&self, store: &S, scope: &Scope) -> Result<i64, SortError> {
        return next_position(store, scope, self.config.step);
    }

    /// Give `record` the next position of its scope unless it already has
    /// one. Returns whether a position was assigned.
    ///
    /// Meant to be called by a store adapter right before inserting a new
    /// record. An explicit position is always kept.
    pub fn assign_if_absent<S, R>(&self, store: &S, record: &mut R) -> Result<bool, SortError>
    where
        S: OrderedStore,
        R: Positioned,
    {
        if record.position().is_some() {
            return Ok(false);
        }
        let scope = self.scope_of(record);
        let position = self.next_position(store, &scope)?;
        record.set_position(position);
        debug!(field = %self.config.name, %scope, position, "assigned position");
        return Ok(true);
    }

    /// Check that `record` carries a position before it is persisted.
    pub fn validate<I: Debug, R: Positioned>(&self, id: &I, record: &R) -> Result<(), SortError> {
        if record.position().is_none() {
            return Err(SortError::MissingPosition {
                id: format!("{:?}", id),
            });
        }
        return Ok(());
    }

    /// Identifiers whose positions must change to turn `old` into `new`.
    pub fn changes_required<T>(&self, old: &[T], new: &[T]) -> Result<Vec<T>, SortError>
    where
        T: Clone + Eq + std::hash::Hash,
    {
        return required_changes(old, new);
    }

    /// Reorder the records of `new_order` within `scope` so that reading
    /// them back yields exactly `new_order`.
    ///
    /// Only the records in the change set are written, in a single
    /// [`apply_batch`](OrderedStore::apply_batch). All positions are
    /// computed before the first write, so a failure in planning leaves
    /// the store untouched. Returns the applied updates.
    pub fn sort_list<S>(
        &self,
        store: &mut S,
        scope: &Scope,
        new_order: &[S::Id],
    ) -> Result<Vec<(S::Id, i64)>, SortError>
    where
        S: OrderedStore,
    {
        let old_order = store
            .fetch_ordered_ids(scope, self.config.order, Some(new_order))
            .map_err(SortError::store)?;

        let found: FxHashSet<&S::Id> = old_order.iter().collect();
        let missing: Vec<&S::Id> = new_order.iter().filter(|id| !found.contains(id)).collect();
        if !missing.is_empty() {
            return Err(SortError::records_not_found(missing));
        }

        let changes = required_changes(&old_order, new_order)?;
        if changes.is_empty() {
            debug!(%scope, items = new_order.len(), "order unchanged");
            return Ok(Vec::new());
        }

        let mut snapshot: FxHashMap<S::Id, i64> = FxHashMap::default();
        snapshot.reserve(new_order.len());
        for id in new_order {
            let position = store
                .get_position(id)
                .map_err(SortError::store)?
                .ok_or_else(|| SortError::MissingPosition {
                    id: format!("{:?}", id),
                })?;
            snapshot.insert(id.clone(), position);
        }

        let updates = plan_positions(new_order, &changes, &snapshot, self.config.step, self.config.order)?;
        store.apply_batch(&updates).map_err(SortError::store)?;
        debug!(%scope, items = new_order.len(), changed = updates.len(), "reordered");
        return Ok(updates);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryRecord, MemoryStore};

    fn items(n: usize) -> (SortPolicy, MemoryStore) {
        let policy = SortPolicy::new(SortConfig::new("position")).unwrap();
        let mut store = MemoryStore::new();
        for _ in 0..n {
            store.create(&policy, MemoryRecord::new()).unwrap();
        }
        return (policy, store);
    }

    #[test]
    fn rejects_invalid_config() {
        let err = SortPolicy::new(SortConfig::new("position").with_step(0)).unwrap_err();
        assert!(matches!(err, SortError::InvalidConfiguration(_)));
    }

    #[test]
    fn creates_with_stepped_positions() {
        let (policy, store) = items(6);
        for id in 1..=6u64 {
            let record = store.get(id).unwrap();
            assert_eq!(record.position(), Some(id as i64 * policy.step()));
        }
    }

    #[test]
    fn explicit_position_is_kept() {
        let (policy, mut store) = items(2);
        let mut record = MemoryRecord::new().with_position(7);
        assert!(!policy.assign_if_absent(&store, &mut record).unwrap());
        assert_eq!(record.position(), Some(7));

        let id = store.create(&policy, record).unwrap();
        assert_eq!(store.get(id).unwrap().position(), Some(7));
    }

    #[test]
    fn validate_requires_position() {
        let (policy, _) = items(0);
        let err = policy.validate(&3u64, &MemoryRecord::new()).unwrap_err();
        assert!(matches!(err, SortError::MissingPosition { ref id } if id == "3"));
        policy.validate(&3u64, &MemoryRecord::new().with_position(1)).unwrap();
    }

    #[test]
    fn sort_list_reorders() {
        let (policy, mut store) = items(7);
        let target = [1, 3, 5, 4, 6, 2, 7];
        let updates = policy.sort_list(&mut store, &Scope::unscoped(), &target).unwrap();
        assert_eq!(updates.len(), 2);

        let ids = store.fetch_ordered_ids(&Scope::unscoped(), Direction::Asc, None).unwrap();
        assert_eq!(ids, target.to_vec());
    }

    #[test]
    fn sort_list_no_op_writes_nothing() {
        let (policy, mut store) = items(4);
        let updates = policy.sort_list(&mut store, &Scope::unscoped(), &[1, 2, 3, 4]).unwrap();
        assert!(updates.is_empty());
        assert_eq!(store.get(4).unwrap().position(), Some(2000));
    }

    #[test]
    fn sort_list_unknown_ids() {
        let (policy, mut store) = items(3);
        let err = policy.sort_list(&mut store, &Scope::unscoped(), &[3, 9, 1]).unwrap_err();
        match err {
            SortError::RecordsNotFound { missing } => assert_eq!(missing, vec!["9".to_string()]),
            other => panic!("expected RecordsNotFound, got {:?}", other),
        }
    }

    #[test]
    fn sort_list_duplicate_ids() {
        let (policy, mut store) = items(3);
        let err = policy.sort_list(&mut store, &Scope::unscoped(), &[3, 1, 3]).unwrap_err();
        assert!(matches!(err, SortError::SizeMismatch { old: 2, new: 3 }));
    }

    #[test]
    fn degenerate_gap_writes_nothing() {
        let policy = SortPolicy::new(SortConfig::new("position")).unwrap();
        let mut store = MemoryStore::new();
        store.insert_raw(MemoryRecord::new().with_position(100));
        store.insert_raw(MemoryRecord::new().with_position(200));
        store.insert_raw(MemoryRecord::new().with_position(200));
        store.insert_raw(MemoryRecord::new().with_position(300));

        // 4 moves between 2 and 3, which share position 200.
        let err = policy.sort_list(&mut store, &Scope::unscoped(), &[1, 2, 4, 3]).unwrap_err();
        assert!(matches!(err, SortError::DegenerateGap { position: 200 }));
        assert_eq!(store.get(4).unwrap().position(), Some(300));
        assert!(!store.has_staged());
    }
}
