//! In-memory ordered store.
//!
//! Records get auto-incrementing ids starting at 1, like rows of a fresh
//! database table. Position writes are staged by `set_position` and only
//! become visible once `persist`ed, so a reorder that fails half way can be
//! observed exactly as a real adapter would leave it.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::assign::Positioned;
use crate::config::Direction;
use crate::error::SortError;
use crate::policy::SortPolicy;
use crate::scope::{Scope, ScopeValue};
use crate::store::OrderedStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("record {0} not found")]
    NotFound(u64),

    #[error("record {0} has no staged position to persist")]
    NothingStaged(u64),
}

/// A stored record: an optional position plus its scope fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryRecord {
    position: Option<i64>,
    fields: BTreeMap<String, ScopeValue>,
}

impl MemoryRecord {
    pub fn new() -> MemoryRecord {
        return MemoryRecord::default();
    }

    pub fn with_position(mut self, position: i64) -> MemoryRecord {
        self.position = Some(position);
        return self;
    }

    pub fn with_scope(mut self, field: impl Into<String>, value: impl Into<ScopeValue>) -> MemoryRecord {
        self.fields.insert(field.into(), value.into());
        return self;
    }
}

impl Positioned for MemoryRecord {
    fn position(&self) -> Option<i64> {
        return self.position;
    }

    fn set_position(&mut self, position: i64) {
        self.position = Some(position);
    }

    fn scope_value(&self, field: &str) -> Option<ScopeValue> {
        return self.fields.get(field).cloned();
    }
}

/// An [`OrderedStore`] backed by a `BTreeMap`.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    records: BTreeMap<u64, MemoryRecord>,
    /// Positions written by `set_position` but not yet persisted.
    staged: FxHashMap<u64, i64>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        return MemoryStore {
            records: BTreeMap::new(),
            staged: FxHashMap::default(),
            next_id: 1,
        };
    }

    /// Insert a record as is, without assigning a position.
    pub fn insert_raw(&mut self, record: MemoryRecord) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.records.insert(id, record);
        return id;
    }

    /// Create a record through `policy`: assign a position if it has none,
    /// validate it, then insert it.
    pub fn create(&mut self, policy: &SortPolicy, mut record: MemoryRecord) -> Result<u64, SortError> {
        policy.assign_if_absent(&*self, &mut record)?;
        policy.validate(&self.next_id, &record)?;
        return Ok(self.insert_raw(record));
    }

    /// Replace a stored record, keeping its id. Positions are not touched
    /// by the policy on this path.
    pub fn update(&mut self, id: u64, record: MemoryRecord) -> Result<(), MemoryStoreError> {
        let slot = self.records.get_mut(&id).ok_or(MemoryStoreError::NotFound(id))?;
        *slot = record;
        return Ok(());
    }

    pub fn get(&self, id: u64) -> Option<&MemoryRecord> {
        return self.records.get(&id);
    }

    pub fn remove(&mut self, id: u64) -> Option<MemoryRecord> {
        self.staged.remove(&id);
        return self.records.remove(&id);
    }

    pub fn len(&self) -> usize {
        return self.records.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.records.is_empty();
    }

    /// Whether any write is staged but not persisted.
    pub fn has_staged(&self) -> bool {
        return !self.staged.is_empty();
    }

    fn in_scope(record: &MemoryRecord, scope: &Scope) -> bool {
        return scope.matches(|field| record.scope_value(field));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        return Self::new();
    }
}

impl OrderedStore for MemoryStore {
    type Id = u64;
    type Error = MemoryStoreError;

    fn max_position(&self, scope: &Scope) -> Result<Option<i64>, MemoryStoreError> {
        let max = self
            .records
            .values()
            .filter(|record| MemoryStore::in_scope(record, scope))
            .filter_map(|record| record.position)
            .max();
        return Ok(max);
    }

    fn fetch_ordered_ids(
        &self,
        scope: &Scope,
        order: Direction,
        ids: Option<&[u64]>,
    ) -> Result<Vec<u64>, MemoryStoreError> {
        let mut rows: Vec<(i64, u64)> = match ids {
            Some(ids) => {
                let mut wanted: Vec<u64> = ids.to_vec();
                wanted.sort_unstable();
                wanted.dedup();
                wanted
                    .into_iter()
                    .filter_map(|id| self.records.get(&id).map(|record| (id, record)))
                    .filter(|(_, record)| MemoryStore::in_scope(record, scope))
                    .filter_map(|(id, record)| record.position.map(|p| (p, id)))
                    .collect()
            }
            None => self
                .records
                .iter()
                .filter(|(_, record)| MemoryStore::in_scope(record, scope))
                .filter_map(|(id, record)| record.position.map(|p| (p, *id)))
                .collect(),
        };

        rows.sort_unstable();
        if order == Direction::Desc {
            rows.reverse();
        }
        return Ok(rows.into_iter().map(|(_, id)| id).collect());
    }

    fn get_position(&self, id: &u64) -> Result<Option<i64>, MemoryStoreError> {
        let record = self.records.get(id).ok_or(MemoryStoreError::NotFound(*id))?;
        return Ok(record.position);
    }

    fn set_position(&mut self, id: &u64, position: i64) -> Result<(), MemoryStoreError> {
        if !self.records.contains_key(id) {
            return Err(MemoryStoreError::NotFound(*id));
        }
        self.staged.insert(*id, position);
        return Ok(());
    }

    fn persist(&mut self, id: &u64) -> Result<(), MemoryStoreError> {
        let position = self.staged.remove(id).ok_or(MemoryStoreError::NothingStaged(*id))?;
        let record = self.records.get_mut(id).ok_or(MemoryStoreError::NotFound(*id))?;
        record.position = Some(position);
        return Ok(());
    }

    /// All-or-nothing: every id is checked before anything is written.
    fn apply_batch(&mut self, updates: &[(u64, i64)]) -> Result<(), MemoryStoreError> {
        if let Some((id, _)) = updates.iter().find(|(id, _)| !self.records.contains_key(id)) {
            return Err(MemoryStoreError::NotFound(*id));
        }
        for (id, position) in updates {
            self.set_position(id, *position)?;
            self.persist(id)?;
        }
        return Ok(());
    }
}
