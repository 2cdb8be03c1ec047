//! The boundary between the ordering algorithm and persistence.
//!
//! The algorithm never owns records. It reads the current ordering of a
//! scope from an [`OrderedStore`], decides which positions change, and
//! writes them back through the same store.
//!
//! Implementations must serialize reorders of the same scope: the snapshot
//! read by `fetch_ordered_ids`/`get_position` and the writes issued by
//! `apply_batch` are assumed not to interleave with another reorder of that
//! scope. Disjoint scopes carry no such requirement.

use std::fmt::Debug;
use std::hash::Hash;

use crate::config::Direction;
use crate::scope::Scope;

mod memory;

pub use memory::{MemoryRecord, MemoryStore, MemoryStoreError};

/// A store of positioned records.
pub trait OrderedStore {
    /// Record identifier, unique within a scope.
    type Id: Clone + Eq + Hash + Debug;

    /// Failure reported by the backing storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Highest position among records in `scope`, ignoring any other
    /// default filtering. `None` for an empty scope.
    fn max_position(&self, scope: &Scope) -> Result<Option<i64>, Self::Error>;

    /// Identifiers of the records in `scope`, ordered by position in
    /// `order`. When `ids` is given, only those records are returned.
    fn fetch_ordered_ids(
        &self,
        scope: &Scope,
        order: Direction,
        ids: Option<&[Self::Id]>,
    ) -> Result<Vec<Self::Id>, Self::Error>;

    /// The stored position of a record. `None` if it has none.
    fn get_position(&self, id: &Self::Id) -> Result<Option<i64>, Self::Error>;

    /// Change the position of a record. Not durable until `persist`.
    fn set_position(&mut self, id: &Self::Id, position: i64) -> Result<(), Self::Error>;

    /// Durably commit the position change of one record.
    fn persist(&mut self, id: &Self::Id) -> Result<(), Self::Error>;

    /// Apply a batch of position updates.
    ///
    /// The default writes each update in turn and stops at the first
    /// failure, leaving earlier updates in place. Stores with transactions
    /// should override this to make the batch all-or-nothing.
    fn apply_batch(&mut self, updates: &[(Self::Id, i64)]) -> Result<(), Self::Error> {
        for (id, position) in updates {
            self.set_position(id, *position)?;
            self.persist(id)?;
        }
        return Ok(());
    }
}
