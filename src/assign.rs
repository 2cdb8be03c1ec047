//! Position assignment for newly created records.
//!
//! The first record of a scope sits one step above zero and every later one
//! one step above the current maximum, so freshly created records are
//! always spaced `step` apart.

use crate::error::SortError;
use crate::scope::{Scope, ScopeValue};
use crate::store::OrderedStore;

/// Typed access to the sortable field of a record.
///
/// Implemented once per record type in place of looking the field up by
/// name at runtime.
pub trait Positioned {
    /// Current position, `None` if never assigned.
    fn position(&self) -> Option<i64>;

    fn set_position(&mut self, position: i64);

    /// Value of a scope field. Records of unscoped collections can rely on
    /// the default.
    fn scope_value(&self, _field: &str) -> Option<ScopeValue> {
        return None;
    }
}

/// Position for the next record created in `scope`.
pub fn next_position<S: OrderedStore>(
    store: &S,
    scope: &Scope,
    step: i64,
) -> Result<i64, SortError> {
    let max = store.max_position(scope).map_err(SortError::store)?;
    return match max {
        None => Ok(step),
        Some(max) => max.checked_add(step).ok_or(SortError::PositionOverflow),
    };
}
