//! Errors raised while configuring a collection or reordering it.
//!
//! Every failure is returned to the immediate caller. Nothing here retries,
//! and nothing here logs: deciding what to do with a failed reorder belongs
//! to whoever asked for it.

use thiserror::Error;

/// Boxed error coming from an [`OrderedStore`](crate::store::OrderedStore).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SortError {
    /// The collection configuration was rejected at setup time.
    #[error("invalid sortable configuration: {0}")]
    InvalidConfiguration(String),

    /// The old and new orderings do not have the same length.
    #[error("size mismatch between new ({new}) and old ({old}) list of items")]
    SizeMismatch { old: usize, new: usize },

    /// Two neighbours share a position, so nothing fits between them.
    #[error("cannot place an item between two neighbours at position {position}")]
    DegenerateGap { position: i64 },

    /// Some identifiers of the requested order are not stored in the scope.
    #[error("records not found: {}", missing.join(", "))]
    RecordsNotFound { missing: Vec<String> },

    /// A record that should carry a position has none.
    #[error("record {id} has no position")]
    MissingPosition { id: String },

    /// The computed position does not fit in an `i64`.
    #[error("position overflow")]
    PositionOverflow,

    #[error("failed to read sortable configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse sortable configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[source] BoxError),
}

impl SortError {
    /// Wrap a store error.
    pub fn store<E>(err: E) -> SortError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        return SortError::Store(Box::new(err));
    }

    /// Build a `RecordsNotFound` from the missing identifiers.
    pub fn records_not_found<'a, I, T>(ids: I) -> SortError
    where
        I: IntoIterator<Item = &'a T>,
        T: std::fmt::Debug + 'a,
    {
        let missing = ids.into_iter().map(|id| format!("{:?}", id)).collect();
        return SortError::RecordsNotFound { missing };
    }
}
