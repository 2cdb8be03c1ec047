//! Per-collection sortable configuration.
//!
//! A collection is configured once, at setup time, with the name of its
//! position field, the direction of the ordering, the step used to space
//! new records and the fields that partition it into independent scopes.
//!
//! ```toml
//! name = "weight"
//! order = "asc"
//! step = 100
//! scope = ["category_id"]
//! ```

use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SortError;

/// Step used when a configuration does not name one.
pub const DEFAULT_STEP: i64 = 500;

/// Direction in which positions sort.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Lowest position first.
    #[default]
    Asc,
    /// Highest position first.
    Desc,
}

impl Direction {
    /// Move `distance` units further along the sequence from `position`.
    #[inline]
    pub fn advance(self, position: i64, distance: i64) -> Option<i64> {
        return match self {
            Direction::Asc => position.checked_add(distance),
            Direction::Desc => position.checked_sub(distance),
        };
    }

    /// Move `distance` units back towards the head of the sequence.
    #[inline]
    pub fn retreat(self, position: i64, distance: i64) -> Option<i64> {
        return match self {
            Direction::Asc => position.checked_sub(distance),
            Direction::Desc => position.checked_add(distance),
        };
    }
}

fn default_step() -> i64 {
    return DEFAULT_STEP;
}

/// Sortable options for one collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortConfig {
    /// Name of the integer field holding the position.
    pub name: String,
    /// Sort direction.
    #[serde(default)]
    pub order: Direction,
    /// Increment between consecutive new records.
    #[serde(default = "default_step")]
    pub step: i64,
    /// Fields whose values partition the collection.
    #[serde(default)]
    pub scope: Vec<String>,
}

impl SortConfig {
    /// Configuration with the default direction, step and no scope.
    pub fn new(name: impl Into<String>) -> SortConfig {
        return SortConfig {
            name: name.into(),
            order: Direction::Asc,
            step: DEFAULT_STEP,
            scope: Vec::new(),
        };
    }

    pub fn with_order(mut self, order: Direction) -> SortConfig {
        self.order = order;
        return self;
    }

    pub fn with_step(mut self, step: i64) -> SortConfig {
        self.step = step;
        return self;
    }

    pub fn with_scope<I, S>(mut self, fields: I) -> SortConfig
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = fields.into_iter().map(Into::into).collect();
        return self;
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<SortConfig, SortError> {
        let config: SortConfig = toml::from_str(text)?;
        config.validate()?;
        return Ok(config);
    }

    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<SortConfig, SortError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = SortConfig::from_toml_str(&text)?;
        debug!(path = %path.display(), field = %config.name, "loaded sortable configuration");
        return Ok(config);
    }

    /// Reject configurations that cannot produce a consistent ordering.
    pub fn validate(&self) -> Result<(), SortError> {
        if self.name.trim().is_empty() {
            return Err(SortError::InvalidConfiguration(
                "sortable field name must not be empty".to_string(),
            ));
        }
        if self.step <= 0 {
            return Err(SortError::InvalidConfiguration(format!(
                "sortable step should be a positive integer, {} given",
                self.step
            )));
        }

        let mut seen = FxHashSet::default();
        for field in &self.scope {
            if field.trim().is_empty() {
                return Err(SortError::InvalidConfiguration(
                    "scope field names must not be empty".to_string(),
                ));
            }
            if field == &self.name {
                return Err(SortError::InvalidConfiguration(format!(
                    "scope cannot include the sortable field `{}`",
                    field
                )));
            }
            if !seen.insert(field.as_str()) {
                return Err(SortError::InvalidConfiguration(format!(
                    "scope field `{}` listed twice",
                    field
                )));
            }
        }
        return Ok(());
    }
}
