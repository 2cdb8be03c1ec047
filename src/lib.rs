//! Gapsort - stable, gap-based ordering for persisted collections.
//!
//! Records carry an integer position spaced `step` apart. Reordering a
//! collection rewrites only the records that actually moved, each placed
//! halfway between its new neighbours, so most reorders touch one or two
//! rows no matter how long the list is.
//!
//! # Quick Start
//!
//! ```
//! use gapsort::config::SortConfig;
//! use gapsort::policy::SortPolicy;
//! use gapsort::scope::Scope;
//! use gapsort::store::{MemoryRecord, MemoryStore, OrderedStore};
//!
//! let policy = SortPolicy::new(SortConfig::new("position")).unwrap();
//! let mut store = MemoryStore::new();
//! for _ in 0..7 {
//!     store.create(&policy, MemoryRecord::new()).unwrap();
//! }
//!
//! let target = [1, 3, 5, 4, 6, 2, 7];
//! let updates = policy.sort_list(&mut store, &Scope::unscoped(), &target).unwrap();
//! assert_eq!(updates.len(), 2);
//!
//! let order = store.fetch_ordered_ids(&Scope::unscoped(), policy.order(), None).unwrap();
//! assert_eq!(order, target);
//! ```
//!
//! Positions are never rebalanced here. Once two neighbours end up one
//! apart, the scope should be renumbered by the caller.

pub mod assign;
pub mod config;
pub mod error;
pub mod plan;
pub mod policy;
pub mod scope;
pub mod store;

pub use config::{Direction, SortConfig};
pub use error::SortError;
pub use policy::SortPolicy;
pub use scope::{Scope, ScopeValue};
