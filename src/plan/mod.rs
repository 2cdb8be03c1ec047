//! Reorder planning: which records move, and where they go.
//!
//! Planning is pure. It works on identifier sequences and a snapshot of
//! positions and never touches a store; [`SortPolicy`](crate::policy::SortPolicy)
//! does the reading and writing around it.

mod center;
mod changes;
mod positions;

pub use center::{center, spread};
pub use changes::{calculate_changes, required_changes};
pub use positions::plan_positions;
