//! AFL fuzz harness for the reorder planner
//!
//! Drives a scoped collection through creates, reorders and deletes and
//! checks after every step:
//! 1. Read-back: a successful reorder reads back exactly as requested,
//!    unless a gap was exhausted along the way
//! 2. Minimality bound: a reorder never rewrites every record
//! 3. Atomicity: a failed reorder leaves the store untouched
//!
//! Model: a handful of scopes sharing one store, with a small step so gap
//! exhaustion is actually reached.

use afl::fuzz;
use gapsort::config::{Direction, SortConfig};
use gapsort::error::SortError;
use gapsort::policy::SortPolicy;
use gapsort::scope::Scope;
use gapsort::store::{MemoryRecord, MemoryStore, OrderedStore};

const NUM_SCOPES: u8 = 3;

/// Operation types the fuzzer can generate
#[derive(Debug, Clone, Copy)]
enum FuzzOp {
    /// Create a record in a scope
    Create { scope: u8 },
    /// Rotate part of a scope's order and swap two items
    Reorder { scope: u8, rotate: u8, swap: u8 },
    /// Delete the record at a fraction of a scope's order
    Delete { scope: u8, pos_frac: u8 },
}

impl FuzzOp {
    fn from_bytes(bytes: &[u8]) -> Option<(FuzzOp, &[u8])> {
        if bytes.is_empty() {
            return None;
        }

        let op_type = bytes[0] % 3;
        let rest = &bytes[1..];

        match op_type {
            0 if !rest.is_empty() => {
                let op = FuzzOp::Create { scope: rest[0] % NUM_SCOPES };
                Some((op, &rest[1..]))
            }
            1 if rest.len() >= 3 => {
                let op = FuzzOp::Reorder {
                    scope: rest[0] % NUM_SCOPES,
                    rotate: rest[1],
                    swap: rest[2],
                };
                Some((op, &rest[3..]))
            }
            2 if rest.len() >= 2 => {
                let op = FuzzOp::Delete {
                    scope: rest[0] % NUM_SCOPES,
                    pos_frac: rest[1],
                };
                Some((op, &rest[2..]))
            }
            _ => None,
        }
    }
}

fn scope(index: u8) -> Scope {
    return Scope::unscoped().with("list", i64::from(index));
}

fn positions(store: &MemoryStore, ids: &[u64]) -> Vec<Option<i64>> {
    return ids.iter().map(|id| store.get_position(id).ok().flatten()).collect();
}

/// Whether any two records of the order share a position.
fn has_ties(store: &MemoryStore, order: &[u64]) -> bool {
    let mut seen: Vec<i64> = positions(store, order).into_iter().flatten().collect();
    seen.sort_unstable();
    return seen.windows(2).any(|w| w[0] == w[1]);
}

fn main() {
    let config = SortConfig::new("position")
        .with_step(8)
        .with_order(Direction::Asc)
        .with_scope(["list"]);
    let policy = match SortPolicy::new(config) {
        Ok(policy) => policy,
        Err(err) => panic!("fuzz configuration rejected: {}", err),
    };

    fuzz!(|data: &[u8]| {
        let mut store = MemoryStore::new();
        let mut remaining = data;

        while let Some((op, rest)) = FuzzOp::from_bytes(remaining) {
            remaining = rest;

            match op {
                FuzzOp::Create { scope: s } => {
                    let record = MemoryRecord::new().with_scope("list", i64::from(s));
                    store.create(&policy, record).expect("create never fails");
                }

                FuzzOp::Reorder { scope: s, rotate, swap } => {
                    let scope = scope(s);
                    let current = store
                        .fetch_ordered_ids(&scope, policy.order(), None)
                        .expect("memory store reads never fail");
                    let n = current.len();
                    if n == 0 {
                        continue;
                    }

                    let mut target = current.clone();
                    target.rotate_left(rotate as usize % n);
                    target.swap(0, swap as usize % n);

                    let tied_before = has_ties(&store, &current);
                    let before = positions(&store, &current);
                    match policy.sort_list(&mut store, &scope, &target) {
                        Ok(updates) => {
                            // CRITICAL INVARIANT: at least one record stays put
                            assert!(n < 2 || updates.len() < n, "rewrote all {} records", n);
                            let read = store
                                .fetch_ordered_ids(&scope, policy.order(), None)
                                .expect("memory store reads never fail");
                            if !tied_before && !has_ties(&store, &read) {
                                assert_eq!(read, target, "read-back mismatch");
                            }
                        }
                        Err(SortError::DegenerateGap { .. }) | Err(SortError::PositionOverflow) => {
                            assert!(!store.has_staged(), "staged writes left behind");
                            assert_eq!(positions(&store, &current), before, "failed reorder wrote");
                        }
                        Err(err) => panic!("unexpected reorder failure: {}", err),
                    }
                }

                FuzzOp::Delete { scope: s, pos_frac } => {
                    let current = store
                        .fetch_ordered_ids(&scope(s), policy.order(), None)
                        .expect("memory store reads never fail");
                    if !current.is_empty() {
                        let index = (pos_frac as usize * current.len()) / 256;
                        store.remove(current[index]);
                    }
                }
            }
        }
    });
}
