//! Entity identifier hashing.

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

use crate::graph::EntityId;

/// Hash a textual identifier (`Q42`, `m.0abc`) into a dense key.
///
/// Surrounding whitespace is ignored. The hash is stable across runs.
pub fn entity_id(raw: &str) -> EntityId {
    let mut hasher = FxHasher::default();
    raw.trim().hash(&mut hasher);
    hasher.finish()
}
