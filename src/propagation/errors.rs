//! Error types for value lookups.

use thiserror::Error;

use crate::graph::EntityId;

/// Failure to read a value from an aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The entity was never observed and no propagated value reached it.
    #[error("no value known for entity {0}")]
    NotFound(EntityId),
}
