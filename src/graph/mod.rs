//! Entity graph.
//!
//! This module holds the directed multigraph that observed values are
//! propagated across.

pub mod adjacency;

pub use adjacency::*;
