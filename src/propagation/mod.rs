//! Value propagation.
//!
//! Observed values (dates, longitudes) are merged per entity, then spread to
//! neighboring entities with a confidence weight and normalized into one
//! estimate per entity.

pub mod aggregator;
pub mod errors;
pub mod merge;
pub mod scalar;

pub use aggregator::*;
pub use errors::*;
pub use merge::*;
pub use scalar::*;
