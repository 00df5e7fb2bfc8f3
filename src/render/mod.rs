//! Density rendering.
//!
//! This module turns propagated times and longitudes into PNG density maps.

pub mod axis;
pub mod errors;
pub mod histogram;
pub mod raster;
pub mod renderer;

pub use axis::*;
pub use errors::*;
pub use histogram::*;
pub use raster::*;
pub use renderer::*;
