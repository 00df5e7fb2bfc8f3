//! Run summary reports.

pub mod generator;

pub use generator::*;
