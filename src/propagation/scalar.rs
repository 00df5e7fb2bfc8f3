//! Numeric value types that can be propagated.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul};

/// A value that can be observed on an entity and averaged across the graph.
///
/// Confidence weights are carried in the same type as the values they
/// weigh, so integer values are normalized with integer division.
pub trait Scalar:
    Copy
    + Debug
    + PartialOrd
    + Send
    + Sync
    + Add<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// Convert a weight constant into this type.
    fn from_weight(weight: u32) -> Self;

    /// Lossy conversion used when placing values on a raster.
    fn to_f64(self) -> f64;

    /// `self + other`, or `None` if the result does not fit.
    fn checked_add(self, other: Self) -> Option<Self>;

    /// `self * other`, or `None` if the result does not fit.
    fn checked_mul(self, other: Self) -> Option<Self>;
}

impl Scalar for i64 {
    fn from_weight(weight: u32) -> Self {
        i64::from(weight)
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        i64::checked_add(self, other)
    }

    fn checked_mul(self, other: Self) -> Option<Self> {
        i64::checked_mul(self, other)
    }
}

impl Scalar for f32 {
    fn from_weight(weight: u32) -> Self {
        weight as f32
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        Some(self + other)
    }

    fn checked_mul(self, other: Self) -> Option<Self> {
        Some(self * other)
    }
}

impl Scalar for f64 {
    fn from_weight(weight: u32) -> Self {
        f64::from(weight)
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        Some(self + other)
    }

    fn checked_mul(self, other: Self) -> Option<Self> {
        Some(self * other)
    }
}
