//! Mapping of longitudes and times onto raster coordinates.

use crate::calendar;
use crate::propagation::Scalar;

/// Horizontal axis: longitudes in [-180, 180) at a fixed resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongitudeAxis {
    /// Cells per degree.
    pub resolution: u32,
}

impl LongitudeAxis {
    pub fn new(resolution: u32) -> Self {
        Self { resolution }
    }

    /// Number of columns, one past the 360 degree span.
    pub fn columns(&self) -> usize {
        360 * self.resolution as usize + 1
    }

    /// Column of `longitude`, or `None` outside [-180, 180).
    ///
    /// The shift and scale are computed in `V` itself, so f32 longitudes
    /// round the way they were stored.
    pub fn column<V: Scalar>(&self, longitude: V) -> Option<usize> {
        if !(-180.0..180.0).contains(&longitude.to_f64()) {
            return None;
        }
        let scaled = (longitude + V::from_weight(180)) * V::from_weight(self.resolution);
        Some(scaled.to_f64().floor() as usize)
    }
}

/// Vertical axis: a time range stretched by a power law.
///
/// `row = floor((t - start)^exponent * rows / (end - start)^exponent)`,
/// which compresses ancient times and expands recent ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    /// First plottable day unit, maps to row 0.
    pub start: i64,
    /// Last plottable day unit, maps to the last row.
    pub end: i64,
    pub rows: usize,
    pub exponent: i32,
}

impl TimeAxis {
    pub fn new(start: i64, end: i64, rows: usize, exponent: i32) -> Self {
        Self {
            start,
            end,
            rows,
            exponent,
        }
    }

    /// Axis from the first day of `start_year` to the day after `end_year` begins.
    pub fn from_years(start_year: i64, end_year: i64, rows: usize, exponent: i32) -> Option<Self> {
        let start = calendar::year_start(start_year)?;
        let end = calendar::year_start(end_year)?.checked_add(1)?;
        Some(Self::new(start, end, rows, exponent))
    }

    /// Row of `time`, or `None` outside `[start, end]`.
    pub fn row(&self, time: f64) -> Option<usize> {
        let start = self.start as f64;
        let end = self.end as f64;
        if self.rows == 0 || end <= start || !(start..=end).contains(&time) {
            return None;
        }

        let offset = (time - start).powi(self.exponent);
        let span = (end - start).powi(self.exponent);
        let row = (offset * self.rows as f64 / span).floor() as usize;
        Some(row.min(self.rows - 1))
    }

    /// Row of the first day of `year`, when it lies on the axis.
    pub fn year_row(&self, year: i64) -> Option<usize> {
        calendar::year_start(year).and_then(|time| self.row(time as f64))
    }
}
