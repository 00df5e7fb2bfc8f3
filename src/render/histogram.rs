//! Occupancy histogram over (longitude, time) cells.

use rayon::prelude::*;
use serde::Serialize;
use std::ops::AddAssign;

use super::axis::{LongitudeAxis, TimeAxis};
use crate::graph::EntityId;
use crate::propagation::{Scalar, ValueAggregator};

/// Count of entities per cell, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityGrid {
    columns: usize,
    rows: usize,
    counts: Vec<u32>,
}

impl DensityGrid {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            counts: vec![0; columns * rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn increment(&mut self, column: usize, row: usize) {
        if let Some(count) = self.counts.get_mut(row * self.columns + column) {
            *count = count.saturating_add(1);
        }
    }

    /// Element-wise sum with a grid of the same shape.
    pub fn merge(&mut self, other: &DensityGrid) {
        for (count, extra) in self.counts.iter_mut().zip(&other.counts) {
            *count = count.saturating_add(*extra);
        }
    }

    /// Non-empty cells as `(column, row, count)`.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(move |(index, &count)| (index % self.columns, index / self.columns, count))
    }

    pub fn occupied_count(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }
}

/// Why entities did or did not land on the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlotTally {
    /// Entities counted into a cell.
    pub plotted: usize,
    /// Entities lacking a time or a longitude estimate.
    pub missing_value: usize,
    /// Entities whose estimates fall outside the axes.
    pub out_of_range: usize,
}

impl AddAssign for PlotTally {
    fn add_assign(&mut self, other: Self) {
        self.plotted += other.plotted;
        self.missing_value += other.missing_value;
        self.out_of_range += other.out_of_range;
    }
}

/// Places entities onto a [`DensityGrid`].
#[derive(Debug, Clone, Copy)]
pub struct HistogramBuilder {
    pub longitude: LongitudeAxis,
    pub time: TimeAxis,
}

impl HistogramBuilder {
    pub fn new(longitude: LongitudeAxis, time: TimeAxis) -> Self {
        Self { longitude, time }
    }

    pub fn empty_grid(&self) -> DensityGrid {
        DensityGrid::new(self.longitude.columns(), self.time.rows)
    }

    /// Count every entity of `ids` into a grid.
    ///
    /// `ids` is split into one partition per worker thread; partitions fill
    /// private grids that are summed at the end.
    pub fn build<T: Scalar, L: Scalar>(
        &self,
        ids: &[EntityId],
        time: &ValueAggregator<T>,
        longitude: &ValueAggregator<L>,
    ) -> (DensityGrid, PlotTally) {
        let partition = ids.len().div_ceil(rayon::current_num_threads()).max(1);

        ids.par_chunks(partition)
            .map(|part| self.build_partition(part, time, longitude))
            .reduce(
                || (self.empty_grid(), PlotTally::default()),
                |(mut grid, mut tally), (other_grid, other_tally)| {
                    grid.merge(&other_grid);
                    tally += other_tally;
                    (grid, tally)
                },
            )
    }

    fn build_partition<T: Scalar, L: Scalar>(
        &self,
        ids: &[EntityId],
        time: &ValueAggregator<T>,
        longitude: &ValueAggregator<L>,
    ) -> (DensityGrid, PlotTally) {
        let mut grid = self.empty_grid();
        let mut tally = PlotTally::default();

        for &id in ids {
            let (time_value, longitude_value) = match (time.get_value(id), longitude.get_value(id)) {
                (Ok(t), Ok(l)) => (t.to_f64(), l),
                _ => {
                    tally.missing_value += 1;
                    continue;
                }
            };

            match (self.longitude.column(longitude_value), self.time.row(time_value)) {
                (Some(column), Some(row)) => {
                    grid.increment(column, row);
                    tally.plotted += 1;
                }
                _ => tally.out_of_range += 1,
            }
        }

        (grid, tally)
    }
}
