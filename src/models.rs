//! Data models for the run summary.
//!
//! This module contains the serializable record of one run: what was read,
//! what was propagated and what was drawn.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use crate::ingest::IngestStats;
use crate::propagation::PropagationStats;
use crate::render::RenderStats;

/// Metadata about the run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    /// Dump that was read.
    pub input: PathBuf,
    /// Dump format name.
    pub format: String,
    /// Date and time the run finished.
    pub finished_at: DateTime<Utc>,
    /// Confidence weight given to observed values.
    pub initial_weight: u32,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// Propagation counters for both value kinds.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PropagationSummary {
    pub time: PropagationStats,
    pub longitude: PropagationStats,
}

/// The complete record of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub metadata: RunMetadata,
    /// Number of distinct entities seen.
    pub entities: usize,
    pub ingest: IngestStats,
    pub propagation: PropagationSummary,
    pub render: RenderStats,
}

impl RunSummary {
    /// Share of known entities that made it onto the image.
    pub fn located_ratio(&self) -> f64 {
        if self.entities == 0 {
            return 0.0;
        }
        self.render.tally.plotted as f64 / self.entities as f64
    }
}
