//! Everything collected from one dump.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::graph::{AdjacencyStore, EntityId};
use crate::propagation::{DiffusionConfig, Mean, Min, ValueAggregator};

/// Counters collected while reading a dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Lines read, including skipped ones.
    pub lines: usize,
    /// Lines with fewer than three fields.
    pub skipped_lines: usize,
    /// Directed edges registered.
    pub edges: usize,
    /// Time observations registered.
    pub time_observations: usize,
    /// Longitude observations registered.
    pub longitude_observations: usize,
    /// Date or coordinate literals that could not be converted.
    pub rejected_literals: usize,
}

/// Graph, observations and known identifiers of a dump.
pub struct Dataset {
    pub graph: AdjacencyStore,
    /// Earliest attested date per entity, in day units.
    pub time: ValueAggregator<i64>,
    /// Averaged longitude per entity, in degrees.
    pub longitude: ValueAggregator<f32>,
    /// Every identifier that appeared in the dump.
    pub ids: FxHashSet<EntityId>,
    pub stats: IngestStats,
}

impl Dataset {
    pub fn new(diffusion: DiffusionConfig) -> Self {
        Self {
            graph: AdjacencyStore::new(),
            time: ValueAggregator::new(Min, diffusion),
            longitude: ValueAggregator::new(Mean, diffusion),
            ids: FxHashSet::default(),
            stats: IngestStats::default(),
        }
    }

    pub fn register_id(&mut self, id: EntityId) {
        self.ids.insert(id);
    }

    pub fn register_edge(&mut self, from: EntityId, to: EntityId) {
        self.graph.add_edge(from, to);
        self.stats.edges += 1;
    }

    /// Link `a` and `b` in both directions.
    pub fn register_link(&mut self, a: EntityId, b: EntityId) {
        self.graph.add_undirected_edge(a, b);
        self.stats.edges += 2;
    }

    pub fn register_time(&mut self, id: EntityId, day: i64) {
        self.time.add_value(id, day);
        self.stats.time_observations += 1;
    }

    pub fn register_longitude(&mut self, id: EntityId, longitude: f32) {
        self.longitude.add_value(id, longitude);
        self.stats.longitude_observations += 1;
    }

    pub fn reject_literal(&mut self) {
        self.stats.rejected_literals += 1;
    }
}
