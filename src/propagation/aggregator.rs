//! Per-entity value aggregation and single-hop diffusion.
//!
//! An aggregator keeps three maps keyed by entity:
//!
//! - `fixed`: merged directly observed values
//! - `estimate`: best known value, seeded from `fixed`
//! - `weight`: accumulated confidence for entities reached by propagation
//!
//! An entity in `fixed` never appears in `weight`, and its estimate always
//! equals its fixed value.

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, warn};

use super::errors::LookupError;
use super::merge::MergePolicy;
use super::scalar::Scalar;
use crate::graph::{AdjacencyStore, EntityId};

/// Numeric parameters of the diffusion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffusionConfig {
    /// Confidence a fixed value starts with before the first hop halves it.
    pub initial_weight: u32,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            initial_weight: 1024,
        }
    }
}

impl From<&crate::config::PropagationConfig> for DiffusionConfig {
    fn from(config: &crate::config::PropagationConfig) -> Self {
        Self {
            initial_weight: config.initial_weight,
        }
    }
}

/// Counters collected by [`ValueAggregator::propagate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PropagationStats {
    /// Entities with a fixed value.
    pub sources: usize,
    /// Sources whose first-hop weight fell to the floor.
    pub skipped_sources: usize,
    /// Weighted contributions added to neighbors.
    pub contributions: usize,
    /// Contributions dropped because they overflowed the value type.
    pub saturated: usize,
    /// Entities that received a propagated estimate.
    pub estimated: usize,
}

/// Merges observations per entity and propagates them to graph neighbors.
pub struct ValueAggregator<V: Scalar> {
    fixed: FxHashMap<EntityId, V>,
    estimate: FxHashMap<EntityId, V>,
    weight: FxHashMap<EntityId, V>,
    merge: Box<dyn MergePolicy<V>>,
    config: DiffusionConfig,
}

impl<V: Scalar> ValueAggregator<V> {
    /// Create an aggregator resolving repeated observations with `merge`.
    pub fn new(merge: impl MergePolicy<V> + 'static, config: DiffusionConfig) -> Self {
        Self {
            fixed: FxHashMap::default(),
            estimate: FxHashMap::default(),
            weight: FxHashMap::default(),
            merge: Box::new(merge),
            config,
        }
    }

    /// Record an observation of `value` on `id`.
    pub fn add_value(&mut self, id: EntityId, value: V) {
        let merged = match self.fixed.get(&id) {
            Some(&previous) => self.merge.merge(previous, value),
            None => value,
        };
        self.fixed.insert(id, merged);
    }

    /// Recompute every estimate from the fixed values and `graph`.
    ///
    /// Each fixed value reaches only the direct out-neighbors of its entity.
    pub fn propagate(&mut self, graph: &AdjacencyStore) -> PropagationStats {
        self.estimate = self.fixed.clone();
        self.weight.clear();

        let mut stats = PropagationStats {
            sources: self.fixed.len(),
            ..PropagationStats::default()
        };
        let initial = V::from_weight(self.config.initial_weight);

        for (&id, &value) in &self.fixed {
            match fan_out(
                id,
                value,
                initial,
                graph,
                &self.fixed,
                &mut self.estimate,
                &mut self.weight,
            ) {
                Some(spread) => {
                    stats.contributions += spread.contributions;
                    stats.saturated += spread.saturated;
                }
                None => stats.skipped_sources += 1,
            }
        }

        for (id, &weight) in &self.weight {
            if let Some(estimate) = self.estimate.get_mut(id) {
                *estimate = *estimate / weight;
            }
        }

        stats.estimated = self.weight.len();
        debug!(
            "Propagated {} sources to {} entities ({} contributions, {} skipped)",
            stats.sources, stats.estimated, stats.contributions, stats.skipped_sources
        );
        if stats.saturated > 0 {
            warn!("Dropped {} contributions that overflowed", stats.saturated);
        }
        stats
    }

    /// Current estimate for `id`.
    pub fn get_value(&self, id: EntityId) -> Result<V, LookupError> {
        self.estimate
            .get(&id)
            .copied()
            .ok_or(LookupError::NotFound(id))
    }

    /// Merged observed value for `id`, if any.
    pub fn fixed_value(&self, id: EntityId) -> Option<V> {
        self.fixed.get(&id).copied()
    }

    /// Number of entities with at least one observation.
    pub fn fixed_count(&self) -> usize {
        self.fixed.len()
    }
}

/// Outcome of spreading one fixed value.
struct Spread {
    contributions: usize,
    saturated: usize,
}

/// Spread `value` from `id` to its direct neighbors at half of `weight`.
///
/// Returns `None` when the halved weight is at or below 1. A contribution
/// whose product or running sum does not fit in `V` is dropped.
fn fan_out<V: Scalar>(
    id: EntityId,
    value: V,
    weight: V,
    graph: &AdjacencyStore,
    fixed: &FxHashMap<EntityId, V>,
    estimate: &mut FxHashMap<EntityId, V>,
    weights: &mut FxHashMap<EntityId, V>,
) -> Option<Spread> {
    let weight = weight / V::from_weight(2);
    if weight <= V::from_weight(1) {
        return None;
    }

    let mut spread = Spread {
        contributions: 0,
        saturated: 0,
    };
    for &neighbor in graph.neighbors(id) {
        if fixed.contains_key(&neighbor) {
            continue;
        }

        let sum = value.checked_mul(weight).and_then(|contribution| {
            match estimate.get(&neighbor) {
                Some(&sum) => sum.checked_add(contribution),
                None => Some(contribution),
            }
        });
        let total = match weights.get(&neighbor) {
            Some(&total) => total.checked_add(weight),
            None => Some(weight),
        };

        match (sum, total) {
            (Some(sum), Some(total)) => {
                estimate.insert(neighbor, sum);
                weights.insert(neighbor, total);
                spread.contributions += 1;
            }
            _ => spread.saturated += 1,
        }
    }

    Some(spread)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::{Mean, Min};

    fn time_aggregator() -> ValueAggregator<i64> {
        ValueAggregator::new(Min, DiffusionConfig::default())
    }

    fn longitude_aggregator() -> ValueAggregator<f32> {
        ValueAggregator::new(Mean, DiffusionConfig::default())
    }

    #[test]
    fn test_min_policy_keeps_earliest_observation() {
        let mut time = time_aggregator();
        time.add_value(1, 10);
        time.add_value(1, 4);
        time.add_value(1, 7);

        assert_eq!(time.fixed_value(1), Some(4));
    }

    #[test]
    fn test_mean_policy_averages_observations() {
        let mut longitude = longitude_aggregator();
        longitude.add_value(1, 10.0);
        longitude.add_value(1, 20.0);

        assert_eq!(longitude.fixed_value(1), Some(15.0));
    }

    #[test]
    fn test_get_value_before_propagate_is_not_found() {
        let mut time = time_aggregator();
        time.add_value(1, 10);

        assert_eq!(time.get_value(1), Err(LookupError::NotFound(1)));
    }

    #[test]
    fn test_unknown_entity_is_not_found() {
        let mut time = time_aggregator();
        time.add_value(1, 10);
        time.propagate(&AdjacencyStore::new());

        assert_eq!(time.get_value(99), Err(LookupError::NotFound(99)));
    }

    #[test]
    fn test_fan_out_reaches_direct_neighbors() {
        let mut graph = AdjacencyStore::new();
        graph.add_edge(1, 2);
        graph.add_edge(1, 3);

        let mut time = time_aggregator();
        time.add_value(1, 1000);
        let stats = time.propagate(&graph);

        assert_eq!(time.get_value(1), Ok(1000));
        assert_eq!(time.get_value(2), Ok(1000));
        assert_eq!(time.get_value(3), Ok(1000));
        assert_eq!(time.fixed_value(2), None);
        assert_eq!(time.fixed_value(3), None);
        assert_eq!(stats.sources, 1);
        assert_eq!(stats.estimated, 2);
        assert_eq!(stats.contributions, 2);
    }

    #[test]
    fn test_propagation_stops_after_one_hop() {
        let mut graph = AdjacencyStore::new();
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);

        let mut time = time_aggregator();
        time.add_value(1, 1000);
        time.propagate(&graph);

        assert_eq!(time.get_value(2), Ok(1000));
        assert_eq!(time.get_value(3), Err(LookupError::NotFound(3)));
    }

    #[test]
    fn test_fixed_values_are_never_overwritten() {
        let mut graph = AdjacencyStore::new();
        graph.add_undirected_edge(1, 2);

        let mut time = time_aggregator();
        time.add_value(1, 1000);
        time.add_value(2, -500);
        let stats = time.propagate(&graph);

        assert_eq!(time.get_value(1), Ok(1000));
        assert_eq!(time.get_value(2), Ok(-500));
        assert_eq!(stats.estimated, 0);
        assert_eq!(stats.contributions, 0);
    }

    #[test]
    fn test_two_sources_average() {
        let mut graph = AdjacencyStore::new();
        graph.add_edge(1, 3);
        graph.add_edge(2, 3);

        let mut longitude = longitude_aggregator();
        longitude.add_value(1, 10.0);
        longitude.add_value(2, 20.0);
        longitude.propagate(&graph);

        assert_eq!(longitude.get_value(3), Ok(15.0));
    }

    #[test]
    fn test_multi_edges_cancel_for_a_single_source() {
        let mut graph = AdjacencyStore::new();
        graph.add_edge(1, 2);
        graph.add_edge(1, 2);

        let mut longitude = longitude_aggregator();
        longitude.add_value(1, -42.5);
        let stats = longitude.propagate(&graph);

        assert_eq!(longitude.get_value(2), Ok(-42.5));
        assert_eq!(stats.contributions, 2);
    }

    #[test]
    fn test_multi_edges_pull_the_average() {
        let mut graph = AdjacencyStore::new();
        graph.add_edge(1, 3);
        graph.add_edge(1, 3);
        graph.add_edge(1, 3);
        graph.add_edge(2, 3);

        let mut longitude = longitude_aggregator();
        longitude.add_value(1, 0.0);
        longitude.add_value(2, 100.0);
        longitude.propagate(&graph);

        assert_eq!(longitude.get_value(3), Ok(25.0));
    }

    #[test]
    fn test_integer_estimates_truncate() {
        let mut graph = AdjacencyStore::new();
        graph.add_edge(1, 3);
        graph.add_edge(2, 3);

        let mut time = time_aggregator();
        time.add_value(1, 1);
        time.add_value(2, 2);
        time.propagate(&graph);

        assert_eq!(time.get_value(3), Ok(1));
    }

    #[test]
    fn test_weight_floor_skips_sources() {
        let mut graph = AdjacencyStore::new();
        graph.add_edge(1, 2);

        let mut time: ValueAggregator<i64> =
            ValueAggregator::new(Min, DiffusionConfig { initial_weight: 2 });
        time.add_value(1, 1000);
        let stats = time.propagate(&graph);

        assert_eq!(stats.skipped_sources, 1);
        assert_eq!(time.get_value(2), Err(LookupError::NotFound(2)));
        assert_eq!(time.get_value(1), Ok(1000));
    }

    #[test]
    fn test_overflowing_contribution_is_dropped() {
        let mut graph = AdjacencyStore::new();
        graph.add_undirected_edge(1, 2);

        // year 20,000,000,000,000,000 in day units; times 512 overflows i64
        let far_future = 7_440_000_000_000_000_032i64;
        let mut time = time_aggregator();
        time.add_value(1, far_future);
        let stats = time.propagate(&graph);

        assert_eq!(stats.saturated, 1);
        assert_eq!(stats.contributions, 0);
        assert_eq!(stats.estimated, 0);
        assert_eq!(time.get_value(1), Ok(far_future));
        assert_eq!(time.get_value(2), Err(LookupError::NotFound(2)));
    }

    #[test]
    fn test_overflowing_sum_keeps_earlier_contributions() {
        let mut graph = AdjacencyStore::new();
        graph.add_edge(1, 3);
        graph.add_edge(2, 3);

        // each product fits, their sum does not
        let large = i64::MAX / 512 - 1;
        let mut time = time_aggregator();
        time.add_value(1, large);
        time.add_value(2, large);
        let stats = time.propagate(&graph);

        assert_eq!(stats.contributions, 1);
        assert_eq!(stats.saturated, 1);
        assert_eq!(time.get_value(3), Ok(large));
    }

    #[test]
    fn test_propagate_twice_is_idempotent() {
        let mut graph = AdjacencyStore::new();
        graph.add_edge(1, 3);
        graph.add_edge(2, 3);

        let mut longitude = longitude_aggregator();
        longitude.add_value(1, 30.0);
        longitude.add_value(2, 60.0);

        let first = longitude.propagate(&graph);
        let first_value = longitude.get_value(3);
        let second = longitude.propagate(&graph);

        assert_eq!(first, second);
        assert_eq!(longitude.get_value(3), first_value);
        assert_eq!(first_value, Ok(45.0));
    }
}
