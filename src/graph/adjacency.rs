//! Directed multigraph adjacency store.
//!
//! Edges are only ever appended. Parallel edges between the same pair of
//! entities are kept, so a neighbor linked twice is visited twice during
//! propagation.

use rustc_hash::FxHashMap;

/// Dense key identifying one entity of the knowledge graph.
pub type EntityId = u64;

/// Out-neighbor lists keyed by entity.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyStore {
    edges: FxHashMap<EntityId, Vec<EntityId>>,
    edge_count: usize,
}

impl AdjacencyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `to` to the out-neighbors of `from`.
    ///
    /// The reverse direction is left untouched.
    pub fn add_edge(&mut self, from: EntityId, to: EntityId) {
        self.edges.entry(from).or_default().push(to);
        self.edge_count += 1;
    }

    /// Add `a -> b` and `b -> a`.
    pub fn add_undirected_edge(&mut self, a: EntityId, b: EntityId) {
        self.add_edge(a, b);
        self.add_edge(b, a);
    }

    /// Out-neighbors of `id` in insertion order, empty if it has none.
    pub fn neighbors(&self, id: EntityId) -> &[EntityId] {
        self.edges.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of entities with at least one outgoing edge.
    pub fn vertex_count(&self) -> usize {
        self.edges.len()
    }

    /// Total number of directed edges, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether no edge was ever added.
    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }
}
