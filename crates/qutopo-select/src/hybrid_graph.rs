//! Weighted hybrid graph: a block's physical subgraph plus logical edges.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use qutopo_ir::{Edge, QuditId};

use crate::coupling::CouplingMap;
use crate::graph::Graph;

/// Where a hybrid edge comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeOrigin {
    /// Present in the coupling map.
    Physical,
    /// Inserted by an edge-placement policy.
    Logical,
}

/// Payload of a hybrid edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridEdge {
    /// Physical or inserted.
    pub origin: EdgeOrigin,
    /// Hop distance between the endpoints in the coupling map.
    pub distance: u32,
    /// Policy weight used for weighted shortest paths.
    pub weight: f64,
}

impl HybridEdge {
    /// A physical edge: distance 1, weight 1.
    pub fn physical() -> Self {
        Self {
            origin: EdgeOrigin::Physical,
            distance: 1,
            weight: 1.0,
        }
    }

    /// An inserted edge with the given measured distance and policy weight.
    pub fn logical(distance: u32, weight: f64) -> Self {
        Self {
            origin: EdgeOrigin::Logical,
            distance,
            weight,
        }
    }
}

/// A hybrid edge with its endpoints, as exported in reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedEdge {
    /// Smaller endpoint.
    pub a: QuditId,
    /// Larger endpoint.
    pub b: QuditId,
    /// Physical or inserted.
    pub origin: EdgeOrigin,
    /// Coupling-map hop distance.
    pub distance: u32,
    /// Policy weight.
    pub weight: f64,
}

/// Weighted undirected graph over one block's global qudits.
///
/// Starts as the physical subgraph induced by the qudit group, every edge
/// with weight 1. Policies then add logical edges. Inserting an edge that
/// already exists keeps the smaller weight.
#[derive(Debug, Clone, Default)]
pub struct HybridGraph {
    graph: UnGraph<QuditId, HybridEdge>,
    nodes: FxHashMap<QuditId, NodeIndex>,
}

impl HybridGraph {
    /// Create an empty hybrid graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// The physical subgraph of `coupling` induced by `qudit_group`.
    pub fn from_physical(coupling: &CouplingMap, qudit_group: &[QuditId]) -> Self {
        let mut hybrid = Self::new();
        for &q in qudit_group {
            hybrid.ensure_node(q);
        }
        for (i, &a) in qudit_group.iter().enumerate() {
            for &b in &qudit_group[i + 1..] {
                if coupling.is_connected(a, b) {
                    hybrid.insert(a, b, HybridEdge::physical());
                }
            }
        }
        hybrid
    }

    fn ensure_node(&mut self, q: QuditId) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(&q) {
            return idx;
        }
        let idx = self.graph.add_node(q);
        self.nodes.insert(q, idx);
        idx
    }

    /// Insert an edge, or lower the weight of an existing one.
    ///
    /// Returns `true` if the graph changed.
    pub fn insert(&mut self, a: QuditId, b: QuditId, edge: HybridEdge) -> bool {
        if a == b {
            return false;
        }
        let na = self.ensure_node(a);
        let nb = self.ensure_node(b);
        match self.graph.find_edge(na, nb) {
            Some(e) => match self.graph.edge_weight_mut(e) {
                Some(existing) if edge.weight < existing.weight => {
                    *existing = HybridEdge {
                        origin: existing.origin,
                        ..edge
                    };
                    true
                }
                _ => false,
            },
            None => {
                self.graph.add_edge(na, nb, edge);
                true
            }
        }
    }

    /// Insert a logical edge with a measured distance and policy weight.
    pub fn add_logical_edge(&mut self, a: QuditId, b: QuditId, distance: u32, weight: f64) -> bool {
        self.insert(a, b, HybridEdge::logical(distance, weight))
    }

    /// Payload of the edge between `a` and `b`.
    pub fn edge(&self, a: QuditId, b: QuditId) -> Option<&HybridEdge> {
        let (na, nb) = (self.nodes.get(&a)?, self.nodes.get(&b)?);
        let e = self.graph.find_edge(*na, *nb)?;
        self.graph.edge_weight(e)
    }

    /// Overwrite the weight of an existing edge.
    pub fn set_weight(&mut self, a: QuditId, b: QuditId, weight: f64) -> bool {
        let (Some(&na), Some(&nb)) = (self.nodes.get(&a), self.nodes.get(&b)) else {
            return false;
        };
        let Some(e) = self.graph.find_edge(na, nb) else {
            return false;
        };
        match self.graph.edge_weight_mut(e) {
            Some(edge) => {
                edge.weight = weight;
                true
            }
            None => false,
        }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of inserted (logical) edges.
    pub fn num_logical_edges(&self) -> usize {
        self.graph
            .edge_weights()
            .filter(|e| e.origin == EdgeOrigin::Logical)
            .count()
    }

    /// Number of connected components.
    pub fn num_components(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    /// All edges, endpoints normalized, sorted by endpoints.
    pub fn edges(&self) -> Vec<WeightedEdge> {
        let mut edges: Vec<WeightedEdge> = self
            .graph
            .edge_references()
            .map(|e| {
                let (x, y) = (self.graph[e.source()], self.graph[e.target()]);
                let (a, b) = if x <= y { (x, y) } else { (y, x) };
                let w = e.weight();
                WeightedEdge {
                    a,
                    b,
                    origin: w.origin,
                    distance: w.distance,
                    weight: w.weight,
                }
            })
            .collect();
        edges.sort_by_key(|e| (e.a, e.b));
        edges
    }

    /// Edges as normalized global pairs.
    pub fn edge_pairs(&self) -> Vec<Edge> {
        self.edges()
            .into_iter()
            .map(|e| Edge::new(e.a.0, e.b.0))
            .collect()
    }

    /// Weighted shortest path: total weight and the vertex sequence.
    pub fn weighted_path(&self, from: QuditId, to: QuditId) -> Option<(f64, Vec<QuditId>)> {
        let start = *self.nodes.get(&from)?;
        let goal = *self.nodes.get(&to)?;
        let (cost, path) = petgraph::algo::astar(
            &self.graph,
            start,
            |n| n == goal,
            |e| e.weight().weight,
            |_| 0.0,
        )?;
        Some((cost, path.into_iter().map(|n| self.graph[n]).collect()))
    }
}

impl Graph for HybridGraph {
    type Weight = f64;

    fn vertices(&self) -> Vec<QuditId> {
        self.graph.node_weights().copied().collect()
    }

    fn has_vertex(&self, v: QuditId) -> bool {
        self.nodes.contains_key(&v)
    }

    fn neighbors(&self, v: QuditId) -> Vec<QuditId> {
        match self.nodes.get(&v) {
            Some(&n) => self.graph.neighbors(n).map(|m| self.graph[m]).collect(),
            None => vec![],
        }
    }

    fn has_edge(&self, a: QuditId, b: QuditId) -> bool {
        self.edge(a, b).is_some()
    }

    fn add_edge(&mut self, a: QuditId, b: QuditId) {
        self.insert(a, b, HybridEdge::physical());
    }

    fn shortest_path(&self, from: QuditId, to: QuditId) -> Option<Vec<QuditId>> {
        self.weighted_path(from, to).map(|(_, path)| path)
    }

    fn shortest_path_length(&self, from: QuditId, to: QuditId) -> Option<f64> {
        self.weighted_path(from, to).map(|(cost, _)| cost)
    }

    fn induced_subgraph(&self, vertices: &[QuditId]) -> Self {
        let mut sub = Self::new();
        for &v in vertices {
            if self.has_vertex(v) {
                sub.ensure_node(v);
            }
        }
        for e in self.graph.edge_references() {
            let (a, b) = (self.graph[e.source()], self.graph[e.target()]);
            if sub.has_vertex(a) && sub.has_vertex(b) {
                sub.insert(a, b, *e.weight());
            }
        }
        sub
    }
}
