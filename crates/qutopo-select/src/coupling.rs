//! Physical coupling graph.
//!
//! The coupling map defines which pairs of global qudits are physically
//! adjacent. It is fixed for the lifetime of a selection run and shared
//! read-only across blocks (and across worker threads).
//!
//! # Example
//!
//! ```
//! use qutopo_select::CouplingMap;
//! use qutopo_ir::QuditId;
//!
//! // 3x3 nearest-neighbour mesh:
//! //   0 - 1 - 2
//! //   |   |   |
//! //   3 - 4 - 5
//! //   |   |   |
//! //   6 - 7 - 8
//! let mesh = CouplingMap::mesh(3, 3);
//! assert!(mesh.is_connected(QuditId(0), QuditId(1)));
//! assert!(!mesh.is_connected(QuditId(0), QuditId(4)));
//! assert_eq!(mesh.distance(QuditId(0), QuditId(8)), Some(4));
//! ```

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use qutopo_ir::{Edge, QuditId};

use crate::graph::Graph;

/// Undirected, unweighted physical adjacency over global qudit indices.
///
/// ## Performance
///
/// Factory constructors precompute an all-pairs distance matrix and a
/// predecessor matrix by BFS from every node, so `distance()` is O(1) and
/// `shortest_path()` is O(distance). Maps built edge by edge, induced
/// subgraphs, and freshly deserialized maps answer queries by BFS until
/// [`rebuild_caches()`](Self::rebuild_caches) is called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingMap {
    /// Connected qudit pairs, stored once each as `(min, max)`.
    edges: Vec<(u32, u32)>,
    /// Number of qudits; vertices are `0..num_qudits`.
    num_qudits: u32,
    /// Vertex restriction for induced subgraphs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    members: Option<Vec<u32>>,
    #[serde(skip)]
    adjacency: FxHashMap<u32, Vec<u32>>,
    /// `dist_matrix[from][to]`, or `u32::MAX` if unreachable.
    #[serde(skip)]
    dist_matrix: Vec<Vec<u32>>,
    /// `pred_matrix[from][to]` is the hop before `to` on a shortest path.
    #[serde(skip)]
    pred_matrix: Vec<Vec<u32>>,
}

impl CouplingMap {
    /// Create a coupling map with no edges.
    pub fn new(num_qudits: u32) -> Self {
        Self {
            edges: vec![],
            num_qudits,
            members: None,
            adjacency: FxHashMap::default(),
            dist_matrix: vec![],
            pred_matrix: vec![],
        }
    }

    /// Add an undirected edge.
    ///
    /// Duplicates (in either orientation) and self-loops are ignored. The
    /// qudit count grows to cover both endpoints. Precomputed distances are
    /// dropped; queries fall back to BFS until the caches are rebuilt.
    pub fn add_edge(&mut self, q1: u32, q2: u32) {
        if q1 == q2 || self.is_connected(QuditId(q1), QuditId(q2)) {
            return;
        }
        let (lo, hi) = (q1.min(q2), q1.max(q2));
        self.edges.push((lo, hi));
        self.adjacency.entry(lo).or_default().push(hi);
        self.adjacency.entry(hi).or_default().push(lo);
        self.num_qudits = self.num_qudits.max(hi + 1);
        self.dist_matrix.clear();
        self.pred_matrix.clear();
    }

    /// A map over `n` qudits with the given couplings and precomputed
    /// distances. Endpoints beyond `n` grow the map.
    fn with_couplings(n: u32, couplings: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut map = Self::new(n);
        for (a, b) in couplings {
            map.add_edge(a, b);
        }
        map.precompute_distances();
        map
    }

    /// Build a map from an edge list; the qudit count is `max index + 1`.
    pub fn from_edges(edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        Self::with_couplings(0, edges)
    }

    /// Qudits on a chain, each coupled to its successor.
    pub fn linear(n: u32) -> Self {
        Self::with_couplings(n, (1..n).map(|q| (q - 1, q)))
    }

    /// Every qudit pair coupled; all distances are 1.
    pub fn full(n: u32) -> Self {
        Self::with_couplings(n, (0..n).flat_map(move |a| (a + 1..n).map(move |b| (a, b))))
    }

    /// Qudit 0 coupled to every other qudit; leaves sit two hops apart.
    pub fn star(n: u32) -> Self {
        Self::with_couplings(n, (1..n).map(|leaf| (0, leaf)))
    }

    /// Row-major `rows x cols` nearest-neighbour mesh.
    pub fn mesh(rows: u32, cols: u32) -> Self {
        let couplings = (0..rows * cols).flat_map(move |q| {
            let (r, c) = (q / cols, q % cols);
            let right = (c + 1 < cols).then_some((q, q + 1));
            let down = (r + 1 < rows).then_some((q, q + cols));
            right.into_iter().chain(down)
        });
        Self::with_couplings(rows * cols, couplings)
    }

    /// Square mesh large enough to hold `n` qudits (side `ceil(sqrt(n))`).
    pub fn grid(n: u32) -> Self {
        let mut side = 0u32;
        while side * side < n {
            side += 1;
        }
        Self::mesh(side, side)
    }

    /// One BFS tree per qudit, flattened into the distance and predecessor
    /// matrices.
    fn precompute_distances(&mut self) {
        let n = self.num_qudits as usize;
        let mut dist = vec![vec![u32::MAX; n]; n];
        let mut pred = vec![vec![u32::MAX; n]; n];

        for (row, src) in (0..self.num_qudits).enumerate() {
            for (node, (d, via)) in self.bfs(src) {
                let col = node as usize;
                if col >= n {
                    continue;
                }
                dist[row][col] = d;
                if node != src {
                    pred[row][col] = via;
                }
            }
        }

        self.dist_matrix = dist;
        self.pred_matrix = pred;
    }

    /// Rebuild adjacency and the distance/predecessor matrices from the edge
    /// list. Call after deserialization.
    ///
    /// The edge list is normalized the way [`add_edge`](Self::add_edge)
    /// normalizes it: self-loops and repeats are dropped, and the qudit count
    /// grows to cover every endpoint.
    pub fn rebuild_caches(&mut self) {
        let mut seen = FxHashSet::default();
        self.edges = self
            .edges
            .iter()
            .filter(|(q1, q2)| q1 != q2)
            .map(|&(q1, q2)| (q1.min(q2), q1.max(q2)))
            .filter(|&pair| seen.insert(pair))
            .collect();

        self.adjacency.clear();
        for &(lo, hi) in &self.edges {
            self.adjacency.entry(lo).or_default().push(hi);
            self.adjacency.entry(hi).or_default().push(lo);
            self.num_qudits = self.num_qudits.max(hi + 1);
        }
        if self.members.is_none() {
            self.precompute_distances();
        }
    }

    /// Whether the all-pairs distance matrix is available.
    pub fn has_distance_cache(&self) -> bool {
        self.dist_matrix.len() == self.num_qudits as usize
            && (self.edges.is_empty() || !self.adjacency.is_empty())
    }

    /// Whether two qudits share a physical edge.
    #[inline]
    pub fn is_connected(&self, q1: QuditId, q2: QuditId) -> bool {
        self.adjacency
            .get(&q1.0)
            .is_some_and(|neighbors| neighbors.contains(&q2.0))
    }

    /// Whether a normalized global pair is a physical edge.
    #[inline]
    pub fn has_physical_edge(&self, edge: Edge) -> bool {
        self.is_connected(QuditId(edge.lo()), QuditId(edge.hi()))
    }

    /// Number of qudits.
    #[inline]
    pub fn num_qudits(&self) -> u32 {
        self.num_qudits
    }

    /// Distance used for unreachable pairs: no simple path can be this long.
    #[inline]
    pub fn worst_distance(&self) -> u32 {
        self.num_qudits.max(1)
    }

    /// The physical edges as `(min, max)` pairs.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    fn is_member(&self, q: u32) -> bool {
        match &self.members {
            Some(members) => members.contains(&q),
            None => q < self.num_qudits,
        }
    }

    /// Hop distance, or `None` if the qudits are disconnected.
    ///
    /// O(1) with precomputed matrices; BFS otherwise.
    pub fn distance(&self, from: QuditId, to: QuditId) -> Option<u32> {
        if !self.is_member(from.0) || !self.is_member(to.0) {
            return None;
        }
        if from == to {
            return Some(0);
        }

        let (f, t) = (from.index(), to.index());
        if f < self.dist_matrix.len() && t < self.dist_matrix[f].len() {
            let d = self.dist_matrix[f][t];
            return if d == u32::MAX { None } else { Some(d) };
        }

        self.bfs(from.0)
            .get(&to.0)
            .map(|&(dist, _)| dist)
    }

    /// Hop distance, or [`worst_distance`](Self::worst_distance) if the
    /// qudits are disconnected.
    pub fn distance_or_worst(&self, from: QuditId, to: QuditId) -> u32 {
        self.distance(from, to).unwrap_or_else(|| self.worst_distance())
    }

    /// A shortest path `from → to`, both endpoints included.
    pub fn shortest_path(&self, from: QuditId, to: QuditId) -> Option<Vec<QuditId>> {
        if !self.is_member(from.0) || !self.is_member(to.0) {
            return None;
        }
        if from == to {
            return Some(vec![from]);
        }

        let (f, t) = (from.index(), to.index());
        let mut path = vec![to.0];
        if f < self.pred_matrix.len() && t < self.pred_matrix[f].len() {
            if self.dist_matrix[f][t] == u32::MAX {
                return None;
            }
            let mut current = to.0;
            while current != from.0 {
                let pred = self.pred_matrix[f][current as usize];
                if pred == u32::MAX {
                    return None;
                }
                path.push(pred);
                current = pred;
            }
        } else {
            let tree = self.bfs(from.0);
            tree.get(&to.0)?;
            let mut current = to.0;
            while current != from.0 {
                let (_, pred) = *tree.get(&current)?;
                path.push(pred);
                current = pred;
            }
        }
        path.reverse();
        Some(path.into_iter().map(QuditId).collect())
    }

    /// BFS tree from `from`: `node → (distance, predecessor)`.
    fn bfs(&self, from: u32) -> FxHashMap<u32, (u32, u32)> {
        let mut visited = FxHashMap::default();
        let mut queue = VecDeque::new();
        visited.insert(from, (0u32, from));
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            let dist = visited.get(&current).map_or(0, |&(d, _)| d);
            for &neighbor in self.adjacency.get(&current).into_iter().flatten() {
                if let std::collections::hash_map::Entry::Vacant(e) = visited.entry(neighbor) {
                    e.insert((dist + 1, current));
                    queue.push_back(neighbor);
                }
            }
        }

        visited
    }
}

impl Graph for CouplingMap {
    type Weight = u32;

    fn vertices(&self) -> Vec<QuditId> {
        match &self.members {
            Some(members) => members.iter().copied().map(QuditId).collect(),
            None => (0..self.num_qudits).map(QuditId).collect(),
        }
    }

    fn has_vertex(&self, v: QuditId) -> bool {
        self.is_member(v.0)
    }

    fn neighbors(&self, v: QuditId) -> Vec<QuditId> {
        self.adjacency
            .get(&v.0)
            .map(|ns| ns.iter().copied().map(QuditId).collect())
            .unwrap_or_default()
    }

    fn has_edge(&self, a: QuditId, b: QuditId) -> bool {
        self.is_connected(a, b)
    }

    fn add_edge(&mut self, a: QuditId, b: QuditId) {
        CouplingMap::add_edge(self, a.0, b.0);
        if let Some(members) = &mut self.members {
            for q in [a.0, b.0] {
                if !members.contains(&q) {
                    members.push(q);
                }
            }
        }
    }

    fn shortest_path(&self, from: QuditId, to: QuditId) -> Option<Vec<QuditId>> {
        CouplingMap::shortest_path(self, from, to)
    }

    fn shortest_path_length(&self, from: QuditId, to: QuditId) -> Option<u32> {
        self.distance(from, to)
    }

    /// The subgraph over `vertices` with the physical edges among them.
    /// It carries no precomputed distances and answers queries by BFS.
    fn induced_subgraph(&self, vertices: &[QuditId]) -> Self {
        let keep: FxHashSet<u32> = vertices.iter().map(|q| q.0).collect();
        let mut sub = Self::new(self.num_qudits);
        sub.members = Some(vertices.iter().map(|q| q.0).collect());
        for &(a, b) in &self.edges {
            if keep.contains(&a) && keep.contains(&b) {
                sub.edges.push((a, b));
            }
        }
        sub.rebuild_caches();
        sub
    }
}
