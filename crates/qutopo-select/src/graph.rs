//! Minimal graph interface shared by the coupling map and hybrid graphs.

use rustc_hash::FxHashSet;
use std::collections::VecDeque;

use qutopo_ir::QuditId;

/// The operations topology selection needs from a graph over qudits.
///
/// `Weight` is the path metric: hop counts for the physical coupling map,
/// accumulated edge weights for a hybrid graph.
pub trait Graph {
    /// Path length type.
    type Weight: Copy + PartialOrd + std::fmt::Debug;

    /// All vertices, in a stable order.
    fn vertices(&self) -> Vec<QuditId>;

    /// Whether `v` is a vertex of the graph.
    fn has_vertex(&self, v: QuditId) -> bool;

    /// Adjacent vertices of `v`.
    fn neighbors(&self, v: QuditId) -> Vec<QuditId>;

    /// Whether `a` and `b` share an edge.
    fn has_edge(&self, a: QuditId, b: QuditId) -> bool;

    /// Insert an undirected edge of unit length.
    fn add_edge(&mut self, a: QuditId, b: QuditId);

    /// A shortest path `from → to`, endpoints included. `None` if unreachable.
    fn shortest_path(&self, from: QuditId, to: QuditId) -> Option<Vec<QuditId>>;

    /// Length of a shortest path, `None` if unreachable.
    fn shortest_path_length(&self, from: QuditId, to: QuditId) -> Option<Self::Weight>;

    /// The subgraph spanned by `vertices` and the edges among them.
    fn induced_subgraph(&self, vertices: &[QuditId]) -> Self
    where
        Self: Sized;

    /// Every vertex reachable from `start` (including `start`), in BFS order.
    fn reachable_from(&self, start: QuditId) -> Vec<QuditId> {
        if !self.has_vertex(start) {
            return vec![];
        }
        let mut seen = FxHashSet::default();
        let mut order = vec![];
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            for n in self.neighbors(v) {
                if seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        order
    }

    /// Connected components, each sorted, ordered by smallest member.
    fn connected_components(&self) -> Vec<Vec<QuditId>> {
        let mut vertices = self.vertices();
        vertices.sort_unstable();
        let mut assigned = FxHashSet::default();
        let mut components = vec![];
        for v in vertices {
            if assigned.contains(&v) {
                continue;
            }
            let mut component = self.reachable_from(v);
            component.sort_unstable();
            assigned.extend(component.iter().copied());
            components.push(component);
        }
        components
    }
}
