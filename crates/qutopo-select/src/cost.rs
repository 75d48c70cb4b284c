//! CNOT-count estimates over a hybrid graph.
//!
//! Each interaction is charged along its weighted shortest path of length
//! `L`: `3 × (⌈L⌉ − 1) + 1` if `L > 1`, else `1` (move into range,
//! interact, move back).
//!
//! With relabeling enabled, every edge of weight above 1 on a used path is
//! set to weight 1 afterwards, modeling that the qudits are already in
//! range for the next use. This is a heuristic and may over- or
//! under-estimate real routing cost; it is not a routing simulation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use qutopo_ir::{Edge, QuditId};

use crate::error::TopologyWarning;
use crate::hybrid::{EdgeClass, EdgeClasses};
use crate::hybrid_graph::HybridGraph;

/// Cost of one interaction whose path length is `length`.
#[inline]
pub fn interaction_cost(length: f64) -> u64 {
    if length > 1.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let hops = length.ceil() as u64;
        3 * (hops - 1) + 1
    } else {
        1
    }
}

/// Per-class operation counts and costs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub direct_ops: usize,
    pub direct_cost: u64,
    pub indirect_ops: usize,
    pub indirect_cost: u64,
    pub external_ops: usize,
    pub external_cost: u64,
}

impl CostBreakdown {
    /// Sum of the three class costs.
    pub fn total(&self) -> u64 {
        self.direct_cost + self.indirect_cost + self.external_cost
    }

    fn record(&mut self, class: EdgeClass, cost: u64) {
        match class {
            EdgeClass::Direct => {
                self.direct_ops += 1;
                self.direct_cost += cost;
            }
            EdgeClass::Indirect => {
                self.indirect_ops += 1;
                self.indirect_cost += cost;
            }
            EdgeClass::External => {
                self.external_ops += 1;
                self.external_cost += cost;
            }
        }
    }
}

/// Estimator with its relabeling option.
#[derive(Debug, Clone, Copy)]
pub struct CostEstimator {
    relabel: bool,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self { relabel: true }
    }
}

impl CostEstimator {
    /// Create an estimator with relabeling on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle relabeling.
    #[must_use]
    pub fn with_relabel(mut self, relabel: bool) -> Self {
        self.relabel = relabel;
        self
    }

    /// Total estimated cost of `interactions` (global pairs) over `graph`.
    ///
    /// Unreachable interactions contribute nothing and are reported in the
    /// returned warnings.
    pub fn estimate(&self, interactions: &[Edge], graph: &HybridGraph) -> (u64, Vec<TopologyWarning>) {
        let mut working = graph.clone();
        let mut warnings = vec![];
        let total = interactions
            .iter()
            .map(|&e| self.charge(e, &mut working, &mut warnings).unwrap_or(0))
            .sum();
        (total, warnings)
    }

    /// Cost split by interaction class.
    ///
    /// Interactions are charged in recording order, as in [`estimate`],
    /// so relabeling from earlier uses applies across classes.
    ///
    /// [`estimate`]: Self::estimate
    pub fn estimate_breakdown(
        &self,
        interactions: &[Edge],
        classes: &EdgeClasses,
        graph: &HybridGraph,
    ) -> (CostBreakdown, Vec<TopologyWarning>) {
        let mut working = graph.clone();
        let mut warnings = vec![];
        let mut breakdown = CostBreakdown::default();
        for &e in interactions {
            let cost = self.charge(e, &mut working, &mut warnings).unwrap_or(0);
            let class = classes.class_of(e).unwrap_or(EdgeClass::External);
            breakdown.record(class, cost);
        }
        (breakdown, warnings)
    }

    fn charge(
        &self,
        edge: Edge,
        working: &mut HybridGraph,
        warnings: &mut Vec<TopologyWarning>,
    ) -> Option<u64> {
        let (a, b) = (QuditId(edge.lo()), QuditId(edge.hi()));
        let Some((length, path)) = working.weighted_path(a, b) else {
            warn!("No hybrid path between {a} and {b}; interaction not costed");
            let warning = TopologyWarning::UncostedInteraction { a, b };
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
            return None;
        };
        if self.relabel {
            for w in path.windows(2) {
                if working.edge(w[0], w[1]).is_some_and(|e| e.weight > 1.0) {
                    working.set_weight(w[0], w[1], 1.0);
                }
            }
        }
        Some(interaction_cost(length))
    }
}

/// [`CostEstimator::estimate`] with relabeling on, dropping warnings.
pub fn estimate_cost(interactions: &[Edge], graph: &HybridGraph) -> u64 {
    CostEstimator::new().estimate(interactions, graph).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupling::CouplingMap;
    use crate::hybrid::{EdgePolicy, build_hybrid, to_global};
    use qutopo_ir::InteractionSet;

    fn q(i: u32) -> QuditId {
        QuditId(i)
    }

    #[test]
    fn test_interaction_cost_formula() {
        assert_eq!(interaction_cost(0.0), 1);
        assert_eq!(interaction_cost(1.0), 1);
        assert_eq!(interaction_cost(2.0), 4);
        assert_eq!(interaction_cost(1.5), 4);
        assert_eq!(interaction_cost(18.0), 52);
    }

    #[test]
    fn test_empty_interactions_cost_zero() {
        let graph = HybridGraph::from_physical(&CouplingMap::linear(3), &[q(0), q(1), q(2)]);
        assert_eq!(estimate_cost(&[], &graph), 0);
    }

    #[test]
    fn test_direct_and_indirect_costs() {
        let graph = HybridGraph::from_physical(&CouplingMap::linear(3), &[q(0), q(1), q(2)]);
        assert_eq!(estimate_cost(&[Edge::new(0, 1)], &graph), 1);
        assert_eq!(estimate_cost(&[Edge::new(0, 2)], &graph), 4);
    }

    #[test]
    fn test_relabel_makes_reuse_cheap() {
        let line = CouplingMap::linear(4);
        let group = [q(0), q(3)];
        let ops = InteractionSet::from_pairs([(0, 1), (0, 1)]);
        let hybrid = build_hybrid(&line, &group, &ops, EdgePolicy::ShortestPath);
        let global: Vec<Edge> = to_global(&group, &ops).iter().collect();

        // logical edge weight 6 * 3 = 18: first use 52, second use 1
        let (with, _) = CostEstimator::new().estimate(&global, &hybrid.graph);
        assert_eq!(with, 53);
        let (without, _) = CostEstimator::new()
            .with_relabel(false)
            .estimate(&global, &hybrid.graph);
        assert_eq!(without, 104);
        // the input graph is untouched
        assert_eq!(hybrid.graph.edge(q(0), q(3)).map(|e| e.weight), Some(18.0));
    }

    #[test]
    fn test_unreachable_contributes_nothing() {
        let graph = HybridGraph::from_physical(&CouplingMap::linear(4), &[q(0), q(1), q(3)]);
        let (cost, warnings) = CostEstimator::new().estimate(&[Edge::new(0, 1), Edge::new(1, 3)], &graph);
        assert_eq!(cost, 1);
        assert_eq!(warnings, vec![TopologyWarning::UncostedInteraction { a: q(1), b: q(3) }]);
    }

    #[test]
    fn test_breakdown_by_class() {
        let mesh = CouplingMap::mesh(3, 3);
        let group = [q(0), q(1), q(4), q(8)];
        let ops = InteractionSet::from_pairs([(0, 1), (0, 2), (0, 3)]);
        let hybrid = build_hybrid(&mesh, &group, &ops, EdgePolicy::ShortestPath);
        let global: Vec<Edge> = to_global(&group, &ops).iter().collect();
        let (breakdown, warnings) =
            CostEstimator::new().estimate_breakdown(&global, &hybrid.classes, &hybrid.graph);
        assert!(warnings.is_empty());
        assert_eq!(breakdown.direct_ops, 1);
        assert_eq!(breakdown.direct_cost, 1);
        assert_eq!(breakdown.indirect_ops, 1);
        assert_eq!(breakdown.indirect_cost, 4);
        assert_eq!(breakdown.external_ops, 1);
        assert_eq!(breakdown.total(), CostEstimator::new().estimate(&global, &hybrid.graph).0);
    }
}
