//! Hybrid topology construction.
//!
//! Each interaction of a block is classified against the physical coupling
//! graph, then logical edges are inserted so that the block's interactions
//! can be realized:
//!
//! ```text
//!   direct    (a,b) is a physical edge
//!   indirect  a path a → b exists inside the block's physical subgraph,
//!             shorter than the block size
//!   external  neither; the edge-placement policy inserts a logical edge
//! ```
//!
//! Policies:
//!
//! | Policy | Inserted edge | Weight |
//! |--------|---------------|--------|
//! | `shortest_path` | `(a, b)` for each external pair | `6 × distance` |
//! | `nearest_physical` | closest pair between the physical components of `a` and `b` | `6 × distance` |
//! | `mst_path` | Prim over interaction pairs, minimum distance first | `6 × distance` |
//! | `mst_density` | Prim over interaction pairs, minimum `distance / frequency` first | `distance / frequency` |

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use qutopo_ir::{Edge, InteractionSet, QuditId};

use crate::coupling::CouplingMap;
use crate::error::{SelectError, SelectResult, TopologyWarning};
use crate::graph::Graph;
use crate::hybrid_graph::HybridGraph;

/// Logical edge placement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Connect each external pair directly.
    #[default]
    ShortestPath,
    /// Connect the physically closest pair between the two sides.
    NearestPhysical,
    /// Spanning tree over interaction pairs by physical distance.
    MstPath,
    /// Spanning tree over interaction pairs by distance per use.
    MstDensity,
}

impl EdgePolicy {
    /// All policies.
    pub const ALL: [EdgePolicy; 4] = [
        EdgePolicy::ShortestPath,
        EdgePolicy::NearestPhysical,
        EdgePolicy::MstPath,
        EdgePolicy::MstDensity,
    ];

    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShortestPath => "shortest_path",
            Self::NearestPhysical => "nearest_physical",
            Self::MstPath => "mst_path",
            Self::MstDensity => "mst_density",
        }
    }

    /// Whether the policy grows a spanning tree.
    pub fn is_spanning_tree(self) -> bool {
        matches!(self, Self::MstPath | Self::MstDensity)
    }

    /// Weight of an inserted edge spanning `distance` hops and used
    /// `frequency` times.
    pub fn edge_weight(self, distance: u32, frequency: usize) -> f64 {
        match self {
            Self::MstDensity => f64::from(distance) / frequency.max(1) as f64,
            _ => swap_cost(distance),
        }
    }
}

impl fmt::Display for EdgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EdgePolicy {
    type Err = SelectError;

    fn from_str(s: &str) -> SelectResult<Self> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        EdgePolicy::ALL
            .into_iter()
            .find(|p| p.as_str() == name)
            .ok_or_else(|| SelectError::InvalidConfig(format!("unknown edge policy '{s}'")))
    }
}

/// CNOTs needed to swap two qudits together across `distance` hops and back.
#[inline]
pub fn swap_cost(distance: u32) -> f64 {
    f64::from(3 * 2 * distance)
}

/// How an interaction relates to the physical graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeClass {
    Direct,
    Indirect,
    External,
}

/// Global interaction pairs partitioned by [`EdgeClass`]; repetitions kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeClasses {
    pub direct: Vec<Edge>,
    pub indirect: Vec<Edge>,
    pub external: Vec<Edge>,
}

impl EdgeClasses {
    /// Per-class occurrence counts.
    pub fn counts(&self) -> ClassCounts {
        ClassCounts {
            direct: self.direct.len(),
            indirect: self.indirect.len(),
            external: self.external.len(),
        }
    }

    /// Class of a pair, if it occurs.
    pub fn class_of(&self, edge: Edge) -> Option<EdgeClass> {
        if self.direct.contains(&edge) {
            Some(EdgeClass::Direct)
        } else if self.indirect.contains(&edge) {
            Some(EdgeClass::Indirect)
        } else if self.external.contains(&edge) {
            Some(EdgeClass::External)
        } else {
            None
        }
    }
}

/// Occurrence counts per class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub direct: usize,
    pub indirect: usize,
    pub external: usize,
}

impl ClassCounts {
    /// Total interactions.
    pub fn total(&self) -> usize {
        self.direct + self.indirect + self.external
    }
}

impl std::ops::AddAssign for ClassCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.direct += rhs.direct;
        self.indirect += rhs.indirect;
        self.external += rhs.external;
    }
}

/// Translate local interactions into global pairs through a qudit group.
pub fn to_global(qudit_group: &[QuditId], interactions: &InteractionSet) -> InteractionSet {
    let mut global = InteractionSet::new();
    for e in interactions.iter() {
        if let (Some(a), Some(b)) = (
            qudit_group.get(e.lo() as usize),
            qudit_group.get(e.hi() as usize),
        ) {
            global.push(a.0, b.0);
        }
    }
    global
}

/// Classify one global pair.
///
/// `subgraph` must be the physical subgraph induced by the qudit group.
pub fn classify_pair(
    edge: Edge,
    coupling: &CouplingMap,
    subgraph: &CouplingMap,
    group_size: usize,
) -> EdgeClass {
    if coupling.has_physical_edge(edge) {
        return EdgeClass::Direct;
    }
    match subgraph.distance(QuditId(edge.lo()), QuditId(edge.hi())) {
        Some(d) if (d as usize) < group_size => EdgeClass::Indirect,
        _ => EdgeClass::External,
    }
}

/// Partition a block's interactions into direct, indirect and external
/// global pairs.
pub fn classify_edges(
    interactions: &InteractionSet,
    coupling: &CouplingMap,
    qudit_group: &[QuditId],
) -> EdgeClasses {
    let subgraph = coupling.induced_subgraph(qudit_group);
    let mut classes = EdgeClasses::default();
    for edge in to_global(qudit_group, interactions).iter() {
        match classify_pair(edge, coupling, &subgraph, qudit_group.len()) {
            EdgeClass::Direct => classes.direct.push(edge),
            EdgeClass::Indirect => classes.indirect.push(edge),
            EdgeClass::External => classes.external.push(edge),
        }
    }
    classes
}

/// Result of building one block's hybrid topology.
#[derive(Debug, Clone)]
pub struct HybridTopology {
    /// Physical subgraph plus inserted logical edges.
    pub graph: HybridGraph,
    /// Interactions by class.
    pub classes: EdgeClasses,
    /// Non-fatal conditions met while building.
    pub warnings: Vec<TopologyWarning>,
}

/// A unique interaction pair with its frequency and physical distance.
#[derive(Debug, Clone, Copy)]
struct RankedPair {
    edge: Edge,
    frequency: usize,
    distance: u32,
    class: EdgeClass,
}

impl RankedPair {
    fn a(&self) -> QuditId {
        QuditId(self.edge.lo())
    }

    fn b(&self) -> QuditId {
        QuditId(self.edge.hi())
    }
}

/// Build the hybrid topology of one block.
///
/// `interactions` are in local indices of `qudit_group`.
pub fn build_hybrid(
    coupling: &CouplingMap,
    qudit_group: &[QuditId],
    interactions: &InteractionSet,
    policy: EdgePolicy,
) -> HybridTopology {
    let mut graph = HybridGraph::from_physical(coupling, qudit_group);
    let classes = classify_edges(interactions, coupling, qudit_group);
    let mut warnings = vec![];

    if interactions.is_empty() {
        return HybridTopology {
            graph,
            classes,
            warnings,
        };
    }

    let subgraph = coupling.induced_subgraph(qudit_group);
    let ranked: Vec<RankedPair> = to_global(qudit_group, interactions)
        .ranked()
        .into_iter()
        .map(|(edge, frequency)| {
            let (a, b) = (QuditId(edge.lo()), QuditId(edge.hi()));
            let distance = coupling.distance(a, b).unwrap_or_else(|| {
                warn!("{a} and {b} are disconnected in the coupling graph");
                warnings.push(TopologyWarning::UnreachablePair { a, b });
                coupling.worst_distance()
            });
            RankedPair {
                edge,
                frequency,
                distance,
                class: classify_pair(edge, coupling, &subgraph, qudit_group.len()),
            }
        })
        .collect();

    match policy {
        EdgePolicy::ShortestPath => insert_shortest_path(&mut graph, &ranked, policy),
        EdgePolicy::NearestPhysical => {
            insert_nearest_physical(&mut graph, coupling, &subgraph, &ranked, policy);
        }
        EdgePolicy::MstPath | EdgePolicy::MstDensity => {
            insert_spanning_tree(&mut graph, &ranked, policy);
            let components = graph.num_components();
            if components > 1 {
                warn!(
                    "{} policy left {} components in group {:?}",
                    policy, components, qudit_group
                );
                warnings.push(TopologyWarning::DisconnectedTopology { components });
            }
        }
    }
    debug!(
        "{}: {} logical edges for {} unique pairs",
        policy,
        graph.num_logical_edges(),
        ranked.len()
    );

    HybridTopology {
        graph,
        classes,
        warnings,
    }
}

fn insert_shortest_path(graph: &mut HybridGraph, ranked: &[RankedPair], policy: EdgePolicy) {
    for pair in ranked.iter().filter(|p| p.class == EdgeClass::External) {
        let weight = policy.edge_weight(pair.distance, pair.frequency);
        graph.add_logical_edge(pair.a(), pair.b(), pair.distance, weight);
    }
}

fn insert_nearest_physical(
    graph: &mut HybridGraph,
    coupling: &CouplingMap,
    subgraph: &CouplingMap,
    ranked: &[RankedPair],
    policy: EdgePolicy,
) {
    for pair in ranked.iter().filter(|p| p.class == EdgeClass::External) {
        let side_a = subgraph.reachable_from(pair.a());
        let side_b = subgraph.reachable_from(pair.b());

        let mut best = (pair.a(), pair.b(), coupling.worst_distance());
        for &x in &side_a {
            for &y in &side_b {
                if let Some(d) = coupling.distance(x, y) {
                    if d > 0 && d < best.2 {
                        best = (x, y, d);
                    }
                }
            }
        }

        let (x, y, d) = best;
        graph.add_logical_edge(x, y, d, policy.edge_weight(d, pair.frequency));
    }
}

/// Prim-style growth over interaction pairs.
///
/// A tree is the hybrid component of a seed vertex. Candidates are pairs
/// with exactly one endpoint in the tree; the cheapest is inserted and the
/// tree recomputed. When no candidate is left, the next interaction
/// endpoint outside every tree seen so far becomes a new seed.
fn insert_spanning_tree(graph: &mut HybridGraph, ranked: &[RankedPair], policy: EdgePolicy) {
    let key = |p: &RankedPair| match policy {
        EdgePolicy::MstDensity => f64::from(p.distance) / p.frequency.max(1) as f64,
        _ => f64::from(p.distance),
    };

    let mut done: FxHashSet<QuditId> = FxHashSet::default();
    let seeds: Vec<QuditId> = ranked.iter().flat_map(|p| [p.a(), p.b()]).collect();

    for seed in seeds {
        if done.contains(&seed) {
            continue;
        }
        loop {
            let tree: FxHashSet<QuditId> = graph.reachable_from(seed).into_iter().collect();
            let mut best: Option<&RankedPair> = None;
            for pair in ranked {
                if tree.contains(&pair.a()) == tree.contains(&pair.b()) {
                    continue;
                }
                if best.is_none_or(|b| key(pair) < key(b)) {
                    best = Some(pair);
                }
            }
            match best {
                Some(pair) => {
                    let weight = policy.edge_weight(pair.distance, pair.frequency);
                    graph.add_logical_edge(pair.a(), pair.b(), pair.distance, weight);
                }
                None => {
                    done.extend(tree);
                    break;
                }
            }
        }
    }
}
