//! Qutopo Topology Selection Engine
//!
//! This crate selects a connectivity kernel and a hybrid topology for every
//! block of a partitioned quantum circuit, given the physical coupling graph
//! of the target device.
//!
//! # Overview
//!
//! For each block the engine:
//! 1. **Matches** a kernel: every vertex permutation of every template of the
//!    configured family is scored against the block's interactions, and the
//!    kernel covering the most interaction occurrences wins
//! 2. **Classifies** the kernel by degree sequence (`"4-line"`, `"5-tee"`, ...)
//! 3. **Builds** a hybrid topology: the block's physical subgraph plus
//!    logical edges for interactions the hardware cannot serve inside the
//!    block
//! 4. **Estimates** the CNOT cost of the block's interactions over that graph
//!
//! # Architecture
//!
//! ```text
//! PartitionStructure              CouplingMap
//!       │                              │
//!       ▼                              ▼
//! ┌──────────────────────────────────────────┐
//! │ KernelSelector ◄── SelectionConfig       │
//! └──────────────────────────────────────────┘
//!       │
//!       ├── grow_qudit_group      (optional, sequential)
//!       ├── propagate_overlap     (optional, sequential)
//!       │
//!       ├── per block, on the rayon pool:
//!       │     KernelMatcher → KernelClass
//!       │     build_hybrid  → CostEstimator
//!       ▼
//! SelectionReport { blocks, summary }
//! ```
//!
//! # Example
//!
//! ```rust
//! use qutopo_ir::{Block, PartitionStructure};
//! use qutopo_select::{Category, CouplingMap, KernelSelector, SelectionConfig};
//!
//! let blocks = vec![
//!     Block::from_raw([0, 1, 2, 3], [(0, 1), (0, 1), (0, 1), (1, 2), (1, 2), (2, 3)]).unwrap(),
//! ];
//! let structure = PartitionStructure::new(blocks);
//!
//! let config = SelectionConfig::new(4).with_category(Category::Lines);
//! let selector = KernelSelector::new(config, CouplingMap::mesh(2, 2)).unwrap();
//! let report = selector.select(&structure).unwrap();
//!
//! assert_eq!(report.blocks[0].label.label(), "4-line");
//! assert_eq!(report.blocks[0].edge_score, 6);
//! println!("{}", report.summary);
//! ```
//!
//! # Edge policies
//!
//! | Policy | Inserted edges |
//! |--------|----------------|
//! | `shortest_path` | one per external interaction pair |
//! | `nearest_physical` | between the closest qudits of the two physical components |
//! | `mst_path` | spanning tree over interaction pairs by distance |
//! | `mst_density` | spanning tree over interaction pairs by distance per use |

pub mod classify;
pub mod config;
pub mod cost;
pub mod coupling;
pub mod error;
pub mod graph;
pub mod growth;
pub mod hybrid;
pub mod hybrid_graph;
pub mod matcher;
pub mod overlap;
pub mod report;
pub mod selector;
pub mod templates;

pub use classify::{KernelClass, kernel_type, possible_labels};
pub use config::SelectionConfig;
pub use cost::{CostBreakdown, CostEstimator, estimate_cost, interaction_cost};
pub use coupling::CouplingMap;
pub use error::{SelectError, SelectResult, TopologyWarning};
pub use graph::Graph;
pub use growth::grow_qudit_group;
pub use hybrid::{
    ClassCounts, EdgeClass, EdgeClasses, EdgePolicy, HybridTopology, build_hybrid, classify_edges,
};
pub use hybrid_graph::{EdgeOrigin, HybridEdge, HybridGraph, WeightedEdge};
pub use matcher::{KernelMatcher, KernelScore, MatchResult, match_kernel, score_kernel};
pub use overlap::{overlap_sets, propagate_overlap, related_blocks};
pub use report::{BlockSubtopology, LabelStats, SelectionReport, SelectionSummary};
pub use selector::{KernelSelector, compare_kernels};
pub use templates::{Category, MAX_BLOCKSIZE, Template, TemplateKind, get_templates};
