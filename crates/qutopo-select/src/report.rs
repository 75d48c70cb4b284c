//! Selection results: per-block subtopologies and an aggregate summary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use qutopo_ir::{Kernel, QuditId};

use crate::classify::{KernelClass, possible_labels};
use crate::error::{SelectResult, TopologyWarning};
use crate::hybrid::ClassCounts;
use crate::hybrid_graph::{EdgeOrigin, WeightedEdge};

/// Report schema version.
pub const SCHEMA_VERSION: &str = "1.0";

/// Everything selected for one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSubtopology {
    /// Position of the block in the partition structure.
    pub index: usize,
    /// Global qudits, after growth if enabled.
    pub qudit_group: Vec<QuditId>,
    /// Selected kernel in local indices.
    pub kernel: Kernel,
    /// Degree-sequence class of the kernel.
    pub label: KernelClass,
    /// Interaction occurrences the kernel covers.
    pub edge_score: usize,
    /// Degree-weighted occurrence score of the kernel.
    pub node_score: usize,
    /// Physical subgraph plus inserted logical edges.
    pub hybrid_edges: Vec<WeightedEdge>,
    /// Interaction occurrences per class.
    pub classes: ClassCounts,
    /// Estimated CNOT count over the hybrid graph.
    pub estimated_cost: u64,
    /// Non-fatal conditions met for this block.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TopologyWarning>,
}

impl BlockSubtopology {
    /// Number of inserted logical edges.
    pub fn num_logical_edges(&self) -> usize {
        self.hybrid_edges
            .iter()
            .filter(|e| e.origin == EdgeOrigin::Logical)
            .count()
    }
}

/// Block count and interaction coverage of one kernel class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStats {
    pub label: KernelClass,
    /// Blocks whose kernel has this class.
    pub blocks: usize,
    /// Interaction occurrences in those blocks.
    pub interactions: usize,
    /// `interactions` as a percentage of all interactions.
    pub coverage: f64,
}

/// Aggregates over all blocks of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSummary {
    pub num_blocks: usize,
    pub total_cost: u64,
    pub mean_cost: f64,
    pub total_edge_score: usize,
    pub mean_edge_score: f64,
    pub total_node_score: usize,
    pub mean_node_score: f64,
    /// Interaction occurrences per class over all blocks.
    pub operations: ClassCounts,
    /// One entry per class reachable at the block size, plus any other
    /// class that occurred.
    pub labels: Vec<LabelStats>,
    pub num_warnings: usize,
}

#[allow(clippy::cast_precision_loss)]
fn ratio(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

impl SelectionSummary {
    /// Aggregate `blocks` selected at `blocksize`.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_blocks(blocks: &[BlockSubtopology], blocksize: usize) -> Self {
        let n = blocks.len();
        let total_cost: u64 = blocks.iter().map(|b| b.estimated_cost).sum();
        let total_edge_score: usize = blocks.iter().map(|b| b.edge_score).sum();
        let total_node_score: usize = blocks.iter().map(|b| b.node_score).sum();

        let mut operations = ClassCounts::default();
        for block in blocks {
            operations += block.classes;
        }
        let all_interactions = operations.total();

        let mut classes = possible_labels(blocksize);
        for block in blocks {
            if !classes.contains(&block.label) {
                classes.push(block.label);
            }
        }
        let labels = classes
            .into_iter()
            .map(|label| {
                let members = blocks.iter().filter(|b| b.label == label);
                let interactions: usize = members.clone().map(|b| b.classes.total()).sum();
                LabelStats {
                    label,
                    blocks: members.count(),
                    interactions,
                    coverage: ratio(100.0 * interactions as f64, all_interactions),
                }
            })
            .collect();

        Self {
            num_blocks: n,
            total_cost,
            mean_cost: ratio(total_cost as f64, n),
            total_edge_score,
            mean_edge_score: ratio(total_edge_score as f64, n),
            total_node_score,
            mean_node_score: ratio(total_node_score as f64, n),
            operations,
            labels,
            num_warnings: blocks.iter().map(|b| b.warnings.len()).sum(),
        }
    }

    /// Stats of one class, if listed.
    pub fn label(&self, label: KernelClass) -> Option<&LabelStats> {
        self.labels.iter().find(|s| s.label == label)
    }
}

impl fmt::Display for SelectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Blocks:            {}", self.num_blocks)?;
        writeln!(
            f,
            "Estimated cost:    {} (mean {:.2})",
            self.total_cost, self.mean_cost
        )?;
        writeln!(
            f,
            "Edge score:        {} (mean {:.2})",
            self.total_edge_score, self.mean_edge_score
        )?;
        writeln!(
            f,
            "Node score:        {} (mean {:.2})",
            self.total_node_score, self.mean_node_score
        )?;
        writeln!(
            f,
            "Operations:        {} direct, {} indirect, {} external",
            self.operations.direct, self.operations.indirect, self.operations.external
        )?;
        writeln!(f, "Kernels:")?;
        for stats in &self.labels {
            writeln!(
                f,
                "  {:<12} {:>5} blocks {:>7.2}% coverage",
                stats.label.label(),
                stats.blocks,
                stats.coverage
            )?;
        }
        write!(f, "Warnings:          {}", self.num_warnings)
    }
}

/// Output of one selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionReport {
    /// Schema version for forward compatibility.
    pub schema_version: String,
    /// One entry per block, in block order.
    pub blocks: Vec<BlockSubtopology>,
    pub summary: SelectionSummary,
}

impl SelectionReport {
    /// Build a report and its summary.
    pub fn new(blocks: Vec<BlockSubtopology>, blocksize: usize) -> Self {
        let summary = SelectionSummary::from_blocks(&blocks, blocksize);
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            blocks,
            summary,
        }
    }

    /// Selected kernels in block order.
    pub fn kernels(&self) -> Vec<Kernel> {
        self.blocks.iter().map(|b| b.kernel.clone()).collect()
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> SelectResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty-printed JSON to a file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> SelectResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
