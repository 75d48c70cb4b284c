//! Batch kernel selection over a partitioned circuit.

use rayon::prelude::*;
use std::borrow::Cow;
use tracing::{debug, info, instrument};

use qutopo_ir::{Block, Edge, InteractionSet, Kernel, PartitionStructure};

use crate::classify::KernelClass;
use crate::config::SelectionConfig;
use crate::cost::CostEstimator;
use crate::coupling::CouplingMap;
use crate::error::{SelectError, SelectResult, TopologyWarning};
use crate::growth::grow_qudit_group;
use crate::hybrid::{build_hybrid, to_global};
use crate::matcher::{KernelMatcher, MatchResult, score_kernel};
use crate::overlap::propagate_overlap;
use crate::report::{BlockSubtopology, SelectionReport};
use crate::templates::Category;

/// Runs kernel matching, classification, hybrid topology construction and
/// cost estimation for every block of a partition structure.
///
/// The configuration is validated once here. Matchers for every block size
/// from 2 up to the configured one are built up front and shared read-only
/// by all blocks.
#[derive(Debug, Clone)]
pub struct KernelSelector {
    config: SelectionConfig,
    coupling: CouplingMap,
    /// `matchers[s - 2]` handles blocks of `s` qudits.
    matchers: Vec<KernelMatcher>,
    estimator: CostEstimator,
}

impl KernelSelector {
    /// Validate `config` and prepare matchers.
    ///
    /// Smaller blocks use the configured category when it has templates at
    /// their size and the embedded family otherwise.
    pub fn new(config: SelectionConfig, mut coupling: CouplingMap) -> SelectResult<Self> {
        config.validate()?;
        if !coupling.has_distance_cache() {
            coupling.rebuild_caches();
        }

        let matchers = (2..=config.blocksize)
            .map(|size| {
                let category = if config.category.is_available(size) {
                    config.category
                } else {
                    Category::Embedded
                };
                KernelMatcher::new(category, size)
            })
            .collect::<SelectResult<Vec<_>>>()?;

        debug!(
            "Prepared {} matchers, {} candidate kernels at block size {}",
            matchers.len(),
            matchers.last().map_or(0, KernelMatcher::num_candidates),
            config.blocksize
        );

        Ok(Self {
            estimator: CostEstimator::new().with_relabel(config.relabel_costs),
            config,
            coupling,
            matchers,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// The physical coupling graph.
    pub fn coupling(&self) -> &CouplingMap {
        &self.coupling
    }

    fn matcher_for(&self, size: usize) -> Option<&KernelMatcher> {
        size.checked_sub(2).and_then(|i| self.matchers.get(i))
    }

    /// Select a kernel and hybrid topology for every block.
    ///
    /// Fails before any block is processed if a block is larger than the
    /// block size, or if growth runs out of qudits.
    #[instrument(skip(self, structure), fields(blocks = structure.len()))]
    pub fn select(&self, structure: &PartitionStructure) -> SelectResult<SelectionReport> {
        info!(
            "Selecting kernels for {} blocks: blocksize {}, category {}, policy {}",
            structure.len(),
            self.config.blocksize,
            self.config.category,
            self.config.edge_policy
        );

        for (index, block) in structure.blocks().iter().enumerate() {
            if block.size() > self.config.blocksize {
                return Err(SelectError::BlockTooLarge {
                    block: index,
                    size: block.size(),
                    blocksize: self.config.blocksize,
                });
            }
        }

        let structure = if self.config.grow_blocks {
            Cow::Owned(self.grow(structure)?)
        } else {
            Cow::Borrowed(structure)
        };

        let augmented = self
            .config
            .propagate_overlap
            .then(|| propagate_overlap(&structure));

        let select_one = |(index, block): (usize, &Block)| {
            let match_input = augmented
                .as_ref()
                .and_then(|a| a.get(index))
                .unwrap_or(block.interactions());
            self.subtopology(index, block, match_input)
        };

        let blocks: Vec<BlockSubtopology> = if self.config.parallel {
            structure.blocks().par_iter().enumerate().map(select_one).collect()
        } else {
            structure.blocks().iter().enumerate().map(select_one).collect()
        };

        let report = SelectionReport::new(blocks, self.config.blocksize);
        info!(
            "Selection completed, total cost: {}, warnings: {}",
            report.summary.total_cost, report.summary.num_warnings
        );
        Ok(report)
    }

    /// Select for a single block using its own interactions.
    pub fn select_block(&self, index: usize, block: &Block) -> BlockSubtopology {
        self.subtopology(index, block, block.interactions())
    }

    fn grow(&self, structure: &PartitionStructure) -> SelectResult<PartitionStructure> {
        let grown = structure
            .blocks()
            .iter()
            .enumerate()
            .map(|(index, block)| {
                grow_qudit_group(&self.coupling, block, self.config.blocksize).map_err(|err| match err {
                    SelectError::GrowthExhausted { target, .. } => SelectError::GrowthExhausted {
                        block: Some(index),
                        target,
                    },
                    other => other,
                })
            })
            .collect::<SelectResult<Vec<_>>>()?;
        Ok(structure.with_blocks(grown)?)
    }

    fn subtopology(&self, index: usize, block: &Block, match_input: &InteractionSet) -> BlockSubtopology {
        let matched = self
            .matcher_for(block.size())
            .map_or_else(MatchResult::empty, |m| m.best_match(match_input));
        let score = score_kernel(block.interactions(), &matched.kernel);
        let label = KernelClass::of(&matched.kernel, block.size());

        let hybrid = build_hybrid(
            &self.coupling,
            block.qudit_group(),
            block.interactions(),
            self.config.edge_policy,
        );
        let global: Vec<Edge> = to_global(block.qudit_group(), block.interactions())
            .iter()
            .collect();
        let (breakdown, cost_warnings) =
            self.estimator
                .estimate_breakdown(&global, &hybrid.classes, &hybrid.graph);

        let mut warnings = vec![];
        if block.interactions().is_empty() {
            warnings.push(TopologyWarning::EmptyInteractions);
        }
        warnings.extend(hybrid.warnings);
        warnings.extend(cost_warnings);

        debug!(
            "Block {}: {} kernel {} (edge score {}), cost {}",
            index,
            label,
            matched.kernel,
            score.edge_score,
            breakdown.total()
        );

        BlockSubtopology {
            index,
            qudit_group: block.qudit_group().to_vec(),
            kernel: matched.kernel,
            label,
            edge_score: score.edge_score,
            node_score: score.node_score,
            hybrid_edges: hybrid.graph.edges(),
            classes: hybrid.classes.counts(),
            estimated_cost: breakdown.total(),
            warnings,
        }
    }
}

/// For each block, whether two runs selected the same kernel.
///
/// Both runs must cover the same blocks in the same order.
pub fn compare_kernels(a: &[Kernel], b: &[Kernel]) -> SelectResult<Vec<bool>> {
    if a.len() != b.len() {
        return Err(SelectError::StructuralMismatch {
            what: "kernel lists of the two runs".into(),
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x == y).collect())
}
