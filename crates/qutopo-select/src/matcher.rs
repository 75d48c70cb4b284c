//! Kernel matching by exhaustive template permutation.
//!
//! For every template of the configured family and every relabeling of its
//! vertices, the permuted kernel is scored against the block's interaction
//! multiset. The kernel covering the most interaction occurrences wins.
//! Block sizes are capped at 5, so there are at most 120 permutations per
//! template. Permuted kernels are computed once per [`KernelMatcher`] and
//! reused for every block.

use itertools::Itertools;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use qutopo_ir::{InteractionSet, Kernel};

use crate::error::SelectResult;
use crate::templates::{Category, TemplateKind, get_templates};

/// Scores of one kernel against one interaction multiset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelScore {
    /// Interaction occurrences lying directly on a kernel edge.
    pub edge_score: usize,
    /// `Σ_x occurrences(x in interactions) × degree(x in kernel)`.
    /// Reported only; it never breaks ties.
    pub node_score: usize,
}

/// Best kernel found for a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Chosen kernel; empty when nothing scored above zero.
    pub kernel: Kernel,
    /// Template the kernel was permuted from.
    pub template: Option<TemplateKind>,
    /// Scores of the chosen kernel.
    pub score: KernelScore,
}

impl MatchResult {
    /// The empty kernel with zero scores.
    pub fn empty() -> Self {
        Self {
            kernel: Kernel::empty(),
            template: None,
            score: KernelScore::default(),
        }
    }
}

/// Score `kernel` against `interactions`.
pub fn score_kernel(interactions: &InteractionSet, kernel: &Kernel) -> KernelScore {
    let freqs = interactions.frequencies();
    let edge_score = kernel.edges().map(|e| freqs.get(e)).sum();

    let n = kernel
        .max_vertex()
        .map_or(0, |v| v as usize + 1);
    let node_score = kernel
        .degrees(n)
        .iter()
        .enumerate()
        .filter(|&(_, &deg)| deg > 0)
        .map(|(x, &deg)| {
            let x = u32::try_from(x).unwrap_or(u32::MAX);
            interactions.vertex_occurrences(x) * deg
        })
        .sum();

    KernelScore {
        edge_score,
        node_score,
    }
}

/// Relabel a kernel: vertex `u` becomes `perm[u]`.
///
/// Vertices outside `perm` keep their label.
pub fn permute_kernel(kernel: &Kernel, perm: &[u32]) -> Kernel {
    kernel.relabeled(|u| perm.get(u as usize).copied().unwrap_or(u))
}

/// Matcher for one `(category, blocksize)` pair with its permuted kernels
/// precomputed.
///
/// Immutable after construction; share it across worker threads by
/// reference.
#[derive(Debug, Clone)]
pub struct KernelMatcher {
    category: Category,
    blocksize: usize,
    /// Distinct permuted kernels in search order: templates outer,
    /// lexicographic permutations inner. Repeats are dropped since they can
    /// never win a strict comparison against their first occurrence.
    candidates: Vec<(TemplateKind, Kernel)>,
}

impl KernelMatcher {
    /// Build the matcher, enumerating every permutation of every template.
    pub fn new(category: Category, blocksize: usize) -> SelectResult<Self> {
        let templates = get_templates(category, blocksize)?;
        let n = u32::try_from(blocksize).unwrap_or(0);
        let mut seen = FxHashSet::default();
        let mut candidates = vec![];

        for template in &templates {
            for perm in (0..n).permutations(blocksize) {
                let kernel = permute_kernel(&template.kernel, &perm);
                if seen.insert(kernel.clone()) {
                    candidates.push((template.kind, kernel));
                }
            }
        }

        Ok(Self {
            category,
            blocksize,
            candidates,
        })
    }

    /// Category this matcher searches.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Block size this matcher searches.
    pub fn blocksize(&self) -> usize {
        self.blocksize
    }

    /// Number of distinct permuted kernels.
    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// Best-scoring kernel for `interactions`.
    ///
    /// Only a strictly greater edge score replaces the current best, so the
    /// earliest candidate wins ties. An empty multiset skips the search.
    pub fn best_match(&self, interactions: &InteractionSet) -> MatchResult {
        if interactions.is_empty() {
            return MatchResult::empty();
        }

        let freqs = interactions.frequencies();
        let mut best: Option<&(TemplateKind, Kernel)> = None;
        let mut best_score = 0;
        for candidate in &self.candidates {
            let edge_score: usize = candidate.1.edges().map(|e| freqs.get(e)).sum();
            if edge_score > best_score {
                best_score = edge_score;
                best = Some(candidate);
            }
        }

        match best {
            Some((kind, kernel)) => MatchResult {
                score: score_kernel(interactions, kernel),
                kernel: kernel.clone(),
                template: Some(*kind),
            },
            None => MatchResult::empty(),
        }
    }
}

/// One-shot matching without a reusable matcher.
pub fn match_kernel(
    interactions: &InteractionSet,
    blocksize: usize,
    category: Category,
) -> SelectResult<Kernel> {
    if interactions.is_empty() {
        return Ok(Kernel::empty());
    }
    Ok(KernelMatcher::new(category, blocksize)?
        .best_match(interactions)
        .kernel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interactions(pairs: &[((u32, u32), usize)]) -> InteractionSet {
        let mut set = InteractionSet::new();
        for &((a, b), count) in pairs {
            for _ in 0..count {
                set.push(a, b);
            }
        }
        set
    }

    #[test]
    fn test_line_usage_selects_line() {
        let ops = interactions(&[((0, 1), 3), ((1, 2), 2), ((2, 3), 1)]);
        let matcher = KernelMatcher::new(Category::Lines, 4).unwrap();
        let result = matcher.best_match(&ops);
        assert_eq!(result.kernel, Kernel::from_pairs([(0, 1), (1, 2), (2, 3)]));
        assert_eq!(result.score.edge_score, 6);
        assert_eq!(result.template, Some(TemplateKind::Line));
    }

    #[test]
    fn test_trees_still_prefer_line() {
        let ops = interactions(&[((0, 1), 3), ((1, 2), 2), ((2, 3), 1)]);
        let kernel = match_kernel(&ops, 4, Category::Trees).unwrap();
        assert_eq!(kernel, Kernel::from_pairs([(0, 1), (1, 2), (2, 3)]));
    }

    #[test]
    fn test_star_usage_selects_star() {
        let ops = interactions(&[((0, 1), 1), ((0, 2), 1), ((0, 3), 1)]);
        let kernel = match_kernel(&ops, 4, Category::Stars).unwrap();
        assert_eq!(kernel, Kernel::from_pairs([(0, 1), (0, 2), (0, 3)]));
    }

    #[test]
    fn test_empty_interactions_give_empty_kernel() {
        let matcher = KernelMatcher::new(Category::Embedded, 5).unwrap();
        let result = matcher.best_match(&InteractionSet::new());
        assert!(result.kernel.is_empty());
        assert_eq!(result.score, KernelScore::default());
    }

    #[test]
    fn test_ties_keep_first_candidate() {
        // A single (2,3) interaction: the first line permutation covering it wins.
        let ops = interactions(&[((2, 3), 1)]);
        let result = KernelMatcher::new(Category::Lines, 4).unwrap().best_match(&ops);
        assert_eq!(result.score.edge_score, 1);
        // identity permutation of line_4 already covers (2,3)
        assert_eq!(result.kernel, Kernel::from_pairs([(0, 1), (1, 2), (2, 3)]));
    }

    #[test]
    fn test_candidates_are_deduplicated() {
        assert_eq!(KernelMatcher::new(Category::Alls, 5).unwrap().num_candidates(), 1);
        // 4!/|Aut(line_4)| = 24/2
        assert_eq!(KernelMatcher::new(Category::Lines, 4).unwrap().num_candidates(), 12);
        // 4!/|Aut(star_4)| = 24/6
        assert_eq!(KernelMatcher::new(Category::Stars, 4).unwrap().num_candidates(), 4);
    }

    #[test]
    fn test_node_score() {
        let ops = interactions(&[((0, 1), 2), ((1, 2), 1)]);
        let kernel = Kernel::from_pairs([(0, 1), (1, 2)]);
        let score = score_kernel(&ops, &kernel);
        assert_eq!(score.edge_score, 3);
        // occ: 0→2, 1→3, 2→1; degree: 0→1, 1→2, 2→1
        assert_eq!(score.node_score, 2 + 6 + 1);
    }

    #[test]
    fn test_permute_kernel() {
        let kernel = Kernel::from_pairs([(0, 1), (1, 2)]);
        assert_eq!(
            permute_kernel(&kernel, &[2, 0, 1]),
            Kernel::from_pairs([(0, 2), (0, 1)])
        );
    }

    #[test]
    fn test_unavailable_category_fails() {
        assert!(KernelMatcher::new(Category::Tees, 4).is_err());
        assert!(match_kernel(&interactions(&[((0, 1), 1)]), 6, Category::Lines).is_err());
    }
}
