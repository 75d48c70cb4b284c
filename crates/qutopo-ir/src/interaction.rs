//! Pairwise interaction multisets.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::qudit::Edge;

/// A multiset of unordered interaction pairs, kept in the order they were
/// recorded.
///
/// Orientation is not significant: `(1, 0)` and `(0, 1)` are the same
/// interaction. Repetition is significant and feeds the frequency counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionSet {
    pairs: Vec<Edge>,
}

impl InteractionSet {
    /// Create an empty multiset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a multiset from raw pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, u32)>) -> Self {
        Self {
            pairs: pairs.into_iter().map(Edge::from).collect(),
        }
    }

    /// Record one occurrence of an interaction.
    pub fn push(&mut self, a: u32, b: u32) {
        self.pairs.push(Edge::new(a, b));
    }

    /// Record one occurrence of an already-normalized edge.
    pub fn push_edge(&mut self, edge: Edge) {
        self.pairs.push(edge);
    }

    /// Append every occurrence from `other`.
    pub fn extend_from(&mut self, other: &InteractionSet) {
        self.pairs.extend_from_slice(&other.pairs);
    }

    /// Total number of occurrences.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no interaction was recorded.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over occurrences in recording order.
    pub fn iter(&self) -> impl Iterator<Item = Edge> + '_ {
        self.pairs.iter().copied()
    }

    /// Number of occurrences of `edge` (in either orientation).
    pub fn count(&self, edge: Edge) -> usize {
        self.pairs.iter().filter(|&&e| e == edge).count()
    }

    /// Per-pair occurrence counts.
    pub fn frequencies(&self) -> InteractionFrequency {
        let mut counts = FxHashMap::default();
        for &e in &self.pairs {
            *counts.entry(e).or_insert(0) += 1;
        }
        InteractionFrequency { counts }
    }

    /// Unique pairs ordered by frequency (descending), ties broken by the
    /// first occurrence.
    pub fn ranked(&self) -> Vec<(Edge, usize)> {
        let freqs = self.frequencies();
        let mut seen = Vec::with_capacity(freqs.len());
        for &e in &self.pairs {
            if !seen.contains(&e) {
                seen.push(e);
            }
        }
        let mut ranked: Vec<(Edge, usize)> = seen.into_iter().map(|e| (e, freqs.get(e))).collect();
        // sort_by is stable, first-occurrence order survives among equal counts
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Number of times vertex `v` appears as an endpoint.
    pub fn vertex_occurrences(&self, v: u32) -> usize {
        self.pairs
            .iter()
            .map(|e| usize::from(e.lo() == v) + usize::from(e.hi() == v))
            .sum()
    }

    /// Relabel every endpoint through `f`.
    #[must_use]
    pub fn relabeled(&self, f: impl Fn(u32) -> u32) -> Self {
        Self {
            pairs: self.pairs.iter().map(|e| e.map(&f)).collect(),
        }
    }

    /// Check that every pair is a proper edge inside `0..size`.
    pub fn validate(&self, size: usize, block: Option<usize>) -> IrResult<()> {
        for e in &self.pairs {
            if e.is_loop() {
                return Err(IrError::SelfInteraction {
                    index: e.lo(),
                    block,
                });
            }
            if e.hi() as usize >= size {
                return Err(IrError::LocalIndexOutOfRange {
                    index: e.hi(),
                    size,
                    block,
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<(u32, u32)> for InteractionSet {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Occurrence count per unordered pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionFrequency {
    counts: FxHashMap<Edge, usize>,
}

impl InteractionFrequency {
    /// Occurrences of `edge`, zero if it never interacts.
    #[inline]
    pub fn get(&self, edge: Edge) -> usize {
        self.counts.get(&edge).copied().unwrap_or(0)
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over `(pair, count)` in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Edge, usize)> + '_ {
        self.counts.iter().map(|(&e, &c)| (e, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_is_ignored() {
        let set = InteractionSet::from_pairs([(0, 1), (1, 0), (2, 1)]);
        assert_eq!(set.count(Edge::new(0, 1)), 2);
        assert_eq!(set.frequencies().get(Edge::new(1, 2)), 1);
        assert_eq!(set.frequencies().get(Edge::new(0, 2)), 0);
    }

    #[test]
    fn test_ranked_breaks_ties_by_first_occurrence() {
        let set = InteractionSet::from_pairs([(2, 3), (0, 1), (0, 1), (1, 2), (2, 3)]);
        let ranked = set.ranked();
        assert_eq!(
            ranked,
            vec![(Edge::new(2, 3), 2), (Edge::new(0, 1), 2), (Edge::new(1, 2), 1)]
        );
    }

    #[test]
    fn test_vertex_occurrences() {
        let set = InteractionSet::from_pairs([(0, 1), (0, 2), (0, 3)]);
        assert_eq!(set.vertex_occurrences(0), 3);
        assert_eq!(set.vertex_occurrences(2), 1);
        assert_eq!(set.vertex_occurrences(4), 0);
    }

    #[test]
    fn test_validate() {
        assert!(InteractionSet::from_pairs([(0, 3)]).validate(4, None).is_ok());
        assert!(matches!(
            InteractionSet::from_pairs([(0, 4)]).validate(4, Some(2)),
            Err(IrError::LocalIndexOutOfRange { index: 4, size: 4, block: Some(2) })
        ));
        assert!(matches!(
            InteractionSet::from_pairs([(1, 1)]).validate(4, None),
            Err(IrError::SelfInteraction { index: 1, .. })
        ));
    }
}
