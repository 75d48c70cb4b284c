//! Kernels: connectivity patterns over block-local vertices.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::qudit::{Edge, QuditId};

/// An undirected edge set over local indices `0..blocksize`.
///
/// Two kernels are equal iff their edge sets are equal. The empty kernel is
/// the normal result for blocks without multi-qudit interactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kernel {
    edges: BTreeSet<Edge>,
}

impl Kernel {
    /// The empty kernel.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a kernel from raw pairs; orientation and duplicates are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, u32)>) -> Self {
        Self {
            edges: pairs.into_iter().map(Edge::from).collect(),
        }
    }

    /// Build a kernel from normalized edges.
    pub fn from_edges(edges: impl IntoIterator<Item = Edge>) -> Self {
        Self {
            edges: edges.into_iter().collect(),
        }
    }

    /// Add an edge. Returns `false` if it was already present.
    pub fn insert(&mut self, edge: Edge) -> bool {
        self.edges.insert(edge)
    }

    /// Whether the kernel has the given edge.
    pub fn contains(&self, edge: Edge) -> bool {
        self.edges.contains(&edge)
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the kernel has no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterate over edges in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().copied()
    }

    /// Largest vertex referenced by an edge.
    pub fn max_vertex(&self) -> Option<u32> {
        self.edges.iter().map(|e| e.hi()).max()
    }

    /// Whether every referenced vertex is `< blocksize`.
    pub fn fits(&self, blocksize: usize) -> bool {
        self.max_vertex().is_none_or(|v| (v as usize) < blocksize)
    }

    /// Degree of each vertex in `0..n`. Vertices `>= n` are ignored.
    pub fn degrees(&self, n: usize) -> Vec<usize> {
        let mut deg = vec![0; n];
        for e in &self.edges {
            for v in [e.lo(), e.hi()] {
                if let Some(d) = deg.get_mut(v as usize) {
                    *d += 1;
                }
            }
        }
        deg
    }

    /// Apply a vertex relabeling.
    #[must_use]
    pub fn relabeled(&self, f: impl Fn(u32) -> u32) -> Self {
        Self {
            edges: self.edges.iter().map(|e| e.map(&f)).collect(),
        }
    }

    /// Translate the kernel into global qudit pairs through a qudit group.
    ///
    /// Edges that reference a vertex outside the group are skipped.
    pub fn to_global(&self, qudit_group: &[QuditId]) -> Vec<(QuditId, QuditId)> {
        self.edges
            .iter()
            .filter_map(|e| {
                let a = qudit_group.get(e.lo() as usize)?;
                let b = qudit_group.get(e.hi() as usize)?;
                Some(if a <= b { (*a, *b) } else { (*b, *a) })
            })
            .collect()
    }
}

impl FromIterator<Edge> for Kernel {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        Self::from_edges(iter)
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, e) in self.edges.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{e}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_equality_ignores_orientation() {
        let a = Kernel::from_pairs([(0, 1), (2, 1)]);
        let b = Kernel::from_pairs([(1, 2), (1, 0)]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_degrees_and_fits() {
        let k = Kernel::from_pairs([(0, 1), (0, 2), (0, 3)]);
        assert_eq!(k.degrees(4), vec![3, 1, 1, 1]);
        assert!(k.fits(4));
        assert!(!k.fits(3));
        assert!(Kernel::empty().fits(0));
    }

    #[test]
    fn test_to_global() {
        let k = Kernel::from_pairs([(0, 1), (1, 2)]);
        let group = [QuditId(8), QuditId(3), QuditId(5)];
        assert_eq!(
            k.to_global(&group),
            vec![(QuditId(3), QuditId(8)), (QuditId(3), QuditId(5))]
        );
    }

    #[test]
    fn test_display() {
        let k = Kernel::from_pairs([(1, 0), (2, 3)]);
        assert_eq!(k.to_string(), "[(0, 1), (2, 3)]");
    }
}
