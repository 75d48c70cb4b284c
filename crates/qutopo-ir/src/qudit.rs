//! Qudit identifiers and unordered qudit pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Circuit-wide identifier of a qudit (a vertex of the coupling graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuditId(pub u32);

impl QuditId {
    /// Index form, for matrix lookups.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QuditId {
    fn from(id: u32) -> Self {
        QuditId(id)
    }
}

/// An unordered pair of vertices, stored as `(min, max)`.
///
/// Used both for block-local pairs (`0..blocksize`) and for global pairs
/// over [`QuditId`] indices; the surrounding type says which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct Edge {
    lo: u32,
    hi: u32,
}

impl Edge {
    /// Create a normalized edge. The endpoints may be given in any order.
    #[inline]
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// Smaller endpoint.
    #[inline]
    pub fn lo(self) -> u32 {
        self.lo
    }

    /// Larger endpoint.
    #[inline]
    pub fn hi(self) -> u32 {
        self.hi
    }

    /// Both endpoints as a tuple `(min, max)`.
    #[inline]
    pub fn endpoints(self) -> (u32, u32) {
        (self.lo, self.hi)
    }

    /// Whether `v` is one of the endpoints.
    #[inline]
    pub fn touches(self, v: u32) -> bool {
        self.lo == v || self.hi == v
    }

    /// Whether both endpoints coincide.
    #[inline]
    pub fn is_loop(self) -> bool {
        self.lo == self.hi
    }

    /// Apply a vertex relabeling to both endpoints.
    #[inline]
    pub fn map(self, f: impl Fn(u32) -> u32) -> Self {
        Self::new(f(self.lo), f(self.hi))
    }
}

impl From<(u32, u32)> for Edge {
    fn from((a, b): (u32, u32)) -> Self {
        Edge::new(a, b)
    }
}

impl From<Edge> for (u32, u32) {
    fn from(e: Edge) -> Self {
        e.endpoints()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lo, self.hi)
    }
}
