//! Naming kernels by degree sequence.
//!
//! Classification looks only at the sorted degrees of the vertices an edge
//! set touches, so isolated vertices and vertex labels do not matter. It is
//! used for reporting and never influences kernel selection.

use serde::{Deserialize, Serialize};
use std::fmt;

use qutopo_ir::Kernel;

/// Shape class of a small edge set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KernelClass {
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "2-line")]
    Line2,
    #[serde(rename = "3-line")]
    Line3,
    #[serde(rename = "3-all")]
    All3,
    /// Two disjoint edges.
    #[serde(rename = "2-2-discon")]
    Discon22,
    #[serde(rename = "4-line")]
    Line4,
    #[serde(rename = "4-star")]
    Star4,
    #[serde(rename = "4-ring")]
    Ring4,
    /// Triangle with a pendant vertex.
    #[serde(rename = "4-kite")]
    Kite4,
    /// Ring with one diagonal.
    #[serde(rename = "4-theta")]
    Theta4,
    #[serde(rename = "4-all")]
    All4,
    /// A disjoint edge and 3-line.
    #[serde(rename = "2-3-discon")]
    Discon23,
    #[serde(rename = "5-line")]
    Line5,
    #[serde(rename = "5-star")]
    Star5,
    #[serde(rename = "5-tee")]
    Tee5,
    /// 4-ring with a pendant vertex.
    #[serde(rename = "5-dipper")]
    Dipper5,
    #[serde(rename = "5-all")]
    All5,
    #[serde(rename = "unknown")]
    Unknown,
}

impl KernelClass {
    /// Classify `kernel` as an edge set over `blocksize` vertices.
    ///
    /// Edge sets that reference a vertex `>= blocksize` are `Unknown`.
    pub fn of(kernel: &Kernel, blocksize: usize) -> Self {
        if kernel.is_empty() {
            return Self::Empty;
        }
        if !kernel.fits(blocksize) {
            return Self::Unknown;
        }
        let mut degrees: Vec<usize> = kernel
            .degrees(blocksize)
            .into_iter()
            .filter(|&d| d > 0)
            .collect();
        degrees.sort_unstable();

        match degrees.as_slice() {
            [1, 1] => Self::Line2,
            [1, 1, 2] => Self::Line3,
            [2, 2, 2] => Self::All3,
            [1, 1, 1, 1] => Self::Discon22,
            [1, 1, 2, 2] => Self::Line4,
            [1, 1, 1, 3] => Self::Star4,
            [2, 2, 2, 2] => Self::Ring4,
            [1, 2, 2, 3] => Self::Kite4,
            [2, 2, 3, 3] => Self::Theta4,
            [3, 3, 3, 3] => Self::All4,
            [1, 1, 1, 1, 2] => Self::Discon23,
            [1, 1, 2, 2, 2] => Self::Line5,
            [1, 1, 1, 1, 4] => Self::Star5,
            [1, 1, 1, 2, 3] => Self::Tee5,
            [1, 2, 2, 2, 3] => Self::Dipper5,
            [4, 4, 4, 4, 4] => Self::All5,
            _ => Self::Unknown,
        }
    }

    /// Report label, e.g. `"4-line"`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Line2 => "2-line",
            Self::Line3 => "3-line",
            Self::All3 => "3-all",
            Self::Discon22 => "2-2-discon",
            Self::Line4 => "4-line",
            Self::Star4 => "4-star",
            Self::Ring4 => "4-ring",
            Self::Kite4 => "4-kite",
            Self::Theta4 => "4-theta",
            Self::All4 => "4-all",
            Self::Discon23 => "2-3-discon",
            Self::Line5 => "5-line",
            Self::Star5 => "5-star",
            Self::Tee5 => "5-tee",
            Self::Dipper5 => "5-dipper",
            Self::All5 => "5-all",
            Self::Unknown => "unknown",
        }
    }

    /// Number of vertices the shape touches.
    pub fn num_vertices(self) -> usize {
        match self {
            Self::Empty | Self::Unknown => 0,
            Self::Line2 => 2,
            Self::Line3 | Self::All3 => 3,
            Self::Discon22
            | Self::Line4
            | Self::Star4
            | Self::Ring4
            | Self::Kite4
            | Self::Theta4
            | Self::All4 => 4,
            Self::Discon23
            | Self::Line5
            | Self::Star5
            | Self::Tee5
            | Self::Dipper5
            | Self::All5 => 5,
        }
    }

    /// Connectivity rank: discon < line < tee < star < ring/dipper < kite
    /// < theta < all. `Unknown` ranks last.
    pub fn complexity(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Discon22 | Self::Discon23 => 1,
            Self::Line2 | Self::Line3 | Self::Line4 | Self::Line5 => 2,
            Self::Tee5 => 3,
            Self::Star4 | Self::Star5 => 4,
            Self::Ring4 | Self::Dipper5 => 5,
            Self::Kite4 => 6,
            Self::Theta4 => 7,
            Self::All3 | Self::All4 | Self::All5 => 8,
            Self::Unknown => 9,
        }
    }
}

impl fmt::Display for KernelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

const LABEL_ORDER: [KernelClass; 17] = [
    KernelClass::Empty,
    KernelClass::Line2,
    KernelClass::Line3,
    KernelClass::All3,
    KernelClass::Line4,
    KernelClass::Discon22,
    KernelClass::Star4,
    KernelClass::Ring4,
    KernelClass::Kite4,
    KernelClass::Theta4,
    KernelClass::All4,
    KernelClass::Discon23,
    KernelClass::Star5,
    KernelClass::Tee5,
    KernelClass::Line5,
    KernelClass::Dipper5,
    KernelClass::All5,
];

/// Label of `edges` over `blocksize` vertices.
pub fn kernel_type(edges: &Kernel, blocksize: usize) -> &'static str {
    KernelClass::of(edges, blocksize).label()
}

/// Every class an edge set over `blocksize` vertices can fall into, for
/// summaries that list zero counts.
pub fn possible_labels(blocksize: usize) -> Vec<KernelClass> {
    LABEL_ORDER
        .into_iter()
        .filter(|c| c.num_vertices() <= blocksize)
        .collect()
}
