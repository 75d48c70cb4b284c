//! Error and warning types for topology selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use qutopo_ir::{IrError, QuditId};

/// Errors that abort a selection run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SelectError {
    /// Only blocks of 2 to 5 qudits have templates.
    #[error("Unsupported block size {0}: templates exist for sizes 2 through 5")]
    UnsupportedBlockSize(usize),

    /// The category name is not recognised at all.
    #[error("Unknown kernel category: {0}")]
    UnknownCategory(String),

    /// The category exists but has no templates at this block size.
    #[error("Kernel category '{category}' is not available for block size {blocksize}")]
    CategoryNotAvailable {
        /// Category name.
        category: String,
        /// Requested block size.
        blocksize: usize,
    },

    /// A required configuration key is missing.
    #[error("Missing configuration key: {0}")]
    MissingConfig(String),

    /// A configuration value is out of range or malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two sequences that must align positionally disagree in length.
    #[error("Structural mismatch: {what} ({left} vs {right})")]
    StructuralMismatch {
        /// Which sequences disagree.
        what: String,
        /// Length of the first sequence.
        left: usize,
        /// Length of the second sequence.
        right: usize,
    },

    /// A block has more qudits than the configured block size.
    #[error("Block {block} has {size} qudits, more than the configured block size {blocksize}")]
    BlockTooLarge {
        /// Block position.
        block: usize,
        /// Number of qudits in the block.
        size: usize,
        /// Configured block size.
        blocksize: usize,
    },

    /// Growth needs another qudit but the coupling graph has none left.
    #[error("Cannot grow block to {target} qudits{}: no unused qudit left in the coupling graph", format_block_context(.block))]
    GrowthExhausted {
        /// Block position, if known.
        block: Option<usize>,
        /// Requested group size.
        target: usize,
    },

    /// Error from the data model.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

    /// Failed to read a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse configuration text.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_yaml_ng::Error> for SelectError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        SelectError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for SelectError {
    fn from(err: serde_json::Error) -> Self {
        SelectError::Parse(err.to_string())
    }
}

#[allow(clippy::ref_option)]
fn format_block_context(block: &Option<usize>) -> String {
    match block {
        Some(b) => format!(" (block {b})"),
        None => String::new(),
    }
}

/// Result type for selection operations.
pub type SelectResult<T> = Result<T, SelectError>;

/// A data-dependent condition recorded on a block instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologyWarning {
    /// The block has no multi-qudit interactions.
    EmptyInteractions,
    /// A spanning-tree policy left the hybrid graph in several pieces because
    /// some qudits never interact.
    DisconnectedTopology {
        /// Number of connected components left.
        components: usize,
    },
    /// Two qudits have no path in the coupling graph.
    UnreachablePair {
        /// First endpoint.
        a: QuditId,
        /// Second endpoint.
        b: QuditId,
    },
    /// A pair had no path in the hybrid graph during cost estimation.
    UncostedInteraction {
        /// First endpoint.
        a: QuditId,
        /// Second endpoint.
        b: QuditId,
    },
}

impl fmt::Display for TopologyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInteractions => write!(f, "block has no interactions"),
            Self::DisconnectedTopology { components } => {
                write!(f, "hybrid topology left in {components} disconnected components")
            }
            Self::UnreachablePair { a, b } => {
                write!(f, "{a} and {b} are not connected in the coupling graph")
            }
            Self::UncostedInteraction { a, b } => {
                write!(f, "no hybrid path between {a} and {b}, interaction not costed")
            }
        }
    }
}
