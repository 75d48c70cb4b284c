//! Error types for the data-model crate.

use crate::qudit::QuditId;
use thiserror::Error;

/// Errors raised while constructing blocks and partition structures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A qudit appears twice in one qudit group.
    #[error("Qudit {qudit} appears more than once in qudit group{}", format_block_context(.block))]
    DuplicateQudit {
        /// The repeated qudit.
        qudit: QuditId,
        /// Block position, if known.
        block: Option<usize>,
    },

    /// An interaction references a local index outside the block.
    #[error("Local index {index} out of range for block of size {size}{}", format_block_context(.block))]
    LocalIndexOutOfRange {
        /// Offending local index.
        index: u32,
        /// Number of qudits in the block.
        size: usize,
        /// Block position, if known.
        block: Option<usize>,
    },

    /// An interaction connects a vertex to itself.
    #[error("Interaction ({index}, {index}) is a self-loop{}", format_block_context(.block))]
    SelfInteraction {
        /// The repeated local index.
        index: u32,
        /// Block position, if known.
        block: Option<usize>,
    },

    /// Two parallel sequences that must align positionally have different lengths.
    #[error("Structural mismatch: {what} ({left} vs {right})")]
    CountMismatch {
        /// Which sequences disagree.
        what: String,
        /// Length of the first sequence.
        left: usize,
        /// Length of the second sequence.
        right: usize,
    },

    /// A global qudit is not part of the block it was looked up in.
    #[error("Qudit {0} is not a member of the qudit group")]
    UnknownQudit(QuditId),
}

#[allow(clippy::ref_option)]
fn format_block_context(block: &Option<usize>) -> String {
    match block {
        Some(b) => format!(" (block {b})"),
        None => String::new(),
    }
}

/// Result type for data-model operations.
pub type IrResult<T> = Result<T, IrError>;
