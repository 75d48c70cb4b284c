//! Qutopo Block Data Model
//!
//! This crate provides the data structures shared by the topology selection
//! engine: qudit identifiers, interaction multisets, kernels, blocks and the
//! partition structure that orders blocks into circuit layers.
//!
//! # Overview
//!
//! A partitioned circuit is a sequence of [`Block`]s. Each block holds an
//! ordered qudit group (global [`QuditId`]s) and an [`InteractionSet`]
//! expressed in local indices `0..size`. A [`Kernel`] is an undirected edge
//! set over the same local indices and is the result of kernel matching.
//!
//! ```text
//!   qudit_group   [q7, q2, q9]
//!   local index     0   1   2
//!
//!   interactions  (0,2) (1,2) (0,2)     ← multiset, orientation ignored
//!   kernel        {(0,2), (1,2)}        ← set of normalized edges
//! ```
//!
//! # Example
//!
//! ```rust
//! use qutopo_ir::{Block, Edge, PartitionStructure, QuditId};
//!
//! let block = Block::from_raw([7, 2, 9], [(0, 2), (1, 2), (2, 0)]).unwrap();
//! assert_eq!(block.interactions().count(Edge::new(0, 2)), 2);
//! assert_eq!(block.global(2), Some(QuditId(9)));
//!
//! let structure = PartitionStructure::new(vec![block]);
//! assert_eq!(structure.layers().len(), 1);
//! ```

pub mod block;
pub mod error;
pub mod interaction;
pub mod kernel;
pub mod partition;
pub mod qudit;

pub use block::Block;
pub use error::{IrError, IrResult};
pub use interaction::{InteractionFrequency, InteractionSet};
pub use kernel::Kernel;
pub use partition::PartitionStructure;
pub use qudit::{Edge, QuditId};
