//! Blocks: a qudit group plus the interactions recorded inside it.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::interaction::InteractionSet;
use crate::qudit::{Edge, QuditId};

/// A cluster of qudits processed together.
///
/// `qudit_group[i]` is the global qudit behind local index `i`; the
/// interactions are expressed in local indices. Blocks are immutable once
/// built; growth produces a new block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct Block {
    qudit_group: Vec<QuditId>,
    interactions: InteractionSet,
}

#[derive(Deserialize)]
struct RawBlock {
    qudit_group: Vec<QuditId>,
    #[serde(default)]
    interactions: InteractionSet,
}

impl TryFrom<RawBlock> for Block {
    type Error = IrError;

    fn try_from(raw: RawBlock) -> IrResult<Self> {
        Block::new(raw.qudit_group, raw.interactions)
    }
}

impl Block {
    /// Create a validated block.
    ///
    /// Fails if the group repeats a qudit or an interaction references a
    /// local index outside the group.
    pub fn new(qudit_group: Vec<QuditId>, interactions: InteractionSet) -> IrResult<Self> {
        Self::validated(qudit_group, interactions, None)
    }

    /// Create a validated block, tagging errors with its position.
    pub fn at(
        position: usize,
        qudit_group: Vec<QuditId>,
        interactions: InteractionSet,
    ) -> IrResult<Self> {
        Self::validated(qudit_group, interactions, Some(position))
    }

    /// Convenience constructor from raw integers.
    pub fn from_raw(
        qudit_group: impl IntoIterator<Item = u32>,
        interactions: impl IntoIterator<Item = (u32, u32)>,
    ) -> IrResult<Self> {
        Self::new(
            qudit_group.into_iter().map(QuditId).collect(),
            InteractionSet::from_pairs(interactions),
        )
    }

    fn validated(
        qudit_group: Vec<QuditId>,
        interactions: InteractionSet,
        block: Option<usize>,
    ) -> IrResult<Self> {
        for (i, q) in qudit_group.iter().enumerate() {
            if qudit_group[..i].contains(q) {
                return Err(IrError::DuplicateQudit { qudit: *q, block });
            }
        }
        interactions.validate(qudit_group.len(), block)?;
        Ok(Self {
            qudit_group,
            interactions,
        })
    }

    /// Number of qudits in the block.
    #[inline]
    pub fn size(&self) -> usize {
        self.qudit_group.len()
    }

    /// The ordered global qudits.
    pub fn qudit_group(&self) -> &[QuditId] {
        &self.qudit_group
    }

    /// The interaction multiset in local indices.
    pub fn interactions(&self) -> &InteractionSet {
        &self.interactions
    }

    /// Whether the global qudit belongs to the block.
    pub fn contains(&self, qudit: QuditId) -> bool {
        self.qudit_group.contains(&qudit)
    }

    /// Local index of a global qudit.
    pub fn local_index(&self, qudit: QuditId) -> Option<u32> {
        self.qudit_group
            .iter()
            .position(|&q| q == qudit)
            .and_then(|i| u32::try_from(i).ok())
    }

    /// Global qudit behind a local index.
    pub fn global(&self, local: u32) -> Option<QuditId> {
        self.qudit_group.get(local as usize).copied()
    }

    /// Translate a local edge into a global pair `(min, max)`.
    pub fn to_global_edge(&self, edge: Edge) -> Option<Edge> {
        let a = self.global(edge.lo())?;
        let b = self.global(edge.hi())?;
        Some(Edge::new(a.0, b.0))
    }

    /// Translate a global pair into a local edge.
    pub fn to_local_edge(&self, edge: Edge) -> IrResult<Edge> {
        let a = self
            .local_index(QuditId(edge.lo()))
            .ok_or(IrError::UnknownQudit(QuditId(edge.lo())))?;
        let b = self
            .local_index(QuditId(edge.hi()))
            .ok_or(IrError::UnknownQudit(QuditId(edge.hi())))?;
        Ok(Edge::new(a, b))
    }

    /// The interaction multiset translated to global pairs.
    pub fn global_interactions(&self) -> Vec<Edge> {
        self.interactions
            .iter()
            .filter_map(|e| self.to_global_edge(e))
            .collect()
    }

    /// Qudits this block shares with `other`, in this block's order.
    pub fn shared_qudits(&self, other: &Block) -> Vec<QuditId> {
        self.qudit_group
            .iter()
            .copied()
            .filter(|&q| other.contains(q))
            .collect()
    }

    /// A copy of this block over an enlarged qudit group.
    ///
    /// The new group must start with the current group so that existing
    /// local indices keep their meaning.
    pub fn with_qudit_group(&self, qudit_group: Vec<QuditId>) -> IrResult<Self> {
        if !qudit_group.starts_with(&self.qudit_group) {
            return Err(IrError::CountMismatch {
                what: "enlarged qudit group must extend the original group".into(),
                left: self.qudit_group.len(),
                right: qudit_group.len(),
            });
        }
        Self::new(qudit_group, self.interactions.clone())
    }

    /// A copy of this block with a different interaction multiset.
    pub fn with_interactions(&self, interactions: InteractionSet) -> IrResult<Self> {
        Self::new(self.qudit_group.clone(), interactions)
    }
}
