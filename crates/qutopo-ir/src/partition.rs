//! The ordered block list of one partitioned circuit, with its layering.

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::error::{IrError, IrResult};
use crate::interaction::InteractionSet;
use crate::qudit::QuditId;

/// All blocks produced from one circuit, in partitioner order, together
/// with the layer (circuit cycle) each block belongs to.
///
/// Two blocks are temporally adjacent when their layers are consecutive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPartition")]
pub struct PartitionStructure {
    blocks: Vec<Block>,
    layers: Vec<Vec<usize>>,
}

#[derive(Deserialize)]
struct RawPartition {
    blocks: Vec<Block>,
    #[serde(default)]
    layers: Option<Vec<Vec<usize>>>,
}

impl TryFrom<RawPartition> for PartitionStructure {
    type Error = IrError;

    fn try_from(raw: RawPartition) -> IrResult<Self> {
        match raw.layers {
            None => Ok(Self::new(raw.blocks)),
            Some(layers) => Self::with_layers(raw.blocks, layers),
        }
    }
}

impl PartitionStructure {
    /// Build a structure with as-soon-as-possible layering: each block is
    /// placed one layer after the latest earlier block it shares a qudit
    /// with.
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut last_layer: rustc_hash::FxHashMap<QuditId, usize> = Default::default();
        let mut layers: Vec<Vec<usize>> = Vec::new();

        for (index, block) in blocks.iter().enumerate() {
            let layer = block
                .qudit_group()
                .iter()
                .filter_map(|q| last_layer.get(q))
                .max()
                .map_or(0, |&l| l + 1);
            for &q in block.qudit_group() {
                last_layer.insert(q, layer);
            }
            if layers.len() <= layer {
                layers.resize_with(layer + 1, Vec::new);
            }
            layers[layer].push(index);
        }

        Self { blocks, layers }
    }

    /// Build a structure from explicit layers, flattening them in order.
    pub fn from_layers(layers: Vec<Vec<Block>>) -> Self {
        let mut blocks = Vec::new();
        let mut index_layers = Vec::with_capacity(layers.len());
        for layer in layers {
            let mut indices = Vec::with_capacity(layer.len());
            for block in layer {
                indices.push(blocks.len());
                blocks.push(block);
            }
            index_layers.push(indices);
        }
        Self {
            blocks,
            layers: index_layers,
        }
    }

    /// Build a structure from the two parallel upstream sequences.
    ///
    /// Fails with [`IrError::CountMismatch`] if the sequences differ in
    /// length, since positions must line up.
    pub fn from_parts(
        qudit_groups: Vec<Vec<u32>>,
        interactions: Vec<Vec<(u32, u32)>>,
    ) -> IrResult<Self> {
        if qudit_groups.len() != interactions.len() {
            return Err(IrError::CountMismatch {
                what: "qudit groups vs interaction lists".into(),
                left: qudit_groups.len(),
                right: interactions.len(),
            });
        }
        let blocks = qudit_groups
            .into_iter()
            .zip(interactions)
            .enumerate()
            .map(|(i, (group, pairs))| {
                Block::at(
                    i,
                    group.into_iter().map(QuditId).collect(),
                    InteractionSet::from_pairs(pairs),
                )
            })
            .collect::<IrResult<Vec<_>>>()?;
        Ok(Self::new(blocks))
    }

    fn with_layers(blocks: Vec<Block>, layers: Vec<Vec<usize>>) -> IrResult<Self> {
        let mut seen = vec![false; blocks.len()];
        for &i in layers.iter().flatten() {
            match seen.get_mut(i) {
                Some(s) if !*s => *s = true,
                _ => {
                    return Err(IrError::CountMismatch {
                        what: "layer indices must cover each block exactly once".into(),
                        left: blocks.len(),
                        right: layers.iter().map(Vec::len).sum(),
                    });
                }
            }
        }
        if seen.iter().any(|s| !s) {
            return Err(IrError::CountMismatch {
                what: "layer indices must cover each block exactly once".into(),
                left: blocks.len(),
                right: layers.iter().map(Vec::len).sum(),
            });
        }
        Ok(Self { blocks, layers })
    }

    /// Replace the blocks, keeping the layering.
    pub fn with_blocks(&self, blocks: Vec<Block>) -> IrResult<Self> {
        if blocks.len() != self.blocks.len() {
            return Err(IrError::CountMismatch {
                what: "replacement blocks vs structure".into(),
                left: blocks.len(),
                right: self.blocks.len(),
            });
        }
        Ok(Self {
            blocks,
            layers: self.layers.clone(),
        })
    }

    /// All blocks in order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Block at a position.
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether there are no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block indices grouped by layer.
    pub fn layers(&self) -> &[Vec<usize>] {
        &self.layers
    }

    /// Largest qudit group size.
    pub fn max_block_size(&self) -> usize {
        self.blocks.iter().map(Block::size).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(group: &[u32]) -> Block {
        Block::from_raw(group.iter().copied(), []).unwrap()
    }

    #[test]
    fn test_asap_layering() {
        let structure = PartitionStructure::new(vec![
            block(&[0, 1, 2]),
            block(&[3, 4, 5]),
            block(&[2, 3]),
            block(&[6, 7]),
            block(&[0, 2, 3]),
        ]);
        assert_eq!(structure.layers(), &[vec![0, 1, 3], vec![2], vec![4]]);
    }

    #[test]
    fn test_from_layers_flattens() {
        let structure =
            PartitionStructure::from_layers(vec![vec![block(&[0, 1]), block(&[2, 3])], vec![
                block(&[1, 2]),
            ]]);
        assert_eq!(structure.len(), 3);
        assert_eq!(structure.layers(), &[vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_from_parts_count_mismatch() {
        let err = PartitionStructure::from_parts(vec![vec![0, 1]], vec![]).unwrap_err();
        assert!(matches!(err, IrError::CountMismatch { left: 1, right: 0, .. }));
    }

    #[test]
    fn test_deserialize_with_and_without_layers() {
        let implicit: PartitionStructure = serde_json::from_str(
            r#"{"blocks":[{"qudit_group":[0,1]},{"qudit_group":[1,2]}]}"#,
        )
        .unwrap();
        assert_eq!(implicit.layers(), &[vec![0], vec![1]]);

        let bad = serde_json::from_str::<PartitionStructure>(
            r#"{"blocks":[{"qudit_group":[0,1]}],"layers":[[0],[0]]}"#,
        );
        assert!(bad.is_err());
    }
}
