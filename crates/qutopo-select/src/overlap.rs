//! Cross-block overlap propagation.
//!
//! Blocks in consecutive layers that share qudits cut the circuit along the
//! same wires. Biasing each block's kernel search towards the interactions
//! its neighbours perform on those shared qudits makes adjacent blocks
//! more likely to pick the same connectivity, so less rerouting is needed
//! between them.
//!
//! ```text
//!   layer k      A: [3, 4, 5]     interactions (3,4) ×3
//!                      │  │
//!   layer k+1    B: [2, 3, 4, 6]  interactions (2,3) (4,6)
//!
//!   augmented(B) = (2,3) (4,6) + (3,4) ×3      ← translated to B's indices
//! ```
//!
//! The augmented multisets only feed the kernel matcher. Hybrid topology and
//! cost estimation always use a block's own interactions.

use tracing::debug;

use qutopo_ir::{Block, InteractionSet, PartitionStructure, QuditId};

/// Minimum number of shared qudits for two adjacent blocks to be related.
pub const MIN_SHARED_QUDITS: usize = 2;

/// Layer index of every block.
fn layer_of(structure: &PartitionStructure) -> Vec<usize> {
    let mut layer_of = vec![0; structure.len()];
    for (layer, members) in structure.layers().iter().enumerate() {
        for &index in members {
            if let Some(slot) = layer_of.get_mut(index) {
                *slot = layer;
            }
        }
    }
    layer_of
}

/// Blocks in the layers directly before and after `layer`.
fn adjacent_blocks(structure: &PartitionStructure, layer: usize) -> impl Iterator<Item = usize> + '_ {
    let layers = structure.layers();
    let before = layer.checked_sub(1).and_then(|l| layers.get(l));
    let after = layers.get(layer + 1);
    before
        .into_iter()
        .chain(after)
        .flat_map(|members| members.iter().copied())
}

/// For every block, the qudits it shares with any block in an adjacent
/// layer, in qudit-group order.
pub fn overlap_sets(structure: &PartitionStructure) -> Vec<Vec<QuditId>> {
    let layers = layer_of(structure);
    structure
        .blocks()
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let neighbours: Vec<&Block> = adjacent_blocks(structure, layers[index])
                .filter_map(|j| structure.block(j))
                .collect();
            block
                .qudit_group()
                .iter()
                .copied()
                .filter(|&q| neighbours.iter().any(|n| n.contains(q)))
                .collect()
        })
        .collect()
}

/// For every block, the adjacent-layer blocks it shares at least
/// [`MIN_SHARED_QUDITS`] qudits with, in layer order.
pub fn related_blocks(structure: &PartitionStructure) -> Vec<Vec<usize>> {
    let layers = layer_of(structure);
    structure
        .blocks()
        .iter()
        .enumerate()
        .map(|(index, block)| {
            adjacent_blocks(structure, layers[index])
                .filter(|&j| {
                    structure
                        .block(j)
                        .is_some_and(|n| block.shared_qudits(n).len() >= MIN_SHARED_QUDITS)
                })
                .collect()
        })
        .collect()
}

/// Augmented interaction multiset of every block, in local indices.
///
/// Each block keeps its own interactions and gains every interaction of a
/// related block whose endpoints both lie in its own qudit group. Blocks
/// without related blocks are unchanged.
pub fn propagate_overlap(structure: &PartitionStructure) -> Vec<InteractionSet> {
    let related = related_blocks(structure);
    structure
        .blocks()
        .iter()
        .zip(&related)
        .enumerate()
        .map(|(index, (block, neighbours))| {
            let mut augmented = block.interactions().clone();
            for neighbour in neighbours.iter().filter_map(|&j| structure.block(j)) {
                for edge in neighbour.global_interactions() {
                    if let Ok(local) = block.to_local_edge(edge) {
                        augmented.push_edge(local);
                    }
                }
            }
            if augmented.len() > block.interactions().len() {
                debug!(
                    "Block {}: {} propagated interactions from {:?}",
                    index,
                    augmented.len() - block.interactions().len(),
                    neighbours
                );
            }
            augmented
        })
        .collect()
}
