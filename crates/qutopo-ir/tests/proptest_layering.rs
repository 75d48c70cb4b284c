//! Property-based tests for blocks and layering.
//!
//! Random block sequences over a small qudit range are layered and checked
//! against the invariants downstream overlap propagation relies on.

use proptest::prelude::*;

use qutopo_ir::{Block, Edge, InteractionSet, PartitionStructure};

/// A block over 2-4 distinct qudits out of `0..8`, with random interactions.
fn arb_block() -> impl Strategy<Value = Block> {
    prop::sample::subsequence((0_u32..8).collect::<Vec<_>>(), 2..=4)
        .prop_shuffle()
        .prop_flat_map(|group| {
            let n = group.len() as u32;
            let pairs = prop::collection::vec((0..n, 0..n), 0..8);
            (Just(group), pairs)
        })
        .prop_map(|(group, pairs)| {
            Block::from_raw(group, pairs.into_iter().filter(|(a, b)| a != b)).unwrap()
        })
}

proptest! {
    #[test]
    fn layers_cover_every_block_once(blocks in prop::collection::vec(arb_block(), 0..12)) {
        let structure = PartitionStructure::new(blocks.clone());
        let mut seen: Vec<usize> = structure.layers().iter().flatten().copied().collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..blocks.len()).collect::<Vec<_>>());
        prop_assert!(structure.layers().iter().all(|l| !l.is_empty()));
    }

    #[test]
    fn blocks_in_one_layer_are_disjoint(blocks in prop::collection::vec(arb_block(), 0..12)) {
        let structure = PartitionStructure::new(blocks);
        for layer in structure.layers() {
            for (i, &a) in layer.iter().enumerate() {
                for &b in &layer[i + 1..] {
                    let shared = structure.blocks()[a].shared_qudits(&structure.blocks()[b]);
                    prop_assert!(shared.is_empty(), "blocks {} and {} share {:?}", a, b, shared);
                }
            }
        }
    }

    #[test]
    fn later_sharing_block_lands_in_later_layer(blocks in prop::collection::vec(arb_block(), 2..12)) {
        let structure = PartitionStructure::new(blocks);
        let mut layer_of = vec![0; structure.len()];
        for (l, members) in structure.layers().iter().enumerate() {
            for &i in members {
                layer_of[i] = l;
            }
        }
        for a in 0..structure.len() {
            for b in a + 1..structure.len() {
                if !structure.blocks()[a].shared_qudits(&structure.blocks()[b]).is_empty() {
                    prop_assert!(layer_of[a] < layer_of[b]);
                }
            }
        }
    }

    #[test]
    fn global_and_local_edges_translate_back(block in arb_block()) {
        for edge in block.interactions().iter() {
            let global = block.to_global_edge(edge).unwrap();
            prop_assert_eq!(block.to_local_edge(global).unwrap(), edge);
        }
    }

    #[test]
    fn ranking_preserves_total_count(pairs in prop::collection::vec((0_u32..5, 0_u32..5), 0..20)) {
        let set: InteractionSet = pairs.into_iter().filter(|(a, b)| a != b).collect();
        let ranked = set.ranked();
        prop_assert_eq!(ranked.iter().map(|(_, n)| n).sum::<usize>(), set.len());
        prop_assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
        for (edge, n) in &ranked {
            prop_assert_eq!(set.count(*edge), *n);
        }
        let unique: std::collections::BTreeSet<Edge> = set.iter().collect();
        prop_assert_eq!(unique.len(), ranked.len());
    }
}
