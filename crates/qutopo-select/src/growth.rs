//! Growing undersized qudit groups.
//!
//! A block smaller than the configured block size can be enlarged with
//! physically nearby idle qudits before its hybrid topology is built. A
//! larger group can turn external interactions into indirect ones by
//! providing a path through the new qudits.

use tracing::debug;

use qutopo_ir::{Block, QuditId};

use crate::coupling::CouplingMap;
use crate::error::{SelectError, SelectResult};
use crate::graph::Graph;
use crate::hybrid::{EdgeClass, classify_pair, to_global};

/// Number of the block's interactions that are direct or indirect when
/// the group is `group`.
fn covered_interactions(coupling: &CouplingMap, block: &Block, group: &[QuditId]) -> usize {
    let subgraph = coupling.induced_subgraph(group);
    to_global(block.qudit_group(), block.interactions())
        .iter()
        .filter(|&e| classify_pair(e, coupling, &subgraph, group.len()) != EdgeClass::External)
        .count()
}

fn total_distance(coupling: &CouplingMap, group: &[QuditId], q: QuditId) -> u64 {
    group
        .iter()
        .map(|&g| u64::from(coupling.distance_or_worst(g, q)))
        .sum()
}

/// Next qudit to append: physical neighbours of the group, or the nearest
/// unused qudits when the group has no free neighbour.
fn candidates(coupling: &CouplingMap, group: &[QuditId]) -> Vec<QuditId> {
    let mut neighbours: Vec<QuditId> = group
        .iter()
        .flat_map(|&g| coupling.neighbors(g))
        .filter(|q| !group.contains(q))
        .collect();
    neighbours.sort_unstable();
    neighbours.dedup();
    if !neighbours.is_empty() {
        return neighbours;
    }

    let unused: Vec<(QuditId, u32)> = (0..coupling.num_qudits())
        .map(QuditId)
        .filter(|q| !group.contains(q))
        .map(|q| {
            let nearest = group
                .iter()
                .map(|&g| coupling.distance_or_worst(g, q))
                .min()
                .unwrap_or(0);
            (q, nearest)
        })
        .collect();
    let Some(best) = unused.iter().map(|&(_, d)| d).min() else {
        return vec![];
    };
    unused
        .into_iter()
        .filter(|&(_, d)| d == best)
        .map(|(q, _)| q)
        .collect()
}

/// Enlarge `block`'s qudit group to `target_size` qudits.
///
/// Each step appends the candidate that maximizes the number of direct and
/// indirect interactions of the enlarged group; ties go to the smaller
/// total distance to the group, then the lower index. Existing local
/// indices stay valid. Blocks already at or above `target_size` are
/// returned unchanged.
pub fn grow_qudit_group(
    coupling: &CouplingMap,
    block: &Block,
    target_size: usize,
) -> SelectResult<Block> {
    let mut group = block.qudit_group().to_vec();
    while group.len() < target_size {
        let next = candidates(coupling, &group)
            .into_iter()
            .map(|c| {
                let mut enlarged = group.clone();
                enlarged.push(c);
                let covered = covered_interactions(coupling, block, &enlarged);
                (c, covered, total_distance(coupling, &group, c))
            })
            .min_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)).then(a.0.cmp(&b.0)))
            .ok_or(SelectError::GrowthExhausted {
                block: None,
                target: target_size,
            })?;
        debug!("Growing group {:?} with {} ({} covered)", group, next.0, next.1);
        group.push(next.0);
    }
    Ok(block.with_qudit_group(group)?)
}
