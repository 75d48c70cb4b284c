//! End-to-end selection scenarios.
//!
//! Each test drives the public API the way a batch driver would: build a
//! partition structure and a coupling map, run a `KernelSelector`, and
//! inspect the per-block report.

use qutopo_ir::{Block, Edge, InteractionSet, Kernel, PartitionStructure, QuditId};
use qutopo_select::{
    Category, CouplingMap, EdgeOrigin, EdgePolicy, Graph, KernelClass, KernelSelector,
    SelectionConfig, TopologyWarning, build_hybrid, compare_kernels, kernel_type, match_kernel,
};

/// Helper: interactions from `(pair, count)` entries.
fn interactions(counts: &[((u32, u32), usize)]) -> InteractionSet {
    let mut set = InteractionSet::new();
    for &((a, b), n) in counts {
        for _ in 0..n {
            set.push(a, b);
        }
    }
    set
}

/// Route selector logs to the test writer; set `RUST_LOG=qutopo_select=debug` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn run(config: SelectionConfig, coupling: CouplingMap, blocks: Vec<Block>) -> qutopo_select::SelectionReport {
    init_tracing();
    let structure = PartitionStructure::new(blocks);
    KernelSelector::new(config, coupling)
        .unwrap()
        .select(&structure)
        .unwrap()
}

#[test]
fn test_line_usage_selects_line_kernel() {
    let ops = interactions(&[((0, 1), 3), ((1, 2), 2), ((2, 3), 1)]);
    let block = Block::new((0..4).map(QuditId).collect(), ops).unwrap();
    let report = run(
        SelectionConfig::new(4).with_category(Category::Lines),
        CouplingMap::linear(4),
        vec![block],
    );

    let result = &report.blocks[0];
    assert_eq!(result.kernel, Kernel::from_pairs([(0, 1), (1, 2), (2, 3)]));
    assert_eq!(result.label, KernelClass::Line4);
    assert_eq!(result.label.label(), "4-line");
    assert_eq!(result.edge_score, 6);
}

#[test]
fn test_trees_category_still_picks_line() {
    let ops = interactions(&[((0, 1), 3), ((1, 2), 2), ((2, 3), 1)]);
    let kernel = match_kernel(&ops, 4, Category::Trees).unwrap();
    assert_eq!(kernel, Kernel::from_pairs([(0, 1), (1, 2), (2, 3)]));
    assert_eq!(kernel_type(&kernel, 4), "4-line");
}

#[test]
fn test_star_usage_selects_star_kernel() {
    let ops = interactions(&[((0, 1), 1), ((0, 2), 1), ((0, 3), 1)]);
    let block = Block::new((0..4).map(QuditId).collect(), ops).unwrap();
    let report = run(
        SelectionConfig::new(4).with_category(Category::Stars),
        CouplingMap::star(4),
        vec![block],
    );
    assert_eq!(report.blocks[0].kernel, Kernel::from_pairs([(0, 1), (0, 2), (0, 3)]));
    assert_eq!(report.blocks[0].label.label(), "4-star");
}

#[test]
fn test_mesh_diagonal_is_indirect() {
    let mesh = CouplingMap::mesh(3, 3);
    let group = [QuditId(0), QuditId(1), QuditId(4)];
    let ops = InteractionSet::from_pairs([(0, 2)]);

    let hybrid = build_hybrid(&mesh, &group, &ops, EdgePolicy::ShortestPath);
    assert_eq!(hybrid.classes.indirect, vec![Edge::new(0, 4)]);
    assert!(hybrid.classes.external.is_empty());
    assert_eq!(hybrid.graph.num_logical_edges(), 0);

    let report = run(
        SelectionConfig::new(3),
        mesh,
        vec![Block::new(group.to_vec(), ops).unwrap()],
    );
    let result = &report.blocks[0];
    assert_eq!(result.classes.indirect, 1);
    // path 0-1-4: two hops
    assert_eq!(result.estimated_cost, 4);
}

#[test]
fn test_mesh_diagonal_without_path_is_external() {
    let mesh = CouplingMap::mesh(3, 3);
    let group = [QuditId(0), QuditId(4)];
    let hybrid = build_hybrid(
        &mesh,
        &group,
        &InteractionSet::from_pairs([(0, 1)]),
        EdgePolicy::ShortestPath,
    );
    assert_eq!(hybrid.classes.external, vec![Edge::new(0, 4)]);

    let inserted = hybrid.graph.edge(QuditId(0), QuditId(4)).copied().unwrap();
    assert_eq!(inserted.origin, EdgeOrigin::Logical);
    assert_eq!(Some(inserted.distance), mesh.distance(QuditId(0), QuditId(4)));
    assert_eq!(inserted.weight, 12.0);
}

#[test]
fn test_empty_block_gives_empty_result() {
    for policy in EdgePolicy::ALL {
        let report = run(
            SelectionConfig::new(4).with_edge_policy(policy),
            CouplingMap::mesh(2, 2),
            vec![Block::from_raw([0, 1, 2, 3], []).unwrap()],
        );
        let result = &report.blocks[0];
        assert!(result.kernel.is_empty());
        assert_eq!(kernel_type(&result.kernel, 4), "empty");
        assert_eq!(result.estimated_cost, 0);
        assert_eq!(result.num_logical_edges(), 0);
        assert_eq!(result.warnings, vec![TopologyWarning::EmptyInteractions]);
    }
}

#[test]
fn test_overlap_propagation_biases_towards_shared_edge() {
    // A = [3, 4, 5] uses (3,4) heavily; B = [2, 3, 4, 6] is a star around 2.
    let a = Block::from_raw([3, 4, 5], [(0, 1), (0, 1), (0, 1), (1, 2)]).unwrap();
    let b = Block::from_raw([2, 3, 4, 6], [(0, 1), (0, 2), (0, 3)]).unwrap();
    let shared = Edge::new(1, 2);

    let config = SelectionConfig::new(4).with_category(Category::Stars);
    let plain = run(config.clone(), CouplingMap::linear(7), vec![a.clone(), b.clone()]);
    let biased = run(config.with_overlap(true), CouplingMap::linear(7), vec![a, b]);

    assert!(!plain.blocks[1].kernel.contains(shared));
    assert!(biased.blocks[1].kernel.contains(shared));
    assert_eq!(
        compare_kernels(&plain.kernels(), &biased.kernels()).unwrap(),
        vec![true, false]
    );

    // scores and cost always describe the block's own interactions
    assert_eq!(plain.blocks[1].estimated_cost, biased.blocks[1].estimated_cost);
    assert!(biased.blocks[1].edge_score <= plain.blocks[1].edge_score);
}

#[test]
fn test_mst_policy_reports_disconnected_topology() {
    // 0 and 2 interact, 4 and 6 interact, the two pairs never do
    let block = Block::from_raw([0, 2, 4, 6], [(0, 1), (2, 3)]).unwrap();
    let report = run(
        SelectionConfig::new(4).with_edge_policy(EdgePolicy::MstPath),
        CouplingMap::linear(8),
        vec![block],
    );
    let result = &report.blocks[0];
    assert_eq!(result.num_logical_edges(), 2);
    assert!(result
        .warnings
        .contains(&TopologyWarning::DisconnectedTopology { components: 2 }));
    assert_eq!(report.summary.num_warnings, 1);
}

#[test]
fn test_policies_connect_every_interaction() {
    let mesh = CouplingMap::mesh(3, 3);
    let group = [QuditId(0), QuditId(2), QuditId(6), QuditId(8)];
    let ops = InteractionSet::from_pairs([(0, 1), (1, 3), (3, 2), (0, 3), (0, 1)]);
    for policy in EdgePolicy::ALL {
        let hybrid = build_hybrid(&mesh, &group, &ops, policy);
        for e in [(0, 2), (2, 8), (6, 8), (0, 8)] {
            assert!(
                hybrid.graph.weighted_path(QuditId(e.0), QuditId(e.1)).is_some(),
                "{policy}: no path for {e:?}"
            );
        }
        assert_eq!(hybrid.graph.connected_components().len(), 1, "{policy}");
    }
}

#[test]
fn test_report_summary_over_several_blocks() {
    let mesh = CouplingMap::mesh(3, 3);
    let blocks = vec![
        Block::from_raw([0, 1, 3, 4], [(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap(),
        Block::from_raw([4, 5, 7, 8], [(0, 1), (0, 2), (0, 3)]).unwrap(),
        Block::from_raw([1, 2], [(0, 1), (0, 1)]).unwrap(),
    ];
    let report = run(SelectionConfig::new(4), mesh, blocks);

    assert_eq!(report.summary.num_blocks, 3);
    assert_eq!(
        report.summary.total_cost,
        report.blocks.iter().map(|b| b.estimated_cost).sum::<u64>()
    );
    assert_eq!(report.summary.operations.total(), 9);
    let coverage: f64 = report.summary.labels.iter().map(|s| s.coverage).sum();
    assert!((coverage - 100.0).abs() < 1e-9);
    assert_eq!(report.blocks[2].label, KernelClass::Line2);

    let json = report.to_json_pretty().unwrap();
    assert!(json.contains("\"schema_version\""));
}

#[test]
fn test_mismatched_inputs_fail() {
    let err = PartitionStructure::from_parts(vec![vec![0, 1], vec![1, 2]], vec![vec![(0, 1)]]);
    assert!(err.is_err());
}
