// crates/rl_network/tests/accumulation.rs

//! 上游面积累积与直接上游索引的集成测试

use rl_network::accumulate::accumulate;
use rl_network::graph::DrainageGraph;
use rl_network::upstream::UpstreamIndex;
use rl_network::{Downstream, NetworkError};

/// 1 -> 4, 2 -> 4, 3 -> 5, 4 -> 5, 5 -> 终点, 6 孤立
fn sample_ids() -> Vec<i64> {
    vec![1, 2, 3, 4, 5, 6]
}

fn sample_next() -> Vec<Downstream> {
    vec![
        Downstream::To(4),
        Downstream::To(4),
        Downstream::To(5),
        Downstream::To(5),
        Downstream::Terminal,
        Downstream::Terminal,
    ]
}

fn seeds() -> Vec<Option<f64>> {
    vec![Some(1.0), Some(2.0), Some(4.0), Some(8.0), Some(16.0), Some(32.0)]
}

#[test]
fn test_uparea_equals_seed_plus_children() {
    let ids = sample_ids();
    let next = sample_next();
    let up = accumulate(&ids, &next, &seeds()).unwrap();

    for (i, &id) in ids.iter().enumerate() {
        let children: f64 = next
            .iter()
            .enumerate()
            .filter(|(_, n)| n.target() == Some(id))
            .map(|(j, _)| up[j])
            .sum();
        let seed = seeds()[i].unwrap();
        assert!((up[i] - (seed + children)).abs() < 1e-12, "节点 {id}");
    }
    assert_eq!(up[4], 31.0);
    assert_eq!(up[5], 32.0);
}

#[test]
fn test_sentinel_equivalence() {
    let ids = sample_ids();
    let variants = [
        Downstream::from_raw(Some(-9999)),
        Downstream::from_raw(Some(0)),
        Downstream::from_raw(None),
        Downstream::To(12345),
    ];

    let mut results = Vec::new();
    for variant in variants {
        let mut next = sample_next();
        next[4] = variant;
        results.push(accumulate(&ids, &next, &seeds()).unwrap());
    }
    for r in &results[1..] {
        assert_eq!(r, &results[0]);
    }
}

#[test]
fn test_folding_does_not_mutate_pointers() {
    let next = vec![Downstream::To(2), Downstream::To(777), Downstream::Absent];
    let graph = DrainageGraph::build(vec![(1, next[0]), (2, next[1]), (3, next[2])]).unwrap();
    assert!(graph.is_outlet(1));
    assert!(graph.is_outlet(2));
    // 存储值保持原样
    assert_eq!(next[1].to_raw(), Some(777));
    assert_eq!(next[2].to_raw(), None);
}

#[test]
fn test_two_node_cycle_detected() {
    let err = accumulate(
        &[10, 20, 30],
        &[Downstream::To(20), Downstream::To(10), Downstream::Terminal],
        &[Some(1.0), Some(1.0), Some(1.0)],
    )
    .unwrap_err();
    match err {
        NetworkError::Cycle { nodes } => assert_eq!(nodes, vec![10, 20]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_nodes_blocked_by_cycle_are_reported() {
    // 4 流入环 1 <-> 2，3 独立
    let err = accumulate(
        &[1, 2, 3, 4],
        &[
            Downstream::To(2),
            Downstream::To(1),
            Downstream::Terminal,
            Downstream::To(1),
        ],
        &[None, None, None, None],
    )
    .unwrap_err();
    match err {
        NetworkError::Cycle { nodes } => assert_eq!(nodes, vec![1, 2]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_upstream_index_padding_and_headwaters() {
    let ids = sample_ids();
    let graph = DrainageGraph::build(ids.iter().copied().zip(sample_next())).unwrap();
    let index = UpstreamIndex::build(&graph);

    assert_eq!(index.width(), 2);
    for slot in 0..graph.len() {
        let row = index.padded_row(slot);
        assert_eq!(row.len(), 2);
        assert_eq!(row.iter().filter(|&&v| v != 0).count(), index.maxup(slot));
    }

    let mut up5 = index.upstream_of(4).to_vec();
    up5.sort_unstable();
    assert_eq!(up5, vec![3, 4]);

    let headwaters: Vec<i64> = (0..graph.len())
        .filter(|&s| index.is_headwater(s))
        .map(|s| graph.id(s))
        .collect();
    assert_eq!(headwaters, vec![1, 2, 3, 6]);
}
