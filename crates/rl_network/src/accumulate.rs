// crates/rl_network/src/accumulate.rs

//! 上游面积累积
//!
//! 在折叠后的汇流图上按 Kahn 拓扑序自上而下累加面积：
//! 每个节点从自身种子面积开始，出队时把累计值加到下游节点。
//! 队列耗尽后仍有剩余入度的节点位于环上（或被环阻塞），作为错误报告。

use std::collections::VecDeque;

use crate::error::{NetworkError, NetworkResult};
use crate::graph::DrainageGraph;
use crate::types::{Downstream, ReachId, Segment};

/// Kahn 拓扑序（上游在前）
///
/// 初始队列为入度为 0 的节点，按槽位顺序入队，先进先出。
pub fn topological_order(graph: &DrainageGraph) -> NetworkResult<Vec<usize>> {
    let mut remaining = graph.in_degrees();
    let mut queue: VecDeque<usize> = (0..graph.len()).filter(|&s| remaining[s] == 0).collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(slot) = queue.pop_front() {
        order.push(slot);
        if let Some(down) = graph.downstream(slot) {
            remaining[down] -= 1;
            if remaining[down] == 0 {
                queue.push_back(down);
            }
        }
    }

    if order.len() < graph.len() {
        let mut nodes: Vec<ReachId> = (0..graph.len())
            .filter(|&s| remaining[s] > 0)
            .map(|s| graph.id(s))
            .collect();
        nodes.sort_unstable();
        return Err(NetworkError::Cycle { nodes });
    }
    Ok(order)
}

/// 累积上游面积
///
/// `seeds[i]` 是槽位 `i` 的本地面积；`None` 和 NaN 按 0 处理。
pub fn accumulate_uparea(graph: &DrainageGraph, seeds: &[Option<f64>]) -> NetworkResult<Vec<f64>> {
    if seeds.len() != graph.len() {
        return Err(NetworkError::LengthMismatch {
            what: "种子面积",
            expected: graph.len(),
            actual: seeds.len(),
        });
    }

    let order = topological_order(graph)?;
    let mut total: Vec<f64> = seeds
        .iter()
        .map(|s| s.filter(|v| !v.is_nan()).unwrap_or(0.0))
        .collect();

    for slot in order {
        if let Some(down) = graph.downstream(slot) {
            total[down] += total[slot];
        }
    }
    Ok(total)
}

/// 由标识、下游和种子面积直接累积
pub fn accumulate(
    ids: &[ReachId],
    next: &[Downstream],
    seeds: &[Option<f64>],
) -> NetworkResult<Vec<f64>> {
    if next.len() != ids.len() {
        return Err(NetworkError::LengthMismatch {
            what: "下游指针",
            expected: ids.len(),
            actual: next.len(),
        });
    }
    let graph = DrainageGraph::build(ids.iter().copied().zip(next.iter().copied()))?;
    accumulate_uparea(&graph, seeds)
}

/// 以河段 `unit_area` 为种子累积上游面积
pub fn accumulate_segments(graph: &DrainageGraph, segments: &[Segment]) -> NetworkResult<Vec<f64>> {
    let seeds: Vec<Option<f64>> = segments.iter().map(|s| Some(s.unit_area)).collect();
    accumulate_uparea(graph, &seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tree() {
        // 1 -> 3, 2 -> 3, 3 -> 4
        let up = accumulate(
            &[1, 2, 3, 4],
            &[
                Downstream::To(3),
                Downstream::To(3),
                Downstream::To(4),
                Downstream::Terminal,
            ],
            &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
        )
        .unwrap();
        assert_eq!(up, vec![1.0, 2.0, 6.0, 10.0]);
    }

    #[test]
    fn test_missing_seed_is_zero() {
        let up = accumulate(
            &[1, 2],
            &[Downstream::To(2), Downstream::Absent],
            &[None, Some(f64::NAN)],
        )
        .unwrap();
        assert_eq!(up, vec![0.0, 0.0]);
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let err = accumulate(&[5], &[Downstream::To(5)], &[Some(1.0)]).unwrap_err();
        assert!(matches!(err, NetworkError::Cycle { ref nodes } if nodes == &vec![5]));
    }

    #[test]
    fn test_length_mismatch() {
        let err = accumulate(&[1, 2], &[Downstream::Terminal], &[Some(1.0)]).unwrap_err();
        assert!(matches!(err, NetworkError::LengthMismatch { .. }));
    }

    #[test]
    fn test_order_is_fifo() {
        let graph = DrainageGraph::build([
            (1, Downstream::To(3)),
            (2, Downstream::To(3)),
            (3, Downstream::Terminal),
            (4, Downstream::Terminal),
        ])
        .unwrap();
        assert_eq!(topological_order(&graph).unwrap(), vec![0, 1, 3, 2]);
    }
}
