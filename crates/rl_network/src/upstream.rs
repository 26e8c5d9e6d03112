// crates/rl_network/src/upstream.rs

//! 直接上游索引
//!
//! 汇流图的反向邻接：节点 `u` 的下游为 `d` 时，`u` 是 `d` 的直接上游。
//! 输出时按全局最大汇入数 `K` 展开为 `up1..upK`，不足补 0。

use crate::graph::DrainageGraph;
use crate::types::{ReachId, Segment};

/// 直接上游索引
#[derive(Debug, Clone, Default)]
pub struct UpstreamIndex {
    lists: Vec<Vec<ReachId>>,
    width: usize,
}

impl UpstreamIndex {
    /// 由汇流图构建，每个列表按上游节点的槽位顺序排列
    pub fn build(graph: &DrainageGraph) -> Self {
        let lists: Vec<Vec<ReachId>> = graph
            .upstream_slots()
            .into_iter()
            .map(|slots| slots.into_iter().map(|s| graph.id(s)).collect())
            .collect();
        let width = lists.iter().map(Vec::len).max().unwrap_or(0);
        Self { lists, width }
    }

    /// 槽位的直接上游
    #[inline]
    pub fn upstream_of(&self, slot: usize) -> &[ReachId] {
        &self.lists[slot]
    }

    /// 槽位的直接上游数量
    #[inline]
    pub fn maxup(&self, slot: usize) -> usize {
        self.lists[slot].len()
    }

    /// 是否为源头
    #[inline]
    pub fn is_headwater(&self, slot: usize) -> bool {
        self.lists[slot].is_empty()
    }

    /// 全局最大汇入数 `K`
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// 展开为 `K` 列，不足补 0
    pub fn padded_row(&self, slot: usize) -> Vec<ReachId> {
        pad_upstream(&self.lists[slot], self.width)
    }

    /// 写回河段表（槽位顺序需与构建图时一致）
    pub fn apply_to(self, segments: &mut [Segment]) {
        for (segment, list) in segments.iter_mut().zip(self.lists) {
            segment.maxup = list.len();
            segment.upstream = list;
        }
    }
}

/// 把上游列表补齐到 `width` 列
pub fn pad_upstream(list: &[ReachId], width: usize) -> Vec<ReachId> {
    let mut row = Vec::with_capacity(width.max(list.len()));
    row.extend_from_slice(list);
    row.resize(width.max(list.len()), 0);
    row
}

/// 河段表中的最大汇入数
pub fn upstream_width(segments: &[Segment]) -> usize {
    segments.iter().map(|s| s.upstream.len()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Downstream;

    fn sample() -> DrainageGraph {
        DrainageGraph::build([
            (1, Downstream::To(4)),
            (2, Downstream::To(4)),
            (3, Downstream::To(4)),
            (4, Downstream::To(5)),
            (5, Downstream::Terminal),
            (6, Downstream::To(404)),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_and_width() {
        let index = UpstreamIndex::build(&sample());
        assert_eq!(index.width(), 3);
        let mut up4 = index.upstream_of(3).to_vec();
        up4.sort_unstable();
        assert_eq!(up4, vec![1, 2, 3]);
        assert_eq!(index.maxup(4), 1);
        assert!(index.is_headwater(0));
        assert!(index.is_headwater(5));
    }

    #[test]
    fn test_padded_rows() {
        let index = UpstreamIndex::build(&sample());
        assert_eq!(index.padded_row(4), vec![4, 0, 0]);
        assert_eq!(index.padded_row(0), vec![0, 0, 0]);
    }

    #[test]
    fn test_apply_to_segments() {
        let graph = sample();
        let mut segments: Vec<Segment> = graph
            .ids()
            .iter()
            .map(|&id| Segment::new(id, Downstream::Terminal, 1.0))
            .collect();
        UpstreamIndex::build(&graph).apply_to(&mut segments);
        assert_eq!(segments[3].maxup, 3);
        assert_eq!(segments[4].upstream, vec![4]);
        assert_eq!(upstream_width(&segments), 3);
    }
}
