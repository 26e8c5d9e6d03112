// crates/rl_network/src/graph.rs

//! 汇流图
//!
//! 以稠密槽位存储节点，每个节点最多一个下游槽位。
//! 构建时把 `Terminal`、`Absent` 和悬空引用折叠为"无下游"，
//! 悬空引用另行记录，供拓扑检查使用。
//!
//! # 示例
//!
//! ```
//! use rl_network::graph::DrainageGraph;
//! use rl_network::types::Downstream;
//!
//! let graph = DrainageGraph::build([
//!     (1, Downstream::To(3)),
//!     (2, Downstream::To(3)),
//!     (3, Downstream::Terminal),
//! ]).unwrap();
//!
//! let outlet = graph.slot(3).unwrap();
//! assert!(graph.is_outlet(outlet));
//! assert_eq!(graph.ancestors(outlet).into_iter().collect::<Vec<_>>(), vec![1, 2]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{NetworkError, NetworkResult};
use crate::types::{Downstream, ReachId, Segment};

/// 汇流图（稠密槽位 + 折叠后的下游）
#[derive(Debug, Clone)]
pub struct DrainageGraph {
    ids: Vec<ReachId>,
    slots: BTreeMap<ReachId, usize>,
    down: Vec<Option<usize>>,
    dangling: Vec<(ReachId, ReachId)>,
}

impl DrainageGraph {
    /// 从 `(标识, 下游)` 序列构建，槽位顺序即输入顺序
    pub fn build<I>(edges: I) -> NetworkResult<Self>
    where
        I: IntoIterator<Item = (ReachId, Downstream)>,
    {
        let edges: Vec<(ReachId, Downstream)> = edges.into_iter().collect();

        let mut slots = BTreeMap::new();
        for (slot, &(id, _)) in edges.iter().enumerate() {
            if slots.insert(id, slot).is_some() {
                return Err(NetworkError::DuplicateId { layer: "rivers", id });
            }
        }

        let mut down = Vec::with_capacity(edges.len());
        let mut dangling = Vec::new();
        for &(id, next) in &edges {
            let target = match next.target() {
                Some(to) => match slots.get(&to) {
                    Some(&slot) => Some(slot),
                    None => {
                        dangling.push((id, to));
                        None
                    }
                },
                None => None,
            };
            down.push(target);
        }

        Ok(Self {
            ids: edges.into_iter().map(|(id, _)| id).collect(),
            slots,
            down,
            dangling,
        })
    }

    /// 从河段表构建
    pub fn from_segments(segments: &[Segment]) -> NetworkResult<Self> {
        Self::build(segments.iter().map(|s| (s.id, s.next)))
    }

    /// 节点数量
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// 槽位对应的标识
    #[inline]
    pub fn id(&self, slot: usize) -> ReachId {
        self.ids[slot]
    }

    /// 全部标识（槽位顺序）
    #[inline]
    pub fn ids(&self) -> &[ReachId] {
        &self.ids
    }

    /// 标识对应的槽位
    #[inline]
    pub fn slot(&self, id: ReachId) -> Option<usize> {
        self.slots.get(&id).copied()
    }

    /// 是否包含标识
    #[inline]
    pub fn contains(&self, id: ReachId) -> bool {
        self.slots.contains_key(&id)
    }

    /// 折叠后的下游槽位
    #[inline]
    pub fn downstream(&self, slot: usize) -> Option<usize> {
        self.down[slot]
    }

    /// 折叠后的下游数组
    #[inline]
    pub fn downstream_slots(&self) -> &[Option<usize>] {
        &self.down
    }

    /// 是否为出口（折叠后无下游）
    #[inline]
    pub fn is_outlet(&self, slot: usize) -> bool {
        self.down[slot].is_none()
    }

    /// 出口槽位（升序）
    pub fn outlets(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|&s| self.is_outlet(s))
    }

    /// 悬空引用 `(引用方, 不存在的下游)`，按槽位顺序
    pub fn dangling(&self) -> &[(ReachId, ReachId)] {
        &self.dangling
    }

    /// 每个节点的入度
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degree = vec![0usize; self.len()];
        for d in self.down.iter().flatten() {
            degree[*d] += 1;
        }
        degree
    }

    /// 反向邻接：每个节点的直接上游槽位（按槽位顺序）
    pub fn upstream_slots(&self) -> Vec<Vec<usize>> {
        let mut up = vec![Vec::new(); self.len()];
        for (slot, d) in self.down.iter().enumerate() {
            if let Some(d) = d {
                up[*d].push(slot);
            }
        }
        up
    }

    /// 节点的全部上游祖先标识
    pub fn ancestors(&self, slot: usize) -> BTreeSet<ReachId> {
        self.ancestors_with(&self.upstream_slots(), slot)
    }

    /// 使用预先构建的反向邻接计算祖先，批量查询时避免重复构建
    pub fn ancestors_with(&self, upstream: &[Vec<usize>], slot: usize) -> BTreeSet<ReachId> {
        let mut seen = vec![false; self.len()];
        let mut out = BTreeSet::new();
        let mut stack: Vec<usize> = upstream[slot].clone();
        seen[slot] = true;
        while let Some(s) = stack.pop() {
            if std::mem::replace(&mut seen[s], true) {
                continue;
            }
            out.insert(self.ids[s]);
            stack.extend(upstream[s].iter().copied());
        }
        out
    }
}
