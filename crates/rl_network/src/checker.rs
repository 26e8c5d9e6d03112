// crates/rl_network/src/checker.rs

//! 拓扑不变量检查
//!
//! 校正后网络的后置条件：
//!
//! - **出口祖先子集**（致命）：校正后每个出口在原网络中也存在时，
//!   其上游祖先（仅计原网络已有节点，新建湖泊节点豁免）必须是原祖先集合的子集
//! - **湖间连接段**（警告）：长度不超过容差的入出流河段，直接邻居中
//!   有两个及以上湖泊节点
//! - **悬空引用**：校正后新出现的悬空下游引用致命，原本就存在的记为警告
//! - **标识集合**（致命）：子流域标识集合必须等于河段标识集合

use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};
use rl_foundation::validation::{ValidationReport, ValidationWarning};

use crate::error::{NetworkError, NetworkResult};
use crate::graph::DrainageGraph;
use crate::types::{Catchment, LakeNode, ReachId, Segment};

/// 检查选项
#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    /// 连接段长度阈值
    pub connector_tolerance: f64,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            connector_tolerance: 1e-3,
        }
    }
}

/// 两个湖泊之间的近零长度连接段
#[derive(Debug, Clone, PartialEq)]
pub struct LakeConnector {
    /// 连接段标识
    pub segment: ReachId,
    /// 连接段长度
    pub length: f64,
    /// 相邻的湖泊节点（升序）
    pub lakes: Vec<ReachId>,
}

/// 检查报告（只包含非致命项）
#[derive(Debug, Clone, Default)]
pub struct TopologyReport {
    /// 检查的出口数量
    pub outlets_checked: usize,
    /// 湖间连接段
    pub connectors: Vec<LakeConnector>,
    /// 原本就存在的悬空引用 `(引用方, 下游)`
    pub preexisting_dangling: Vec<(ReachId, ReachId)>,
    /// 汇总的警告
    pub validation: ValidationReport,
}

/// 检查校正后网络
pub fn check_topology(
    corrected: &[Segment],
    original: &[Segment],
    lake_nodes: &[LakeNode],
    catchments: &[Catchment],
    options: &CheckOptions,
) -> NetworkResult<TopologyReport> {
    let new_graph = DrainageGraph::from_segments(corrected)?;
    let org_graph = DrainageGraph::from_segments(original)?;

    let mut report = TopologyReport::default();

    check_id_sets(corrected, catchments)?;
    check_dangling(&new_graph, &org_graph, &mut report)?;
    report.outlets_checked = check_outlet_ancestors(&new_graph, &org_graph)?;
    check_connectors(corrected, &new_graph, lake_nodes, options, &mut report);

    info!(
        "拓扑检查通过: 出口 {} 个, 连接段警告 {} 个, 既有悬空引用 {} 个",
        report.outlets_checked,
        report.connectors.len(),
        report.preexisting_dangling.len()
    );
    Ok(report)
}

/// 出口祖先子集检查，返回检查的出口数量
fn check_outlet_ancestors(
    new_graph: &DrainageGraph,
    org_graph: &DrainageGraph,
) -> NetworkResult<usize> {
    let new_up = new_graph.upstream_slots();
    let org_up = org_graph.upstream_slots();

    let mut checked = 0;
    let mut violations: BTreeMap<ReachId, Vec<ReachId>> = BTreeMap::new();

    for slot in new_graph.outlets() {
        let id = new_graph.id(slot);
        let Some(org_slot) = org_graph.slot(id) else {
            continue;
        };
        checked += 1;

        let org_ancestors = org_graph.ancestors_with(&org_up, org_slot);
        let extra: Vec<ReachId> = new_graph
            .ancestors_with(&new_up, slot)
            .into_iter()
            .filter(|a| org_graph.contains(*a) && !org_ancestors.contains(a))
            .collect();
        if !extra.is_empty() {
            violations.insert(id, extra);
        }
    }

    let count = violations.len();
    match violations.into_iter().next() {
        None => Ok(checked),
        Some((example, extra)) => Err(NetworkError::TopologyViolation {
            checked,
            violations: count,
            example,
            extra,
        }),
    }
}

/// 湖间连接段检查
fn check_connectors(
    corrected: &[Segment],
    graph: &DrainageGraph,
    lake_nodes: &[LakeNode],
    options: &CheckOptions,
    report: &mut TopologyReport,
) {
    let lake_ids: BTreeSet<ReachId> = lake_nodes
        .iter()
        .map(|n| n.node_id)
        .chain(corrected.iter().filter(|s| s.is_lake).map(|s| s.id))
        .collect();

    for (slot, segment) in corrected.iter().enumerate() {
        if !segment.inoutflow || segment.length > options.connector_tolerance {
            continue;
        }
        let downstream = graph.downstream(slot).map(|d| graph.id(d));
        let lakes: BTreeSet<ReachId> = downstream
            .into_iter()
            .chain(segment.upstream.iter().copied())
            .filter(|id| lake_ids.contains(id))
            .collect();
        if lakes.len() >= 2 {
            let lakes: Vec<ReachId> = lakes.into_iter().collect();
            warn!(
                "河段 {} 长度 {} 连接湖泊节点 {:?}，可能是同一水体被拆成两个多边形",
                segment.id, segment.length, lakes
            );
            report.validation.add_warning(ValidationWarning::Topology {
                element_id: segment.id,
                message: format!("近零长度湖间连接段，相邻湖泊节点 {lakes:?}"),
            });
            report.connectors.push(LakeConnector {
                segment: segment.id,
                length: segment.length,
                lakes,
            });
        }
    }
}

/// 悬空引用检查
fn check_dangling(
    new_graph: &DrainageGraph,
    org_graph: &DrainageGraph,
    report: &mut TopologyReport,
) -> NetworkResult<()> {
    let before: BTreeSet<(ReachId, ReachId)> = org_graph.dangling().iter().copied().collect();
    for &(from, to) in new_graph.dangling() {
        if !before.contains(&(from, to)) {
            return Err(NetworkError::DanglingReference { from, to });
        }
        warn!("河段 {from} 的下游 {to} 不存在，按终点处理");
        report.validation.add_warning(ValidationWarning::Topology {
            element_id: from,
            message: format!("下游 {to} 不存在，按终点处理"),
        });
        report.preexisting_dangling.push((from, to));
    }
    Ok(())
}

/// 子流域与河段标识集合一致性检查
fn check_id_sets(rivers: &[Segment], catchments: &[Catchment]) -> NetworkResult<()> {
    let river_ids: BTreeSet<ReachId> = rivers.iter().map(|s| s.id).collect();
    let catchment_ids: BTreeSet<ReachId> = catchments.iter().map(|c| c.id).collect();
    if river_ids == catchment_ids {
        return Ok(());
    }
    Err(NetworkError::IdSetMismatch {
        only_rivers: river_ids.difference(&catchment_ids).copied().collect(),
        only_catchments: catchment_ids.difference(&river_ids).copied().collect(),
    })
}
