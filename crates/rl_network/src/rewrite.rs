// crates/rl_network/src/rewrite.rs

//! 湖泊嵌入与拓扑重写
//!
//! 把可解析湖泊作为新节点插入河段/子流域网络：
//!
//! 1. 计算河段 × 湖泊相交对（裁剪长度为正）
//! 2. 按相交河段的最大输入 `uparea` 升序排列湖泊，无相交河段的排在最后
//! 3. 依次分配新节点标识 `max(id) + 1, ...`
//! 4. 基于原始几何计算收缩校正（子流域与河段并行）
//! 5. 每个湖泊追加一行河段和一行子流域
//! 6. 逐个湖泊改写下游指针：相交河段全部流入湖泊；外流湖以
//!    `uparea` 最大的相交河段为出口（同值优先最下游，再取最小标识），
//!    出口恢复改写前离开相交集合的下游指针，湖泊流向出口
//! 7. `inoutflow = inflow && outflow`
//! 8. 应用收缩校正
//! 9. 河段 `unit_area` 取子流域的值
//! 10. 重新累积 `uparea`，重建直接上游
//!
//! 没有任何河段与湖泊相交时只重算派生字段，几何、长度、面积和指针保持不变。
//! 输入表只读，结果写入新表；任一步出错时不返回部分结果。

use std::collections::BTreeMap;

use log::{debug, info};
use rl_geo::spatial_index::{BoundingBox, EnvelopeIndex};
use rl_geo::GeometryEngine;

use crate::accumulate::accumulate_segments;
use crate::error::NetworkResult;
use crate::graph::DrainageGraph;
use crate::shrink::{shrink_corrections, CatchmentShrink, RiverShrink};
use crate::types::{Catchment, Downstream, Lake, LakeNode, ReachId, Segment, SegmentGeometry};
use crate::upstream::UpstreamIndex;

/// 重写结果
#[derive(Debug, Clone, Default)]
pub struct RewriteOutcome {
    /// 校正后的河段表（原始行在前，湖泊行按节点标识追加）
    pub rivers: Vec<Segment>,
    /// 校正后的子流域表
    pub catchments: Vec<Catchment>,
    /// 湖泊节点（按节点标识升序）
    pub lake_nodes: Vec<LakeNode>,
    /// 全局最大汇入数
    pub upstream_width: usize,
}

/// 湖泊嵌入与拓扑重写
pub fn rewrite<E: GeometryEngine + ?Sized>(
    engine: &E,
    catchments: &[Catchment],
    rivers: &[Segment],
    lakes: &[Lake],
) -> NetworkResult<RewriteOutcome> {
    // 1. 相交对
    let touching = river_lake_pairs(engine, rivers, lakes);
    if touching.iter().all(Vec::is_empty) {
        info!("没有河段与湖泊相交，仅重算派生字段");
        return trivial(catchments, rivers);
    }

    // 2. 排序
    let order = insertion_order(rivers, &touching);

    // 3. 节点标识
    let base = rivers
        .iter()
        .map(|s| s.id)
        .chain(catchments.iter().map(|c| c.id))
        .max()
        .unwrap_or(0)
        + 1;

    // 4. 收缩校正（基于原始几何）
    let (cat_shrink, riv_shrink) = shrink_corrections(engine, catchments, rivers, lakes);

    // 5. 追加湖泊行
    let mut out_rivers: Vec<Segment> = rivers.iter().map(reset_flags).collect();
    let mut out_catchments: Vec<Catchment> = catchments.to_vec();
    for (k, &li) in order.iter().enumerate() {
        let lake = &lakes[li];
        let node_id = base + k as ReachId;
        out_rivers.push(lake_segment(lake, node_id));
        out_catchments.push(lake_catchment(lake, node_id));
    }

    // 6. 改写指针
    let n_rivers = rivers.len();
    let mut lake_nodes = Vec::with_capacity(order.len());
    for (k, &li) in order.iter().enumerate() {
        let lake = &lakes[li];
        let node_id = base + k as ReachId;
        let lake_slot = n_rivers + k;
        let node = wire_lake(&mut out_rivers, rivers, lake, node_id, lake_slot, &touching[li]);
        debug!(
            "湖泊 {} -> 节点 {}: 入流 {:?}, 出口 {:?}",
            node.lake_id, node.node_id, node.inflows, node.outlet
        );
        lake_nodes.push(node);
    }

    // 7. 入出流
    for segment in &mut out_rivers {
        segment.inoutflow = segment.inflow && segment.outflow;
    }

    // 8. 收缩校正
    apply_river_shrink(&mut out_rivers[..n_rivers], riv_shrink);
    apply_catchment_shrink(&mut out_catchments[..catchments.len()], cat_shrink);

    // 9. 子流域面积传给河段
    hand_off_unit_area(&mut out_rivers, &out_catchments);

    // 10. 派生字段
    let upstream_width = recompute_derived(&mut out_rivers)?;

    info!(
        "湖泊嵌入完成: {} 个湖泊节点 (孤立 {}), 河段 {} 行, 子流域 {} 行",
        lake_nodes.len(),
        lake_nodes.iter().filter(|n| n.is_isolated()).count(),
        out_rivers.len(),
        out_catchments.len()
    );

    Ok(RewriteOutcome {
        rivers: out_rivers,
        catchments: out_catchments,
        lake_nodes,
        upstream_width,
    })
}

// ============================================================================
// 步骤实现
// ============================================================================

/// 每个湖泊相交的河段行号（按河段标识升序）
fn river_lake_pairs<E: GeometryEngine + ?Sized>(
    engine: &E,
    rivers: &[Segment],
    lakes: &[Lake],
) -> Vec<Vec<usize>> {
    let index = EnvelopeIndex::bulk_load(
        rivers
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                s.channel()
                    .and_then(|line| engine.line_bounds(line))
                    .map(|b| (b, i))
            })
            .collect::<Vec<(BoundingBox, usize)>>(),
    );

    lakes
        .iter()
        .map(|lake| {
            let Some(bbox) = engine.polygon_bounds(&lake.geometry) else {
                return Vec::new();
            };
            let mut hits: Vec<usize> = index
                .query_sorted(&bbox)
                .into_iter()
                .filter(|&i| {
                    rivers[i].channel().is_some_and(|line| {
                        engine.length(&engine.clip_line(line, &lake.geometry)) > 0.0
                    })
                })
                .collect();
            hits.sort_by_key(|&i| rivers[i].id);
            hits
        })
        .collect()
}

/// 按相交河段最大 `uparea` 升序的湖泊下标（稳定排序）
fn insertion_order(rivers: &[Segment], touching: &[Vec<usize>]) -> Vec<usize> {
    let keys: Vec<f64> = touching
        .iter()
        .map(|hits| {
            hits.iter()
                .map(|&i| rivers[i].uparea)
                .filter(|v| !v.is_nan())
                .reduce(f64::max)
                .unwrap_or(f64::INFINITY)
        })
        .collect();
    let mut order: Vec<usize> = (0..touching.len()).collect();
    order.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));
    order
}

fn reset_flags(segment: &Segment) -> Segment {
    Segment {
        inflow: false,
        outflow: false,
        inoutflow: false,
        length_ratio: 1.0,
        ..segment.clone()
    }
}

fn lake_segment(lake: &Lake, node_id: ReachId) -> Segment {
    let mut segment = Segment::new(node_id, Downstream::Terminal, 0.0)
        .with_unit_area(lake.unit_area)
        .with_uparea(lake.unit_area);
    segment.is_lake = true;
    segment.lake_ref = Some(lake.lake_id);
    segment.geometry = Some(SegmentGeometry::Water(lake.geometry.clone()));
    segment
}

fn lake_catchment(lake: &Lake, node_id: ReachId) -> Catchment {
    let mut catchment = Catchment::new(node_id, lake.unit_area, Some(lake.geometry.clone()));
    catchment.is_lake = true;
    catchment.lake_ref = Some(lake.lake_id);
    catchment
}

/// 改写一个湖泊的入流与出口
fn wire_lake(
    out: &mut [Segment],
    original: &[Segment],
    lake: &Lake,
    node_id: ReachId,
    lake_slot: usize,
    touching: &[usize],
) -> LakeNode {
    let mut node = LakeNode {
        lake_id: lake.lake_id,
        node_id,
        exorheic: lake.exorheic,
        inflows: Vec::new(),
        outlet: None,
    };
    if touching.is_empty() {
        return node;
    }

    let prior: Vec<Downstream> = touching.iter().map(|&i| out[i].next).collect();
    for &i in touching {
        let segment = &mut out[i];
        segment.inflow = true;
        segment.next = Downstream::To(node_id);
        segment.lake_ref = Some(lake.lake_id);
    }
    out[lake_slot].next = Downstream::Terminal;

    if lake.exorheic {
        let best = outlet_position(original, touching, &prior);
        let outlet = touching[best];
        let segment = &mut out[outlet];
        segment.inflow = false;
        segment.outflow = true;
        segment.next = exit_pointer(original, touching, &prior, best);
        out[lake_slot].next = Downstream::To(original[outlet].id);
        node.outlet = Some(original[outlet].id);
    }

    node.inflows = touching
        .iter()
        .map(|&i| original[i].id)
        .filter(|&id| Some(id) != node.outlet)
        .collect();
    node
}

/// 出口在 `touching` 中的位置
///
/// `uparea` 最大者；同值时优先下游不在相交集合内的河段，再取最小标识
/// （`touching` 已按标识升序）。
fn outlet_position(original: &[Segment], touching: &[usize], prior: &[Downstream]) -> usize {
    let drains_inside = |k: usize| {
        prior[k]
            .target()
            .is_some_and(|t| touching.iter().any(|&i| original[i].id == t))
    };
    let mut best = 0;
    for k in 1..touching.len() {
        let candidate = original[touching[k]].uparea;
        let current = original[touching[best]].uparea;
        if candidate > current
            || (candidate == current && drains_inside(best) && !drains_inside(k))
        {
            best = k;
        }
    }
    best
}

/// 出口恢复后的下游指针
///
/// 改写前的指针若指向另一个相交河段（该河段已流入湖泊），沿原指针链
/// 继续向下，取第一个离开相交集合的指针，避免湖泊与出口成环。
fn exit_pointer(
    original: &[Segment],
    touching: &[usize],
    prior: &[Downstream],
    start: usize,
) -> Downstream {
    let mut k = start;
    for _ in 0..touching.len() {
        let inside = prior[k]
            .target()
            .and_then(|t| touching.iter().position(|&i| original[i].id == t));
        match inside {
            Some(next) => k = next,
            None => return prior[k],
        }
    }
    // 相交集合内部成环，输入本身已有环
    Downstream::Terminal
}

fn apply_river_shrink(rivers: &mut [Segment], shrink: Vec<RiverShrink>) {
    for (segment, s) in rivers.iter_mut().zip(shrink) {
        segment.length_ratio = s.ratio;
        if s.ratio == 0.0 {
            segment.geometry = None;
            segment.length = 0.0;
        } else if s.ratio < 1.0 {
            if let Some(line) = s.remaining {
                segment.geometry = Some(SegmentGeometry::Channel(line));
            }
            segment.length *= s.ratio;
        }
    }
}

fn apply_catchment_shrink(catchments: &mut [Catchment], shrink: Vec<CatchmentShrink>) {
    for (catchment, s) in catchments.iter_mut().zip(shrink) {
        catchment.area_ratio = s.ratio;
        if s.ratio == 0.0 {
            catchment.geometry = None;
            catchment.unit_area = 0.0;
        } else if s.ratio < 1.0 {
            if let Some(polygon) = s.remaining {
                catchment.geometry = Some(polygon);
            }
            catchment.unit_area *= s.ratio;
        }
    }
}

/// 河段 `unit_area` 取同标识子流域的值，缺失为 0
pub fn hand_off_unit_area(rivers: &mut [Segment], catchments: &[Catchment]) {
    let areas: BTreeMap<ReachId, f64> = catchments.iter().map(|c| (c.id, c.unit_area)).collect();
    for segment in rivers {
        segment.unit_area = areas.get(&segment.id).copied().unwrap_or(0.0);
    }
}

/// 重算 `uparea`、直接上游和 `maxup`，返回全局最大汇入数
pub fn recompute_derived(rivers: &mut [Segment]) -> NetworkResult<usize> {
    let graph = DrainageGraph::from_segments(rivers)?;
    let uparea = accumulate_segments(&graph, rivers)?;
    for (segment, up) in rivers.iter_mut().zip(uparea) {
        segment.uparea = up;
    }
    let index = UpstreamIndex::build(&graph);
    let width = index.width();
    index.apply_to(rivers);
    Ok(width)
}

fn trivial(catchments: &[Catchment], rivers: &[Segment]) -> NetworkResult<RewriteOutcome> {
    let mut out_rivers: Vec<Segment> = rivers.iter().map(reset_flags).collect();
    let out_catchments: Vec<Catchment> = catchments
        .iter()
        .map(|c| Catchment {
            area_ratio: 1.0,
            ..c.clone()
        })
        .collect();
    let upstream_width = recompute_derived(&mut out_rivers)?;
    Ok(RewriteOutcome {
        rivers: out_rivers,
        catchments: out_catchments,
        lake_nodes: Vec::new(),
        upstream_width,
    })
}
