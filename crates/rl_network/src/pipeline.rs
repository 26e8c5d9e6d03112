// crates/rl_network/src/pipeline.rs

//! 湖泊嵌入流程
//!
//! 过滤 → 重写 → 检查，三步串行执行，任一步失败即中止。

use std::time::Instant;

use log::info;
use rl_geo::GeometryEngine;

use crate::checker::{check_topology, CheckOptions, TopologyReport};
use crate::error::NetworkResult;
use crate::resolvable::{filter_resolvable_lakes, FilterStats};
use crate::rewrite::rewrite;
use crate::types::{Catchment, Lake, LakeNode, Segment};

/// 流程参数
#[derive(Debug, Clone, Copy)]
pub struct BurnOptions {
    /// 空间子集外扩距离
    pub margin: f64,
    /// 拓扑检查选项
    pub check: CheckOptions,
}

impl Default for BurnOptions {
    fn default() -> Self {
        Self {
            margin: 2.0,
            check: CheckOptions::default(),
        }
    }
}

/// 流程结果
#[derive(Debug, Clone, Default)]
pub struct BurnOutcome {
    /// 校正后的河段表
    pub rivers: Vec<Segment>,
    /// 校正后的子流域表
    pub catchments: Vec<Catchment>,
    /// 可解析湖泊
    pub resolvable: Vec<Lake>,
    /// 湖泊节点
    pub lake_nodes: Vec<LakeNode>,
    /// 过滤统计
    pub filter_stats: FilterStats,
    /// 全局最大汇入数
    pub upstream_width: usize,
    /// 拓扑检查报告
    pub report: TopologyReport,
}

/// 把湖泊嵌入河网
pub fn burn_lakes<E: GeometryEngine + ?Sized>(
    engine: &E,
    catchments: &[Catchment],
    rivers: &[Segment],
    lakes: &[Lake],
    options: &BurnOptions,
) -> NetworkResult<BurnOutcome> {
    let start = Instant::now();
    let filtered = filter_resolvable_lakes(engine, catchments, rivers, lakes, options.margin);
    info!("过滤耗时 {:.3?}", start.elapsed());

    let start = Instant::now();
    let outcome = rewrite(engine, catchments, rivers, &filtered.lakes)?;
    info!("重写耗时 {:.3?}", start.elapsed());

    let start = Instant::now();
    let report = check_topology(
        &outcome.rivers,
        rivers,
        &outcome.lake_nodes,
        &outcome.catchments,
        &options.check,
    )?;
    info!("检查耗时 {:.3?}", start.elapsed());

    Ok(BurnOutcome {
        rivers: outcome.rivers,
        catchments: outcome.catchments,
        resolvable: filtered.lakes,
        lake_nodes: outcome.lake_nodes,
        filter_stats: filtered.stats,
        upstream_width: outcome.upstream_width,
        report,
    })
}
