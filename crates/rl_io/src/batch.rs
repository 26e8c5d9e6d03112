// crates/rl_io/src/batch.rs

//! 批处理入口
//!
//! 读取 → 摄入 → 湖泊修正 → 过滤/重写/检查 → 导出。

use std::time::Instant;

use log::info;
use rl_config::BurnConfig;
use rl_foundation::validation::ValidationReport;
use rl_geo::GeometryEngine;
use rl_network::checker::CheckOptions;
use rl_network::resolvable::FilterStats;
use rl_network::{burn_lakes, BurnOptions};

use crate::corrections::{apply_lake_corrections, CorrectionStats};
use crate::error::IoResult;
use crate::export::{write_outputs, OutputPaths};
use crate::ingest::{load_inputs, Inputs};

/// 批处理摘要
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// 输入河段数
    pub rivers: usize,
    /// 输入子流域数
    pub catchments: usize,
    /// 修正后的湖泊数
    pub lakes: usize,
    /// 湖泊修正统计
    pub corrections: CorrectionStats,
    /// 过滤统计
    pub filter: FilterStats,
    /// 嵌入的湖泊节点数
    pub lake_nodes: usize,
    /// 全局最大汇入数
    pub upstream_width: usize,
    /// 汇总的警告（摄入、修正、拓扑检查）
    pub report: ValidationReport,
    /// 输出文件
    pub outputs: OutputPaths,
}

/// 读取并摄入图层，再应用湖泊修正
pub fn prepare_inputs<E: GeometryEngine + ?Sized>(
    engine: &E,
    config: &BurnConfig,
) -> IoResult<(Inputs, CorrectionStats)> {
    config.validate()?;
    let mut inputs = load_inputs(config)?;
    let lakes = std::mem::take(&mut inputs.lakes);
    let (lakes, stats) =
        apply_lake_corrections(engine, lakes, &config.lake_corrections, &mut inputs.report)?;
    inputs.lakes = lakes;
    Ok((inputs, stats))
}

/// 运行完整批处理
pub fn run_batch<E: GeometryEngine + ?Sized>(
    engine: &E,
    config: &BurnConfig,
) -> IoResult<BatchSummary> {
    let start = Instant::now();
    let (inputs, corrections) = prepare_inputs(engine, config)?;

    let options = BurnOptions {
        margin: config.margin,
        check: CheckOptions {
            connector_tolerance: config.connector_tolerance,
        },
    };
    let outcome = burn_lakes(
        engine,
        &inputs.catchments,
        &inputs.rivers,
        &inputs.lakes,
        &options,
    )?;

    let outputs = write_outputs(&config.output, &inputs.crs, &outcome, &inputs.attributes)?;

    let mut report = inputs.report;
    report.merge(outcome.report.validation);

    info!(
        "批处理完成: 湖泊节点 {} 个, 警告 {} 个, 总耗时 {:.3?}",
        outcome.lake_nodes.len(),
        report.warning_count(),
        start.elapsed()
    );

    Ok(BatchSummary {
        rivers: inputs.rivers.len(),
        catchments: inputs.catchments.len(),
        lakes: inputs.lakes.len(),
        corrections,
        filter: outcome.filter_stats,
        lake_nodes: outcome.lake_nodes.len(),
        upstream_width: outcome.upstream_width,
        report,
        outputs,
    })
}
