// apps/rl_cli/src/commands/run.rs

//! 运行湖泊嵌入命令
//!
//! 读取 → 修正 → 过滤 → 重写 → 检查 → 导出。

use anyhow::{bail, Context, Result};
use clap::Args;
use rl_geo::PlanarEngine;
use rl_io::run_batch;
use std::path::PathBuf;
use tracing::{info, warn};

use super::ConfigSource;

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    /// 输出目录（覆盖配置）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 空间子集外扩距离（覆盖配置）
    #[arg(long)]
    pub margin: Option<f64>,

    /// 缩进输出 GeoJSON
    #[arg(long)]
    pub pretty: bool,

    /// 严格模式（有警告时返回失败）
    #[arg(long)]
    pub strict: bool,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== RiverLake 湖泊嵌入 ===");

    let mut config = args.source.load()?;
    if let Some(dir) = args.output {
        config.output.directory = dir;
    }
    if let Some(margin) = args.margin {
        config.margin = margin;
    }
    if args.pretty {
        config.output.pretty = true;
    }
    config.validate().context("配置无效")?;

    let summary = run_batch(&PlanarEngine, &config).context("湖泊嵌入失败")?;

    println!("\n=== 结果 ===");
    println!("河段: {}, 子流域: {}", summary.rivers, summary.catchments);
    println!(
        "湖泊修正: 合并 {} 组, 吸收 {} 个, 删除 {} 个",
        summary.corrections.merged_groups, summary.corrections.absorbed, summary.corrections.removed
    );
    println!(
        "可解析湖泊: {} -> 空间子集 {} -> 多流域 {} -> 端点接触 {}",
        summary.filter.input,
        summary.filter.spatial_subset,
        summary.filter.multi_catchment,
        summary.filter.endpoint_contact
    );
    println!("湖泊节点: {}, 最大汇入数: {}", summary.lake_nodes, summary.upstream_width);
    println!("输出:");
    println!("  {}", summary.outputs.rivers.display());
    println!("  {}", summary.outputs.catchments.display());
    println!("  {}", summary.outputs.lakes.display());

    if summary.report.has_warnings() {
        warn!("共 {} 个警告", summary.report.warning_count());
        println!("\n{}", summary.report);
        if args.strict {
            bail!("严格模式: 存在 {} 个警告", summary.report.warning_count());
        }
    }

    Ok(())
}
