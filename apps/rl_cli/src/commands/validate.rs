// apps/rl_cli/src/commands/validate.rs

//! 验证命令
//!
//! 只做摄入和输入网络检查，不写任何输出：
//! 字段映射、面积单位、坐标系、标识集合、输入网络是否有环。

use anyhow::{bail, Result};
use clap::Args;
use rl_foundation::validation::{ValidationReport, ValidationWarning};
use rl_geo::PlanarEngine;
use rl_io::prepare_inputs;
use rl_network::accumulate::topological_order;
use rl_network::graph::DrainageGraph;
use tracing::{error, info};

use super::ConfigSource;

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== RiverLake 输入验证 ===");

    if !args.source.is_given() {
        println!("用法: riverlake validate --config <配置文件>");
        println!("      riverlake validate --rivers <河段> --catchments <子流域> --lakes <湖泊>");
        return Ok(());
    }

    let config = args.source.load()?;
    println!("  ✓ 配置有效");

    let (inputs, corrections) = match prepare_inputs(&PlanarEngine, &config) {
        Ok(v) => v,
        Err(e) => {
            error!("{e}");
            bail!("输入图层无效: {e}");
        }
    };
    println!(
        "  ✓ 图层一致: 河段 {}, 子流域 {}, 湖泊 {} (坐标系 {}, 面积单位 {})",
        inputs.rivers.len(),
        inputs.catchments.len(),
        inputs.lakes.len(),
        inputs.crs,
        inputs.area_unit
    );
    if !config.lake_corrections.is_empty() {
        println!(
            "  ✓ 湖泊修正: 合并 {} 组, 删除 {} 个",
            corrections.merged_groups, corrections.removed
        );
    }

    let graph = DrainageGraph::from_segments(&inputs.rivers)?;
    topological_order(&graph)?;
    println!("  ✓ 输入河网无环, 出口 {} 个", graph.outlets().count());

    let mut report = inputs.report;
    for &(from, to) in graph.dangling() {
        report.add_warning(ValidationWarning::Topology {
            element_id: from,
            message: format!("下游 {to} 不存在，按终点处理"),
        });
    }

    print_report(&report, args.strict)
}

fn print_report(report: &ValidationReport, strict: bool) -> Result<()> {
    if report.has_warnings() {
        println!("\n{report}");
    }
    if strict && report.has_warnings() {
        bail!("严格模式: 存在 {} 个警告", report.warning_count());
    }
    println!("\n验证通过");
    Ok(())
}
