// apps/rl_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示默认配置、导出配置模板、列出输入图层概况。

use anyhow::{Context, Result};
use clap::Args;
use rl_config::BurnConfig;
use rl_io::layer::FeatureLayer;
use std::path::{Path, PathBuf};
use tracing::info;

use super::ConfigSource;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,

    /// 将默认配置写为模板文件
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== RiverLake 信息 ===");

    if args.defaults {
        print_default_config()?;
    }

    if let Some(path) = &args.template {
        default_config()
            .save_to_file(path)
            .with_context(|| format!("无法写出模板 {}", path.display()))?;
        println!("配置模板已写入 {}", path.display());
    }

    if args.source.is_given() {
        let config = args.source.load()?;
        print_layers(&config)?;
    } else if !args.defaults && args.template.is_none() {
        println!("RiverLake CLI 版本: {}", env!("CARGO_PKG_VERSION"));
        println!();
        print_default_config()?;
    }

    Ok(())
}

fn default_config() -> BurnConfig {
    BurnConfig::with_paths("rivers.geojson", "catchments.geojson", "lakes.geojson")
}

fn print_default_config() -> Result<()> {
    println!("=== 默认配置 ===");
    println!("{}", serde_json::to_string_pretty(&default_config())?);
    Ok(())
}

fn print_layers(config: &BurnConfig) -> Result<()> {
    println!("=== 输入图层 ===");
    print_layer("rivers", &config.rivers.path)?;
    print_layer("catchments", &config.catchments.path)?;
    print_layer("lakes", &config.lakes.path)?;

    println!("\n空间子集外扩: {}", config.margin);
    println!("连接段阈值: {}", config.connector_tolerance);
    println!("输出目录: {}", config.output.directory.display());
    if !config.lake_corrections.is_empty() {
        println!(
            "湖泊修正: 删除 {} 个, 合并 {} 组",
            config.lake_corrections.remove.len(),
            config.lake_corrections.merge.len()
        );
    }
    Ok(())
}

fn print_layer(name: &str, path: &Path) -> Result<()> {
    let layer = FeatureLayer::read(path, name)
        .with_context(|| format!("无法读取图层 {}", path.display()))?;
    let with_geometry = layer.features.iter().filter(|f| f.geometry.is_some()).count();
    println!(
        "{:<12} {:>8} 个要素 ({} 个有几何)  坐标系 {}  {}",
        name,
        layer.len(),
        with_geometry,
        layer.crs,
        path.display()
    );
    Ok(())
}
