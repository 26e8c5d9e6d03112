// apps/rl_cli/src/commands/mod.rs

//! 子命令

pub mod info;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use clap::Args;
use rl_config::BurnConfig;
use std::path::PathBuf;

/// 配置来源：配置文件，或直接给出三个图层路径（使用默认字段映射）
#[derive(Args, Debug, Clone)]
pub struct ConfigSource {
    /// 配置文件路径 (JSON)
    #[arg(short, long, conflicts_with_all = ["rivers", "catchments", "lakes"])]
    pub config: Option<PathBuf>,

    /// 河段图层
    #[arg(long, requires_all = ["catchments", "lakes"])]
    pub rivers: Option<PathBuf>,

    /// 子流域图层
    #[arg(long)]
    pub catchments: Option<PathBuf>,

    /// 湖泊图层
    #[arg(long)]
    pub lakes: Option<PathBuf>,
}

impl ConfigSource {
    /// 是否给出了任何来源
    pub fn is_given(&self) -> bool {
        self.config.is_some() || self.rivers.is_some()
    }

    /// 加载并验证配置
    pub fn load(&self) -> Result<BurnConfig> {
        let config = match (&self.config, &self.rivers, &self.catchments, &self.lakes) {
            (Some(path), ..) => BurnConfig::from_file(path)
                .with_context(|| format!("无法加载配置文件 {}", path.display()))?,
            (None, Some(r), Some(c), Some(l)) => BurnConfig::with_paths(r, c, l),
            _ => anyhow::bail!("需要 --config，或同时给出 --rivers --catchments --lakes"),
        };
        config.validate().context("配置无效")?;
        Ok(config)
    }
}
