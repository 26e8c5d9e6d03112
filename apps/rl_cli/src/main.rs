// apps/rl_cli/src/main.rs

//! RiverLake 命令行界面
//!
//! 读取河段、子流域和湖泊三个 GeoJSON 图层，把可解析湖泊嵌入河网，
//! 写出校正后的图层。库代码通过 `log` 输出日志，这里统一接入
//! `tracing-subscriber`。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

/// RiverLake 河网湖泊拓扑校正工具
#[derive(Parser)]
#[command(name = "riverlake")]
#[command(author = "RiverLake Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Burn lakes into a river network and correct its topology", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行湖泊嵌入
    Run(commands::run::RunArgs),
    /// 显示配置与图层信息
    Info(commands::info::InfoArgs),
    /// 验证配置和输入图层
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // try_init 同时安装 log -> tracing 桥接
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish()
        .try_init()?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
