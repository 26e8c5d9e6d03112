// crates/rl_config/src/lib.rs

//! RiverLake Config Layer
//!
//! 配置层，描述一次湖泊嵌入批处理所需的全部参数。
//!
//! # 模块概览
//!
//! - [`burn_config`]: BurnConfig 图层、过滤参数、输出、湖泊修正
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! rl_cli      ─> BurnConfig
//! rl_io       ─> 字段映射、面积单位、湖泊修正
//! rl_config   ─> BurnConfig (本层)
//! rl_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod burn_config;
pub mod error;

// 重导出核心类型
pub use burn_config::{
    BurnConfig, CatchmentFields, CatchmentLayerConfig, LakeCorrectionConfig, LakeFields,
    LakeLayerConfig, MergeGroup, OutputConfig, RiverFields, RiverLayerConfig,
};
pub use error::ConfigError;
