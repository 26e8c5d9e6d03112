// crates/rl_io/src/lib.rs

//! RiverLake IO 模块
//!
//! 负责网络校正前后的数据进出。
//!
//! # 模块
//!
//! - [`layer`]: GeoJSON 图层读写与坐标系成员
//! - [`schema`]: 字段类型转换、`exorheic` 解析、几何类型检查
//! - [`ingest`]: 字段映射、单位换算、标识一致性与面积传递
//! - [`corrections`]: 数据集湖泊合并/删除
//! - [`export`]: 校正结果图层
//! - [`batch`]: 完整批处理
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use rl_config::BurnConfig;
//! use rl_geo::PlanarEngine;
//! use rl_io::batch::run_batch;
//!
//! let config = BurnConfig::from_file("burn.json")?;
//! let summary = run_batch(&PlanarEngine, &config)?;
//! println!("{} 个湖泊节点", summary.lake_nodes);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod corrections;
pub mod error;
pub mod export;
pub mod ingest;
pub mod layer;
pub mod schema;

// 重导出常用类型
pub use batch::{prepare_inputs, run_batch, BatchSummary};
pub use corrections::{apply_lake_corrections, CorrectionStats};
pub use error::{IoError, IoResult};
pub use export::{write_outputs, OutputPaths};
pub use ingest::{ingest, load_inputs, Attributes, Inputs};
pub use layer::{FeatureLayer, FeatureRecord};
