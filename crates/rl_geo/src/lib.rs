// crates/rl_geo/src/lib.rs

//! RiverLake 几何处理模块
//!
//! 为网络校正提供几何原语、空间索引和坐标系比较。
//!
//! # 模块
//!
//! - `engine`: 几何引擎 trait 及基于 `geo` 的平面实现
//! - `spatial_index`: 基于 R-tree 的包络索引
//! - `crs`: 图层坐标系名称归一化与一致性检查
//! - `error`: 几何层错误
//!
//! # 示例
//!
//! ```
//! use rl_geo::prelude::*;
//!
//! let engine = PlanarEngine;
//! let crs = LayerCrs::parse_or_default(None);
//! assert!(crs.is_wgs84());
//! # let _ = engine;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod crs;
pub mod engine;
pub mod error;
pub mod spatial_index;

/// 预导入模块
pub mod prelude {
    pub use crate::crs::LayerCrs;
    pub use crate::engine::{GeometryEngine, PlanarEngine};
    pub use crate::error::{GeoError, GeoResult};
    pub use crate::spatial_index::{BoundingBox, EnvelopeIndex};
}

// 重导出常用类型
pub use crs::LayerCrs;
pub use engine::{line_endpoints, GeometryEngine, PlanarEngine};
pub use error::{GeoError, GeoResult};
pub use spatial_index::{BoundingBox, EnvelopeIndex};

// 几何类型统一使用 geo 的定义
pub use geo::{Coord, MultiLineString, MultiPolygon};
