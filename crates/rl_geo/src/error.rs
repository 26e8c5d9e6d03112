// crates/rl_geo/src/error.rs

//! 几何层错误类型
//!
//! 包含几何运算、空间索引和坐标系相关的错误。
//! 所有错误可转换为 `rl_foundation::RlError` 向上传播。
//!
//! # 错误分类
//!
//! - **输入错误**：坐标非有限值、几何为空
//! - **坐标系错误**：图层之间坐标系不一致
//! - **计算错误**：布尔运算结果无效

use rl_foundation::RlError;
use thiserror::Error;

/// Geo 模块结果类型
pub type GeoResult<T> = Result<T, GeoError>;

/// 几何层错误
#[derive(Error, Debug)]
pub enum GeoError {
    /// 坐标包含 NaN 或无穷大
    #[error("几何包含非有限坐标: {context}")]
    NonFiniteCoordinate {
        /// 出错的要素描述
        context: String,
    },

    /// 运算需要非空几何
    #[error("{operation} 需要非空几何")]
    EmptyGeometry {
        /// 运算名称
        operation: &'static str,
    },

    /// 几何计算失败
    #[error("{operation} 计算失败: {message}")]
    ComputationFailed {
        /// 运算名称（如"溶解"、"差集"）
        operation: &'static str,
        /// 失败原因
        message: String,
    },

    /// 坐标系不一致
    #[error("坐标系不一致: {left_layer}={left} 与 {right_layer}={right}")]
    CrsMismatch {
        /// 左侧图层名
        left_layer: String,
        /// 左侧坐标系
        left: String,
        /// 右侧图层名
        right_layer: String,
        /// 右侧坐标系
        right: String,
    },

    /// 基础层错误
    #[error("基础层错误: {0}")]
    Foundation(#[from] RlError),
}

// ============================================================================
// 转换实现
// ============================================================================

impl From<GeoError> for RlError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::NonFiniteCoordinate { context } => {
                RlError::geometry(format!("几何包含非有限坐标: {context}"))
            }
            GeoError::EmptyGeometry { operation } => {
                RlError::geometry(format!("{operation} 需要非空几何"))
            }
            GeoError::ComputationFailed { operation, message } => {
                RlError::geometry(format!("{operation} 计算失败: {message}"))
            }
            GeoError::CrsMismatch {
                left_layer,
                left,
                right_layer,
                right,
            } => RlError::crs(format!(
                "{left_layer} 使用 {left}，{right_layer} 使用 {right}"
            )),
            GeoError::Foundation(err) => err,
        }
    }
}

// ============================================================================
// 便捷构造函数
// ============================================================================

impl GeoError {
    /// 创建非有限坐标错误
    #[inline]
    pub fn non_finite(context: impl Into<String>) -> Self {
        Self::NonFiniteCoordinate {
            context: context.into(),
        }
    }

    /// 创建空几何错误
    #[inline]
    pub fn empty_geometry(operation: &'static str) -> Self {
        Self::EmptyGeometry { operation }
    }

    /// 创建几何计算失败错误
    #[inline]
    pub fn computation_failed(operation: &'static str, message: impl Into<String>) -> Self {
        Self::ComputationFailed {
            operation,
            message: message.into(),
        }
    }

    /// 创建坐标系不一致错误
    pub fn crs_mismatch(
        left_layer: impl Into<String>,
        left: impl Into<String>,
        right_layer: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::CrsMismatch {
            left_layer: left_layer.into(),
            left: left.into(),
            right_layer: right_layer.into(),
            right: right.into(),
        }
    }
}
