// crates/rl_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `RlError` 枚举和 `RlResult` 类型别名。各业务层（`rl_geo`、
//! `rl_network`、`rl_io`、`rl_config`）定义自己的错误枚举，并全部可转换为
//! `RlError` 向上传播。
//!
//! # 错误分类
//!
//! - **模式错误**：缺少字段、单位无法换算、坐标系不一致
//! - **图完整性错误**：汇流图存在环、标识重复
//! - **拓扑不变量违例**：校正后的网络出现原网络不存在的上游连通
//!
//! # 示例
//!
//! ```
//! use rl_foundation::error::{RlError, RlResult};
//!
//! fn read_layer() -> RlResult<()> {
//!     Err(RlError::schema("rivers", "缺少字段 next_id"))
//! }
//! assert!(read_layer().is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type RlResult<T> = Result<T, RlError>;

/// RiverLake 错误类型
#[derive(Error, Debug)]
pub enum RlError {
    // ========================================================================
    // IO 相关错误
    // ========================================================================

    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },

    // ========================================================================
    // 输入数据错误
    // ========================================================================

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 图层模式错误（字段缺失、单位、标识集合不一致等）
    #[error("图层 {layer} 模式错误: {message}")]
    Schema {
        /// 图层名（rivers / catchments / lakes）
        layer: String,
        /// 具体错误信息
        message: String,
    },

    /// 坐标系错误
    #[error("坐标系错误: {0}")]
    Crs(String),

    /// 几何计算错误
    #[error("几何计算错误: {message}")]
    Geometry {
        /// 具体错误信息
        message: String,
    },

    // ========================================================================
    // 网络拓扑错误
    // ========================================================================

    /// 汇流图完整性错误（环、重复标识）
    #[error("汇流图完整性错误: {message}")]
    GraphIntegrity {
        /// 具体错误信息
        message: String,
    },

    /// 拓扑不变量违例
    #[error("拓扑检查失败: {message}")]
    TopologyViolation {
        /// 具体错误信息
        message: String,
    },

    // ========================================================================
    // 配置错误
    // ========================================================================

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    /// 验证失败
    #[error("验证失败: {0}")]
    Validation(String),

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl RlError {
    /// IO 错误
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// IO 错误（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 图层模式错误
    pub fn schema(layer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            layer: layer.into(),
            message: message.into(),
        }
    }

    /// 坐标系错误
    pub fn crs(message: impl Into<String>) -> Self {
        Self::Crs(message.into())
    }

    /// 几何计算错误
    pub fn geometry(message: impl Into<String>) -> Self {
        Self::Geometry {
            message: message.into(),
        }
    }

    /// 汇流图完整性错误
    pub fn graph_integrity(message: impl Into<String>) -> Self {
        Self::GraphIntegrity {
            message: message.into(),
        }
    }

    /// 拓扑不变量违例
    pub fn topology_violation(message: impl Into<String>) -> Self {
        Self::TopologyViolation {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 验证失败
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 是否属于输入数据问题（而非程序内部问题）
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::Schema { .. }
                | Self::Crs(_)
                | Self::GraphIntegrity { .. }
                | Self::TopologyViolation { .. }
        )
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for RlError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 测试
// ========================================================================
