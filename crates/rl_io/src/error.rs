// crates/rl_io/src/error.rs

//! IO 错误类型定义
//!
//! 图层读写、字段映射和输入一致性检查的错误。
//! 这些错误都在核心算法运行之前抛出，最终可转换为 `RlError`。

use std::path::PathBuf;

use rl_config::ConfigError;
use rl_foundation::RlError;
use rl_geo::GeoError;
use rl_network::NetworkError;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 文件读写失败
    #[error("文件读写失败: {path}: {source}")]
    File {
        /// 文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// GeoJSON 解析或序列化失败
    #[error("GeoJSON 错误: {layer}: {message}")]
    GeoJson {
        /// 图层名
        layer: String,
        /// 错误信息
        message: String,
    },

    /// 缺少映射字段
    #[error("{layer} 第 {feature} 个要素缺少字段 '{field}'")]
    MissingField {
        /// 图层名
        layer: &'static str,
        /// 数据源中的列名
        field: String,
        /// 要素序号
        feature: usize,
    },

    /// 字段值类型不符
    #[error("{layer} 第 {feature} 个要素字段 '{field}' 的值 {value} 无效: {reason}")]
    InvalidField {
        /// 图层名
        layer: &'static str,
        /// 数据源中的列名
        field: String,
        /// 要素序号
        feature: usize,
        /// 原始值
        value: String,
        /// 原因
        reason: &'static str,
    },

    /// 几何类型不符
    #[error("{layer} 第 {feature} 个要素几何类型为 {kind}，期望 {expected}")]
    UnexpectedGeometry {
        /// 图层名
        layer: &'static str,
        /// 要素序号
        feature: usize,
        /// 实际类型
        kind: String,
        /// 期望类型
        expected: &'static str,
    },

    /// 河段与子流域标识不一致
    #[error(
        "河段与子流域标识不一致 (河段 {rivers} 个, 子流域 {catchments} 个): 仅河段 {only_rivers:?}, 仅子流域 {only_catchments:?}"
    )]
    IdMismatch {
        /// 河段数量
        rivers: usize,
        /// 子流域数量
        catchments: usize,
        /// 仅出现在河段中的标识（最多 10 个）
        only_rivers: Vec<i64>,
        /// 仅出现在子流域中的标识（最多 10 个）
        only_catchments: Vec<i64>,
    },

    /// 几何层错误
    #[error("几何错误: {0}")]
    Geo(#[from] GeoError),

    /// 网络层错误
    #[error("网络错误: {0}")]
    Network(#[from] NetworkError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

impl IoError {
    /// 文件读写错误
    #[inline]
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// GeoJSON 错误
    #[inline]
    pub fn geojson(layer: impl Into<String>, message: impl ToString) -> Self {
        Self::GeoJson {
            layer: layer.into(),
            message: message.to_string(),
        }
    }

    /// 出错的图层名（字段级错误）
    pub fn layer(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { layer, .. }
            | Self::InvalidField { layer, .. }
            | Self::UnexpectedGeometry { layer, .. } => Some(*layer),
            _ => None,
        }
    }
}

impl From<IoError> for RlError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::File { path, source } => {
                if source.kind() == std::io::ErrorKind::NotFound {
                    RlError::file_not_found(path)
                } else {
                    RlError::io_with_source(format!("读写 {} 失败", path.display()), source)
                }
            }
            IoError::GeoJson { layer, message } => RlError::schema(layer, message),
            e @ (IoError::MissingField { .. }
            | IoError::InvalidField { .. }
            | IoError::UnexpectedGeometry { .. }) => {
                RlError::schema(e.layer().unwrap_or("input"), e.to_string())
            }
            e @ IoError::IdMismatch { .. } => RlError::schema("rivers/catchments", e.to_string()),
            IoError::Geo(e) => e.into(),
            IoError::Network(e) => e.into(),
            IoError::Config(e) => e.into(),
        }
    }
}
