// crates/rl_network/src/error.rs

//! 网络层错误类型
//!
//! 包含汇流图完整性、拓扑不变量和几何运算相关的错误。
//! 所有错误可转换为 `rl_foundation::RlError` 向上传播。
//!
//! # 错误分类
//!
//! - **图完整性错误**：环、重复标识、新增的悬空下游引用
//! - **拓扑不变量违例**：出口获得原网络中不存在的上游、子流域与河段标识集合不一致
//! - **几何错误**：来自几何层

use rl_foundation::RlError;
use rl_geo::GeoError;
use thiserror::Error;

use crate::types::ReachId;

/// 网络层结果类型
pub type NetworkResult<T> = Result<T, NetworkError>;

/// 错误信息中最多列出的标识数量
const MAX_LISTED_IDS: usize = 10;

/// 网络层错误
#[derive(Error, Debug)]
pub enum NetworkError {
    /// 汇流图存在环
    #[error("汇流图存在环，涉及 {} 个节点: {}", nodes.len(), format_ids(nodes))]
    Cycle {
        /// 环上（及被环阻塞）的节点，升序
        nodes: Vec<ReachId>,
    },

    /// 标识重复
    #[error("{layer} 中标识重复: {id}")]
    DuplicateId {
        /// 图层名
        layer: &'static str,
        /// 重复的标识
        id: ReachId,
    },

    /// 输入数组长度不一致
    #[error("{what} 长度不一致: 期望 {expected}, 实际 {actual}")]
    LengthMismatch {
        /// 数组说明
        what: &'static str,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 出口获得了原网络中不存在的上游
    #[error(
        "拓扑检查失败: 检查出口 {checked} 个, 违例 {violations} 个; 示例: 节点 {example} 多出上游 {}",
        format_ids(extra)
    )]
    TopologyViolation {
        /// 检查的出口数量
        checked: usize,
        /// 违例数量
        violations: usize,
        /// 示例节点
        example: ReachId,
        /// 示例节点多出的上游
        extra: Vec<ReachId>,
    },

    /// 子流域与河段标识集合不一致
    #[error(
        "子流域与河段标识集合不一致: 仅河段 {}, 仅子流域 {}",
        format_ids(only_rivers),
        format_ids(only_catchments)
    )]
    IdSetMismatch {
        /// 仅出现在河段中的标识
        only_rivers: Vec<ReachId>,
        /// 仅出现在子流域中的标识
        only_catchments: Vec<ReachId>,
    },

    /// 校正后新出现的悬空下游引用
    #[error("河段 {from} 的下游 {to} 不存在（校正前无此问题）")]
    DanglingReference {
        /// 引用方
        from: ReachId,
        /// 不存在的下游标识
        to: ReachId,
    },

    /// 几何层错误
    #[error("几何错误: {0}")]
    Geo(#[from] GeoError),
}

fn format_ids(ids: &[ReachId]) -> String {
    let shown: Vec<String> = ids.iter().take(MAX_LISTED_IDS).map(ToString::to_string).collect();
    if ids.len() > MAX_LISTED_IDS {
        format!("[{}, ...]", shown.join(", "))
    } else {
        format!("[{}]", shown.join(", "))
    }
}

// ============================================================================
// 转换实现
// ============================================================================

impl From<NetworkError> for RlError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::Geo(e) => e.into(),
            e @ (NetworkError::Cycle { .. }
            | NetworkError::DuplicateId { .. }
            | NetworkError::DanglingReference { .. }) => RlError::graph_integrity(e.to_string()),
            e @ (NetworkError::TopologyViolation { .. } | NetworkError::IdSetMismatch { .. }) => {
                RlError::topology_violation(e.to_string())
            }
            e @ NetworkError::LengthMismatch { .. } => RlError::internal(e.to_string()),
        }
    }
}
