// crates/rl_network/src/types.rs

//! 网络数据模型
//!
//! 河段（[`Segment`]）、子流域（[`Catchment`]）和湖泊（[`Lake`]）三张表的行类型，
//! 以及下游指针的规范化表示 [`Downstream`]。
//!
//! 下游指针在摄入边界统一转换：
//!
//! | 原始值 | 规范值 |
//! |---|---|
//! | `-9999`、`0` 或任意非正整数 | `Terminal` |
//! | 缺失 / null | `Absent` |
//! | 正整数 `id` | `To(id)` |
//!
//! 图算法把 `Terminal`、`Absent` 和指向不存在标识的 `To` 一律视为无下游，
//! 但不会修改存储的值。

use geo::{MultiLineString, MultiPolygon};
use serde::Serialize;

/// 河段 / 子流域标识
pub type ReachId = i64;

/// 输出时 `Terminal` 写回的哨兵值
pub const TERMINAL_SENTINEL: ReachId = -9999;

// ============================================================================
// 下游指针
// ============================================================================

/// 规范化的下游指针
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Downstream {
    /// 明确的终点（哨兵值）
    #[default]
    Terminal,
    /// 未给出下游
    Absent,
    /// 指向另一个河段
    To(ReachId),
}

impl Downstream {
    /// 从原始整数值解析
    #[inline]
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            None => Self::Absent,
            Some(v) if v <= 0 => Self::Terminal,
            Some(v) => Self::To(v),
        }
    }

    /// 写回原始整数值
    #[inline]
    pub fn to_raw(self) -> Option<i64> {
        match self {
            Self::Terminal => Some(TERMINAL_SENTINEL),
            Self::Absent => None,
            Self::To(id) => Some(id),
        }
    }

    /// 指向的标识（若有）
    #[inline]
    pub fn target(self) -> Option<ReachId> {
        match self {
            Self::To(id) => Some(id),
            Self::Terminal | Self::Absent => None,
        }
    }
}

// ============================================================================
// 河段
// ============================================================================

/// 河段几何
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentGeometry {
    /// 河道折线
    Channel(MultiLineString<f64>),
    /// 湖泊节点使用湖泊多边形
    Water(MultiPolygon<f64>),
}

/// 河段表中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// 标识
    pub id: ReachId,
    /// 下游指针
    pub next: Downstream,
    /// 河长
    pub length: f64,
    /// 本段面积（累积种子）
    pub unit_area: f64,
    /// 上游汇水面积；输入时为数据源的值，输出时为重新累积的值
    pub uparea: f64,
    /// 是否为湖泊节点
    pub is_lake: bool,
    /// 湖泊节点对应的湖泊标识，或最后一次改写该河段的湖泊标识
    pub lake_ref: Option<i64>,
    /// 流入湖泊
    pub inflow: bool,
    /// 湖泊出流河段
    pub outflow: bool,
    /// 同时为入流和出流
    pub inoutflow: bool,
    /// 河长保留比例（1 未受影响，0 完全淹没）
    pub length_ratio: f64,
    /// 直接上游（派生）
    pub upstream: Vec<ReachId>,
    /// 直接上游数量（派生）
    pub maxup: usize,
    /// 几何，完全淹没时为 `None`
    pub geometry: Option<SegmentGeometry>,
}

impl Segment {
    /// 创建普通河段，派生字段取默认值
    pub fn new(id: ReachId, next: Downstream, length: f64) -> Self {
        Self {
            id,
            next,
            length,
            unit_area: 0.0,
            uparea: 0.0,
            is_lake: false,
            lake_ref: None,
            inflow: false,
            outflow: false,
            inoutflow: false,
            length_ratio: 1.0,
            upstream: Vec::new(),
            maxup: 0,
            geometry: None,
        }
    }

    /// 设置本段面积
    #[must_use]
    pub fn with_unit_area(mut self, unit_area: f64) -> Self {
        self.unit_area = unit_area;
        self
    }

    /// 设置输入上游面积
    #[must_use]
    pub fn with_uparea(mut self, uparea: f64) -> Self {
        self.uparea = uparea;
        self
    }

    /// 设置河道折线
    #[must_use]
    pub fn with_channel(mut self, line: MultiLineString<f64>) -> Self {
        self.geometry = Some(SegmentGeometry::Channel(line));
        self
    }

    /// 河道折线（湖泊节点和无几何河段返回 `None`）
    pub fn channel(&self) -> Option<&MultiLineString<f64>> {
        match &self.geometry {
            Some(SegmentGeometry::Channel(line)) if !line.0.is_empty() => Some(line),
            _ => None,
        }
    }
}

// ============================================================================
// 子流域
// ============================================================================

/// 子流域表中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct Catchment {
    /// 标识（与河段同域）
    pub id: ReachId,
    /// 面积
    pub unit_area: f64,
    /// 面积保留比例（1 未受影响，0 完全被湖泊覆盖）
    pub area_ratio: f64,
    /// 是否为湖泊节点
    pub is_lake: bool,
    /// 湖泊节点对应的湖泊标识
    pub lake_ref: Option<i64>,
    /// 多边形，完全覆盖时为 `None`
    pub geometry: Option<MultiPolygon<f64>>,
}

impl Catchment {
    /// 创建子流域
    pub fn new(id: ReachId, unit_area: f64, geometry: Option<MultiPolygon<f64>>) -> Self {
        Self {
            id,
            unit_area,
            area_ratio: 1.0,
            is_lake: false,
            lake_ref: None,
            geometry,
        }
    }
}

// ============================================================================
// 湖泊
// ============================================================================

/// 湖泊表中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct Lake {
    /// 湖泊标识（调用方的标识域）
    pub lake_id: i64,
    /// 湖泊面积（已换算为子流域单位）
    pub unit_area: f64,
    /// 是否为外流湖
    pub exorheic: bool,
    /// 湖泊多边形
    pub geometry: MultiPolygon<f64>,
}

impl Lake {
    /// 创建湖泊
    pub fn new(lake_id: i64, unit_area: f64, exorheic: bool, geometry: MultiPolygon<f64>) -> Self {
        Self {
            lake_id,
            unit_area,
            exorheic,
            geometry,
        }
    }
}

/// 嵌入网络后的湖泊节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LakeNode {
    /// 湖泊标识
    pub lake_id: i64,
    /// 分配的节点标识
    pub node_id: ReachId,
    /// 是否为外流湖
    pub exorheic: bool,
    /// 入流河段（升序）
    pub inflows: Vec<ReachId>,
    /// 出流河段
    pub outlet: Option<ReachId>,
}

impl LakeNode {
    /// 是否为孤立节点（没有任何河段相交）
    pub fn is_isolated(&self) -> bool {
        self.inflows.is_empty() && self.outlet.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downstream_from_raw() {
        assert_eq!(Downstream::from_raw(Some(-9999)), Downstream::Terminal);
        assert_eq!(Downstream::from_raw(Some(0)), Downstream::Terminal);
        assert_eq!(Downstream::from_raw(None), Downstream::Absent);
        assert_eq!(Downstream::from_raw(Some(42)), Downstream::To(42));
    }

    #[test]
    fn test_downstream_to_raw_keeps_tag() {
        assert_eq!(Downstream::Terminal.to_raw(), Some(TERMINAL_SENTINEL));
        assert_eq!(Downstream::Absent.to_raw(), None);
        assert_eq!(Downstream::To(7).to_raw(), Some(7));
        assert_eq!(Downstream::To(7).target(), Some(7));
        assert_eq!(Downstream::Absent.target(), None);
    }

    #[test]
    fn test_segment_channel() {
        let seg = Segment::new(1, Downstream::Terminal, 1.0);
        assert!(seg.channel().is_none());
        let seg = seg.with_channel(MultiLineString::new(Vec::new()));
        assert!(seg.channel().is_none());
    }
}
