// crates/rl_geo/src/engine.rs

//! 几何引擎
//!
//! 网络校正只依赖这里定义的少量多边形/折线原语：面积、长度、
//! 交集、差集、并集（溶解）、质心、外包框、相交谓词以及
//! 折线按多边形裁剪。[`PlanarEngine`] 在平面坐标上用 `geo` 实现这些原语。
//!
//! 面积和长度使用图层本身的坐标单位，比值计算不受单位影响。
//!
//! # 示例
//!
//! ```
//! use geo::{polygon, line_string, MultiLineString, MultiPolygon};
//! use rl_geo::engine::{GeometryEngine, PlanarEngine};
//!
//! let engine = PlanarEngine;
//! let square = MultiPolygon::new(vec![polygon![
//!     (x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0), (x: 0.0, y: 0.0),
//! ]]);
//! assert!((engine.area(&square) - 4.0).abs() < 1e-10);
//!
//! let river = MultiLineString::new(vec![line_string![(x: -1.0, y: 1.0), (x: 3.0, y: 1.0)]]);
//! let inside = engine.clip_line(&river, &square);
//! assert!((engine.length(&inside) - 2.0).abs() < 1e-9);
//! ```

use geo::{
    Area, BooleanOps, BoundingRect, Centroid, Coord, EuclideanLength, Intersects,
    MultiLineString, MultiPolygon,
};

use crate::error::{GeoError, GeoResult};
use crate::spatial_index::BoundingBox;

// ============================================================================
// 引擎 trait
// ============================================================================

/// 几何引擎抽象
///
/// 实现必须是纯函数：相同输入得到相同输出，不保留内部状态，
/// 这样校正阶段可以在 rayon 线程池中共享同一个引擎。
pub trait GeometryEngine: Send + Sync {
    /// 多边形面积（无符号）
    fn area(&self, polygon: &MultiPolygon<f64>) -> f64;

    /// 折线长度
    fn length(&self, line: &MultiLineString<f64>) -> f64;

    /// 多边形交集
    fn intersection(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64>;

    /// 多边形差集 `a - b`
    fn difference(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64>;

    /// 多边形并集
    fn union(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64>;

    /// 折线位于多边形内部的部分
    fn clip_line(&self, line: &MultiLineString<f64>, polygon: &MultiPolygon<f64>)
        -> MultiLineString<f64>;

    /// 折线位于多边形外部的部分
    fn erase_line(
        &self,
        line: &MultiLineString<f64>,
        polygon: &MultiPolygon<f64>,
    ) -> MultiLineString<f64>;

    /// 多边形质心，空几何返回 `None`
    fn centroid(&self, polygon: &MultiPolygon<f64>) -> Option<Coord<f64>>;

    /// 多边形外包框
    fn polygon_bounds(&self, polygon: &MultiPolygon<f64>) -> Option<BoundingBox>;

    /// 折线外包框
    fn line_bounds(&self, line: &MultiLineString<f64>) -> Option<BoundingBox>;

    /// 两个多边形是否相交（含边界接触）
    fn polygons_intersect(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool;

    /// 点是否位于多边形内部或边界上
    fn covers_point(&self, polygon: &MultiPolygon<f64>, point: Coord<f64>) -> bool;

    /// 溶解：多个多边形合并为一个
    fn dissolve(&self, parts: &[&MultiPolygon<f64>]) -> GeoResult<MultiPolygon<f64>> {
        let (first, rest) = parts
            .split_first()
            .ok_or_else(|| GeoError::empty_geometry("溶解"))?;
        Ok(rest
            .iter()
            .fold((*first).clone(), |acc, part| self.union(&acc, part)))
    }
}

// ============================================================================
// 平面实现
// ============================================================================

/// 平面几何引擎（笛卡尔坐标，基于 `geo` 布尔运算）
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarEngine;

impl GeometryEngine for PlanarEngine {
    #[inline]
    fn area(&self, polygon: &MultiPolygon<f64>) -> f64 {
        polygon.unsigned_area()
    }

    #[inline]
    fn length(&self, line: &MultiLineString<f64>) -> f64 {
        line.euclidean_length()
    }

    fn intersection(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        if a.0.is_empty() || b.0.is_empty() {
            return MultiPolygon::new(Vec::new());
        }
        a.intersection(b)
    }

    fn difference(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        if a.0.is_empty() || b.0.is_empty() {
            return a.clone();
        }
        a.difference(b)
    }

    fn union(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        match (a.0.is_empty(), b.0.is_empty()) {
            (true, _) => b.clone(),
            (_, true) => a.clone(),
            _ => a.union(b),
        }
    }

    fn clip_line(
        &self,
        line: &MultiLineString<f64>,
        polygon: &MultiPolygon<f64>,
    ) -> MultiLineString<f64> {
        if line.0.is_empty() || polygon.0.is_empty() {
            return MultiLineString::new(Vec::new());
        }
        polygon.clip(line, false)
    }

    fn erase_line(
        &self,
        line: &MultiLineString<f64>,
        polygon: &MultiPolygon<f64>,
    ) -> MultiLineString<f64> {
        if line.0.is_empty() || polygon.0.is_empty() {
            return line.clone();
        }
        polygon.clip(line, true)
    }

    fn centroid(&self, polygon: &MultiPolygon<f64>) -> Option<Coord<f64>> {
        polygon.centroid().map(|p| p.0)
    }

    fn polygon_bounds(&self, polygon: &MultiPolygon<f64>) -> Option<BoundingBox> {
        polygon.bounding_rect().map(BoundingBox::from_rect)
    }

    fn line_bounds(&self, line: &MultiLineString<f64>) -> Option<BoundingBox> {
        line.bounding_rect().map(BoundingBox::from_rect)
    }

    fn polygons_intersect(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
        a.0.iter().any(|pa| b.0.iter().any(|pb| pa.intersects(pb)))
    }

    fn covers_point(&self, polygon: &MultiPolygon<f64>, point: Coord<f64>) -> bool {
        polygon.0.iter().any(|p| p.intersects(&point))
    }
}

// ============================================================================
// 辅助函数
// ============================================================================

/// 折线的首点和末点
///
/// 多段折线取第一段的首点和最后一段的末点；没有坐标时返回 `None`。
pub fn line_endpoints(line: &MultiLineString<f64>) -> Option<(Coord<f64>, Coord<f64>)> {
    let first = line.0.iter().find_map(|ls| ls.0.first().copied())?;
    let last = line.0.iter().rev().find_map(|ls| ls.0.last().copied())?;
    Some((first, last))
}

/// 检查多边形所有坐标是否有限
pub fn ensure_finite_polygon(polygon: &MultiPolygon<f64>, context: &str) -> GeoResult<()> {
    let finite = polygon.0.iter().all(|p| {
        p.exterior().0.iter().all(coord_is_finite)
            && p.interiors().iter().all(|ring| ring.0.iter().all(coord_is_finite))
    });
    if finite {
        Ok(())
    } else {
        Err(GeoError::non_finite(context))
    }
}

/// 检查折线所有坐标是否有限
pub fn ensure_finite_line(line: &MultiLineString<f64>, context: &str) -> GeoResult<()> {
    if line.0.iter().all(|ls| ls.0.iter().all(coord_is_finite)) {
        Ok(())
    } else {
        Err(GeoError::non_finite(context))
    }
}

#[inline]
fn coord_is_finite(c: &Coord<f64>) -> bool {
    c.x.is_finite() && c.y.is_finite()
}

// ============================================================================
// 测试
// ============================================================================
