// crates/rl_geo/src/spatial_index.rs

//! 空间索引实现
//!
//! 基于 R-tree 的包络索引，用于湖泊与子流域、河段之间的候选配对。
//! 包络相交只是粗筛，精确谓词由 [`GeometryEngine`](crate::engine::GeometryEngine) 判定。
//!
//! # 示例
//!
//! ```
//! use rl_geo::spatial_index::{BoundingBox, EnvelopeIndex};
//!
//! let index = EnvelopeIndex::bulk_load(vec![
//!     (BoundingBox::new(0.0, 0.0, 1.0, 1.0), 10_i64),
//!     (BoundingBox::new(5.0, 5.0, 6.0, 6.0), 20_i64),
//! ]);
//!
//! let hits = index.query_intersecting(&BoundingBox::new(0.5, 0.5, 2.0, 2.0));
//! assert_eq!(hits, vec![&10]);
//! ```

use geo::{Coord, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

/// 边界框
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// 最小 x
    pub min_x: f64,
    /// 最小 y
    pub min_y: f64,
    /// 最大 x
    pub max_x: f64,
    /// 最大 y
    pub max_y: f64,
}

impl BoundingBox {
    /// 创建新的边界框
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// 从 geo 矩形创建
    #[must_use]
    pub fn from_rect(rect: Rect<f64>) -> Self {
        let (min, max) = (rect.min(), rect.max());
        Self::new(min.x, min.y, max.x, max.y)
    }

    /// 检查点是否在边界框内（含边界）
    #[must_use]
    pub fn contains_point(&self, point: Coord<f64>) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// 检查两个边界框是否相交
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// 合并两个边界框
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// 合并一组边界框，空输入返回 `None`
    pub fn merge_all<I>(boxes: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        boxes.into_iter().reduce(|acc, b| acc.merge(&b))
    }

    /// 四周各扩展 `amount`
    #[must_use]
    pub fn expand(&self, amount: f64) -> Self {
        Self {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    #[inline]
    fn to_aabb(self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

// ============================================================================
// R-tree 包装
// ============================================================================

type Entry<T> = GeomWithData<Rectangle<[f64; 2]>, T>;

/// 包络索引
///
/// 每个条目是一个边界框加一个载荷（通常是行号或要素标识）。
pub struct EnvelopeIndex<T> {
    tree: RTree<Entry<T>>,
}

impl<T> EnvelopeIndex<T> {
    /// 批量构建
    #[must_use]
    pub fn bulk_load(items: Vec<(BoundingBox, T)>) -> Self {
        let entries: Vec<Entry<T>> = items
            .into_iter()
            .map(|(bbox, data)| {
                GeomWithData::new(
                    Rectangle::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y]),
                    data,
                )
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// 返回包络与 `bbox` 相交的全部载荷
    ///
    /// 结果顺序由树结构决定，需要确定顺序的调用方自行排序。
    #[must_use]
    pub fn query_intersecting(&self, bbox: &BoundingBox) -> Vec<&T> {
        self.tree
            .locate_in_envelope_intersecting(&bbox.to_aabb())
            .map(|entry| &entry.data)
            .collect()
    }

    /// 返回索引中的条目数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// 检查索引是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl<T: Copy + Ord> EnvelopeIndex<T> {
    /// 包络相交查询，结果升序去重
    #[must_use]
    pub fn query_sorted(&self, bbox: &BoundingBox) -> Vec<T> {
        let mut hits: Vec<T> = self.query_intersecting(bbox).into_iter().copied().collect();
        hits.sort_unstable();
        hits.dedup();
        hits
    }
}

// ============================================================================
// 测试
// ============================================================================
