// crates/rl_network/src/resolvable.rs

//! 可解析湖泊过滤
//!
//! 只有改变网络拓扑的湖泊才会嵌入网络。依次执行三个阶段，
//! 每个阶段只缩小候选集：
//!
//! 1. **空间子集**：质心位于全部子流域外包框（外扩 `margin`）内，
//!    且至少与一个子流域相交
//! 2. **剔除单流域湖泊**：与湖泊有正面积交集的子流域恰好一个时剔除
//! 3. **河段端点接触**：至少一个河段的首点或末点落在湖泊内或边界上
//!
//! 输出保持输入顺序，且 `lake_id` 唯一。

use std::collections::BTreeSet;

use log::{debug, info};
use rl_geo::spatial_index::{BoundingBox, EnvelopeIndex};
use rl_geo::{line_endpoints, GeometryEngine};
use serde::Serialize;

use crate::types::{Catchment, Lake, Segment};

/// 各阶段保留的湖泊数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    /// 输入湖泊数
    pub input: usize,
    /// 空间子集后
    pub spatial_subset: usize,
    /// 剔除单流域湖泊后
    pub multi_catchment: usize,
    /// 端点接触后（最终结果）
    pub endpoint_contact: usize,
}

/// 过滤结果
#[derive(Debug, Clone, Default)]
pub struct ResolvableLakes {
    /// 可解析湖泊（输入顺序）
    pub lakes: Vec<Lake>,
    /// 阶段统计
    pub stats: FilterStats,
}

/// 子流域几何及其包络索引
struct CatchmentIndex<'a> {
    polygons: Vec<&'a geo::MultiPolygon<f64>>,
    index: EnvelopeIndex<usize>,
    extent: Option<BoundingBox>,
}

impl<'a> CatchmentIndex<'a> {
    fn build<E: GeometryEngine + ?Sized>(engine: &E, catchments: &'a [Catchment]) -> Self {
        let mut polygons = Vec::new();
        let mut boxes = Vec::new();
        for polygon in catchments.iter().filter_map(|c| c.geometry.as_ref()) {
            if let Some(bbox) = engine.polygon_bounds(polygon) {
                boxes.push((bbox, polygons.len()));
                polygons.push(polygon);
            }
        }
        let extent = BoundingBox::merge_all(boxes.iter().map(|(b, _)| *b));
        Self {
            polygons,
            index: EnvelopeIndex::bulk_load(boxes),
            extent,
        }
    }

    fn candidates(&self, bbox: &BoundingBox) -> Vec<&'a geo::MultiPolygon<f64>> {
        self.index
            .query_sorted(bbox)
            .into_iter()
            .map(|i| self.polygons[i])
            .collect()
    }
}

/// 筛选可解析湖泊
pub fn filter_resolvable_lakes<E: GeometryEngine + ?Sized>(
    engine: &E,
    catchments: &[Catchment],
    rivers: &[Segment],
    lakes: &[Lake],
    margin: f64,
) -> ResolvableLakes {
    let mut stats = FilterStats {
        input: lakes.len(),
        ..FilterStats::default()
    };

    let catchment_index = CatchmentIndex::build(engine, catchments);

    // 阶段 1：空间子集
    let Some(extent) = catchment_index.extent.map(|b| b.expand(margin)) else {
        info!("子流域图层没有有效几何，全部湖泊被剔除");
        return ResolvableLakes {
            lakes: Vec::new(),
            stats,
        };
    };

    let mut seen = BTreeSet::new();
    let subset: Vec<&Lake> = lakes
        .iter()
        .filter(|lake| seen.insert(lake.lake_id))
        .filter(|lake| {
            let inside = engine
                .centroid(&lake.geometry)
                .is_some_and(|c| extent.contains_point(c));
            inside && touches_any_catchment(engine, &catchment_index, lake)
        })
        .collect();
    stats.spatial_subset = subset.len();

    // 阶段 2：剔除单流域湖泊
    let multi: Vec<&Lake> = subset
        .into_iter()
        .filter(|lake| {
            let count = overlapping_catchments(engine, &catchment_index, lake);
            if count == 1 {
                debug!("湖泊 {} 只位于一个子流域内，剔除", lake.lake_id);
            }
            count != 1
        })
        .collect();
    stats.multi_catchment = multi.len();

    // 阶段 3：河段端点接触
    let endpoints: Vec<geo::Coord<f64>> = rivers
        .iter()
        .filter_map(Segment::channel)
        .filter_map(line_endpoints)
        .flat_map(|(first, last)| [first, last])
        .collect();
    let endpoint_index = EnvelopeIndex::bulk_load(
        endpoints
            .iter()
            .enumerate()
            .map(|(i, c)| (BoundingBox::new(c.x, c.y, c.x, c.y), i))
            .collect(),
    );

    let resolvable: Vec<Lake> = multi
        .into_iter()
        .filter(|lake| {
            let Some(bbox) = engine.polygon_bounds(&lake.geometry) else {
                return false;
            };
            endpoint_index
                .query_sorted(&bbox)
                .into_iter()
                .any(|i| engine.covers_point(&lake.geometry, endpoints[i]))
        })
        .cloned()
        .collect();
    stats.endpoint_contact = resolvable.len();

    info!(
        "可解析湖泊过滤: 输入 {} -> 空间子集 {} -> 多流域 {} -> 端点接触 {}",
        stats.input, stats.spatial_subset, stats.multi_catchment, stats.endpoint_contact
    );

    ResolvableLakes {
        lakes: resolvable,
        stats,
    }
}

fn touches_any_catchment<E: GeometryEngine + ?Sized>(
    engine: &E,
    catchments: &CatchmentIndex<'_>,
    lake: &Lake,
) -> bool {
    engine.polygon_bounds(&lake.geometry).is_some_and(|bbox| {
        catchments
            .candidates(&bbox)
            .into_iter()
            .any(|polygon| engine.polygons_intersect(polygon, &lake.geometry))
    })
}

/// 与湖泊有正面积交集的子流域数量
fn overlapping_catchments<E: GeometryEngine + ?Sized>(
    engine: &E,
    catchments: &CatchmentIndex<'_>,
    lake: &Lake,
) -> usize {
    let Some(bbox) = engine.polygon_bounds(&lake.geometry) else {
        return 0;
    };
    catchments
        .candidates(&bbox)
        .into_iter()
        .filter(|polygon| engine.area(&engine.intersection(polygon, &lake.geometry)) > 0.0)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Downstream;
    use geo::{line_string, polygon, MultiLineString, MultiPolygon};
    use rl_geo::PlanarEngine;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
            (x: x0, y: y0),
        ]])
    }

    fn river(id: i64, from: (f64, f64), to: (f64, f64)) -> Segment {
        Segment::new(id, Downstream::Terminal, 1.0).with_channel(MultiLineString::new(vec![
            line_string![(x: from.0, y: from.1), (x: to.0, y: to.1)],
        ]))
    }

    /// 两个并排子流域 [0,1]x[0,1] 与 [1,2]x[0,1]
    fn catchments() -> Vec<Catchment> {
        vec![
            Catchment::new(1, 1.0, Some(rect(0.0, 0.0, 1.0, 1.0))),
            Catchment::new(2, 1.0, Some(rect(1.0, 0.0, 2.0, 1.0))),
        ]
    }

    #[test]
    fn test_lake_across_boundary_with_endpoint_kept() {
        let lakes = vec![Lake::new(100, 0.1, true, rect(0.8, 0.4, 1.2, 0.6))];
        let rivers = vec![river(1, (0.1, 0.5), (1.0, 0.5)), river(2, (1.0, 0.5), (1.9, 0.5))];
        let result = filter_resolvable_lakes(&PlanarEngine, &catchments(), &rivers, &lakes, 2.0);
        assert_eq!(result.lakes.len(), 1);
        assert_eq!(result.stats.endpoint_contact, 1);
    }

    #[test]
    fn test_single_catchment_lake_rejected() {
        let lakes = vec![Lake::new(100, 0.1, false, rect(0.2, 0.2, 0.4, 0.4))];
        let rivers = vec![river(1, (0.3, 0.3), (0.9, 0.9))];
        let result = filter_resolvable_lakes(&PlanarEngine, &catchments(), &rivers, &lakes, 2.0);
        assert!(result.lakes.is_empty());
        assert_eq!(result.stats.spatial_subset, 1);
        assert_eq!(result.stats.multi_catchment, 0);
    }

    #[test]
    fn test_mid_river_crossing_rejected() {
        // 河段从湖泊中间穿过，首末点都在湖泊外
        let lakes = vec![Lake::new(100, 0.1, false, rect(0.8, 0.4, 1.2, 0.6))];
        let rivers = vec![river(1, (0.1, 0.5), (1.9, 0.5))];
        let result = filter_resolvable_lakes(&PlanarEngine, &catchments(), &rivers, &lakes, 2.0);
        assert!(result.lakes.is_empty());
        assert_eq!(result.stats.multi_catchment, 1);
    }

    #[test]
    fn test_far_lake_and_duplicates() {
        let lakes = vec![
            Lake::new(7, 0.1, false, rect(0.8, 0.4, 1.2, 0.6)),
            Lake::new(7, 0.1, false, rect(0.8, 0.4, 1.2, 0.6)),
            Lake::new(8, 0.1, false, rect(50.0, 50.0, 51.0, 51.0)),
        ];
        let rivers = vec![river(1, (0.1, 0.5), (1.0, 0.5)), river(2, (1.0, 0.5), (1.9, 0.5))];
        let result = filter_resolvable_lakes(&PlanarEngine, &catchments(), &rivers, &lakes, 2.0);
        let ids: Vec<i64> = result.lakes.iter().map(|l| l.lake_id).collect();
        assert_eq!(ids, vec![7]);
        assert_eq!(result.stats.input, 3);
        assert_eq!(result.stats.spatial_subset, 1);
    }

    #[test]
    fn test_null_river_geometry_skipped() {
        let lakes = vec![Lake::new(100, 0.1, false, rect(0.8, 0.4, 1.2, 0.6))];
        let rivers = vec![
            Segment::new(1, Downstream::Terminal, 0.0),
            river(2, (1.0, 0.5), (1.9, 0.5)),
        ];
        let result = filter_resolvable_lakes(&PlanarEngine, &catchments(), &rivers, &lakes, 2.0);
        assert_eq!(result.lakes.len(), 1);
    }

    #[test]
    fn test_no_lakes() {
        let result = filter_resolvable_lakes(&PlanarEngine, &catchments(), &[], &[], 2.0);
        assert!(result.lakes.is_empty());
        assert_eq!(result.stats, FilterStats::default());
    }
}
