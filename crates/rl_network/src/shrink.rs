// crates/rl_network/src/shrink.rs

//! 几何收缩校正
//!
//! 计算湖泊覆盖后每个子流域的剩余面积比例和每个河段的剩余长度比例。
//! 两张表互不依赖，用 `rayon::join` 并行计算；表内各行用 `par_iter`
//! 并行，收集结果保持输入顺序。
//!
//! - 子流域：`剩余 = 子流域 - ∪湖泊`，`比例 = 面积(剩余) / 面积(原始)`
//! - 河段：`淹没长度 = Σ 长度(河段 ∩ 湖泊)`，
//!   `比例 = clamp(1 - 淹没长度 / 几何长度, 0, 1)`

use geo::{MultiLineString, MultiPolygon};
use rayon::prelude::*;
use rl_geo::spatial_index::EnvelopeIndex;
use rl_geo::GeometryEngine;

use crate::types::{Catchment, Lake, Segment};

/// 比例吸附到 0 或 1 的容差
pub const RATIO_EPS: f64 = 1e-9;

/// 子流域校正结果
#[derive(Debug, Clone, PartialEq)]
pub struct CatchmentShrink {
    /// 面积保留比例
    pub ratio: f64,
    /// 剩余几何（仅 0 < ratio < 1 时有值）
    pub remaining: Option<MultiPolygon<f64>>,
}

impl CatchmentShrink {
    fn untouched() -> Self {
        Self {
            ratio: 1.0,
            remaining: None,
        }
    }
}

/// 河段校正结果
#[derive(Debug, Clone, PartialEq)]
pub struct RiverShrink {
    /// 长度保留比例
    pub ratio: f64,
    /// 剩余折线（仅 0 < ratio < 1 时有值）
    pub remaining: Option<MultiLineString<f64>>,
}

impl RiverShrink {
    fn untouched() -> Self {
        Self {
            ratio: 1.0,
            remaining: None,
        }
    }
}

/// 把接近 0 或 1 的比例吸附到端点，并限制在 [0, 1]
#[inline]
pub fn snap_ratio(ratio: f64) -> f64 {
    if !ratio.is_finite() {
        return 1.0;
    }
    let r = ratio.clamp(0.0, 1.0);
    if r <= RATIO_EPS {
        0.0
    } else if r >= 1.0 - RATIO_EPS {
        1.0
    } else {
        r
    }
}

/// 湖泊包络索引
pub(crate) fn lake_index<E: GeometryEngine + ?Sized>(
    engine: &E,
    lakes: &[Lake],
) -> EnvelopeIndex<usize> {
    EnvelopeIndex::bulk_load(
        lakes
            .iter()
            .enumerate()
            .filter_map(|(i, lake)| engine.polygon_bounds(&lake.geometry).map(|b| (b, i)))
            .collect(),
    )
}

/// 子流域面积校正
pub fn catchment_corrections<E: GeometryEngine + ?Sized>(
    engine: &E,
    catchments: &[Catchment],
    lakes: &[Lake],
) -> Vec<CatchmentShrink> {
    let index = lake_index(engine, lakes);
    catchments
        .par_iter()
        .map(|catchment| shrink_catchment(engine, catchment, lakes, &index))
        .collect()
}

fn shrink_catchment<E: GeometryEngine + ?Sized>(
    engine: &E,
    catchment: &Catchment,
    lakes: &[Lake],
    index: &EnvelopeIndex<usize>,
) -> CatchmentShrink {
    let Some(polygon) = catchment.geometry.as_ref() else {
        return CatchmentShrink::untouched();
    };
    let Some(bbox) = engine.polygon_bounds(polygon) else {
        return CatchmentShrink::untouched();
    };
    let hits: Vec<usize> = index
        .query_sorted(&bbox)
        .into_iter()
        .filter(|&i| engine.polygons_intersect(polygon, &lakes[i].geometry))
        .collect();
    if hits.is_empty() {
        return CatchmentShrink::untouched();
    }

    let original_area = engine.area(polygon);
    if original_area <= 0.0 {
        return CatchmentShrink::untouched();
    }

    let remaining = hits.iter().fold(polygon.clone(), |acc, &i| {
        engine.difference(&acc, &lakes[i].geometry)
    });
    let ratio = snap_ratio(engine.area(&remaining) / original_area);

    CatchmentShrink {
        ratio,
        remaining: (ratio > 0.0 && ratio < 1.0).then_some(remaining),
    }
}

/// 河段长度校正
pub fn river_corrections<E: GeometryEngine + ?Sized>(
    engine: &E,
    rivers: &[Segment],
    lakes: &[Lake],
) -> Vec<RiverShrink> {
    let index = lake_index(engine, lakes);
    rivers
        .par_iter()
        .map(|segment| shrink_river(engine, segment, lakes, &index))
        .collect()
}

fn shrink_river<E: GeometryEngine + ?Sized>(
    engine: &E,
    segment: &Segment,
    lakes: &[Lake],
    index: &EnvelopeIndex<usize>,
) -> RiverShrink {
    let Some(line) = segment.channel() else {
        return RiverShrink::untouched();
    };
    let Some(bbox) = engine.line_bounds(line) else {
        return RiverShrink::untouched();
    };
    let geometric_length = engine.length(line);
    if geometric_length <= 0.0 {
        return RiverShrink::untouched();
    }

    let mut submerged = 0.0;
    let mut hits = Vec::new();
    for i in index.query_sorted(&bbox) {
        let inside = engine.length(&engine.clip_line(line, &lakes[i].geometry));
        if inside > 0.0 {
            submerged += inside;
            hits.push(i);
        }
    }
    if hits.is_empty() {
        return RiverShrink::untouched();
    }

    let ratio = snap_ratio(1.0 - submerged / geometric_length);
    let remaining = (ratio > 0.0 && ratio < 1.0).then(|| {
        hits.iter().fold(line.clone(), |acc, &i| {
            engine.erase_line(&acc, &lakes[i].geometry)
        })
    });

    RiverShrink { ratio, remaining }
}

/// 并行计算两张表的校正
pub fn shrink_corrections<E: GeometryEngine + ?Sized>(
    engine: &E,
    catchments: &[Catchment],
    rivers: &[Segment],
    lakes: &[Lake],
) -> (Vec<CatchmentShrink>, Vec<RiverShrink>) {
    rayon::join(
        || catchment_corrections(engine, catchments, lakes),
        || river_corrections(engine, rivers, lakes),
    )
}
