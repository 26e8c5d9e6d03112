// crates/rl_io/src/export.rs

//! 校正结果导出
//!
//! 输出三个 GeoJSON 图层：
//!
//! - 河段：透传属性 + `id`, `next_id`, `length`, `unitarea`, `uparea`,
//!   `up1..upK`, `maxup`, `inflow`, `outflow`, `inoutflow`, `islake`,
//!   `lake_ref`, `length_ratio`
//! - 子流域：透传属性 + `id`, `unitarea`, `area_ratio`, `islake`, `lake_ref`
//! - 可解析湖泊：透传属性 + `lake_id`, `unitarea`, `exorheic`,
//!   `node_id`, `outlet`, `inflows`
//!
//! `next_id` 写回原始编码：终点为 `-9999`，缺失为 `null`。

use std::collections::BTreeMap;
use std::path::PathBuf;

use geojson::{Feature, JsonObject, JsonValue};
use log::info;
use rl_config::OutputConfig;
use rl_geo::crs::LayerCrs;
use rl_network::upstream::pad_upstream;
use rl_network::{BurnOutcome, Catchment, Lake, LakeNode, Segment, SegmentGeometry};

use crate::error::IoResult;
use crate::ingest::Attributes;
use crate::layer::{make_feature, write_layer};

/// 写出的文件路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// 河段图层
    pub rivers: PathBuf,
    /// 子流域图层
    pub catchments: PathBuf,
    /// 可解析湖泊图层
    pub lakes: PathBuf,
}

fn flag(value: bool) -> JsonValue {
    JsonValue::from(u8::from(value))
}

fn optional_id(value: Option<i64>) -> JsonValue {
    value.map_or(JsonValue::Null, JsonValue::from)
}

fn number(value: f64) -> JsonValue {
    // 非有限值写为 null
    serde_json::Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number)
}

fn base_properties(attributes: &BTreeMap<i64, JsonObject>, id: i64) -> JsonObject {
    attributes.get(&id).cloned().unwrap_or_default()
}

// ============================================================================
// 要素构造
// ============================================================================

/// 河段要素
pub fn river_features(
    rivers: &[Segment],
    width: usize,
    attributes: &BTreeMap<i64, JsonObject>,
) -> Vec<Feature> {
    rivers
        .iter()
        .map(|s| {
            let mut props = base_properties(attributes, s.id);
            props.insert("id".into(), JsonValue::from(s.id));
            props.insert("next_id".into(), optional_id(s.next.to_raw()));
            props.insert("length".into(), number(s.length));
            props.insert("unitarea".into(), number(s.unit_area));
            props.insert("uparea".into(), number(s.uparea));
            for (k, up) in pad_upstream(&s.upstream, width).into_iter().enumerate() {
                props.insert(format!("up{}", k + 1), JsonValue::from(up));
            }
            props.insert("maxup".into(), JsonValue::from(s.maxup));
            props.insert("inflow".into(), flag(s.inflow));
            props.insert("outflow".into(), flag(s.outflow));
            props.insert("inoutflow".into(), flag(s.inoutflow));
            props.insert("islake".into(), flag(s.is_lake));
            props.insert("lake_ref".into(), optional_id(s.lake_ref));
            props.insert("length_ratio".into(), number(s.length_ratio));

            let geometry = s.geometry.as_ref().map(|g| match g {
                SegmentGeometry::Channel(line) => geojson::Value::from(line),
                SegmentGeometry::Water(polygon) => geojson::Value::from(polygon),
            });
            make_feature(geometry, props)
        })
        .collect()
}

/// 子流域要素
pub fn catchment_features(
    catchments: &[Catchment],
    attributes: &BTreeMap<i64, JsonObject>,
) -> Vec<Feature> {
    catchments
        .iter()
        .map(|c| {
            let mut props = base_properties(attributes, c.id);
            props.insert("id".into(), JsonValue::from(c.id));
            props.insert("unitarea".into(), number(c.unit_area));
            props.insert("area_ratio".into(), number(c.area_ratio));
            props.insert("islake".into(), flag(c.is_lake));
            props.insert("lake_ref".into(), optional_id(c.lake_ref));
            make_feature(c.geometry.as_ref().map(geojson::Value::from), props)
        })
        .collect()
}

/// 可解析湖泊要素
pub fn lake_features(
    lakes: &[Lake],
    nodes: &[LakeNode],
    attributes: &BTreeMap<i64, JsonObject>,
) -> Vec<Feature> {
    let by_lake: BTreeMap<i64, &LakeNode> = nodes.iter().map(|n| (n.lake_id, n)).collect();
    lakes
        .iter()
        .map(|lake| {
            let node = by_lake.get(&lake.lake_id);
            let mut props = base_properties(attributes, lake.lake_id);
            props.insert("lake_id".into(), JsonValue::from(lake.lake_id));
            props.insert("unitarea".into(), number(lake.unit_area));
            props.insert("exorheic".into(), flag(lake.exorheic));
            props.insert("node_id".into(), optional_id(node.map(|n| n.node_id)));
            props.insert("outlet".into(), optional_id(node.and_then(|n| n.outlet)));
            props.insert(
                "inflows".into(),
                JsonValue::from(node.map(|n| n.inflows.clone()).unwrap_or_default()),
            );
            make_feature(Some(geojson::Value::from(&lake.geometry)), props)
        })
        .collect()
}

// ============================================================================
// 写出
// ============================================================================

/// 写出全部结果图层
pub fn write_outputs(
    output: &OutputConfig,
    crs: &LayerCrs,
    outcome: &BurnOutcome,
    attributes: &Attributes,
) -> IoResult<OutputPaths> {
    let paths = OutputPaths {
        rivers: output.rivers_path(),
        catchments: output.catchments_path(),
        lakes: output.lakes_path(),
    };

    write_layer(
        &paths.rivers,
        "rivers",
        crs,
        river_features(&outcome.rivers, outcome.upstream_width, &attributes.rivers),
        output.pretty,
    )?;
    write_layer(
        &paths.catchments,
        "catchments",
        crs,
        catchment_features(&outcome.catchments, &attributes.catchments),
        output.pretty,
    )?;
    write_layer(
        &paths.lakes,
        "lakes",
        crs,
        lake_features(&outcome.resolvable, &outcome.lake_nodes, &attributes.lakes),
        output.pretty,
    )?;

    info!(
        "结果已写出: {}, {}, {}",
        paths.rivers.display(),
        paths.catchments.display(),
        paths.lakes.display()
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_network::Downstream;
    use serde_json::json;

    #[test]
    fn test_river_properties() {
        let mut lake = Segment::new(3, Downstream::Terminal, 0.0);
        lake.is_lake = true;
        lake.lake_ref = Some(77);
        lake.upstream = vec![1, 2];
        lake.maxup = 2;

        let mut upper = Segment::new(1, Downstream::To(3), 1.5);
        upper.inflow = true;
        let absent = Segment::new(2, Downstream::Absent, 1.0);

        let mut attrs = BTreeMap::new();
        let mut extra = JsonObject::new();
        extra.insert("name".into(), json!("upper"));
        attrs.insert(1, extra);

        let features = river_features(&[upper, absent, lake], 2, &attrs);
        let p0 = features[0].properties.as_ref().unwrap();
        assert_eq!(p0["name"], json!("upper"));
        assert_eq!(p0["next_id"], json!(3));
        assert_eq!(p0["inflow"], json!(1));
        assert_eq!(p0["up1"], json!(0));
        assert_eq!(p0["up2"], json!(0));
        assert_eq!(p0["lake_ref"], JsonValue::Null);

        let p1 = features[1].properties.as_ref().unwrap();
        assert_eq!(p1["next_id"], JsonValue::Null);

        let p2 = features[2].properties.as_ref().unwrap();
        assert_eq!(p2["next_id"], json!(-9999));
        assert_eq!(p2["up1"], json!(1));
        assert_eq!(p2["up2"], json!(2));
        assert_eq!(p2["maxup"], json!(2));
        assert_eq!(p2["islake"], json!(1));
        assert_eq!(p2["lake_ref"], json!(77));
        assert!(features[2].geometry.is_none());
    }

    #[test]
    fn test_non_finite_written_as_null() {
        assert_eq!(number(f64::NAN), JsonValue::Null);
        assert_eq!(number(2.5), json!(2.5));
    }
}
