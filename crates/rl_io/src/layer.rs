// crates/rl_io/src/layer.rs

//! GeoJSON 图层读写
//!
//! 输入图层是 GeoJSON `FeatureCollection`。坐标系取自旧式 `crs` 成员
//! (`crs.properties.name`)，缺失时按 RFC 7946 视为 `OGC:CRS84`。
//! 写出时同样写入 `crs` 成员，便于 GIS 软件识别投影坐标。
//!
//! # 示例
//!
//! ```
//! use rl_io::layer::FeatureLayer;
//!
//! let text = r#"{
//!     "type": "FeatureCollection",
//!     "crs": {"type": "name", "properties": {"name": "EPSG:32650"}},
//!     "features": [
//!         {"type": "Feature", "properties": {"COMID": 1}, "geometry": null}
//!     ]
//! }"#;
//! let layer = FeatureLayer::parse(text, "rivers").unwrap();
//! assert_eq!(layer.len(), 1);
//! assert_eq!(layer.crs.to_string(), "EPSG:32650");
//! ```

use std::fs;
use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use log::debug;
use rl_geo::crs::LayerCrs;

use crate::error::{IoError, IoResult};

/// 一个要素：属性表加可选几何
#[derive(Debug, Clone)]
pub struct FeatureRecord {
    /// 属性
    pub properties: JsonObject,
    /// 几何（`null` 几何为 `None`）
    pub geometry: Option<geo::Geometry<f64>>,
}

/// 读入内存的图层
#[derive(Debug, Clone)]
pub struct FeatureLayer {
    /// 图层名（用于错误信息）
    pub name: String,
    /// 坐标系
    pub crs: LayerCrs,
    /// 要素（文件顺序）
    pub features: Vec<FeatureRecord>,
}

impl FeatureLayer {
    /// 从文件读取
    pub fn read<P: AsRef<Path>>(path: P, name: &str) -> IoResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| IoError::file(path, e))?;
        let layer = Self::parse(&content, name)?;
        debug!(
            "读取图层 {}: {} 个要素, 坐标系 {} ({})",
            name,
            layer.len(),
            layer.crs,
            path.display()
        );
        Ok(layer)
    }

    /// 从 GeoJSON 文本解析
    pub fn parse(content: &str, name: &str) -> IoResult<Self> {
        let geojson: GeoJson = content.parse().map_err(|e| IoError::geojson(name, e))?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(IoError::geojson(name, "顶层对象不是 FeatureCollection"));
        };

        let crs = LayerCrs::parse_or_default(crs_name(collection.foreign_members.as_ref()));

        let features = collection
            .features
            .into_iter()
            .map(|feature| {
                let geometry = feature
                    .geometry
                    .map(geo::Geometry::<f64>::try_from)
                    .transpose()
                    .map_err(|e| IoError::geojson(name, e))?;
                Ok(FeatureRecord {
                    properties: feature.properties.unwrap_or_default(),
                    geometry,
                })
            })
            .collect::<IoResult<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            crs,
            features,
        })
    }

    /// 要素数量
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// 是否没有要素
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// `crs.properties.name`
fn crs_name(members: Option<&JsonObject>) -> Option<&str> {
    members?
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
}

// ============================================================================
// 写出
// ============================================================================

/// 由几何和属性构造要素
pub fn make_feature(geometry: Option<geojson::Value>, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: geometry.map(geojson::Geometry::new),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// 写出 `FeatureCollection`，带 `crs` 成员
pub fn write_layer<P: AsRef<Path>>(
    path: P,
    name: &str,
    crs: &LayerCrs,
    features: Vec<Feature>,
    pretty: bool,
) -> IoResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IoError::file(parent, e))?;
    }

    let mut crs_member = JsonObject::new();
    crs_member.insert("type".to_string(), JsonValue::from("name"));
    crs_member.insert(
        "properties".to_string(),
        serde_json::json!({ "name": crs.to_urn() }),
    );
    let mut members = JsonObject::new();
    members.insert("crs".to_string(), JsonValue::Object(crs_member));

    let count = features.len();
    let collection = GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(members),
    });

    let text = if pretty {
        serde_json::to_string_pretty(&collection)
    } else {
        serde_json::to_string(&collection)
    }
    .map_err(|e| IoError::geojson(name, e))?;

    fs::write(path, text).map_err(|e| IoError::file(path, e))?;
    debug!("写出图层 {}: {} 个要素 ({})", name, count, path.display());
    Ok(())
}
