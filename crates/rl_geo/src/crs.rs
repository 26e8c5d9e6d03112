// crates/rl_geo/src/crs.rs

//! 坐标参考系统名称
//!
//! 图层只需要做一件事：判断三个输入图层是否处于同一坐标系。
//! 这里把 GeoJSON 中常见的几种写法归一化为 `AUTHORITY:CODE` 形式再比较。
//!
//! # 示例
//!
//! ```
//! use rl_geo::crs::LayerCrs;
//!
//! let a = LayerCrs::parse("urn:ogc:def:crs:EPSG::32650");
//! let b = LayerCrs::parse("EPSG:32650");
//! assert_eq!(a, b);
//! assert!(LayerCrs::parse("urn:ogc:def:crs:OGC:1.3:CRS84").is_wgs84());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GeoError, GeoResult};

/// 未声明坐标系时的默认值（RFC 7946）
pub const DEFAULT_CRS: &str = "OGC:CRS84";

/// 归一化后的图层坐标系
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerCrs {
    authority: String,
    code: String,
}

impl LayerCrs {
    /// 解析坐标系名称
    ///
    /// 支持 `EPSG:4326`、`urn:ogc:def:crs:EPSG::4326`、
    /// `urn:ogc:def:crs:OGC:1.3:CRS84` 等写法。无法识别的名称原样保留，
    /// 仍可参与相等比较。
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        let parts: Vec<&str> = trimmed.split(':').filter(|s| !s.is_empty()).collect();

        let (authority, code) = match parts.as_slice() {
            // urn:ogc:def:crs:<AUTH>[:<version>]:<CODE>
            [urn, ogc, def, crs, auth, .., code]
                if urn.eq_ignore_ascii_case("urn")
                    && ogc.eq_ignore_ascii_case("ogc")
                    && def.eq_ignore_ascii_case("def")
                    && crs.eq_ignore_ascii_case("crs") =>
            {
                (auth.to_uppercase(), code.to_uppercase())
            }
            [auth, code] => (auth.to_uppercase(), code.to_uppercase()),
            _ => (String::new(), trimmed.to_uppercase()),
        };

        // EPSG:4326 与 CRS84 只差轴序，平面比较中视为同一坐标系
        if (authority == "EPSG" && code == "4326") || code == "CRS84" {
            return Self::wgs84();
        }

        Self { authority, code }
    }

    /// 解析可选名称，缺失时使用默认坐标系
    pub fn parse_or_default(name: Option<&str>) -> Self {
        name.map_or_else(Self::wgs84, Self::parse)
    }

    /// WGS84 经纬度
    pub fn wgs84() -> Self {
        Self {
            authority: "OGC".to_string(),
            code: "CRS84".to_string(),
        }
    }

    /// 是否为 WGS84 经纬度
    pub fn is_wgs84(&self) -> bool {
        self.authority == "OGC" && self.code == "CRS84"
    }

    /// 写回 GeoJSON 时使用的名称
    pub fn to_urn(&self) -> String {
        if self.is_wgs84() {
            "urn:ogc:def:crs:OGC:1.3:CRS84".to_string()
        } else if self.authority.is_empty() {
            self.code.clone()
        } else {
            format!("urn:ogc:def:crs:{}::{}", self.authority, self.code)
        }
    }
}

impl fmt::Display for LayerCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.authority.is_empty() {
            f.write_str(&self.code)
        } else {
            write!(f, "{}:{}", self.authority, self.code)
        }
    }
}

/// 检查所有图层坐标系一致
///
/// `layers` 中第一个图层作为参照。
pub fn ensure_same_crs(layers: &[(&str, &LayerCrs)]) -> GeoResult<()> {
    let Some((ref_name, ref_crs)) = layers.first() else {
        return Ok(());
    };
    for (name, crs) in &layers[1..] {
        if crs != ref_crs {
            return Err(GeoError::crs_mismatch(
                *ref_name,
                ref_crs.to_string(),
                *name,
                crs.to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!(LayerCrs::parse("epsg:3857").to_string(), "EPSG:3857");
        assert_eq!(
            LayerCrs::parse("urn:ogc:def:crs:EPSG::3857"),
            LayerCrs::parse("EPSG:3857")
        );
        assert!(LayerCrs::parse("EPSG:4326").is_wgs84());
        assert!(LayerCrs::parse_or_default(None).is_wgs84());
    }

    #[test]
    fn test_unknown_name_kept() {
        let crs = LayerCrs::parse("my-local-grid");
        assert_eq!(crs.to_string(), "MY-LOCAL-GRID");
        assert_ne!(crs, LayerCrs::wgs84());
    }

    #[test]
    fn test_ensure_same_crs() {
        let a = LayerCrs::parse("EPSG:32650");
        let b = LayerCrs::parse("urn:ogc:def:crs:EPSG::32650");
        let c = LayerCrs::wgs84();
        assert!(ensure_same_crs(&[("rivers", &a), ("catchments", &b)]).is_ok());
        let err = ensure_same_crs(&[("rivers", &a), ("lakes", &c)]).unwrap_err();
        assert!(err.to_string().contains("lakes"));
    }

    #[test]
    fn test_urn_roundtrip() {
        let crs = LayerCrs::parse("EPSG:32650");
        assert_eq!(LayerCrs::parse(&crs.to_urn()), crs);
        assert_eq!(LayerCrs::parse(&LayerCrs::wgs84().to_urn()), LayerCrs::wgs84());
    }
}
