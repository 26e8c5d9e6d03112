// crates/rl_io/src/schema.rs

//! 字段读取与类型转换
//!
//! 数据源的属性类型并不可靠：标识可能写成 `12.0` 或 `"12"`，
//! `exorheic` 可能是布尔、0/1、字符串甚至缺失。这里集中处理这些情况，
//! 核心算法只接收规范化后的值。

use geo::{Geometry, MultiLineString, MultiPolygon};
use geojson::{JsonObject, JsonValue};
use rl_geo::engine::{ensure_finite_line, ensure_finite_polygon};

use crate::error::{IoError, IoResult};

/// 读取整数字段，缺失或 `null` 返回 `None`
///
/// 接受整数、整值浮点数和数字字符串。
pub fn optional_i64(
    props: &JsonObject,
    layer: &'static str,
    field: &str,
    feature: usize,
) -> IoResult<Option<i64>> {
    let Some(value) = props.get(field) else {
        return Ok(None);
    };
    let invalid = |reason| IoError::InvalidField {
        layer,
        field: field.to_string(),
        feature,
        value: value.to_string(),
        reason,
    };
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::Number(n) => match n.as_i64() {
            Some(v) => Ok(Some(v)),
            None => n
                .as_f64()
                .and_then(integral)
                .map(Some)
                .ok_or_else(|| invalid("不是整数")),
        },
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
                .map(Some)
                .ok_or_else(|| invalid("不是整数"))
        }
        _ => Err(invalid("不是整数")),
    }
}

/// 读取必需的整数字段
pub fn required_i64(
    props: &JsonObject,
    layer: &'static str,
    field: &str,
    feature: usize,
) -> IoResult<i64> {
    optional_i64(props, layer, field, feature)?.ok_or_else(|| IoError::MissingField {
        layer,
        field: field.to_string(),
        feature,
    })
}

/// 读取浮点字段，缺失或 `null` 返回 `None`
pub fn optional_f64(
    props: &JsonObject,
    layer: &'static str,
    field: &str,
    feature: usize,
) -> IoResult<Option<f64>> {
    let Some(value) = props.get(field) else {
        return Ok(None);
    };
    let parsed = match value {
        JsonValue::Null => return Ok(None),
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| IoError::InvalidField {
        layer,
        field: field.to_string(),
        feature,
        value: value.to_string(),
        reason: "不是数值",
    })
}

/// 读取必需的浮点字段
pub fn required_f64(
    props: &JsonObject,
    layer: &'static str,
    field: &str,
    feature: usize,
) -> IoResult<f64> {
    optional_f64(props, layer, field, feature)?.ok_or_else(|| IoError::MissingField {
        layer,
        field: field.to_string(),
        feature,
    })
}

fn integral(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

// ============================================================================
// exorheic
// ============================================================================

/// 解析外流湖标记
///
/// - 缺失、`null` → `Ok(false)`
/// - 布尔值原样返回
/// - 数值（含数字字符串）等于 1 为外流湖，其余为内流湖
/// - 字符串 `"true"` / `"false"`（不区分大小写）
/// - 其它值无法解析，返回 `Err(原始文本)`，调用方记警告并按内流湖处理
pub fn parse_exorheic(value: Option<&JsonValue>) -> Result<bool, String> {
    match value {
        None | Some(JsonValue::Null) => Ok(false),
        Some(JsonValue::Bool(b)) => Ok(*b),
        Some(JsonValue::Number(n)) => Ok(n.as_f64() == Some(1.0)),
        Some(JsonValue::String(s)) => {
            let s = s.trim();
            if let Ok(v) = s.parse::<f64>() {
                return Ok(v == 1.0);
            }
            match s.to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(s.to_string()),
            }
        }
        Some(other) => Err(other.to_string()),
    }
}

// ============================================================================
// 几何
// ============================================================================

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// 折线几何（`LineString` / `MultiLineString`）
pub fn into_multi_line(
    geometry: Option<Geometry<f64>>,
    layer: &'static str,
    feature: usize,
) -> IoResult<Option<MultiLineString<f64>>> {
    let line = match geometry {
        None => return Ok(None),
        Some(Geometry::LineString(ls)) => MultiLineString::new(vec![ls]),
        Some(Geometry::MultiLineString(mls)) => mls,
        Some(other) => {
            return Err(IoError::UnexpectedGeometry {
                layer,
                feature,
                kind: geometry_kind(&other).to_string(),
                expected: "LineString/MultiLineString",
            })
        }
    };
    ensure_finite_line(&line, &format!("{layer} 要素 {feature}"))?;
    Ok(Some(line))
}

/// 多边形几何（`Polygon` / `MultiPolygon`）
pub fn into_multi_polygon(
    geometry: Option<Geometry<f64>>,
    layer: &'static str,
    feature: usize,
) -> IoResult<Option<MultiPolygon<f64>>> {
    let polygon = match geometry {
        None => return Ok(None),
        Some(Geometry::Polygon(p)) => MultiPolygon::new(vec![p]),
        Some(Geometry::MultiPolygon(mp)) => mp,
        Some(other) => {
            return Err(IoError::UnexpectedGeometry {
                layer,
                feature,
                kind: geometry_kind(&other).to_string(),
                expected: "Polygon/MultiPolygon",
            })
        }
    };
    ensure_finite_polygon(&polygon, &format!("{layer} 要素 {feature}"))?;
    Ok(Some(polygon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon};
    use rl_geo::GeoError;
    use serde_json::json;

    fn props(value: JsonValue) -> JsonObject {
        let mut map = JsonObject::new();
        map.insert("v".to_string(), value);
        map
    }

    #[test]
    fn test_integer_coercion() {
        for value in [json!(12), json!(12.0), json!("12"), json!(" 12.0 ")] {
            assert_eq!(optional_i64(&props(value), "rivers", "v", 0).unwrap(), Some(12));
        }
        assert_eq!(optional_i64(&props(json!(null)), "rivers", "v", 0).unwrap(), None);
        assert_eq!(optional_i64(&props(json!(-9999)), "rivers", "v", 0).unwrap(), Some(-9999));
        assert!(optional_i64(&props(json!(1.5)), "rivers", "v", 0).is_err());
        assert!(optional_i64(&props(json!("abc")), "rivers", "v", 0).is_err());
    }

    #[test]
    fn test_required_missing() {
        let err = required_f64(&JsonObject::new(), "lakes", "Lake_area", 4).unwrap_err();
        match err {
            IoError::MissingField { layer, field, feature } => {
                assert_eq!(layer, "lakes");
                assert_eq!(field, "Lake_area");
                assert_eq!(feature, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(required_f64(&props(json!("2.5")), "c", "v", 0).unwrap(), 2.5);
        assert_eq!(required_f64(&props(json!(3)), "c", "v", 0).unwrap(), 3.0);
        assert!(required_f64(&props(json!([1])), "c", "v", 0).is_err());
    }

    #[test]
    fn test_exorheic_coercion() {
        let truthy = [json!(true), json!(1), json!(1.0), json!("1"), json!("1.0"), json!("TRUE")];
        for v in &truthy {
            assert_eq!(parse_exorheic(Some(v)), Ok(true), "{v}");
        }
        let falsy = [json!(false), json!(0), json!(0.0), json!("0"), json!("false"), json!(2)];
        for v in &falsy {
            assert_eq!(parse_exorheic(Some(v)), Ok(false), "{v}");
        }
        assert_eq!(parse_exorheic(None), Ok(false));
        assert_eq!(parse_exorheic(Some(&json!(null))), Ok(false));
        assert_eq!(parse_exorheic(Some(&json!("yes"))), Err("yes".to_string()));
        assert!(parse_exorheic(Some(&json!({"a": 1}))).is_err());
    }

    #[test]
    fn test_geometry_kinds() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)];
        let multi = into_multi_line(Some(Geometry::LineString(line)), "rivers", 0).unwrap();
        assert_eq!(multi.map(|m| m.0.len()), Some(1));

        let err = into_multi_polygon(Some(Geometry::Point(point!(x: 0.0, y: 0.0))), "lakes", 2)
            .unwrap_err();
        assert!(matches!(err, IoError::UnexpectedGeometry { feature: 2, .. }));
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        let line = line_string![(x: 0.0, y: 0.0), (x: f64::NAN, y: 1.0)];
        let err = into_multi_line(Some(Geometry::LineString(line)), "rivers", 3).unwrap_err();
        assert!(matches!(err, IoError::Geo(GeoError::NonFiniteCoordinate { .. })));

        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: f64::INFINITY, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        let err = into_multi_polygon(Some(Geometry::Polygon(square)), "lakes", 1).unwrap_err();
        assert!(err.to_string().contains("lakes 要素 1"));
    }
}
