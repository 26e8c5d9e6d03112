// crates/rl_io/src/ingest.rs

//! 输入图层摄入
//!
//! 把三个原始图层转换为网络层的表：
//!
//! 1. 三个图层坐标系必须一致
//! 2. 按配置的字段映射读取规范字段，其余属性原样保留（按标识索引）
//! 3. 面积换算到子流域图层的单位
//! 4. 河段与子流域标识集合必须相等，两表按标识排序
//! 5. 河段 `unit_area` 取子流域的值
//! 6. 河段图层没有 `uparea` 字段时用累积结果补齐

use std::collections::{BTreeMap, BTreeSet};

use geojson::JsonObject;
use log::{info, warn};
use rl_config::BurnConfig;
use rl_foundation::units::AreaUnit;
use rl_foundation::validation::{ValidationReport, ValidationWarning};
use rl_geo::crs::{ensure_same_crs, LayerCrs};
use rl_network::accumulate::accumulate_segments;
use rl_network::graph::DrainageGraph;
use rl_network::rewrite::hand_off_unit_area;
use rl_network::{Catchment, Downstream, Lake, NetworkError, Segment};

use crate::error::{IoError, IoResult};
use crate::layer::FeatureLayer;
use crate::schema::{
    into_multi_line, into_multi_polygon, optional_f64, optional_i64, parse_exorheic,
    required_f64, required_i64,
};

const RIVERS: &str = "rivers";
const CATCHMENTS: &str = "catchments";
const LAKES: &str = "lakes";

/// 错误信息中最多列出的标识数量
const MAX_LISTED_IDS: usize = 10;

/// 未被映射为规范字段的属性，按标识索引
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    /// 河段属性
    pub rivers: BTreeMap<i64, JsonObject>,
    /// 子流域属性
    pub catchments: BTreeMap<i64, JsonObject>,
    /// 湖泊属性
    pub lakes: BTreeMap<i64, JsonObject>,
}

/// 摄入结果
#[derive(Debug, Clone)]
pub struct Inputs {
    /// 河段（按标识升序）
    pub rivers: Vec<Segment>,
    /// 子流域（按标识升序）
    pub catchments: Vec<Catchment>,
    /// 湖泊（文件顺序）
    pub lakes: Vec<Lake>,
    /// 公共坐标系
    pub crs: LayerCrs,
    /// 面积单位（子流域图层单位）
    pub area_unit: AreaUnit,
    /// 透传属性
    pub attributes: Attributes,
    /// 河段 `uparea` 是否由累积补齐
    pub computed_uparea: bool,
    /// 数据质量警告
    pub report: ValidationReport,
}

/// 读取配置中的三个图层并摄入
pub fn load_inputs(config: &BurnConfig) -> IoResult<Inputs> {
    let rivers = FeatureLayer::read(&config.rivers.path, RIVERS)?;
    let catchments = FeatureLayer::read(&config.catchments.path, CATCHMENTS)?;
    let lakes = FeatureLayer::read(&config.lakes.path, LAKES)?;
    ingest(rivers, catchments, lakes, config)
}

/// 摄入已读入内存的图层
pub fn ingest(
    rivers: FeatureLayer,
    catchments: FeatureLayer,
    lakes: FeatureLayer,
    config: &BurnConfig,
) -> IoResult<Inputs> {
    ensure_same_crs(&[
        (RIVERS, &rivers.crs),
        (CATCHMENTS, &catchments.crs),
        (LAKES, &lakes.crs),
    ])?;
    let crs = rivers.crs.clone();
    let unit = config.catchments.area_unit;

    let mut report = ValidationReport::new();
    let mut attributes = Attributes::default();

    let mut catchment_rows = read_catchments(catchments, config, &mut attributes.catchments)?;
    let (mut river_rows, declared_unit_area) =
        read_rivers(rivers, config, unit, &mut attributes.rivers)?;
    let lake_rows = read_lakes(lakes, config, unit, &mut attributes.lakes, &mut report)?;

    check_ids(&river_rows, &catchment_rows)?;
    river_rows.sort_by_key(|s| s.id);
    catchment_rows.sort_by_key(|c| c.id);

    hand_off_unit_area(&mut river_rows, &catchment_rows);
    compare_unit_area(&river_rows, &declared_unit_area, &mut report);

    let computed_uparea = config.rivers.fields.uparea.is_none();
    if computed_uparea {
        let graph = DrainageGraph::from_segments(&river_rows)?;
        let uparea = accumulate_segments(&graph, &river_rows)?;
        for (segment, up) in river_rows.iter_mut().zip(uparea) {
            segment.uparea = up;
        }
        info!("河段图层没有 uparea 字段，已由子流域面积累积得到");
    }

    info!(
        "摄入完成: 河段 {}, 子流域 {}, 湖泊 {}, 坐标系 {}, 面积单位 {}",
        river_rows.len(),
        catchment_rows.len(),
        lake_rows.len(),
        crs,
        unit
    );

    Ok(Inputs {
        rivers: river_rows,
        catchments: catchment_rows,
        lakes: lake_rows,
        crs,
        area_unit: unit,
        attributes,
        computed_uparea,
        report,
    })
}

// ============================================================================
// 各图层
// ============================================================================

fn read_catchments(
    layer: FeatureLayer,
    config: &BurnConfig,
    attributes: &mut BTreeMap<i64, JsonObject>,
) -> IoResult<Vec<Catchment>> {
    let fields = &config.catchments.fields;
    let mut rows = Vec::with_capacity(layer.len());

    for (i, feature) in layer.features.into_iter().enumerate() {
        let mut props = feature.properties;
        let id = required_i64(&props, CATCHMENTS, &fields.id, i)?;
        let unit_area = non_negative(
            required_f64(&props, CATCHMENTS, &fields.unitarea, i)?,
            CATCHMENTS,
            &fields.unitarea,
            i,
        )?;
        let geometry = into_multi_polygon(feature.geometry, CATCHMENTS, i)?;

        props.remove(&fields.id);
        props.remove(&fields.unitarea);
        if attributes.insert(id, props).is_some() {
            return Err(NetworkError::DuplicateId {
                layer: CATCHMENTS,
                id,
            }
            .into());
        }
        rows.push(Catchment::new(id, unit_area, geometry));
    }
    Ok(rows)
}

/// 返回河段表和数据源声明的 `unitarea`（若配置了该字段）
fn read_rivers(
    layer: FeatureLayer,
    config: &BurnConfig,
    unit: AreaUnit,
    attributes: &mut BTreeMap<i64, JsonObject>,
) -> IoResult<(Vec<Segment>, BTreeMap<i64, f64>)> {
    let fields = &config.rivers.fields;
    let from = config.rivers.area_unit;
    let mut rows = Vec::with_capacity(layer.len());
    let mut declared = BTreeMap::new();

    for (i, feature) in layer.features.into_iter().enumerate() {
        let mut props = feature.properties;
        let id = required_i64(&props, RIVERS, &fields.id, i)?;
        let next = Downstream::from_raw(optional_i64(&props, RIVERS, &fields.next_id, i)?);
        let length = non_negative(
            required_f64(&props, RIVERS, &fields.length, i)?,
            RIVERS,
            &fields.length,
            i,
        )?;

        let mut segment = Segment::new(id, next, length);
        if let Some(name) = &fields.uparea {
            let up = required_f64(&props, RIVERS, name, i)?;
            segment.uparea = from.convert(up, unit);
            props.remove(name);
        }
        if let Some(name) = &fields.unitarea {
            if let Some(v) = optional_f64(&props, RIVERS, name, i)? {
                declared.insert(id, from.convert(v, unit));
            }
            props.remove(name);
        }
        if let Some(line) = into_multi_line(feature.geometry, RIVERS, i)? {
            segment = segment.with_channel(line);
        }

        props.remove(&fields.id);
        props.remove(&fields.next_id);
        props.remove(&fields.length);
        if attributes.insert(id, props).is_some() {
            return Err(NetworkError::DuplicateId { layer: RIVERS, id }.into());
        }
        rows.push(segment);
    }
    Ok((rows, declared))
}

fn read_lakes(
    layer: FeatureLayer,
    config: &BurnConfig,
    unit: AreaUnit,
    attributes: &mut BTreeMap<i64, JsonObject>,
    report: &mut ValidationReport,
) -> IoResult<Vec<Lake>> {
    let fields = &config.lakes.fields;
    let from = config.lakes.area_unit;
    let mut rows = Vec::with_capacity(layer.len());

    for (i, feature) in layer.features.into_iter().enumerate() {
        let mut props = feature.properties;
        let lake_id = required_i64(&props, LAKES, &fields.lake_id, i)?;
        let area = non_negative(
            required_f64(&props, LAKES, &fields.unitarea, i)?,
            LAKES,
            &fields.unitarea,
            i,
        )?;

        let exorheic = match &fields.exorheic {
            None => false,
            Some(name) => match parse_exorheic(props.get(name)) {
                Ok(flag) => flag,
                Err(raw) => {
                    warn!("湖泊 {lake_id} 的 {name} 值 '{raw}' 无法解析，按内流湖处理");
                    report.add_warning(ValidationWarning::DataQuality {
                        layer: LAKES,
                        element_id: Some(lake_id),
                        message: format!("{name} 值 '{raw}' 无法解析，按内流湖处理"),
                    });
                    false
                }
            },
        };

        let Some(geometry) = into_multi_polygon(feature.geometry, LAKES, i)? else {
            warn!("湖泊 {lake_id} 没有几何，跳过");
            report.add_warning(ValidationWarning::DataQuality {
                layer: LAKES,
                element_id: Some(lake_id),
                message: "没有几何，跳过".to_string(),
            });
            continue;
        };

        props.remove(&fields.lake_id);
        props.remove(&fields.unitarea);
        if let Some(name) = &fields.exorheic {
            props.remove(name);
        }
        if attributes.contains_key(&lake_id) {
            return Err(NetworkError::DuplicateId {
                layer: LAKES,
                id: lake_id,
            }
            .into());
        }
        attributes.insert(lake_id, props);
        rows.push(Lake::new(lake_id, from.convert(area, unit), exorheic, geometry));
    }
    Ok(rows)
}

// ============================================================================
// 一致性
// ============================================================================

fn non_negative(value: f64, layer: &'static str, field: &str, feature: usize) -> IoResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(IoError::InvalidField {
            layer,
            field: field.to_string(),
            feature,
            value: value.to_string(),
            reason: "必须为非负有限值",
        })
    }
}

fn check_ids(rivers: &[Segment], catchments: &[Catchment]) -> IoResult<()> {
    let river_ids: BTreeSet<i64> = rivers.iter().map(|s| s.id).collect();
    let catchment_ids: BTreeSet<i64> = catchments.iter().map(|c| c.id).collect();
    if river_ids == catchment_ids {
        return Ok(());
    }
    Err(IoError::IdMismatch {
        rivers: rivers.len(),
        catchments: catchments.len(),
        only_rivers: river_ids
            .difference(&catchment_ids)
            .take(MAX_LISTED_IDS)
            .copied()
            .collect(),
        only_catchments: catchment_ids
            .difference(&river_ids)
            .take(MAX_LISTED_IDS)
            .copied()
            .collect(),
    })
}

/// 河段声明的 `unitarea` 与子流域不一致时记警告（以子流域为准）
fn compare_unit_area(
    rivers: &[Segment],
    declared: &BTreeMap<i64, f64>,
    report: &mut ValidationReport,
) {
    let mut mismatched = 0usize;
    for segment in rivers {
        let Some(&value) = declared.get(&segment.id) else {
            continue;
        };
        let scale = value.abs().max(segment.unit_area.abs()).max(1.0);
        if (value - segment.unit_area).abs() > 1e-6 * scale {
            mismatched += 1;
            report.add_warning(ValidationWarning::DataQuality {
                layer: RIVERS,
                element_id: Some(segment.id),
                message: format!(
                    "unitarea {} 与子流域 {} 不一致，使用子流域的值",
                    value, segment.unit_area
                ),
            });
        }
    }
    if mismatched > 0 {
        warn!("{mismatched} 个河段的 unitarea 与子流域不一致，使用子流域的值");
    }
}
