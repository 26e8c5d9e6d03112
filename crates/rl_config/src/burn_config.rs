// crates/rl_config/src/burn_config.rs

//! BurnConfig - 湖泊嵌入配置
//!
//! 描述三个输入图层（河段、子流域、湖泊）的位置与字段映射、
//! 可解析湖泊过滤参数、拓扑检查容差、输出位置以及数据集级湖泊修正。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rl_foundation::AreaUnit;

use crate::error::ConfigError;

/// 湖泊嵌入配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnConfig {
    /// 河段图层
    pub rivers: RiverLayerConfig,

    /// 子流域图层
    pub catchments: CatchmentLayerConfig,

    /// 湖泊图层
    pub lakes: LakeLayerConfig,

    /// 空间子集外扩距离（图层坐标单位）
    #[serde(default = "default_margin")]
    pub margin: f64,

    /// 连接段长度阈值，不超过该长度的出入流河段参与连接段检查
    #[serde(default = "default_connector_tolerance")]
    pub connector_tolerance: f64,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 湖泊数据集修正
    #[serde(default)]
    pub lake_corrections: LakeCorrectionConfig,
}

fn default_margin() -> f64 { 2.0 }
fn default_connector_tolerance() -> f64 { 1e-3 }

// ============================================================================
// 图层配置
// ============================================================================

/// 河段图层配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiverLayerConfig {
    /// GeoJSON 文件路径
    pub path: PathBuf,

    /// 字段映射
    #[serde(default)]
    pub fields: RiverFields,

    /// `uparea` 的面积单位
    #[serde(default)]
    pub area_unit: AreaUnit,
}

/// 河段字段映射（规范字段 -> 输入列名）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiverFields {
    /// 河段标识列
    #[serde(default = "default_id_field")]
    pub id: String,
    /// 下游河段标识列
    #[serde(default = "default_next_field")]
    pub next_id: String,
    /// 长度列
    #[serde(default = "default_length_field")]
    pub length: String,
    /// 上游汇水面积列，缺失时由子流域面积累积计算
    #[serde(default = "default_uparea_field")]
    pub uparea: Option<String>,
    /// 本段面积列，通常由子流域图层提供
    #[serde(default)]
    pub unitarea: Option<String>,
}

fn default_id_field() -> String { "COMID".to_string() }
fn default_next_field() -> String { "NextDownID".to_string() }
fn default_length_field() -> String { "lengthkm".to_string() }
fn default_uparea_field() -> Option<String> { Some("uparea".to_string()) }
fn default_unitarea_field() -> String { "unitarea".to_string() }

impl Default for RiverFields {
    fn default() -> Self {
        Self {
            id: default_id_field(),
            next_id: default_next_field(),
            length: default_length_field(),
            uparea: default_uparea_field(),
            unitarea: None,
        }
    }
}

/// 子流域图层配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchmentLayerConfig {
    /// GeoJSON 文件路径
    pub path: PathBuf,

    /// 字段映射
    #[serde(default)]
    pub fields: CatchmentFields,

    /// `unitarea` 的面积单位，也是全流程的统一单位
    #[serde(default)]
    pub area_unit: AreaUnit,
}

/// 子流域字段映射
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchmentFields {
    /// 子流域标识列（与河段标识同域）
    #[serde(default = "default_id_field")]
    pub id: String,
    /// 子流域面积列
    #[serde(default = "default_unitarea_field")]
    pub unitarea: String,
}

impl Default for CatchmentFields {
    fn default() -> Self {
        Self {
            id: default_id_field(),
            unitarea: default_unitarea_field(),
        }
    }
}

/// 湖泊图层配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LakeLayerConfig {
    /// GeoJSON 文件路径
    pub path: PathBuf,

    /// 字段映射
    #[serde(default)]
    pub fields: LakeFields,

    /// 湖泊面积单位
    #[serde(default)]
    pub area_unit: AreaUnit,
}

/// 湖泊字段映射
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LakeFields {
    /// 湖泊标识列
    #[serde(default = "default_lake_id_field")]
    pub lake_id: String,
    /// 湖泊面积列
    #[serde(default = "default_lake_area_field")]
    pub unitarea: String,
    /// 外流湖标记列，缺失时全部按内流湖处理
    #[serde(default = "default_exorheic_field")]
    pub exorheic: Option<String>,
}

fn default_lake_id_field() -> String { "Hylak_id".to_string() }
fn default_lake_area_field() -> String { "Lake_area".to_string() }
fn default_exorheic_field() -> Option<String> { Some("exorheic".to_string()) }

impl Default for LakeFields {
    fn default() -> Self {
        Self {
            lake_id: default_lake_id_field(),
            unitarea: default_lake_area_field(),
            exorheic: default_exorheic_field(),
        }
    }
}

// ============================================================================
// 输出配置
// ============================================================================

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// 校正后河段文件名
    #[serde(default = "default_rivers_file")]
    pub rivers_file: String,

    /// 校正后子流域文件名
    #[serde(default = "default_catchments_file")]
    pub catchments_file: String,

    /// 可解析湖泊文件名
    #[serde(default = "default_lakes_file")]
    pub lakes_file: String,

    /// 是否缩进输出 JSON
    #[serde(default)]
    pub pretty: bool,
}

fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_rivers_file() -> String { "rivers_corrected.geojson".to_string() }
fn default_catchments_file() -> String { "catchments_corrected.geojson".to_string() }
fn default_lakes_file() -> String { "lakes_resolvable.geojson".to_string() }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            rivers_file: default_rivers_file(),
            catchments_file: default_catchments_file(),
            lakes_file: default_lakes_file(),
            pretty: false,
        }
    }
}

impl OutputConfig {
    /// 河段输出路径
    pub fn rivers_path(&self) -> PathBuf {
        self.directory.join(&self.rivers_file)
    }

    /// 子流域输出路径
    pub fn catchments_path(&self) -> PathBuf {
        self.directory.join(&self.catchments_file)
    }

    /// 湖泊输出路径
    pub fn lakes_path(&self) -> PathBuf {
        self.directory.join(&self.lakes_file)
    }
}

// ============================================================================
// 湖泊修正配置
// ============================================================================

/// 湖泊数据集修正
///
/// 在可解析性过滤之前执行：先删除，再合并。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LakeCorrectionConfig {
    /// 需要删除的湖泊标识
    #[serde(default)]
    pub remove: Vec<i64>,

    /// 需要合并的湖泊组
    #[serde(default)]
    pub merge: Vec<MergeGroup>,
}

impl LakeCorrectionConfig {
    /// 是否没有任何修正
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.merge.is_empty()
    }
}

/// 合并组：`absorb` 中的湖泊并入 `keep`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeGroup {
    /// 保留的湖泊标识
    pub keep: i64,
    /// 被吸收的湖泊标识
    pub absorb: Vec<i64>,
}

// ============================================================================
// 加载 / 验证 / 保存
// ============================================================================

impl BurnConfig {
    /// 用三个图层路径和默认参数创建配置
    pub fn with_paths(
        rivers: impl Into<PathBuf>,
        catchments: impl Into<PathBuf>,
        lakes: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rivers: RiverLayerConfig {
                path: rivers.into(),
                fields: RiverFields::default(),
                area_unit: AreaUnit::default(),
            },
            catchments: CatchmentLayerConfig {
                path: catchments.into(),
                fields: CatchmentFields::default(),
                area_unit: AreaUnit::default(),
            },
            lakes: LakeLayerConfig {
                path: lakes.into(),
                fields: LakeFields::default(),
                area_unit: AreaUnit::default(),
            },
            margin: default_margin(),
            connector_tolerance: default_connector_tolerance(),
            output: OutputConfig::default(),
            lake_corrections: LakeCorrectionConfig::default(),
        }
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;

        let config: BurnConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(ConfigError::invalid_value(
                "margin",
                self.margin,
                "外扩距离必须为非负有限值",
            ));
        }

        if !self.connector_tolerance.is_finite() || self.connector_tolerance < 0.0 {
            return Err(ConfigError::invalid_value(
                "connector_tolerance",
                self.connector_tolerance,
                "连接段容差必须为非负有限值",
            ));
        }

        // 路径
        for (key, path) in [
            ("rivers.path", &self.rivers.path),
            ("catchments.path", &self.catchments.path),
            ("lakes.path", &self.lakes.path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Missing(key.to_string()));
            }
        }

        // 字段名
        let required = [
            ("rivers.fields.id", Some(&self.rivers.fields.id)),
            ("rivers.fields.next_id", Some(&self.rivers.fields.next_id)),
            ("rivers.fields.length", Some(&self.rivers.fields.length)),
            ("rivers.fields.uparea", self.rivers.fields.uparea.as_ref()),
            ("rivers.fields.unitarea", self.rivers.fields.unitarea.as_ref()),
            ("catchments.fields.id", Some(&self.catchments.fields.id)),
            ("catchments.fields.unitarea", Some(&self.catchments.fields.unitarea)),
            ("lakes.fields.lake_id", Some(&self.lakes.fields.lake_id)),
            ("lakes.fields.unitarea", Some(&self.lakes.fields.unitarea)),
            ("lakes.fields.exorheic", self.lakes.fields.exorheic.as_ref()),
        ];
        for (key, name) in required {
            if let Some(name) = name {
                if name.trim().is_empty() {
                    return Err(ConfigError::invalid_value(key, "\"\"", "字段名不能为空"));
                }
            }
        }

        self.validate_lake_corrections()
    }

    fn validate_lake_corrections(&self) -> Result<(), ConfigError> {
        let removed: BTreeSet<i64> = self.lake_corrections.remove.iter().copied().collect();
        let mut seen: BTreeSet<i64> = BTreeSet::new();

        for (i, group) in self.lake_corrections.merge.iter().enumerate() {
            let key = format!("lake_corrections.merge[{i}]");
            if group.absorb.is_empty() {
                return Err(ConfigError::invalid_value(key, group.keep, "合并组不能为空"));
            }
            for id in std::iter::once(group.keep).chain(group.absorb.iter().copied()) {
                if !seen.insert(id) {
                    return Err(ConfigError::invalid_value(key, id, "湖泊在多个合并组中重复出现"));
                }
                if removed.contains(&id) {
                    return Err(ConfigError::invalid_value(key, id, "湖泊同时出现在删除列表中"));
                }
            }
        }
        Ok(())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }
}
