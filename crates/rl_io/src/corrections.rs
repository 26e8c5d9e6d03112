// crates/rl_io/src/corrections.rs

//! 数据集湖泊修正
//!
//! 某些湖泊数据集需要在过滤之前手工修正：把一组湖泊合并为一个
//! （例如被拆成两个多边形的同一水体），或删除已知有问题的湖泊。
//! 先合并后删除；找不到的标识只记警告。
//!
//! 合并只做几何并集，不做缓冲：共边或重叠的部分融合为一个多边形，
//! 相隔缝隙的部分保持为多部件几何，并记一条数据质量警告。

use std::collections::BTreeSet;

use log::{info, warn};
use rl_config::LakeCorrectionConfig;
use rl_foundation::validation::{ValidationReport, ValidationWarning};
use rl_geo::GeometryEngine;
use rl_network::Lake;

use crate::error::IoResult;

const LAKES: &str = "lakes";

/// 修正统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionStats {
    /// 合并组数
    pub merged_groups: usize,
    /// 被吸收的湖泊数
    pub absorbed: usize,
    /// 删除的湖泊数
    pub removed: usize,
}

/// 应用湖泊修正
///
/// 合并时保留 `keep` 行的位置、标识和 `exorheic`，几何为全组溶解结果，
/// 面积为全组之和。
pub fn apply_lake_corrections<E: GeometryEngine + ?Sized>(
    engine: &E,
    mut lakes: Vec<Lake>,
    corrections: &LakeCorrectionConfig,
    report: &mut ValidationReport,
) -> IoResult<(Vec<Lake>, CorrectionStats)> {
    let mut stats = CorrectionStats::default();
    if corrections.is_empty() {
        return Ok((lakes, stats));
    }

    for group in &corrections.merge {
        let Some(keep) = lakes.iter().position(|l| l.lake_id == group.keep) else {
            unknown(report, group.keep, "合并保留湖泊不存在，整组跳过");
            continue;
        };

        let absorb: BTreeSet<i64> = group
            .absorb
            .iter()
            .copied()
            .filter(|&id| {
                let found = lakes.iter().any(|l| l.lake_id == id);
                if !found {
                    unknown(report, id, "待合并湖泊不存在");
                }
                found && id != group.keep
            })
            .collect();
        if absorb.is_empty() {
            continue;
        }

        let members: Vec<&Lake> = lakes
            .iter()
            .filter(|l| l.lake_id == group.keep || absorb.contains(&l.lake_id))
            .collect();
        let parts: Vec<_> = members.iter().map(|l| &l.geometry).collect();
        let geometry = engine.dissolve(&parts)?;
        let area: f64 = members.iter().map(|l| l.unit_area).sum();

        if geometry.0.len() > 1 {
            warn!("湖泊 {} 合并后仍有 {} 个分离部分", group.keep, geometry.0.len());
            report.add_warning(ValidationWarning::DataQuality {
                layer: LAKES,
                element_id: Some(group.keep),
                message: format!("合并后仍有 {} 个分离部分", geometry.0.len()),
            });
        }

        let kept = &mut lakes[keep];
        kept.geometry = geometry;
        kept.unit_area = area;
        lakes.retain(|l| !absorb.contains(&l.lake_id));

        info!("湖泊 {} 合并了 {:?}", group.keep, absorb);
        stats.merged_groups += 1;
        stats.absorbed += absorb.len();
    }

    let remove: BTreeSet<i64> = corrections.remove.iter().copied().collect();
    for &id in &remove {
        if !lakes.iter().any(|l| l.lake_id == id) {
            unknown(report, id, "待删除湖泊不存在");
        }
    }
    let before = lakes.len();
    lakes.retain(|l| !remove.contains(&l.lake_id));
    stats.removed = before - lakes.len();

    info!(
        "湖泊修正: 合并 {} 组（吸收 {} 个）, 删除 {} 个, 剩余 {} 个",
        stats.merged_groups,
        stats.absorbed,
        stats.removed,
        lakes.len()
    );
    Ok((lakes, stats))
}

fn unknown(report: &mut ValidationReport, id: i64, message: &str) {
    warn!("湖泊修正: {id} {message}");
    report.add_warning(ValidationWarning::DataQuality {
        layer: LAKES,
        element_id: Some(id),
        message: message.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use rl_config::MergeGroup;
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

    fn sample() -> Vec<Lake> {
        vec![
            Lake::new(6, 1.0, false, rect(0.0, 0.0, 1.0, 1.0)),
            Lake::new(8, 2.0, true, rect(1.0, 0.0, 3.0, 1.0)),
            Lake::new(50, 0.5, false, rect(5.0, 5.0, 6.0, 6.0)),
        ]
    }

    #[test]
    fn test_merge_then_remove() {
        let corrections = LakeCorrectionConfig {
            remove: vec![50],
            merge: vec![MergeGroup {
                keep: 8,
                absorb: vec![6],
            }],
        };
        let mut report = ValidationReport::new();
        let (lakes, stats) =
            apply_lake_corrections(&PlanarEngine, sample(), &corrections, &mut report).unwrap();

        assert_eq!(lakes.len(), 1);
        let merged = &lakes[0];
        assert_eq!(merged.lake_id, 8);
        assert!(merged.exorheic);
        assert_eq!(merged.unit_area, 3.0);
        assert!((PlanarEngine.area(&merged.geometry) - 3.0).abs() < 1e-9);
        assert_eq!(merged.geometry.0.len(), 1);
        assert_eq!(
            stats,
            CorrectionStats {
                merged_groups: 1,
                absorbed: 1,
                removed: 1
            }
        );
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_unknown_ids_are_warnings() {
        let corrections = LakeCorrectionConfig {
            remove: vec![999],
            merge: vec![MergeGroup {
                keep: 1234,
                absorb: vec![6],
            }],
        };
        let mut report = ValidationReport::new();
        let (lakes, stats) =
            apply_lake_corrections(&PlanarEngine, sample(), &corrections, &mut report).unwrap();
        assert_eq!(lakes, sample());
        assert_eq!(stats, CorrectionStats::default());
        assert_eq!(report.warning_count(), 2);
    }

    #[test]
    fn test_merge_with_gap_keeps_parts_and_warns() {
        let lakes = vec![
            Lake::new(6, 1.0, true, rect(0.0, 0.0, 1.0, 1.0)),
            Lake::new(8, 1.0, false, rect(1.00001, 0.0, 2.0, 1.0)),
        ];
        let corrections = LakeCorrectionConfig {
            remove: Vec::new(),
            merge: vec![MergeGroup {
                keep: 6,
                absorb: vec![8],
            }],
        };
        let mut report = ValidationReport::new();
        let (lakes, stats) =
            apply_lake_corrections(&PlanarEngine, lakes, &corrections, &mut report).unwrap();

        assert_eq!(stats.merged_groups, 1);
        assert_eq!(lakes.len(), 1);
        assert_eq!(lakes[0].geometry.0.len(), 2);
        assert_eq!(lakes[0].unit_area, 2.0);
        assert_eq!(report.warning_count(), 1);
        assert!(report.to_string().contains("2 个分离部分"));
    }
}
