// crates/rl_network/tests/burn_lakes.rs

//! 湖泊嵌入端到端测试
//!
//! 基础网络：1 -> 3, 2 -> 3, 3 -> 终点，三个河段在 (1, 1) 汇合。

use geo::{line_string, polygon, MultiLineString, MultiPolygon};
use rl_geo::PlanarEngine;
use rl_network::checker::{check_topology, CheckOptions};
use rl_network::prelude::*;
use rl_network::rewrite::rewrite;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x0, y: y0),
        (x: x1, y: y0),
        (x: x1, y: y1),
        (x: x0, y: y1),
        (x: x0, y: y0),
    ]])
}

fn line(from: (f64, f64), to: (f64, f64)) -> MultiLineString<f64> {
    MultiLineString::new(vec![line_string![(x: from.0, y: from.1), (x: to.0, y: to.1)]])
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn confluence_catchments() -> Vec<Catchment> {
    vec![
        Catchment::new(1, 1.0, Some(rect(0.0, 1.0, 1.0, 2.0))),
        Catchment::new(2, 1.0, Some(rect(1.0, 1.0, 2.0, 2.0))),
        Catchment::new(3, 2.0, Some(rect(0.0, 0.0, 2.0, 1.0))),
    ]
}

fn confluence_rivers(up1: f64, up2: f64) -> Vec<Segment> {
    vec![
        Segment::new(1, Downstream::To(3), 2f64.sqrt())
            .with_unit_area(1.0)
            .with_uparea(up1)
            .with_channel(line((0.0, 2.0), (1.0, 1.0))),
        Segment::new(2, Downstream::To(3), 2f64.sqrt())
            .with_unit_area(1.0)
            .with_uparea(up2)
            .with_channel(line((2.0, 2.0), (1.0, 1.0))),
        Segment::new(3, Downstream::Terminal, 1.0)
            .with_unit_area(2.0)
            .with_uparea(up1 + up2 + 2.0)
            .with_channel(line((1.0, 1.0), (1.0, 0.0))),
    ]
}

fn river(rivers: &[Segment], id: ReachId) -> &Segment {
    rivers.iter().find(|s| s.id == id).unwrap()
}

#[test]
fn test_lake_at_confluence_end_to_end() {
    let catchments = confluence_catchments();
    let rivers = confluence_rivers(1.0, 1.0);
    let lakes = vec![Lake::new(900, 0.16, true, rect(0.8, 0.8, 1.2, 1.2))];

    let out = burn_lakes(&PlanarEngine, &catchments, &rivers, &lakes, &BurnOptions::default())
        .unwrap();

    assert_eq!(out.filter_stats.endpoint_contact, 1);
    assert_eq!(out.lake_nodes.len(), 1);
    let node = &out.lake_nodes[0];
    assert_eq!(node.node_id, 4);
    assert_eq!(node.outlet, Some(3));
    assert_eq!(node.inflows, vec![1, 2]);

    assert_eq!(river(&out.rivers, 1).next, Downstream::To(4));
    assert_eq!(river(&out.rivers, 2).next, Downstream::To(4));
    assert_eq!(river(&out.rivers, 3).next, Downstream::Terminal);
    assert_eq!(river(&out.rivers, 4).next, Downstream::To(3));
    assert!(river(&out.rivers, 4).is_lake);
    assert!(river(&out.rivers, 3).outflow);
    assert!(!river(&out.rivers, 3).inflow);

    // 总面积守恒：湖泊覆盖的部分转移到湖泊节点
    assert!(approx(river(&out.rivers, 3).uparea, 4.0));
    assert!(approx(river(&out.rivers, 4).uparea, 0.16 + 0.96 + 0.96));
    assert!(approx(river(&out.rivers, 1).length_ratio, 0.8));
    assert!(approx(river(&out.rivers, 3).length_ratio, 0.8));

    let cat1 = out.catchments.iter().find(|c| c.id == 1).unwrap();
    assert!(approx(cat1.area_ratio, 0.96));
    assert!(approx(cat1.unit_area, 0.96));

    assert_eq!(river(&out.rivers, 3).upstream, vec![4]);
    let mut lake_up = river(&out.rivers, 4).upstream.clone();
    lake_up.sort_unstable();
    assert_eq!(lake_up, vec![1, 2]);
    assert_eq!(out.upstream_width, 2);
    assert_eq!(out.report.outlets_checked, 1);
}

#[test]
fn test_lake_node_exempt_from_subset_check() {
    // 湖泊只接触 1 和 2，不接触 3
    let catchments = confluence_catchments();
    let rivers = confluence_rivers(1.0, 1.0);
    let lakes = vec![Lake::new(900, 0.36, true, rect(0.5, 1.2, 1.5, 1.8))];

    let out = rewrite(&PlanarEngine, &catchments, &rivers, &lakes).unwrap();
    let node = &out.lake_nodes[0];
    // 同值取最小标识
    assert_eq!(node.outlet, Some(1));
    assert_eq!(river(&out.rivers, 1).next, Downstream::To(3));
    assert_eq!(river(&out.rivers, 2).next, Downstream::To(node.node_id));

    let report = check_topology(
        &out.rivers,
        &rivers,
        &out.lake_nodes,
        &out.catchments,
        &CheckOptions::default(),
    )
    .unwrap();
    assert_eq!(report.outlets_checked, 1);
}

#[test]
fn test_endorheic_lake_becomes_outlet() {
    let catchments = confluence_catchments();
    let rivers = confluence_rivers(1.0, 1.0);
    let lakes = vec![Lake::new(900, 0.16, false, rect(0.8, 0.8, 1.2, 1.2))];

    let out = rewrite(&PlanarEngine, &catchments, &rivers, &lakes).unwrap();
    let node = &out.lake_nodes[0];
    assert_eq!(node.outlet, None);
    assert_eq!(node.inflows, vec![1, 2, 3]);
    assert!(out.rivers[..3].iter().all(|s| s.next == Downstream::To(4)));
    assert_eq!(river(&out.rivers, 4).next, Downstream::Terminal);
    assert!(out.rivers.iter().all(|s| !s.outflow));

    // 原出口 3 失去全部祖先，子集检查仍然通过
    let report = check_topology(
        &out.rivers,
        &rivers,
        &out.lake_nodes,
        &out.catchments,
        &CheckOptions::default(),
    )
    .unwrap();
    assert_eq!(report.outlets_checked, 0);
}

#[test]
fn test_exorheic_outlet_is_largest_uparea() {
    let catchments: Vec<Catchment> = (1..=4)
        .map(|id| Catchment::new(id, 1.0, None))
        .collect();
    let mut rivers: Vec<Segment> = [(1, 10.0), (2, 50.0), (3, 20.0)]
        .iter()
        .map(|&(id, up)| {
            let x = id as f64;
            Segment::new(id, Downstream::To(4), 2.0)
                .with_uparea(up)
                .with_channel(line((x, 2.0), (x, 0.0)))
        })
        .collect();
    rivers.push(
        Segment::new(4, Downstream::Terminal, 4.0)
            .with_uparea(81.0)
            .with_channel(line((0.0, -1.0), (4.0, -1.0))),
    );
    let lakes = vec![
        Lake::new(78, 1.0, true, rect(20.0, 20.0, 21.0, 21.0)),
        Lake::new(77, 1.5, true, rect(0.5, 1.0, 3.5, 1.5)),
    ];

    let out = rewrite(&PlanarEngine, &catchments, &rivers, &lakes).unwrap();
    let node = &out.lake_nodes[0];
    assert_eq!(node.lake_id, 77);
    assert!(!node.is_isolated());
    assert_eq!(node.outlet, Some(2));
    assert_eq!(node.inflows, vec![1, 3]);
    assert_eq!(river(&out.rivers, 2).next, Downstream::To(4));
    assert_eq!(river(&out.rivers, 5).next, Downstream::To(2));
    assert_eq!(river(&out.rivers, 1).next, Downstream::To(5));
    assert_eq!(river(&out.rivers, 3).next, Downstream::To(5));
    assert!(out.rivers.iter().all(|s| !s.inoutflow));

    // 不接触任何河段的湖泊排在最后，成为孤立节点
    let isolated = &out.lake_nodes[1];
    assert_eq!(isolated.lake_id, 78);
    assert_eq!(isolated.node_id, 6);
    assert!(isolated.is_isolated());
    assert_eq!(river(&out.rivers, 6).next, Downstream::Terminal);
}

#[test]
fn test_fully_submerged_segment() {
    let catchments = vec![
        Catchment::new(1, 1.0, Some(rect(0.0, 0.0, 1.0, 1.0))),
        Catchment::new(2, 2.0, Some(rect(1.0, 0.0, 3.0, 1.0))),
    ];
    let rivers = vec![
        Segment::new(1, Downstream::To(2), 0.6)
            .with_unit_area(1.0)
            .with_uparea(1.0)
            .with_channel(line((0.2, 0.5), (0.8, 0.5))),
        Segment::new(2, Downstream::Terminal, 1.2)
            .with_unit_area(2.0)
            .with_uparea(3.0)
            .with_channel(line((0.8, 0.5), (2.0, 0.5))),
    ];
    let lakes = vec![Lake::new(5, 1.0, false, rect(0.0, 0.0, 1.0, 1.0))];

    let out = rewrite(&PlanarEngine, &catchments, &rivers, &lakes).unwrap();

    let r1 = river(&out.rivers, 1);
    assert_eq!(r1.length_ratio, 0.0);
    assert_eq!(r1.length, 0.0);
    assert!(r1.geometry.is_none());

    let r2 = river(&out.rivers, 2);
    assert!(approx(r2.length_ratio, 1.0 - 0.2 / 1.2));
    assert!(approx(r2.length, 1.0));

    let c1 = &out.catchments[0];
    assert_eq!(c1.area_ratio, 0.0);
    assert_eq!(c1.unit_area, 0.0);
    assert!(c1.geometry.is_none());
    assert_eq!(out.catchments[1].area_ratio, 1.0);
}

#[test]
fn test_no_touching_lake_is_noop() {
    let catchments = confluence_catchments();
    let rivers = confluence_rivers(1.0, 1.0);
    let lakes = vec![Lake::new(900, 1.0, true, rect(10.0, 10.0, 11.0, 11.0))];

    let out = rewrite(&PlanarEngine, &catchments, &rivers, &lakes).unwrap();
    assert_eq!(out.rivers.len(), rivers.len());
    assert!(out.lake_nodes.is_empty());
    for (before, after) in rivers.iter().zip(&out.rivers) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.next, after.next);
        assert_eq!(before.length, after.length);
        assert_eq!(before.geometry, after.geometry);
    }
    assert_eq!(out.catchments, catchments);
    assert!(approx(river(&out.rivers, 3).uparea, 4.0));

    // 再跑一次结果不变
    let again = rewrite(&PlanarEngine, &out.catchments, &out.rivers, &lakes).unwrap();
    assert_eq!(again.rivers, out.rivers);
}

#[test]
fn test_cycle_in_input_is_error() {
    let catchments = vec![Catchment::new(1, 1.0, None), Catchment::new(2, 1.0, None)];
    let rivers = vec![
        Segment::new(1, Downstream::To(2), 1.0),
        Segment::new(2, Downstream::To(1), 1.0),
    ];
    let err = rewrite(&PlanarEngine, &catchments, &rivers, &[]).unwrap_err();
    assert!(matches!(err, NetworkError::Cycle { .. }));
}

fn tied_chain(up1: f64, up2: f64) -> (Vec<Catchment>, Vec<Segment>) {
    let catchments = vec![Catchment::new(1, 5.0, None), Catchment::new(2, 0.0, None)];
    let rivers = vec![
        Segment::new(1, Downstream::To(2), 1.0)
            .with_unit_area(5.0)
            .with_uparea(up1)
            .with_channel(line((0.0, 1.0), (1.0, 1.0))),
        Segment::new(2, Downstream::Terminal, 1.0)
            .with_uparea(up2)
            .with_channel(line((1.0, 1.0), (2.0, 1.0))),
    ];
    (catchments, rivers)
}

#[test]
fn test_tied_uparea_prefers_downstream_outlet() {
    // 下游子流域面积为 0，上下游 uparea 相同
    let (catchments, rivers) = tied_chain(5.0, 5.0);
    let lakes = vec![Lake::new(60, 0.16, true, rect(0.8, 0.8, 1.2, 1.2))];

    let out = rewrite(&PlanarEngine, &catchments, &rivers, &lakes).unwrap();
    let node = &out.lake_nodes[0];
    assert_eq!(node.node_id, 3);
    assert_eq!(node.outlet, Some(2));
    assert_eq!(node.inflows, vec![1]);
    assert_eq!(river(&out.rivers, 1).next, Downstream::To(3));
    assert_eq!(river(&out.rivers, 3).next, Downstream::To(2));
    assert_eq!(river(&out.rivers, 2).next, Downstream::Terminal);

    let report = check_topology(
        &out.rivers,
        &rivers,
        &out.lake_nodes,
        &out.catchments,
        &CheckOptions::default(),
    )
    .unwrap();
    assert_eq!(report.outlets_checked, 1);
}

#[test]
fn test_outlet_pointer_leaves_touching_set() {
    // 输入 uparea 上游大于下游，出口原指针指向另一个相交河段
    let (catchments, rivers) = tied_chain(9.0, 5.0);
    let lakes = vec![Lake::new(60, 0.16, true, rect(0.8, 0.8, 1.2, 1.2))];

    let out = rewrite(&PlanarEngine, &catchments, &rivers, &lakes).unwrap();
    assert_eq!(out.lake_nodes[0].outlet, Some(1));
    assert_eq!(river(&out.rivers, 1).next, Downstream::Terminal);
    assert_eq!(river(&out.rivers, 2).next, Downstream::To(3));
    assert_eq!(river(&out.rivers, 3).next, Downstream::To(1));
}

#[test]
fn test_adjacent_lakes_share_connector() {
    // 1 -> 2 -> 3 -> 终点，2 为极短连接段，两侧各有一个湖泊
    let catchments: Vec<Catchment> = (1..=3).map(|id| Catchment::new(id, 1.0, None)).collect();
    let rivers = vec![
        Segment::new(1, Downstream::To(2), 2.0)
            .with_unit_area(1.0)
            .with_uparea(1.0)
            .with_channel(line((0.0, 0.0), (2.0, 0.0))),
        Segment::new(2, Downstream::To(3), 0.0005)
            .with_unit_area(1.0)
            .with_uparea(2.0)
            .with_channel(line((2.0, 0.0), (2.0005, 0.0))),
        Segment::new(3, Downstream::Terminal, 1.0)
            .with_unit_area(1.0)
            .with_uparea(3.0)
            .with_channel(line((2.0005, 0.0), (3.0005, 0.0))),
    ];
    // 下游湖泊在前，插入顺序仍按 uparea
    let lakes = vec![
        Lake::new(72, 0.5, true, rect(2.0003, -0.5, 3.0, 0.5)),
        Lake::new(71, 0.5, true, rect(1.5, -0.5, 2.0002, 0.5)),
    ];

    let out = rewrite(&PlanarEngine, &catchments, &rivers, &lakes).unwrap();
    assert_eq!(out.lake_nodes.len(), 2);
    assert_eq!(out.lake_nodes[0].lake_id, 71);
    assert_eq!(out.lake_nodes[0].node_id, 4);
    assert_eq!(out.lake_nodes[0].outlet, Some(2));
    assert_eq!(out.lake_nodes[1].lake_id, 72);
    assert_eq!(out.lake_nodes[1].node_id, 5);
    assert_eq!(out.lake_nodes[1].outlet, Some(3));

    assert_eq!(river(&out.rivers, 1).next, Downstream::To(4));
    assert_eq!(river(&out.rivers, 4).next, Downstream::To(2));
    assert_eq!(river(&out.rivers, 2).next, Downstream::To(5));
    assert_eq!(river(&out.rivers, 5).next, Downstream::To(3));
    assert_eq!(river(&out.rivers, 3).next, Downstream::Terminal);

    let connector = river(&out.rivers, 2);
    assert!(connector.inflow && connector.outflow && connector.inoutflow);
    assert!(connector.length < 1e-3);
    assert!(!river(&out.rivers, 1).inoutflow);
    assert!(!river(&out.rivers, 3).inoutflow);
    assert!(approx(river(&out.rivers, 3).uparea, 4.0));

    let report = check_topology(
        &out.rivers,
        &rivers,
        &out.lake_nodes,
        &out.catchments,
        &CheckOptions::default(),
    )
    .unwrap();
    assert_eq!(report.connectors.len(), 1);
    assert_eq!(report.connectors[0].segment, 2);
    assert_eq!(report.connectors[0].lakes, vec![4, 5]);
    assert!(report.validation.has_warnings());
}
