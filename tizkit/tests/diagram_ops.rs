use tizkit::{
    ConnectionKind, ConnectionPatch, ConnectionStyle, Diagram, DiagramError, NodePatch, ShapeKind,
};

fn style(kind: ConnectionKind) -> ConnectionStyle {
    ConnectionStyle { kind, ..ConnectionStyle::default() }
}

/// a -> b -> c, plus a lone node d.
fn chain() -> (Diagram, [u32; 4], [u32; 2]) {
    let mut d = Diagram::new();
    let a = d.add_node(ShapeKind::Rectangle, 0.0, 0.0).unwrap();
    let b = d.add_node(ShapeKind::Circle, 200.0, 0.0).unwrap();
    let c = d.add_node(ShapeKind::Diamond, 200.0, 200.0).unwrap();
    let e = d.add_node(ShapeKind::Rectangle, 400.0, 400.0).unwrap();
    let ab = d.connect(a, b, style(ConnectionKind::Arrow)).unwrap();
    let bc = d.connect(b, c, style(ConnectionKind::Line)).unwrap();
    (d, [a, b, c, e], [ab, bc])
}

#[test]
fn new_nodes_get_defaults() {
    let mut d = Diagram::new();
    let id = d.add_node(ShapeKind::Circle, 10.0, 20.0).unwrap();
    let n = d.node(id).unwrap();
    assert_eq!((n.width, n.height), (80.0, 80.0));
    assert_eq!(n.label, "New Node");
    assert_eq!(n.fill_color, "#f5f5f5");
    assert_eq!(n.stroke_width, 2.0);
    let r = d.add_node(ShapeKind::Rectangle, 0.0, 0.0).unwrap();
    assert_eq!(d.node(r).map(|n| (n.width, n.height)), Some((100.0, 60.0)));
}

#[test]
fn deleting_a_node_cascades_to_its_connections() {
    let (mut d, [a, b, c, _], [ab, bc]) = chain();
    let mut removed = d.delete_node(b).unwrap();
    removed.sort();
    assert_eq!(removed, vec![ab, bc]);
    assert!(d.connection(ab).is_none() && d.connection(bc).is_none());
    assert!(d.incident_connections(a).is_empty());
    assert!(d.incident_connections(c).is_empty());
    assert!(d.validate().is_ok());
    assert!(matches!(d.delete_node(b), Err(DiagramError::InvalidId { .. })));
}

#[test]
fn ids_are_not_reused() {
    let (mut d, [_, b, _, _], _) = chain();
    d.delete_node(b).unwrap();
    let fresh = d.add_node(ShapeKind::Circle, 0.0, 0.0).unwrap();
    assert_ne!(fresh, b);
}

#[test]
fn moving_a_node_only_touches_incident_connections() {
    let (mut d, [a, _, c, e], [ab, bc]) = chain();
    let before_bc = d.connection(bc).cloned().unwrap();
    let before_ab = d.connection(ab).cloned().unwrap();
    assert_eq!(d.move_node(a, 0.0, 150.0).unwrap(), 1);
    assert_eq!(d.connection(bc), Some(&before_bc));
    assert_ne!(d.connection(ab).map(|c| c.from_point), Some(before_ab.from_point));
    assert_eq!(d.move_node(e, 10.0, 10.0).unwrap(), 0);
    assert_eq!(d.move_node(c, 300.0, 300.0).unwrap(), 1);
    assert!(d.validate().is_ok());
}

#[test]
fn connect_rejects_bad_endpoints() {
    let (mut d, [a, _, _, _], _) = chain();
    let ver = d.version();
    assert!(matches!(
        d.connect(a, a, ConnectionStyle::default()),
        Err(DiagramError::SelfConnection { node }) if node == a
    ));
    assert!(matches!(
        d.connect(a, 99, ConnectionStyle::default()),
        Err(DiagramError::InvalidId { kind: "node", id: 99 })
    ));
    let wide = ConnectionStyle { stroke_width: f32::NAN, ..ConnectionStyle::default() };
    assert!(matches!(d.connect(a, 1, wide), Err(DiagramError::NonFinite { .. })));
    assert_eq!(d.version(), ver);
}

#[test]
fn parallel_connections_are_allowed() {
    let (mut d, [a, b, _, _], _) = chain();
    d.connect(a, b, ConnectionStyle::default()).unwrap();
    d.connect(b, a, ConnectionStyle::default()).unwrap();
    assert_eq!(d.connection_count(), 4);
    assert_eq!(d.incident_connections(a).len(), 3);
}

#[test]
fn node_patch_resizes_and_reanchors() {
    let (mut d, [a, _, _, _], [ab, _]) = chain();
    let patch = NodePatch { width: Some(300.0), label: Some("Start".into()), ..Default::default() };
    d.update_node(a, patch).unwrap();
    let n = d.node(a).unwrap();
    assert_eq!((n.width, n.label.as_str()), (300.0, "Start"));
    assert!(d.validate().is_ok());
    assert!((d.connection(ab).unwrap().from_point.x - 300.0).abs() < 1e-3);

    let bad = NodePatch { height: Some(-1.0), ..Default::default() };
    assert!(matches!(d.update_node(a, bad), Err(DiagramError::OutOfRange { param: "height", .. })));
    assert_eq!(d.node(a).unwrap().height, 60.0);
}

#[test]
fn connection_patch_changes_style() {
    let (mut d, _, [ab, _]) = chain();
    let patch = ConnectionPatch {
        kind: Some(ConnectionKind::Line),
        color: Some("#ff0000".into()),
        stroke_width: Some(4.0),
    };
    d.update_connection(ab, patch).unwrap();
    let c = d.connection(ab).unwrap();
    assert_eq!((c.kind, c.color.as_str(), c.stroke_width), (ConnectionKind::Line, "#ff0000", 4.0));
    assert!(d.update_connection(77, ConnectionPatch::default()).is_err());
}

#[test]
fn delete_connection_unlinks_both_ends() {
    let (mut d, [a, b, _, _], [ab, bc]) = chain();
    d.delete_connection(ab).unwrap();
    assert!(d.incident_connections(a).is_empty());
    assert_eq!(d.incident_connections(b), &[bc]);
    assert!(d.delete_connection(ab).is_err());
}

#[test]
fn grid_layout_places_nodes_and_reanchors() {
    let (mut d, ids, _) = chain();
    d.apply_grid_layout();
    let pos: Vec<_> = ids.iter().map(|&id| d.node(id).map(|n| (n.x, n.y)).unwrap()).collect();
    assert_eq!(pos, vec![(0.0, 0.0), (150.0, 0.0), (0.0, 100.0), (150.0, 100.0)]);
    assert!(d.validate().is_ok());
}

#[test]
fn stats_count_by_type() {
    let (d, _, _) = chain();
    let s = d.stats();
    assert_eq!((s.nodes, s.connections), (4, 2));
    assert_eq!(s.node_types.get(&ShapeKind::Rectangle), Some(&2));
    assert_eq!(s.node_types.get(&ShapeKind::Diamond), Some(&1));
    assert_eq!(s.connection_types.get(&ConnectionKind::Line), Some(&1));
}

#[test]
fn bulk_edits_bump_version() {
    let (mut d, _, _) = chain();
    let v = d.version();
    d.remove_all_borders();
    assert!(d.nodes().all(|(_, n)| n.stroke_width == 0.0));
    assert!(d.version() > v);
    let v = d.version();
    d.clear();
    assert!(d.version() > v);
    assert_eq!((d.node_count(), d.connection_count()), (0, 0));
    assert!(d.validate().is_ok());
}

#[test]
fn ids_survive_a_clear() {
    let (mut d, ids, conns) = chain();
    d.clear();
    let fresh = d.add_node(ShapeKind::Circle, 0.0, 0.0).unwrap();
    assert!(!ids.contains(&fresh));
    let other = d.add_node(ShapeKind::Circle, 300.0, 0.0).unwrap();
    let c = d.connect(fresh, other, ConnectionStyle::default()).unwrap();
    assert!(!conns.contains(&c));
    assert!(d.node(ids[0]).is_none());
    assert!(d.validate().is_ok());
}

#[test]
fn add_node_checks_bounds_and_caps() {
    let mut d = Diagram::new();
    let ver = d.version();
    assert!(matches!(
        d.add_node(ShapeKind::Circle, 5.0e6, 0.0),
        Err(DiagramError::OutOfRange { param: "x", .. })
    ));
    assert!(matches!(
        d.add_node(ShapeKind::Circle, 0.0, f32::NAN),
        Err(DiagramError::NonFinite { param: "y" })
    ));
    assert_eq!((d.node_count(), d.version()), (0, ver));

    for i in 0..20_000 {
        d.add_node(ShapeKind::Rectangle, (i % 100) as f32, (i / 100) as f32).unwrap();
    }
    assert!(matches!(
        d.add_node(ShapeKind::Rectangle, 0.0, 0.0),
        Err(DiagramError::CapsExceeded { what: "nodes", .. })
    ));
}

#[test]
fn connection_colors_are_length_capped() {
    let (mut d, [a, b, _, _], [ab, _]) = chain();
    let long = "#".repeat(65);
    let style = ConnectionStyle { color: long.clone(), ..ConnectionStyle::default() };
    assert!(matches!(d.connect(a, b, style), Err(DiagramError::CapsExceeded { what: "color length", .. })));
    let patch = ConnectionPatch { color: Some(long), ..Default::default() };
    assert!(matches!(
        d.update_connection(ab, patch),
        Err(DiagramError::CapsExceeded { what: "color length", .. })
    ));
    assert_eq!(d.connection(ab).unwrap().color, "#000000");
}
