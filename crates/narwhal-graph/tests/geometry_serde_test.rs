use narwhal_graph::{ClusterId, Dimension, GraphManager, Node, Point, Rect};

#[test]
fn rect_serializes_as_a_flat_object() {
    let json = serde_json::to_string(&Rect::new(1.0, 2.0, 3.0, 4.5)).unwrap();
    assert_eq!(json, r#"{"x":1.0,"y":2.0,"width":3.0,"height":4.5}"#);
}

#[test]
fn geometry_read_from_json_builds_nodes() {
    let rect: Rect =
        serde_json::from_str(r#"{"x": 10, "y": 20, "width": 30, "height": 40}"#).unwrap();
    let size: Dimension = serde_json::from_str(r#"{"width": 5, "height": 6}"#).unwrap();
    let center: Point = serde_json::from_value(serde_json::json!({"x": 0.5, "y": -2})).unwrap();

    let mut gm = GraphManager::new();
    let root = gm.add_root();
    let a = gm.add_node(root, Node::new(rect));
    let b = gm.add_node(root, Node::sized(size.width, size.height));
    gm[b].set_center(center.x, center.y);

    assert_eq!(gm[a].center(), Point::new(25.0, 40.0));
    assert_eq!(gm[b].rect, Rect::new(-2.0, -5.0, 5.0, 6.0));
}

#[test]
fn malformed_geometry_is_rejected() {
    assert!(serde_json::from_str::<Rect>(r#"{"x": 1, "y": 2}"#).is_err());
    assert!(serde_json::from_str::<Point>(r#"[1, 2, 3]"#).is_err());
}

#[test]
fn cluster_ids_are_plain_numbers() {
    assert_eq!(serde_json::to_string(&ClusterId(7)).unwrap(), "7");
    let id: ClusterId = serde_json::from_str("12").unwrap();
    assert_eq!(id, ClusterId(12));
}
