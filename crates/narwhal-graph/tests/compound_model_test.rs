use narwhal_graph::{ClusterId, Edge, GraphManager, ModelError, Node, Rect, Transform, Point};

fn rect_node(x: f64, y: f64, w: f64, h: f64) -> Node {
    Node::new(Rect::new(x, y, w, h))
}

#[test]
fn compound_bounds_follow_children() {
    let mut gm = GraphManager::new();
    let root = gm.add_root();
    let c = gm.add_node(root, rect_node(0.0, 0.0, 1.0, 1.0));
    let inner = gm.add_graph(c);
    gm.add_node(inner, rect_node(10.0, 10.0, 20.0, 20.0));
    gm.add_node(inner, rect_node(60.0, 30.0, 20.0, 20.0));

    gm.update_bounds();

    let compound = gm[c].rect;
    assert_eq!(compound.left(), 0.0);
    assert_eq!(compound.top(), 0.0);
    assert_eq!(compound.width, 70.0 + 20.0);
    assert_eq!(compound.height, 40.0 + 20.0 + 20.0);
}

#[test]
fn every_listed_edge_is_indexed_once() {
    let mut gm = GraphManager::new();
    let root = gm.add_root();
    let a = gm.add_node(root, rect_node(0.0, 0.0, 10.0, 10.0));
    let b = gm.add_node(root, rect_node(0.0, 0.0, 10.0, 10.0));
    let c = gm.add_node(root, rect_node(0.0, 0.0, 10.0, 10.0));
    let inner = gm.add_graph(c);
    let d = gm.add_node(inner, rect_node(0.0, 0.0, 10.0, 10.0));

    let ab = gm.add_edge(a, b, Edge::new());
    let bd = gm.add_edge(b, d, Edge::new());
    let loop_edge = gm.add_edge(d, d, Edge::new());

    let all = gm.all_edges();
    assert_eq!(all.len(), 3);
    for e in [ab, bd, loop_edge] {
        assert_eq!(all.iter().filter(|&&x| x == e).count(), 1);
    }
    assert_eq!(gm[d].edges(), &[bd, loop_edge]);
    assert_eq!(gm.neighbors(d), vec![b]);
    assert_eq!(gm.edges_between(b, a), vec![ab]);
    assert_eq!(gm.edge_list_to_node(b, a), Vec::new());
    gm.validate().unwrap();
}

#[test]
fn validate_reports_missing_root() {
    let gm = GraphManager::new();
    assert_eq!(gm.validate(), Err(ModelError::MissingRoot));
}

#[test]
fn reconnect_moves_edge_between_lists() {
    let mut gm = GraphManager::new();
    let root = gm.add_root();
    let a = gm.add_node(root, rect_node(0.0, 0.0, 10.0, 10.0));
    let c = gm.add_node(root, rect_node(0.0, 0.0, 10.0, 10.0));
    let inner = gm.add_graph(c);
    let d = gm.add_node(inner, rect_node(0.0, 0.0, 10.0, 10.0));

    let e = gm.add_edge(a, c, Edge::new());
    assert!(gm[root].edges().contains(&e));

    gm.reconnect_edge(e, a, d);
    assert!(gm[e].is_inter_graph());
    assert!(!gm[root].edges().contains(&e));
    assert!(gm[c].edges().is_empty());
    assert_eq!(gm[d].edges(), &[e]);
}

#[test]
fn removing_root_graph_empties_the_tree() {
    let mut gm = GraphManager::new();
    let root = gm.add_root();
    let a = gm.add_node(root, rect_node(0.0, 0.0, 10.0, 10.0));
    let b = gm.add_node(root, rect_node(0.0, 0.0, 10.0, 10.0));
    gm.add_edge(a, b, Edge::new());

    gm.remove_graph(root);
    assert!(gm.root().is_none());
    assert!(gm.all_nodes().is_empty());
    assert!(gm.all_edges().is_empty());
}

#[test]
fn nodes_relocate_through_transform() {
    let mut gm = GraphManager::new();
    let root = gm.add_root();
    let a = gm.add_node(root, rect_node(130.0, 70.0, 10.0, 10.0));
    let b = gm.add_node(root, rect_node(200.0, 90.0, 10.0, 10.0));

    let left_top = gm.update_left_top(root).unwrap();
    assert_eq!(left_top, Point::new(115.0, 55.0));

    let t = Transform::translation(Point::new(0.0, 0.0), left_top);
    for n in [a, b] {
        gm[n].transform(&t);
    }
    assert_eq!(gm[a].location(), Point::new(15.0, 15.0));
    assert_eq!(gm[b].location(), Point::new(85.0, 35.0));
}

#[test]
fn clusters_survive_node_removal_bookkeeping() {
    let mut gm = GraphManager::new();
    let root = gm.add_root();
    let a = gm.add_node(root, rect_node(0.0, 0.0, 10.0, 10.0));
    let b = gm.add_node(root, rect_node(20.0, 0.0, 10.0, 10.0));
    gm.add_node_to_cluster(a, ClusterId(2));
    gm.add_node_to_cluster(b, ClusterId(2));

    gm.remove_node(a);
    let cluster = gm.cluster_manager().cluster(ClusterId(2)).unwrap();
    assert_eq!(cluster.nodes().iter().copied().collect::<Vec<_>>(), vec![b]);

    gm.reset_clusters(b);
    assert!(gm.cluster_manager().cluster(ClusterId(2)).unwrap().nodes().is_empty());
}
