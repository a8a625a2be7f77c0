use narwhal::graph::{Edge, GraphManager, Node, Point};
use narwhal::{BEND_DUMMY, LayoutOptions, layout_cose};

fn no_dummies_left(gm: &GraphManager) -> bool {
    gm.all_nodes().iter().all(|&n| !gm[n].kind_is(BEND_DUMMY))
}

#[test]
fn self_loops_and_multi_edges_get_bend_points() {
    let mut gm = GraphManager::new();
    let root = gm.add_root();
    let a = gm.add_node(root, Node::sized(20.0, 20.0));
    let b = gm.add_node(root, Node::sized(20.0, 20.0));
    let c = gm.add_node(root, Node::sized(20.0, 20.0));
    let looped = gm.add_edge(a, a, Edge::new());
    let first = gm.add_edge(a, b, Edge::new());
    let second = gm.add_edge(b, a, Edge::new());
    let plain = gm.add_edge(b, c, Edge::new());

    let options = LayoutOptions {
        create_bends_as_needed: true,
        ..LayoutOptions::default()
    };
    layout_cose(&mut gm, options).unwrap();

    assert_eq!(gm[looped].bendpoints.len(), 2);
    assert_eq!(gm[first].bendpoints.len(), 1);
    assert_eq!(gm[second].bendpoints.len(), 1);
    assert!(gm[plain].bendpoints.is_empty());

    assert!(no_dummies_left(&gm));
    assert_eq!(gm.all_nodes().len(), 3);
    assert_eq!(gm.all_edges().len(), 4);
    assert_eq!((gm[first].source(), gm[first].target()), (Some(a), Some(b)));
    assert_eq!((gm[second].source(), gm[second].target()), (Some(b), Some(a)));
}

#[test]
fn given_bend_points_follow_their_dummy_nodes() {
    let mut gm = GraphManager::new();
    let root = gm.add_root();
    let a = gm.add_node(root, Node::sized(20.0, 20.0));
    let b = gm.add_node(root, Node::sized(20.0, 20.0));
    let bent = gm.add_edge(
        a,
        b,
        Edge::new().with_bendpoints(vec![Point::new(-500.0, -500.0)]),
    );

    layout_cose(&mut gm, LayoutOptions::default()).unwrap();

    assert!(no_dummies_left(&gm));
    let bend = gm[bent].bendpoints[0];
    assert!(bend.x > 0.0 && bend.y > 0.0, "bend point left at {bend:?}");
    assert_eq!(gm[a].edges(), &[bent]);
    assert_eq!(gm[b].edges(), &[bent]);
}
