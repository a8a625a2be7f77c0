#[test]
fn version_matches_cargo_pkg_version() {
    assert_eq!(narwhal_graph::VERSION, env!("CARGO_PKG_VERSION"));
    assert!(!narwhal_graph::VERSION.is_empty());
}
