#[test]
fn version_matches_cargo_pkg_version() {
    assert_eq!(narwhal::VERSION, env!("CARGO_PKG_VERSION"));
    assert_eq!(narwhal::VERSION, narwhal::graph::VERSION);
}
