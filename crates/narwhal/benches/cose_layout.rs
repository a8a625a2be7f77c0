use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use narwhal::graph::{Edge, GraphManager, Node};
use narwhal::{LayoutOptions, layout_cose};
use std::hint::black_box;
use std::time::Duration;

#[derive(Debug, Clone)]
struct GraphSpec {
    node_count: usize,
    edges: Vec<(usize, usize)>,
    /// Nodes `0..nested` are moved into compounds of four.
    nested: usize,
}

impl GraphSpec {
    fn build(&self) -> GraphManager {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let mut ids = Vec::with_capacity(self.node_count);
        let mut compound_graph = None;
        for i in 0..self.node_count {
            let graph = if i < self.nested {
                if i % 4 == 0 {
                    let c = gm.add_node(root, Node::sized(40.0, 40.0));
                    compound_graph = Some(gm.add_graph(c));
                }
                compound_graph.unwrap_or(root)
            } else {
                root
            };
            ids.push(gm.add_node(graph, Node::sized(30.0, 20.0)));
        }
        for &(from, to) in &self.edges {
            if from < ids.len() && to < ids.len() && from != to {
                gm.add_edge(ids[from], ids[to], Edge::new());
            }
        }
        gm
    }
}

fn build_mesh_spec(node_count: usize, nested: usize) -> GraphSpec {
    let mut edges = Vec::new();
    // A spine to guarantee connectivity.
    for i in 0..node_count.saturating_sub(1) {
        edges.push((i, i + 1));
    }
    for i in (0..node_count).step_by(3) {
        edges.push((i, (i * 7 + 5) % node_count));
    }
    GraphSpec {
        node_count,
        edges,
        nested,
    }
}

fn bench_cose(c: &mut Criterion) {
    let mut group = c.benchmark_group("cose");
    group.measurement_time(Duration::from_secs(10));

    let cases = [
        ("flat_50", 50usize, 0usize),
        ("flat_200", 200, 0),
        ("compound_200", 200, 80),
    ];

    for (name, nodes, nested) in cases {
        let spec = build_mesh_spec(nodes, nested);
        group.bench_with_input(BenchmarkId::new("layout_cose", name), &spec, |b, spec| {
            b.iter_batched(
                || spec.build(),
                |mut gm| {
                    let stats = layout_cose(black_box(&mut gm), LayoutOptions::default());
                    black_box(stats.is_ok());
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cose);
criterion_main!(benches);
