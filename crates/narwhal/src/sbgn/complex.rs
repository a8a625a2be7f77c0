//! Complexes are packed into fixed-size leaves before the simulation and repopulated after it.
//! Zero-degree siblings are first gathered under a temporary complex so they get packed too.

use indexmap::IndexMap;
use narwhal_graph::constants::COMPOUND_NODE_MARGIN;
use narwhal_graph::{EdgeId, GraphId, GraphManager, Node, NodeId};
use rustc_hash::FxHashSet;

use super::constants::COMPLEX_MEM_MARGIN;
use super::glyph::{COMPLEX, is_complex};
use super::polyomino::pack_members;
use super::tiling::MemberPack;
use crate::options::Compaction;

/// An edge end moved from a hidden member onto its complex.
#[derive(Debug, Clone, Copy)]
struct Redirect {
    edge: EdgeId,
    source: bool,
    node: NodeId,
}

#[derive(Debug, Default)]
pub(crate) struct ComplexState {
    dummy_complexes: Vec<NodeId>,
    /// Complexes in the order they were cleared, innermost first.
    order: Vec<NodeId>,
    child_graphs: IndexMap<NodeId, GraphId>,
    packs: IndexMap<NodeId, MemberPack>,
    emptied: IndexMap<NodeId, GraphId>,
    redirects: Vec<Redirect>,
    hidden_edges: Vec<EdgeId>,
}

/// Incident edges of `node` and of everything nested in it.
pub(crate) fn calc_graph_degree(gm: &GraphManager, node: NodeId) -> usize {
    let own = gm[node].edges().len();
    match gm[node].child() {
        Some(child) => {
            own + gm[child]
                .nodes()
                .iter()
                .map(|&n| calc_graph_degree(gm, n))
                .sum::<usize>()
        }
        None => own,
    }
}

/// Area covered by the leaves of a complex, descending into nested complexes.
pub(crate) fn calculate_used_area(gm: &GraphManager, node: NodeId) -> f64 {
    let Some(child) = gm[node].child() else {
        return 0.0;
    };
    gm[child]
        .nodes()
        .iter()
        .map(|&n| {
            let m = &gm[n];
            if is_complex(m) && m.child().is_some() {
                calculate_used_area(gm, n)
            } else {
                m.width() * m.height()
            }
        })
        .sum()
}

/// Used area over total area of the largest complex, `None` without a populated complex.
pub(crate) fn fullness(gm: &GraphManager) -> Option<f64> {
    let largest = gm
        .all_nodes()
        .iter()
        .copied()
        .filter(|&n| is_complex(&gm[n]) && gm[n].child().is_some())
        .max_by(|&a, &b| {
            let area = |n: NodeId| gm[n].width() * gm[n].height();
            area(a).total_cmp(&area(b))
        })?;
    let area = gm[largest].width() * gm[largest].height();
    (area > 0.0).then(|| calculate_used_area(gm, largest) / area)
}

/// Moves the members of `graph` so their bounding box starts just inside `comp`.
pub(crate) fn adjust_location(gm: &mut GraphManager, comp: NodeId, graph: GraphId) {
    let members = gm[graph].nodes().to_vec();
    let Some(bounds) = gm.calculate_bounds(&members) else {
        return;
    };
    let mut dx = bounds.left() - gm[comp].left();
    let mut dy = bounds.top() - gm[comp].top();
    if !is_complex(&gm[comp]) {
        dx -= COMPOUND_NODE_MARGIN;
        dy -= COMPOUND_NODE_MARGIN;
    }
    for s in members {
        let (left, top) = (gm[s].left(), gm[s].top());
        gm[s].set_location(left - dx + COMPLEX_MEM_MARGIN, top - dy + COMPLEX_MEM_MARGIN);
        if let Some(child) = gm[s].child() {
            adjust_location(gm, s, child);
        }
    }
}

impl ComplexState {
    /// Gathers the zero-degree nodes of every graph not owned by a complex under a new dummy
    /// complex, when there is more than one of them.
    pub fn group_zero_degree_members(&mut self, gm: &mut GraphManager) {
        let mut groups = Vec::new();
        for &g in gm.graphs() {
            if gm[g].parent().is_some_and(|p| is_complex(&gm[p])) {
                continue;
            }
            let zero: Vec<NodeId> = gm[g]
                .nodes()
                .iter()
                .copied()
                .filter(|&n| calc_graph_degree(gm, n) == 0)
                .collect();
            if zero.len() > 1 {
                groups.push((g, zero));
            }
        }

        for (g, members) in groups {
            let label = gm[g]
                .parent()
                .and_then(|p| gm[p].label.clone())
                .unwrap_or_else(|| "root".to_string());
            let complex = gm.add_node(
                g,
                Node::default()
                    .with_kind(COMPLEX)
                    .with_label(format!("DummyComplex_{label}")),
            );
            let child = gm.add_graph(complex);
            for m in members {
                gm.move_node_to_graph(m, child);
            }
            self.dummy_complexes.push(complex);
        }
        gm.update_bounds();
    }

    /// Clears every complex, innermost first, so each one enters the simulation as a single
    /// node sized to its packed members.
    pub fn apply_dfs_on_complexes(&mut self, gm: &mut GraphManager, compaction: Compaction) {
        let mut visited = FxHashSet::default();
        for &n in gm.all_nodes().iter() {
            if is_complex(&gm[n]) && !visited.contains(&n) {
                self.dfs_visit_complex(gm, n, &mut visited);
            }
        }
        for comp in self.order.clone() {
            self.clear_complex(gm, comp, compaction);
        }
        gm.update_bounds();
        tracing::debug!(complexes = self.order.len(), "cleared complexes");
    }

    fn dfs_visit_complex(
        &mut self,
        gm: &GraphManager,
        node: NodeId,
        visited: &mut FxHashSet<NodeId>,
    ) {
        if let Some(child) = gm[node].child() {
            for &m in gm[child].nodes() {
                if !visited.contains(&m) {
                    self.dfs_visit_complex(gm, m, visited);
                }
            }
        }
        if is_complex(&gm[node]) && visited.insert(node) {
            self.order.push(node);
        }
    }

    fn clear_complex(&mut self, gm: &mut GraphManager, comp: NodeId, compaction: Compaction) {
        let Some(child) = gm[comp].child() else {
            return;
        };
        self.child_graphs.insert(comp, child);

        let size = match compaction {
            Compaction::Polyomino => pack_members(gm, child).map(|r| (r.width, r.height)),
            Compaction::Tiling => {
                let pack = MemberPack::new(gm, child);
                let size = (pack.width(), pack.height());
                self.packs.insert(comp, pack);
                Some(size)
            }
        };

        if self.dummy_complexes.contains(&comp) {
            for n in gm[child].nodes().to_vec() {
                self.clear_dummy_complex_graphs(gm, n);
            }
        }
        self.hide_member_edges(gm, comp);
        gm.detach_child_graph(comp);

        if let Some((width, height)) = size {
            let n = &mut gm[comp];
            n.set_width(width);
            n.set_height(height);
        }
    }

    /// Edges between members of `comp` leave the model; edges leaving it are re-anchored on
    /// `comp` itself.
    fn hide_member_edges(&mut self, gm: &mut GraphManager, comp: NodeId) {
        let members: Vec<NodeId> = gm.with_children(comp).into_iter().skip(1).collect();
        let inside: FxHashSet<NodeId> = members.iter().copied().collect();

        for &d in &members {
            for e in gm[d].edges().to_vec() {
                let edge = &gm[e];
                let (Some(source), Some(target)) = (edge.source(), edge.target()) else {
                    continue;
                };
                let other = if source == d { target } else { source };
                if inside.contains(&other) {
                    if edge.is_inter_graph() {
                        gm.detach_edge(e);
                        self.hidden_edges.push(e);
                    }
                    continue;
                }
                if source == d {
                    gm.reconnect_edge(e, comp, target);
                } else {
                    gm.reconnect_edge(e, source, comp);
                }
                self.redirects.push(Redirect {
                    edge: e,
                    source: source == d,
                    node: d,
                });
            }
        }
    }

    /// Detaches the child graphs of edge-free compounds inside a dummy complex.
    fn clear_dummy_complex_graphs(&mut self, gm: &mut GraphManager, comp: NodeId) {
        let Some(child) = gm[comp].child() else {
            return;
        };
        for n in gm[child].nodes().to_vec() {
            if gm[n].child().is_some() && gm[n].edges().is_empty() {
                self.clear_dummy_complex_graphs(gm, n);
            }
        }
        if calc_graph_degree(gm, comp) == 0 {
            if let Some(graph) = gm.detach_child_graph(comp) {
                self.emptied.insert(comp, graph);
            }
        }
    }

    /// Reattaches every cleared graph, places members inside their final complex, restores
    /// hidden and re-anchored edges and dissolves the dummy complexes. Returns the fullness of
    /// the largest complex, measured before dissolving.
    pub fn repopulate(&mut self, gm: &mut GraphManager, compaction: Compaction) -> Option<f64> {
        for (&comp, &graph) in &self.emptied {
            gm.attach_child_graph(comp, graph);
        }
        for &comp in self.order.iter().rev() {
            let Some(&graph) = self.child_graphs.get(&comp) else {
                continue;
            };
            gm.attach_child_graph(comp, graph);
            match compaction {
                Compaction::Polyomino => adjust_location(gm, comp, graph),
                Compaction::Tiling => {
                    if let Some(pack) = self.packs.get(&comp) {
                        let (left, top) = (gm[comp].left(), gm[comp].top());
                        pack.adjust_locations(gm, left, top);
                    }
                }
            }
        }
        for (&comp, &graph) in &self.emptied {
            adjust_location(gm, comp, graph);
        }

        for e in self.hidden_edges.drain(..) {
            gm.reattach_edge(e);
        }
        for r in self.redirects.drain(..).rev() {
            let (Some(source), Some(target)) = (gm[r.edge].source(), gm[r.edge].target()) else {
                continue;
            };
            if r.source {
                gm.reconnect_edge(r.edge, r.node, target);
            } else {
                gm.reconnect_edge(r.edge, source, r.node);
            }
        }
        gm.update_bounds();
        let ratio = fullness(gm);

        self.remove_dummy_complexes(gm);
        gm.update_bounds();
        ratio
    }

    fn remove_dummy_complexes(&mut self, gm: &mut GraphManager) {
        for dc in self.dummy_complexes.drain(..) {
            let Some(owner) = gm[dc].owner() else {
                continue;
            };
            if let Some(child) = gm[dc].child() {
                for m in gm[child].nodes().to_vec() {
                    gm.move_node_to_graph(m, owner);
                }
            }
            gm.remove_node(dc);
        }
    }
}

#[cfg(test)]
mod tests {
    use narwhal_graph::{Edge, GraphManager, Node};

    use super::*;

    #[test]
    fn degree_counts_nested_edges() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let c = gm.add_node(root, Node::sized(10.0, 10.0));
        let inner = gm.add_graph(c);
        let a = gm.add_node(inner, Node::sized(10.0, 10.0));
        let b = gm.add_node(inner, Node::sized(10.0, 10.0));
        let lone = gm.add_node(root, Node::sized(10.0, 10.0));
        gm.add_edge(a, b, Edge::new());

        assert_eq!(calc_graph_degree(&gm, c), 2);
        assert_eq!(calc_graph_degree(&gm, lone), 0);
    }

    #[test]
    fn isolated_siblings_are_grouped_then_dissolved() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = gm.add_node(root, Node::sized(20.0, 20.0));
        let b = gm.add_node(root, Node::sized(20.0, 20.0));
        let c = gm.add_node(root, Node::sized(20.0, 20.0));
        let d = gm.add_node(root, Node::sized(20.0, 20.0));
        gm.add_edge(c, d, Edge::new());

        let mut state = ComplexState::default();
        state.group_zero_degree_members(&mut gm);
        assert_eq!(gm[root].nodes().len(), 3);
        assert_eq!(gm[a].owner(), gm[b].owner());
        assert_ne!(gm[a].owner(), Some(root));

        state.apply_dfs_on_complexes(&mut gm, Compaction::Tiling);
        assert_eq!(gm.all_nodes().len(), 3);

        state.repopulate(&mut gm, Compaction::Tiling);
        assert_eq!(gm[root].nodes().len(), 4);
        assert_eq!(gm[a].owner(), Some(root));
        assert!(!gm[a].rect.intersects(&gm[b].rect));
    }

    #[test]
    fn member_edges_are_anchored_on_the_complex_and_restored() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let outside = gm.add_node(root, Node::sized(20.0, 20.0));
        let comp = gm.add_node(root, Node::sized(10.0, 10.0).with_kind(COMPLEX));
        let inner = gm.add_graph(comp);
        let m1 = gm.add_node(inner, Node::sized(20.0, 20.0));
        let m2 = gm.add_node(inner, Node::sized(30.0, 10.0));
        let out_edge = gm.add_edge(outside, m1, Edge::new());
        let in_edge = gm.add_edge(m1, m2, Edge::new());

        let mut state = ComplexState::default();
        state.apply_dfs_on_complexes(&mut gm, Compaction::Polyomino);
        assert_eq!(gm[out_edge].target(), Some(comp));
        assert!(!gm[out_edge].is_inter_graph());
        assert_eq!(&*gm.all_edges(), &[out_edge]);
        assert!(gm[comp].child().is_none());

        gm[comp].set_location(500.0, 500.0);
        let fullness = state.repopulate(&mut gm, Compaction::Polyomino);
        assert_eq!(gm[out_edge].target(), Some(m1));
        assert!(gm[out_edge].is_inter_graph());
        assert_eq!(gm.all_edges().len(), 2);
        assert!(gm[in_edge].is_attached());
        assert!(gm[comp].rect.contains(&gm[m1].rect));
        assert!(gm[m1].left() >= 500.0);
        assert!(fullness.is_some_and(|f| f > 0.0 && f <= 1.0));
    }
}
