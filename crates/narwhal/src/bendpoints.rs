//! Bend points routed through temporary dummy nodes.

use narwhal_graph::{Edge, EdgeId, Node, NodeId, Point, Rect};
use rustc_hash::FxHashSet;

use crate::engine::Engine;

/// Kind tag of the 1x1 nodes standing in for bend points while the embedder runs.
pub const BEND_DUMMY: &str = "bend dummy";

impl Engine {
    /// Gives self-loops two bend points and every edge of a multi-edge bundle one.
    pub(crate) fn create_bendpoints(&mut self) {
        let edges = self.gm.all_edges();
        let mut visited: FxHashSet<EdgeId> = FxHashSet::default();

        for &e in edges.iter() {
            if visited.contains(&e) {
                continue;
            }
            let (Some(source), Some(target)) = (self.gm[e].source(), self.gm[e].target()) else {
                continue;
            };

            if source == target {
                self.gm[e].bendpoints.extend([Point::default(); 2]);
                visited.insert(e);
                continue;
            }

            let mut bundle = self.gm.edge_list_to_node(source, target);
            bundle.extend(self.gm.edge_list_to_node(target, source));
            if bundle.len() > 1 {
                for &m in &bundle {
                    self.gm[m].bendpoints.push(Point::default());
                }
            }
            visited.extend(bundle);

            if visited.len() == edges.len() {
                break;
            }
        }
    }

    /// Replaces every edge carrying bend points with a chain of dummy nodes.
    pub(crate) fn substitute_bendpoints(&mut self) {
        for &e in self.gm.all_edges().iter() {
            if !self.gm[e].bendpoints.is_empty() && !self.edge_to_dummy_nodes.contains_key(&e) {
                self.create_dummy_nodes_for_bendpoints(e);
            }
        }
    }

    /// Takes `edge` out of the model and routes a path of 1x1 dummy nodes, one per bend point,
    /// through the lowest common ancestor graph of its endpoints.
    pub(crate) fn create_dummy_nodes_for_bendpoints(&mut self, edge: EdgeId) -> Vec<NodeId> {
        let (Some(source), Some(target)) = (self.gm[edge].source(), self.gm[edge].target()) else {
            return Vec::new();
        };
        let Some(graph) = self.gm.calc_lowest_common_ancestor(source, target) else {
            return Vec::new();
        };

        let count = self.gm[edge].bendpoints.len();
        let mut dummies = Vec::with_capacity(count);
        let mut previous = source;
        for _ in 0..count {
            let dummy = self.gm.add_node(
                graph,
                Node::new(Rect::new(0.0, 0.0, 1.0, 1.0)).with_kind(BEND_DUMMY),
            );
            self.gm.add_edge(previous, dummy, Edge::new());
            dummies.push(dummy);
            previous = dummy;
        }
        self.gm.add_edge(previous, target, Edge::new());
        self.gm.detach_edge(edge);

        self.edge_to_dummy_nodes.insert(edge, dummies.clone());
        dummies
    }

    /// Copies dummy centers into the bend points, removes the dummies and restores the original
    /// edges.
    pub(crate) fn create_bendpoints_from_dummy_nodes(&mut self) {
        for (edge, dummies) in std::mem::take(&mut self.edge_to_dummy_nodes) {
            for (i, &dummy) in dummies.iter().enumerate() {
                let center = self.gm[dummy].center();
                if let Some(bend) = self.gm[edge].bendpoints.get_mut(i) {
                    *bend = center;
                }
                self.gm.remove_node(dummy);
            }
            self.gm.reattach_edge(edge);
        }
    }
}

#[cfg(test)]
mod tests {
    use narwhal_graph::{Edge, GraphManager, Node};

    use crate::engine::Engine;
    use crate::options::LayoutOptions;

    #[test]
    fn self_loop_and_bundle_get_bend_points() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = gm.add_node(root, Node::sized(10.0, 10.0));
        let b = gm.add_node(root, Node::sized(10.0, 10.0));
        let aa = gm.add_edge(a, a, Edge::new());
        let ab1 = gm.add_edge(a, b, Edge::new());
        let ab2 = gm.add_edge(b, a, Edge::new());

        let mut engine = Engine::new(gm, LayoutOptions::default());
        engine.create_bendpoints();
        let gm = engine.graph();
        assert_eq!(gm[aa].bendpoints.len(), 2);
        assert_eq!(gm[ab1].bendpoints.len(), 1);
        assert_eq!(gm[ab2].bendpoints.len(), 1);
    }

    #[test]
    fn dummies_are_removed_when_restoring() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = gm.add_node(root, Node::sized(10.0, 10.0));
        let b = gm.add_node(root, Node::sized(10.0, 10.0));
        let ab = gm.add_edge(a, b, Edge::new());
        gm[ab].bendpoints.push(Default::default());

        let mut engine = Engine::new(gm, LayoutOptions::default());
        engine.substitute_bendpoints();
        assert_eq!(engine.graph()[root].nodes().len(), 3);
        assert!(!engine.graph()[ab].is_attached());

        engine.create_bendpoints_from_dummy_nodes();
        let gm = engine.graph();
        assert_eq!(gm[root].nodes(), &[a, b]);
        assert!(gm[ab].is_attached());
        assert_eq!(gm.all_edges().len(), 1);
    }
}
