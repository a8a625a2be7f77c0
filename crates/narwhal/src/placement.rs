//! Initial placements: random scatter and radial trees.

use narwhal_graph::{GraphId, NodeId, Point, Transform};

use crate::constants::{
    DEFAULT_COMPONENT_SEPERATION, DEFAULT_RADIAL_SEPARATION, WORLD_CENTER_X, WORLD_CENTER_Y,
};
use crate::engine::Engine;
use crate::forest::find_center_of_tree;

impl Engine {
    /// Scatters every leaf and empty compound in the initial world square, then fits compound
    /// nodes around their children.
    pub fn position_nodes_randomly(&mut self) {
        let Some(root) = self.gm.root() else {
            return;
        };
        self.scatter_graph(root);
        self.gm.update_graph_bounds(root, true);
    }

    fn scatter_graph(&mut self, graph: GraphId) {
        for n in self.gm[graph].nodes().to_vec() {
            match self.gm[n].child() {
                Some(child) if !self.gm[child].nodes().is_empty() => {
                    self.scatter_graph(child);
                    self.gm.update_node_bounds(n);
                }
                _ => {
                    let (ux, uy) = self.rng.next_unit_point();
                    self.gm[n].scatter(ux, uy);
                }
            }
        }
    }

    /// Lays out each tree radially around its center and arranges the trees in rows of
    /// `ceil(sqrt(trees))`, then centers the whole drawing on the world center.
    pub fn position_nodes_radially(&mut self, forest: &[Vec<NodeId>]) {
        if forest.is_empty() {
            return;
        }
        let columns = (forest.len() as f64).sqrt().ceil() as usize;
        let mut row_height = 0.0_f64;
        let mut current_x = 0.0_f64;
        let mut current_y = 0.0_f64;
        let mut point = Point::default();

        for (i, tree) in forest.iter().enumerate() {
            if i % columns == 0 {
                current_x = 0.0;
                current_y = row_height;
                if i != 0 {
                    current_y += DEFAULT_COMPONENT_SEPERATION;
                }
                row_height = 0.0;
            }

            let Some(center) = find_center_of_tree(&self.gm, tree) else {
                continue;
            };
            point = self.radial_layout(tree, center, Point::new(current_x, current_y));

            if point.y > row_height {
                row_height = point.y.trunc();
            }
            current_x = (point.x + DEFAULT_COMPONENT_SEPERATION).trunc();
        }

        self.transform_to(Point::new(
            WORLD_CENTER_X - point.x / 2.0,
            WORLD_CENTER_Y - point.y / 2.0,
        ));
    }

    /// Radial layout of one tree with its bounding box's top-left moved to `start`. Returns the
    /// bottom-right corner of the placed tree.
    fn radial_layout(&mut self, tree: &[NodeId], center: NodeId, start: Point) -> Point {
        let max_diagonal = tree
            .iter()
            .map(|&n| self.gm[n].diagonal())
            .fold(0.0_f64, f64::max);
        let separation = max_diagonal.max(DEFAULT_RADIAL_SEPARATION);

        self.branch_radial_layout(center, None, 0.0, 359.0, 0.0, separation);

        let Some(bounds) = self.gm.calculate_bounds(tree) else {
            return start;
        };
        let trans = Transform::translation(start, Point::new(bounds.left(), bounds.top()));
        for &n in tree {
            self.gm[n].transform(&trans);
        }
        trans.inverse_transform_point(Point::new(bounds.right(), bounds.bottom()))
    }

    /// Places `node` on the circle of radius `distance` in the middle of its wedge, then splits
    /// the wedge evenly among its children, starting after the edge to the parent.
    fn branch_radial_layout(
        &mut self,
        node: NodeId,
        parent: Option<NodeId>,
        start_angle: f64,
        end_angle: f64,
        distance: f64,
        separation: f64,
    ) {
        let mut half_interval = ((end_angle - start_angle) + 1.0) / 2.0;
        if half_interval < 0.0 {
            half_interval += 180.0;
        }
        let node_angle = (half_interval + start_angle) % 360.0;
        let teta = node_angle.to_radians();
        self.gm[node].set_center(distance * teta.cos(), distance * teta.sin());

        let mut neighbor_edges = self.gm[node].edges().to_vec();
        let mut child_count = neighbor_edges.len() as isize;
        if parent.is_some() {
            child_count -= 1;
        }

        let mut parent_edges = parent
            .map(|p| self.gm.edges_between(node, p))
            .unwrap_or_default();
        while parent_edges.len() > 1 {
            let extra = parent_edges.remove(0);
            neighbor_edges.retain(|&e| e != extra);
            child_count -= 1;
        }
        if child_count <= 0 || neighbor_edges.is_empty() {
            return;
        }

        let edge_count = neighbor_edges.len();
        let start_index = match parent_edges.first() {
            Some(to_parent) => neighbor_edges
                .iter()
                .position(|e| e == to_parent)
                .map_or(0, |i| (i + 1) % edge_count),
            None => 0,
        };
        let step = (end_angle - start_angle).abs() / child_count as f64;

        let mut i = start_index;
        let mut branch = 0;
        let mut visits = 0;
        while branch != child_count && visits < 2 * edge_count {
            visits += 1;
            let current = neighbor_edges[i];
            i = (i + 1) % edge_count;
            let Some(child) = self.gm[current].other_end(node) else {
                continue;
            };
            if Some(child) == parent {
                continue;
            }
            let child_start = (start_angle + branch as f64 * step) % 360.0;
            let child_end = (child_start + step) % 360.0;
            self.branch_radial_layout(
                child,
                Some(node),
                child_start,
                child_end,
                distance + separation,
                separation,
            );
            branch += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use narwhal_graph::{Edge, GraphManager, Node};

    use crate::engine::Engine;
    use crate::forest::flat_forest;
    use crate::options::LayoutOptions;

    #[test]
    fn radial_star_puts_leaves_on_one_circle() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let hub = gm.add_node(root, Node::sized(10.0, 10.0));
        let leaves: Vec<_> = (0..4)
            .map(|_| gm.add_node(root, Node::sized(10.0, 10.0)))
            .collect();
        for &l in &leaves {
            gm.add_edge(hub, l, Edge::new());
        }

        let mut engine = Engine::new(gm, LayoutOptions::default());
        let forest = flat_forest(engine.graph());
        engine.position_nodes_radially(&forest);

        let gm = engine.graph();
        let c = gm[hub].center();
        let radii: Vec<f64> = leaves.iter().map(|&l| gm[l].center().distance_to(c)).collect();
        for r in &radii {
            assert!((r - radii[0]).abs() < 1e-6, "radii differ: {radii:?}");
            assert!(*r >= 50.0 - 1e-6);
        }
    }

    #[test]
    fn random_scatter_is_seeded() {
        let build = || {
            let mut gm = GraphManager::new();
            let root = gm.add_root();
            for _ in 0..3 {
                gm.add_node(root, Node::sized(20.0, 20.0));
            }
            gm
        };
        let mut a = Engine::new(build(), LayoutOptions::default());
        let mut b = Engine::new(build(), LayoutOptions::default());
        a.position_nodes_randomly();
        b.position_nodes_randomly();
        let rects = |e: &Engine| -> Vec<_> {
            e.graph().all_nodes().iter().map(|&n| e.graph()[n].rect).collect()
        };
        assert_eq!(rects(&a), rects(&b));
    }
}
