//! Bounding boxes, estimated sizes and subtree moves.

use crate::constants::{COMPOUND_NODE_MARGIN, EMPTY_COMPOUND_NODE_SIZE, LABEL_HEIGHT};
use crate::geometry::{Point, Rect};

use super::{GraphId, GraphManager, NodeId};

impl GraphManager {
    /// Recomputes the bounds of every graph and compound node, bottom up from the root.
    pub fn update_bounds(&mut self) {
        if let Some(root) = self.root {
            self.update_graph_bounds(root, true);
        }
    }

    /// Fits `graph` around its members plus margin. With `recursive`, compound members are
    /// refitted first. An empty child graph takes its parent node's rectangle.
    pub fn update_graph_bounds(&mut self, graph: GraphId, recursive: bool) {
        let members = self[graph].nodes.clone();
        if recursive {
            for &n in &members {
                self.update_node_bounds(n);
            }
        }

        let bbox = self.calculate_bounds(&members);
        let fallback = self[graph].parent.map(|p| self[p].rect);
        let g = &mut self[graph];
        match (bbox, fallback) {
            (Some(b), _) => {
                g.left = b.left() - g.margin;
                g.top = b.top() - g.margin;
                g.right = b.right() + g.margin;
                g.bottom = b.bottom() + g.margin;
            }
            (None, Some(r)) => {
                g.left = r.left();
                g.top = r.top();
                g.right = r.right();
                g.bottom = r.bottom();
            }
            (None, None) => {
                g.left = 0.0;
                g.top = 0.0;
                g.right = 0.0;
                g.bottom = 0.0;
            }
        }
    }

    /// Refits a compound node around its (non-empty) child graph. Leaves keep their rectangle;
    /// an empty compound keeps its rectangle and its child graph is fitted to it.
    pub fn update_node_bounds(&mut self, node: NodeId) {
        let Some(child) = self[node].child else {
            return;
        };
        if self[child].nodes.is_empty() {
            self.update_graph_bounds(child, false);
            return;
        }
        self.update_graph_bounds(child, true);

        let g = &self[child];
        let inner = Rect::from_corners(
            g.left + g.margin,
            g.top + g.margin,
            g.right - g.margin,
            g.bottom - g.margin,
        );
        self[node].rect = Rect::new(
            inner.left() - COMPOUND_NODE_MARGIN,
            inner.top() - COMPOUND_NODE_MARGIN,
            inner.width + 2.0 * COMPOUND_NODE_MARGIN,
            inner.height + 2.0 * COMPOUND_NODE_MARGIN + LABEL_HEIGHT,
        );
    }

    /// Bounding box of the given nodes' rectangles.
    pub fn calculate_bounds(&self, nodes: &[NodeId]) -> Option<Rect> {
        Rect::bounding(nodes.iter().map(|&n| &self[n].rect))
    }

    /// Sets the graph's left/top from its members (minus margin) and returns them, or `None`
    /// for an empty graph.
    pub fn update_left_top(&mut self, graph: GraphId) -> Option<Point> {
        let members = &self[graph].nodes;
        if members.is_empty() {
            return None;
        }
        let left = members
            .iter()
            .map(|&n| self[n].left())
            .fold(f64::INFINITY, f64::min);
        let top = members
            .iter()
            .map(|&n| self[n].top())
            .fold(f64::INFINITY, f64::min);
        let g = &mut self[graph];
        g.left = left - g.margin;
        g.top = top - g.margin;
        Some(Point::new(g.left, g.top))
    }

    /// Estimated size of a graph: the sum of member estimates divided by the square root of
    /// the member count. Empty graphs use [`EMPTY_COMPOUND_NODE_SIZE`].
    pub fn calc_estimated_size(&mut self, graph: GraphId) -> f64 {
        let members = self[graph].nodes.clone();
        let sum: f64 = members
            .iter()
            .map(|&n| self.calc_node_estimated_size(n))
            .sum();
        let size = if members.is_empty() || sum == 0.0 {
            EMPTY_COMPOUND_NODE_SIZE
        } else {
            sum / (members.len() as f64).sqrt()
        };
        self[graph].estimated_size = size;
        size
    }

    /// Leaves estimate `(w + h) / 2`. Compound nodes take their child graph's estimate and are
    /// resized to a square of that side.
    pub fn calc_node_estimated_size(&mut self, node: NodeId) -> f64 {
        let size = match self[node].child {
            None => (self[node].width() + self[node].height()) / 2.0,
            Some(child) => {
                let size = self.calc_estimated_size(child);
                let n = &mut self[node];
                n.set_width(size);
                n.set_height(size);
                size
            }
        };
        self[node].estimated_size = size;
        size
    }

    /// Translates `node` and everything nested inside it.
    pub fn move_with_children(&mut self, node: NodeId, dx: f64, dy: f64) {
        for n in self.with_children(node) {
            self[n].move_by(dx, dy);
        }
    }

    /// Moves `node` so its top-left corner lands at `(x, y)`, carrying its subtree along.
    pub fn set_location_with_children(&mut self, node: NodeId, x: f64, y: f64) {
        let (dx, dy) = (x - self[node].left(), y - self[node].top());
        self.move_with_children(node, dx, dy);
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::Rect;
    use crate::graph::{GraphManager, Node};

    #[test]
    fn compound_wraps_children_with_margins() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let c = gm.add_node(root, Node::new(Rect::new(0.0, 0.0, 5.0, 5.0)));
        let inner = gm.add_graph(c);
        gm.add_node(inner, Node::new(Rect::new(100.0, 100.0, 20.0, 10.0)));
        gm.add_node(inner, Node::new(Rect::new(140.0, 120.0, 10.0, 10.0)));

        gm.update_bounds();
        assert_eq!(gm[c].rect, Rect::new(90.0, 90.0, 70.0, 70.0));
        assert_eq!(gm[inner].left(), 85.0);
        assert_eq!(gm[inner].bottom(), 145.0);
        assert_eq!(gm[root].left(), 75.0);
    }

    #[test]
    fn empty_compound_keeps_its_rect() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let c = gm.add_node(root, Node::new(Rect::new(3.0, 4.0, 30.0, 20.0)));
        let inner = gm.add_graph(c);
        gm.update_bounds();
        assert_eq!(gm[c].rect, Rect::new(3.0, 4.0, 30.0, 20.0));
        assert_eq!(gm[inner].bounds(), Rect::new(3.0, 4.0, 30.0, 20.0));

        gm[c].move_by(10.0, 10.0);
        gm.update_bounds();
        assert_eq!(gm[inner].bounds(), Rect::new(13.0, 14.0, 30.0, 20.0));
    }

    #[test]
    fn estimated_sizes() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        gm.add_node(root, Node::sized(40.0, 20.0));
        let c = gm.add_node(root, Node::sized(1.0, 1.0));
        let inner = gm.add_graph(c);

        let size = gm.calc_estimated_size(root);
        assert_eq!(gm[c].width(), 40.0);
        assert_eq!(gm[inner].estimated_size(), 40.0);
        assert!((size - 70.0 / 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn moving_a_compound_carries_children() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let c = gm.add_node(root, Node::sized(50.0, 50.0));
        let inner = gm.add_graph(c);
        let d = gm.add_node(inner, Node::new(Rect::new(10.0, 10.0, 5.0, 5.0)));
        gm.move_with_children(c, 5.0, -5.0);
        assert_eq!(gm[d].location().x, 15.0);
        assert_eq!(gm[d].location().y, 5.0);
    }
}
