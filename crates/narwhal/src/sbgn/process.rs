//! Process nodes expanded into a compound with an input port, an output port and the process
//! body, plus the orientation bookkeeping of the second phase.

use narwhal_graph::geometry::{angle_between, signed_angle};
use narwhal_graph::{Edge, EdgeId, GraphManager, Node, NodeId, Point, Rect};

use super::constants::{
    ANGLE_TOLERANCE, EFFECTOR_ANGLE_TOLERANCE, PORT_NODE_DEFAULT_HEIGHT, PORT_NODE_DEFAULT_WIDTH,
    RIGID_EDGE_LENGTH, ROTATION_90_DEGREE,
};
use super::glyph::{ArcClass, DUMMY_COMPOUND, INPUT_PORT, OUTPUT_PORT, RIGID_EDGE, is_port};
use crate::engine::Engine;

/// Direction of the reaction flow through a process, from the input port to the output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Orientation {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::LeftToRight,
        Orientation::RightToLeft,
        Orientation::TopToBottom,
        Orientation::BottomToTop,
    ];

    /// Unit vector from the process body towards its output port.
    pub fn output_direction(self) -> (f64, f64) {
        match self {
            Orientation::LeftToRight => (1.0, 0.0),
            Orientation::RightToLeft => (-1.0, 0.0),
            Orientation::TopToBottom => (0.0, 1.0),
            Orientation::BottomToTop => (0.0, -1.0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Orientation::LeftToRight | Orientation::RightToLeft)
    }

    /// Quarter turn; `clockwise` is on screen, with y growing downwards.
    pub fn rotated(self, clockwise: bool) -> Self {
        use Orientation::*;
        match (self, clockwise) {
            (LeftToRight, true) => TopToBottom,
            (TopToBottom, true) => RightToLeft,
            (RightToLeft, true) => BottomToTop,
            (BottomToTop, true) => LeftToRight,
            (LeftToRight, false) => BottomToTop,
            (BottomToTop, false) => RightToLeft,
            (RightToLeft, false) => TopToBottom,
            (TopToBottom, false) => LeftToRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Source,
    Target,
}

/// Where a process ended up, reported once its ports are gone.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessPlacement {
    pub process: NodeId,
    pub orientation: Orientation,
    pub input_port: Point,
    pub output_port: Point,
    pub proper_edge_count: usize,
    /// Consumption, production and effector edges taken into account for orientation.
    pub edge_count: usize,
}

/// Side table entry for one expanded process.
#[derive(Debug, Clone)]
pub(crate) struct ProcessNode {
    pub process: NodeId,
    pub compound: NodeId,
    pub input_port: NodeId,
    pub output_port: NodeId,
    pub consumption_edges: Vec<EdgeId>,
    pub product_edges: Vec<EdgeId>,
    pub effector_edges: Vec<EdgeId>,
    redirected: Vec<(EdgeId, End)>,
    pub orientation: Orientation,
    pub net_rotational_force: f64,
    pub proper_edge_count: usize,
    /// Consumption flags first, then production, then effector.
    pub properly_oriented: Vec<bool>,
}

fn reconnect_end(gm: &mut GraphManager, edge: EdgeId, end: End, node: NodeId) {
    let (Some(source), Some(target)) = (gm[edge].source(), gm[edge].target()) else {
        return;
    };
    match end {
        End::Source => gm.reconnect_edge(edge, node, target),
        End::Target => gm.reconnect_edge(edge, source, node),
    }
}

fn offset(p: Point, (dx, dy): (f64, f64), by: f64) -> Point {
    Point::new(p.x + dx * by, p.y + dy * by)
}

impl ProcessNode {
    /// Wraps `process` in a dummy compound together with two ports joined to it by rigid
    /// edges. Consumption arcs move onto the input port, production arcs onto the output port
    /// and every other arc onto the compound.
    pub fn expand(gm: &mut GraphManager, process: NodeId) -> Option<Self> {
        let owner = gm[process].owner()?;
        let label = gm[process].label.clone().unwrap_or_default();
        let rect = gm[process].rect;

        let compound = gm.add_node(
            owner,
            Node::new(rect)
                .with_kind(DUMMY_COMPOUND)
                .with_label(format!("DummyCompound_{label}")),
        );
        let child = gm.add_graph(compound);
        gm.move_node_to_graph(process, child);
        let port = |kind: &str, prefix: &str| {
            Node::new(Rect::new(
                rect.center_x(),
                rect.center_y(),
                PORT_NODE_DEFAULT_WIDTH,
                PORT_NODE_DEFAULT_HEIGHT,
            ))
            .with_kind(kind)
            .with_label(format!("{prefix}_{label}"))
        };
        let input_port = gm.add_node(child, port(INPUT_PORT, "InputPort"));
        let output_port = gm.add_node(child, port(OUTPUT_PORT, "OutputPort"));

        let mut node = Self {
            process,
            compound,
            input_port,
            output_port,
            consumption_edges: Vec::new(),
            product_edges: Vec::new(),
            effector_edges: Vec::new(),
            redirected: Vec::new(),
            orientation: Orientation::default(),
            net_rotational_force: 0.0,
            proper_edge_count: 0,
            properly_oriented: Vec::new(),
        };

        for e in gm[process].edges().to_vec() {
            let edge = &gm[e];
            if edge.other_end(process).is_none_or(|o| o == process) {
                continue;
            }
            let end = if edge.source() == Some(process) {
                End::Source
            } else {
                End::Target
            };
            let arc = ArcClass::of(edge);
            let replacement = match arc {
                Some(ArcClass::Consumption) => {
                    node.consumption_edges.push(e);
                    input_port
                }
                Some(ArcClass::Production) => {
                    node.product_edges.push(e);
                    output_port
                }
                Some(a) if a.is_effector() => {
                    node.effector_edges.push(e);
                    compound
                }
                _ => compound,
            };
            reconnect_end(gm, e, end, replacement);
            node.redirected.push((e, end));
        }

        gm.add_edge(input_port, process, Edge::new().with_kind(RIGID_EDGE));
        gm.add_edge(output_port, process, Edge::new().with_kind(RIGID_EDGE));
        node.place_ports(gm);
        node.properly_oriented = vec![false; node.edge_count()];
        Some(node)
    }

    pub fn edge_count(&self) -> usize {
        self.consumption_edges.len() + self.product_edges.len() + self.effector_edges.len()
    }

    /// Port centers for `orientation`: on the flow axis, one rigid edge length beyond the body.
    pub fn port_centers(&self, gm: &GraphManager, orientation: Orientation) -> (Point, Point) {
        let body = &gm[self.process];
        let c = body.center();
        let dir = orientation.output_direction();
        let half = if orientation.is_horizontal() {
            body.width() / 2.0 + PORT_NODE_DEFAULT_WIDTH / 2.0
        } else {
            body.height() / 2.0 + PORT_NODE_DEFAULT_HEIGHT / 2.0
        };
        let reach = half + RIGID_EDGE_LENGTH;
        (offset(c, dir, -reach), offset(c, dir, reach))
    }

    /// Snaps both ports to their offsets for the current orientation.
    pub fn place_ports(&self, gm: &mut GraphManager) {
        let (input, output) = self.port_centers(gm, self.orientation);
        gm[self.input_port].set_center(input.x, input.y);
        gm[self.output_port].set_center(output.x, output.y);
    }

    /// Where a neighbor would ideally sit: one ideal edge length outwards from the port.
    fn port_targets(
        &self,
        gm: &GraphManager,
        orientation: Orientation,
        ideal: f64,
    ) -> ((Point, Point), (Point, Point)) {
        let (input, output) = self.port_centers(gm, orientation);
        let dir = orientation.output_direction();
        (
            (input, offset(input, dir, -ideal)),
            (output, offset(output, dir, ideal)),
        )
    }

    /// Effectors belong beside the flow axis, on whichever side they already are.
    fn effector_target(center: Point, effector: Point, orientation: Orientation, ideal: f64) -> Point {
        if orientation.is_horizontal() {
            let dy = if effector.y > center.y { ideal } else { -ideal };
            Point::new(center.x, center.y + dy)
        } else {
            let dx = if effector.x > center.x { ideal } else { -ideal };
            Point::new(center.x + dx, center.y)
        }
    }

    fn other_center(gm: &GraphManager, edge: EdgeId, end: NodeId) -> Option<Point> {
        gm[edge].other_end(end).map(|o| gm[o].center())
    }

    /// Properly oriented flags for a hypothetical orientation, with their count.
    pub fn count_proper(
        &self,
        gm: &GraphManager,
        orientation: Orientation,
        ideal: f64,
    ) -> (usize, Vec<bool>) {
        let ((input, input_target), (output, output_target)) =
            self.port_targets(gm, orientation, ideal);
        let center = gm[self.process].center();
        let mut flags = Vec::with_capacity(self.edge_count());

        for &e in &self.consumption_edges {
            let ok = Self::other_center(gm, e, self.input_port)
                .is_some_and(|o| angle_between(input_target, input, o) <= ANGLE_TOLERANCE);
            flags.push(ok);
        }
        for &e in &self.product_edges {
            let ok = Self::other_center(gm, e, self.output_port)
                .is_some_and(|o| angle_between(output_target, output, o) <= ANGLE_TOLERANCE);
            flags.push(ok);
        }
        for &e in &self.effector_edges {
            let ok = Self::other_center(gm, e, self.compound).is_some_and(|o| {
                let target = Self::effector_target(center, o, orientation, ideal);
                angle_between(target, center, o) <= EFFECTOR_ANGLE_TOLERANCE
            });
            flags.push(ok);
        }
        (flags.iter().filter(|&&f| f).count(), flags)
    }

    pub fn calc_properly_oriented_edges(&mut self, gm: &GraphManager, ideal: f64) -> usize {
        let (count, flags) = self.count_proper(gm, self.orientation, ideal);
        self.proper_edge_count = count;
        self.properly_oriented = flags;
        count
    }

    /// Mean signed deviation, in degrees, of the reactant and product neighbors from the
    /// outward direction of their port. Positive values ask for a clockwise turn.
    pub fn calc_rotational_forces(&mut self, gm: &GraphManager, ideal: f64) {
        let center = gm[self.process].center();
        let mut sum = 0.0;
        let mut count = 0usize;
        let sides = [
            (self.input_port, &self.consumption_edges),
            (self.output_port, &self.product_edges),
        ];
        for (port, edges) in sides {
            let p = gm[port].center();
            let outward = Point::new(p.x - center.x, p.y - center.y);
            for &e in edges {
                if let Some(o) = Self::other_center(gm, e, port) {
                    sum += signed_angle(outward, Point::new(o.x - p.x, o.y - p.y));
                    count += 1;
                }
            }
        }
        self.net_rotational_force = if count == 0 { 0.0 } else { sum / count as f64 };
        self.calc_properly_oriented_edges(gm, ideal);
    }

    pub fn is_rotation_necessary(&self) -> bool {
        self.net_rotational_force.abs() > ROTATION_90_DEGREE
    }

    /// Turns the process a quarter in the direction of its net rotational force.
    pub fn apply_rotation(&mut self, gm: &mut GraphManager) {
        self.set_orientation(gm, self.orientation.rotated(self.net_rotational_force > 0.0));
        self.net_rotational_force = 0.0;
    }

    pub fn set_orientation(&mut self, gm: &mut GraphManager, orientation: Orientation) {
        self.orientation = orientation;
        self.place_ports(gm);
    }

    /// Moves single leaf reactants and products straight onto their port targets.
    pub fn apply_approximations(&self, gm: &mut GraphManager, ideal: f64) {
        let ((_, input_target), (_, output_target)) =
            self.port_targets(gm, self.orientation, ideal);
        let owner = gm[self.compound].owner();
        let sides = [
            (self.input_port, &self.consumption_edges, input_target),
            (self.output_port, &self.product_edges, output_target),
        ];
        for (port, edges, target) in sides {
            for &e in edges {
                let Some(o) = gm[e].other_end(port) else {
                    continue;
                };
                let n = &gm[o];
                if n.child().is_none() && n.edges().len() == 1 && n.owner() == owner && !is_port(n)
                {
                    gm[o].set_center(target.x, target.y);
                }
            }
        }
    }

    /// Hands the forces gathered on the body and the ports to the compound, so the three move
    /// as one unit.
    pub fn transfer_forces(&self, engine: &mut Engine) {
        let (mut fx, mut fy) = (0.0, 0.0);
        for n in [self.process, self.input_port, self.output_port] {
            let (x, y) = engine.force(n);
            fx += x;
            fy += y;
            engine.reset_forces(n);
        }
        engine.add_force(self.compound, fx, fy);
    }

    /// Puts the process back in place of its compound: arcs return to the process, ports,
    /// rigid edges and the compound are removed.
    pub fn restore(&self, gm: &mut GraphManager) -> ProcessPlacement {
        let placement = ProcessPlacement {
            process: self.process,
            orientation: self.orientation,
            input_port: gm[self.input_port].center(),
            output_port: gm[self.output_port].center(),
            proper_edge_count: self.proper_edge_count,
            edge_count: self.edge_count(),
        };

        for &(e, end) in &self.redirected {
            reconnect_end(gm, e, end, self.process);
        }
        gm.remove_node(self.input_port);
        gm.remove_node(self.output_port);
        if let Some(owner) = gm[self.compound].owner() {
            gm.move_node_to_graph(self.process, owner);
        }
        gm.remove_node(self.compound);
        placement
    }
}

#[cfg(test)]
mod tests {
    use narwhal_graph::{Edge, GraphManager, Node};

    use super::*;
    use crate::sbgn::glyph::{CATALYSIS, CONSUMPTION, PROCESS, PRODUCTION};

    fn reaction() -> (GraphManager, [NodeId; 4]) {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = gm.add_node(root, Node::new(Rect::new(0.0, 45.0, 10.0, 10.0)));
        let p = gm.add_node(
            root,
            Node::new(Rect::new(95.0, 45.0, 10.0, 10.0)).with_kind(PROCESS).with_label("p"),
        );
        let b = gm.add_node(root, Node::new(Rect::new(190.0, 45.0, 10.0, 10.0)));
        let enzyme = gm.add_node(root, Node::new(Rect::new(95.0, 0.0, 10.0, 10.0)));
        gm.add_edge(a, p, Edge::new().with_kind(CONSUMPTION));
        gm.add_edge(p, b, Edge::new().with_kind(PRODUCTION));
        gm.add_edge(enzyme, p, Edge::new().with_kind(CATALYSIS));
        (gm, [a, p, b, enzyme])
    }

    #[test]
    fn orientation_turns_in_both_directions() {
        for o in Orientation::ALL {
            assert_eq!(o.rotated(true).rotated(false), o);
            assert_ne!(o.rotated(true).is_horizontal(), o.is_horizontal());
        }
    }

    #[test]
    fn expansion_moves_arcs_onto_ports() {
        let (mut gm, [a, p, b, enzyme]) = reaction();
        let node = ProcessNode::expand(&mut gm, p).unwrap();

        assert_eq!(gm[node.input_port].center(), Point::new(83.5, 50.0));
        assert_eq!(gm[node.output_port].center(), Point::new(116.5, 50.0));
        assert!(gm.is_neighbor(a, node.input_port));
        assert!(gm.is_neighbor(node.output_port, b));
        assert!(gm.is_neighbor(enzyme, node.compound));
        assert_eq!(gm[p].edges().len(), 2);

        let mut node = node;
        assert_eq!(node.calc_properly_oriented_edges(&gm, 50.0), 3);
    }

    #[test]
    fn restoring_keeps_process_identity() {
        let (mut gm, [a, p, b, _]) = reaction();
        let root = gm.root().unwrap();
        let node = ProcessNode::expand(&mut gm, p).unwrap();
        let placement = node.restore(&mut gm);

        assert_eq!(placement.process, p);
        assert_eq!(placement.edge_count, 3);
        assert_eq!(gm[p].owner(), Some(root));
        assert_eq!(gm[root].nodes().len(), 4);
        assert_eq!(gm.all_edges().len(), 3);
        assert!(gm.is_neighbor(a, p) && gm.is_neighbor(p, b));
    }

    #[test]
    fn reversed_neighbors_ask_for_rotation() {
        let (mut gm, [a, p, b, _]) = reaction();
        gm[a].set_center(195.0, 50.0);
        gm[b].set_center(5.0, 50.0);
        let mut node = ProcessNode::expand(&mut gm, p).unwrap();
        node.calc_rotational_forces(&gm, 50.0);
        assert!(node.is_rotation_necessary());
        assert_eq!(node.proper_edge_count, 1);

        let (best, _) = node.count_proper(&gm, Orientation::RightToLeft, 50.0);
        assert_eq!(best, 3);
    }
}
