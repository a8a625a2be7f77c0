use crate::constants::DEFAULT_GRAPH_MARGIN;
use crate::geometry::{Point, Rect};
use crate::view::ViewRef;

use super::{EdgeId, NodeId};

/// A graph in the inclusion tree: the root, or the child graph of a compound node.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) parent: Option<NodeId>,
    pub(crate) nodes: Vec<NodeId>,
    pub(crate) edges: Vec<EdgeId>,
    pub(crate) left: f64,
    pub(crate) top: f64,
    pub(crate) right: f64,
    pub(crate) bottom: f64,
    pub(crate) estimated_size: f64,
    pub(crate) is_connected: bool,
    pub margin: f64,
    pub label: Option<String>,
    pub view: Option<ViewRef>,
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            parent: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            left: 0.0,
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
            estimated_size: 0.0,
            is_connected: false,
            margin: DEFAULT_GRAPH_MARGIN,
            label: None,
            view: None,
        }
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(mut self, view: ViewRef) -> Self {
        self.view = Some(view);
        self
    }

    /// Parent compound node; `None` only for the root graph.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Intra-graph edges.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    /// Bounds including the graph margin, as of the last bounds update.
    pub fn bounds(&self) -> Rect {
        Rect::from_corners(self.left, self.top, self.right, self.bottom)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    pub fn estimated_size(&self) -> f64 {
        self.estimated_size
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected
    }
}
