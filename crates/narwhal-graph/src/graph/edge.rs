use crate::geometry::Point;
use crate::view::ViewRef;

use super::{GraphId, NodeId};

/// Where an edge is currently listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum EdgePlacement {
    /// Not part of the model (freshly created, or temporarily taken out).
    #[default]
    Detached,
    /// Listed by a single graph; both endpoints are members of it.
    Graph(GraphId),
    /// Listed by the manager; endpoints live in different graphs.
    InterGraph,
}

#[derive(Debug, Clone, Default)]
pub struct Edge {
    pub(crate) source: Option<NodeId>,
    pub(crate) target: Option<NodeId>,
    pub(crate) placement: EdgePlacement,
    pub(crate) lca: Option<GraphId>,
    pub(crate) source_in_lca: Option<NodeId>,
    pub(crate) target_in_lca: Option<NodeId>,
    pub bendpoints: Vec<Point>,
    pub kind: Option<String>,
    pub label: Option<String>,
    pub view: Option<ViewRef>,
}

impl Edge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_view(mut self, view: ViewRef) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_bendpoints(mut self, bendpoints: Vec<Point>) -> Self {
        self.bendpoints = bendpoints;
        self
    }

    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn is_inter_graph(&self) -> bool {
        self.placement == EdgePlacement::InterGraph
    }

    pub fn is_attached(&self) -> bool {
        self.placement != EdgePlacement::Detached
    }

    /// Owning graph for intra-graph edges.
    pub fn owner_graph(&self) -> Option<GraphId> {
        match self.placement {
            EdgePlacement::Graph(g) => Some(g),
            _ => None,
        }
    }

    /// Lowest common ancestor graph of the endpoints, valid after
    /// [`super::GraphManager::calc_lowest_common_ancestors`].
    pub fn lca(&self) -> Option<GraphId> {
        self.lca
    }

    pub fn source_in_lca(&self) -> Option<NodeId> {
        self.source_in_lca
    }

    pub fn target_in_lca(&self) -> Option<NodeId> {
        self.target_in_lca
    }

    pub fn kind_is(&self, kind: &str) -> bool {
        self.kind.as_deref() == Some(kind)
    }

    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if self.source == Some(node) {
            self.target
        } else if self.target == Some(node) {
            self.source
        } else {
            None
        }
    }
}
