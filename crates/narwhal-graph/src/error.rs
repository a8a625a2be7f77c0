use crate::graph::{EdgeId, GraphId, NodeId};

/// Index-consistency failures reported by [`crate::GraphManager::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("graph manager has no root graph")]
    MissingRoot,

    #[error("node {node:?} is not listed by its owner graph {graph:?}")]
    NodeNotInOwner { node: NodeId, graph: GraphId },

    #[error("child graph {graph:?} does not point back to its parent node {node:?}")]
    ChildParentMismatch { node: NodeId, graph: GraphId },

    #[error("edge {edge:?} has a missing endpoint")]
    MissingEndpoint { edge: EdgeId },

    #[error("edge {edge:?} is classified as {found} but its endpoints say otherwise")]
    EdgeClassification { edge: EdgeId, found: &'static str },

    #[error("node {node:?} has inclusion depth {depth}, expected {expected}")]
    InclusionDepth {
        node: NodeId,
        depth: u32,
        expected: u32,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
