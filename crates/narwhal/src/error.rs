use narwhal_graph::{EdgeId, ModelError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("graph manager has no root graph")]
    MissingRoot,

    #[error("graph has no nodes to lay out")]
    EmptyGraph,

    #[error("graph contains an edge with a missing endpoint: {edge:?}")]
    InvalidEdge { edge: EdgeId },

    #[error("invalid layout options: {0}")]
    Options(#[from] serde_json::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, Error>;
