#![forbid(unsafe_code)]

//! Compound graph model used by `narwhal`.
//!
//! Nodes, edges and graphs live in arenas owned by a [`GraphManager`] and refer to each other
//! through copyable ids. A node may own a child graph (making it a compound node); edges whose
//! endpoints live in different graphs are tracked by the manager as inter-graph edges.

pub mod cluster;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod transform;
pub mod view;

pub use cluster::{Cluster, ClusterId, ClusterManager, Clustered};
pub use error::{ModelError, Result};
pub use geometry::{Dimension, Point, Rect};
pub use graph::{Edge, EdgeId, Graph, GraphId, GraphManager, Node, NodeId};
pub use transform::Transform;
pub use view::{Updatable, ViewObject, ViewRef};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
