#![forbid(unsafe_code)]

//! Headless compound spring-embedder layout (CoSE) with an SBGN process-description variant.
//!
//! Build a [`graph::GraphManager`], then run a [`Layout`] over it. [`Layout::cose`] uses the
//! plain compound embedder; [`sbgn::SbgnPd`] adds port nodes, orientation refinement and
//! complex packing.

mod bendpoints;
mod coarsen;
pub mod constants;
pub mod engine;
pub mod error;
pub mod forest;
mod grid;
pub mod layout;
pub mod options;
mod placement;
pub mod policy;
pub mod random;
pub mod sbgn;

pub use narwhal_graph as graph;

pub use bendpoints::BEND_DUMMY;
pub use engine::Engine;
pub use error::{Error, Result};
pub use layout::{Layout, LayoutStats, layout_cose};
pub use options::{Compaction, LayoutOptions, Quality, RotationSelection, SbgnOptions};
pub use policy::{Cose, LayoutPolicy};
pub use sbgn::{Orientation, ProcessPlacement, SbgnPd, SbgnStats, layout_sbgn};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
