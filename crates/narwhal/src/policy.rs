//! Extension points of the layout driver.
//!
//! [`LayoutPolicy`] lets a layout variant hook into the shared driver and spring embedder
//! without re-implementing them. [`Cose`] uses every default.

use narwhal_graph::{EdgeId, GraphManager, NodeId};

use crate::engine::Engine;

pub trait LayoutPolicy {
    /// Runs before bend points are created and before any placement.
    fn pre_process_topology(&mut self, _engine: &mut Engine) {}

    /// Places nodes when the run is not incremental: radial for a flat forest, random otherwise.
    fn initial_placement(&mut self, engine: &mut Engine) {
        engine.default_initial_placement();
    }

    /// Runs after placement. Returning `true` means the topology changed and the derived
    /// quantities (gravitation set, ancestors, depths, ideal lengths) must be recomputed.
    fn before_spring_embedder(&mut self, _engine: &mut Engine) -> bool {
        false
    }

    fn run_spring_embedder(&mut self, engine: &mut Engine) {
        engine.run_spring_embedder(self);
    }

    fn spring_applies(&self, _gm: &GraphManager, _edge: EdgeId) -> bool {
        true
    }

    fn repulsion_applies(&self, _gm: &GraphManager, _a: NodeId, _b: NodeId) -> bool {
        true
    }

    /// Runs after spring, repulsion and gravity forces are accumulated, before nodes move.
    fn compute_extra_forces(&mut self, _engine: &mut Engine) {}

    fn after_move(&mut self, _engine: &mut Engine) {}

    /// Runs after the spring embedder, before the final translation and view updates.
    fn post_process_topology(&mut self, _engine: &mut Engine) {}

    fn supports_multi_level(&self) -> bool {
        true
    }
}

/// Plain compound spring embedder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cose;

impl LayoutPolicy for Cose {}
