use std::time::Instant;

use narwhal_graph::{GraphManager, Point};

use crate::engine::Engine;
use crate::error::Result;
use crate::options::LayoutOptions;
use crate::policy::{Cose, LayoutPolicy};

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutStats {
    /// Iterations of the last spring embedder run (the finest level under multi-level scaling).
    pub total_iterations: usize,
    pub converged: bool,
    /// Coarse levels built by multi-level scaling; `0` without it.
    pub levels: usize,
}

/// A layout run over one graph manager with a fixed policy.
pub struct Layout<P: LayoutPolicy = Cose> {
    engine: Engine,
    policy: P,
}

impl Layout<Cose> {
    pub fn cose(gm: GraphManager, options: LayoutOptions) -> Self {
        Self::new(gm, options, Cose)
    }
}

impl<P: LayoutPolicy> Layout<P> {
    pub fn new(gm: GraphManager, options: LayoutOptions, policy: P) -> Self {
        Self {
            engine: Engine::new(gm, options),
            policy,
        }
    }

    pub fn graph(&self) -> &GraphManager {
        self.engine.graph()
    }

    pub fn graph_mut(&mut self) -> &mut GraphManager {
        self.engine.graph_mut()
    }

    pub fn into_graph(self) -> GraphManager {
        self.engine.into_graph()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn options_mut(&mut self) -> &mut LayoutOptions {
        &mut self.engine.options
    }

    pub fn set_animation_hook(&mut self, hook: impl FnMut(&GraphManager) + 'static) {
        self.engine.set_animation_hook(hook);
    }

    /// Runs the layout, reporting success as a flag. Failures are logged at debug level and
    /// leave the model untouched.
    pub fn run_layout(&mut self) -> bool {
        match self.try_run_layout() {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(%err, "layout skipped");
                false
            }
        }
    }

    /// Runs the layout: validation, the policy-driven embedder, translation of the drawing to
    /// the origin and view updates.
    pub fn try_run_layout(&mut self) -> Result<LayoutStats> {
        let start = Instant::now();
        self.engine.init_parameters();
        self.engine.check_model()?;

        self.engine.layout(&mut self.policy);

        self.engine.transform_to(Point::new(0.0, 0.0));
        self.engine.update_views();

        let stats = LayoutStats {
            total_iterations: self.engine.total_iterations,
            converged: self.engine.converged,
            levels: self.engine.no_of_levels,
        };
        tracing::info!(
            iterations = stats.total_iterations,
            converged = stats.converged,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "layout finished"
        );
        Ok(stats)
    }
}

/// Runs a plain compound layout over `gm` in place.
pub fn layout_cose(gm: &mut GraphManager, options: LayoutOptions) -> Result<LayoutStats> {
    let mut layout = Layout::cose(std::mem::take(gm), options);
    let result = layout.try_run_layout();
    *gm = layout.into_graph();
    result
}
