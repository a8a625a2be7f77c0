//! SBGN process-description layout.
//!
//! [`SbgnPd`] is a [`LayoutPolicy`] that runs the compound spring embedder in two phases. The
//! first is a short undirected run. The second adds rotational forces so that every process
//! lines its input and output ports up with its reactants and products. Before the run, process
//! nodes are expanded into a compound holding two ports, and complexes are packed into
//! fixed-size leaves; both are undone afterwards.

pub mod complex;
pub mod constants;
pub mod glyph;
mod polyomino;
pub mod process;
mod tiling;

use narwhal_graph::{EdgeId, GraphManager, NodeId};

use self::complex::ComplexState;
use self::constants::{
    APPROXIMATION_MIN_COOLING, APPROXIMATION_PERIOD, PHASE1_MAX_ITERATION_COUNT,
    PHASE2_INITIAL_COOLING_FACTOR, PHASE2_ITERATIONS_PER_LOG_STEP, PHASE2_MAX_ITERATION_COUNT,
    ROTATIONAL_FORCE_CONVERGENCE, ROTATIONAL_FORCE_ITERATION_COUNT,
};
use self::glyph::{ArcClass, Glyph, is_port};
use self::process::ProcessNode;
use crate::constants::CONVERGENCE_CHECK_PERIOD;
use crate::engine::Engine;
use crate::error::Result;
use crate::layout::{Layout, LayoutStats};
use crate::options::{LayoutOptions, RotationSelection, SbgnOptions};
use crate::policy::LayoutPolicy;

pub use self::glyph::UnknownKind;
pub use self::process::{Orientation, ProcessPlacement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Undirected,
    Rotational,
}

/// Outcome of the orientation refinement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SbgnStats {
    pub phase1_iterations: usize,
    pub phase2_iterations: usize,
    pub proper_edge_count: usize,
    pub total_edge_count_to_be_oriented: usize,
    /// Properly oriented share after the rotational phase.
    pub success_ratio: f64,
    /// Properly oriented share after the final enhancement.
    pub enhanced_ratio: f64,
    pub total_effector_count: usize,
    /// Used area over total area of the largest complex.
    pub fullness: Option<f64>,
    pub processes: Vec<ProcessPlacement>,
}

#[derive(Debug, Default)]
pub struct SbgnPd {
    options: SbgnOptions,
    phase: Phase,
    ports_created: bool,
    processes: Vec<ProcessNode>,
    complexes: ComplexState,
    iteration_proper: usize,
    iteration_total: usize,
    stats: SbgnStats,
}

fn ratio(proper: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        proper as f64 / total as f64
    }
}

/// Index picked by spinning a wheel whose slots are proportional to `weights`; `None` when
/// `spin` falls past the last slot.
fn roulette_wheel(weights: &[f64], spin: f64) -> Option<usize> {
    let sum: f64 = weights.iter().sum();
    if weights.is_empty() || sum <= 0.0 {
        return None;
    }
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w / sum;
        if spin < cumulative {
            return Some(i);
        }
    }
    None
}

impl SbgnPd {
    pub fn new(options: SbgnOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &SbgnOptions {
        &self.options
    }

    pub fn stats(&self) -> &SbgnStats {
        &self.stats
    }

    fn expand_processes(&mut self, gm: &mut GraphManager) {
        let candidates: Vec<NodeId> = gm
            .all_nodes()
            .iter()
            .copied()
            .filter(|&n| Glyph::of(&gm[n]).is_some_and(Glyph::is_process))
            .collect();
        for p in candidates {
            if let Some(node) = ProcessNode::expand(gm, p) {
                self.processes.push(node);
            }
        }
        gm.update_bounds();
        tracing::debug!(processes = self.processes.len(), "created port nodes");
    }

    fn run_rotational_phase(&mut self, engine: &mut Engine) {
        let size = engine.gm.all_nodes().len() + engine.gm.all_edges().len();
        let steps = (size.max(1) as f64).ln().floor().max(1.0) as usize;
        let max = (steps * PHASE2_ITERATIONS_PER_LOG_STEP).min(PHASE2_MAX_ITERATION_COUNT);

        engine.max_iterations = max;
        engine.total_iterations = 0;
        engine.initial_cooling_factor = PHASE2_INITIAL_COOLING_FACTOR;
        engine.cooling_factor = PHASE2_INITIAL_COOLING_FACTOR;
        engine.converged = false;

        loop {
            engine.total_iterations += 1;
            if engine.total_iterations % CONVERGENCE_CHECK_PERIOD == 0 {
                self.stats.success_ratio = ratio(self.iteration_proper, self.iteration_total);
                if engine.is_converged()
                    && self.stats.success_ratio >= ROTATIONAL_FORCE_CONVERGENCE
                {
                    engine.converged = true;
                    break;
                }
                engine.cooling_factor = engine.initial_cooling_factor
                    * ((max as f64 - engine.total_iterations as f64) / max as f64);
            }

            engine.step(self);

            if engine.total_iterations >= max {
                break;
            }
        }
        engine.gm.update_bounds();
        self.stats.phase2_iterations = engine.total_iterations;
    }

    fn recalc_properly_oriented_edges(&mut self, engine: &Engine) {
        let ideal = engine.ideal_edge_length;
        let mut proper = 0;
        let mut total = 0;
        for p in &mut self.processes {
            proper += p.calc_properly_oriented_edges(&engine.gm, ideal);
            total += p.edge_count();
        }
        self.stats.proper_edge_count = proper;
        self.stats.total_edge_count_to_be_oriented = total;
        self.stats.success_ratio = ratio(proper, total);
    }

    /// Tries every orientation on every process and keeps a strictly better one.
    fn final_enhancement(&mut self, engine: &mut Engine) {
        let ideal = engine.ideal_edge_length;
        let mut total_proper = 0;
        let mut effectors = 0;
        for p in &mut self.processes {
            let mut best: Option<(Orientation, usize, Vec<bool>)> = None;
            let mut best_count = p.proper_edge_count;
            for orientation in Orientation::ALL {
                let (count, flags) = p.count_proper(&engine.gm, orientation, ideal);
                if count > best_count {
                    best_count = count;
                    best = Some((orientation, count, flags));
                }
            }
            if let Some((orientation, count, flags)) = best {
                p.set_orientation(&mut engine.gm, orientation);
                p.proper_edge_count = count;
                p.properly_oriented = flags;
            }
            total_proper += p.proper_edge_count;
            effectors += p.effector_edges.len();
        }
        self.stats.proper_edge_count = total_proper;
        self.stats.enhanced_ratio = ratio(total_proper, self.stats.total_edge_count_to_be_oriented);
        self.stats.total_effector_count = effectors;
    }

    /// Picks one process asking for a quarter turn and turns it.
    fn rotate_a_process(&mut self, engine: &mut Engine) {
        let candidates: Vec<usize> = self
            .processes
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_rotation_necessary())
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return;
        }

        let picked = match self.options.rotation_selection {
            RotationSelection::Uniform => Some(engine.rng.next_usize(candidates.len())),
            RotationSelection::RouletteWheel => {
                let weights: Vec<f64> = candidates
                    .iter()
                    .map(|&i| self.processes[i].net_rotational_force.abs())
                    .collect();
                roulette_wheel(&weights, engine.rng.next_f64_unit())
            }
        };
        match picked {
            Some(i) => self.processes[candidates[i]].apply_rotation(&mut engine.gm),
            None => tracing::warn!(
                candidates = candidates.len(),
                "no process selected for rotation"
            ),
        }
    }

    fn remove_dummy_compounds(&mut self, engine: &mut Engine) {
        let placements: Vec<ProcessPlacement> = self
            .processes
            .drain(..)
            .map(|p| p.restore(&mut engine.gm))
            .collect();
        self.stats.processes = placements;
        engine.gm.update_bounds();
        engine.reset_state();
    }
}

impl LayoutPolicy for SbgnPd {
    fn pre_process_topology(&mut self, engine: &mut Engine) {
        self.phase = Phase::Idle;
        self.ports_created = false;
        self.processes.clear();
        self.complexes = ComplexState::default();
        self.stats = SbgnStats::default();

        self.complexes.group_zero_degree_members(&mut engine.gm);
        self.complexes
            .apply_dfs_on_complexes(&mut engine.gm, self.options.compaction);
    }

    fn before_spring_embedder(&mut self, engine: &mut Engine) -> bool {
        if self.ports_created {
            return false;
        }
        self.ports_created = true;
        self.expand_processes(&mut engine.gm);
        !self.processes.is_empty()
    }

    fn run_spring_embedder(&mut self, engine: &mut Engine) {
        self.phase = Phase::Undirected;
        engine.max_iterations = PHASE1_MAX_ITERATION_COUNT;
        engine.total_iterations = 0;
        engine.run_spring_embedder(self);
        self.stats.phase1_iterations = engine.total_iterations;
        tracing::debug!(iterations = engine.total_iterations, "sbgn phase 1 finished");

        self.phase = Phase::Rotational;
        self.run_rotational_phase(engine);
        tracing::debug!(
            iterations = self.stats.phase2_iterations,
            success_ratio = self.stats.success_ratio,
            "sbgn phase 2 finished"
        );

        self.phase = Phase::Idle;
        self.recalc_properly_oriented_edges(engine);
        self.final_enhancement(engine);
        self.remove_dummy_compounds(engine);
    }

    fn spring_applies(&self, gm: &GraphManager, edge: EdgeId) -> bool {
        ArcClass::of(&gm[edge]) != Some(ArcClass::Rigid)
    }

    fn repulsion_applies(&self, gm: &GraphManager, a: NodeId, b: NodeId) -> bool {
        let same_owner = gm[a].owner() == gm[b].owner();
        !(same_owner && (is_port(&gm[a]) || is_port(&gm[b])))
    }

    fn compute_extra_forces(&mut self, engine: &mut Engine) {
        self.iteration_proper = 0;
        self.iteration_total = 0;
        let ideal = engine.ideal_edge_length;

        if engine.total_iterations % CONVERGENCE_CHECK_PERIOD == APPROXIMATION_PERIOD
            && engine.cooling_factor > APPROXIMATION_MIN_COOLING
        {
            for p in &self.processes {
                p.apply_approximations(&mut engine.gm, ideal);
            }
        }

        let rotational = self.phase == Phase::Rotational;
        for p in &mut self.processes {
            if rotational {
                p.calc_rotational_forces(&engine.gm, ideal);
                self.iteration_proper += p.proper_edge_count;
                self.iteration_total += p.edge_count();
            }
            p.transfer_forces(engine);
        }

        if rotational && engine.total_iterations % ROTATIONAL_FORCE_ITERATION_COUNT == 0 {
            self.rotate_a_process(engine);
        }
    }

    fn after_move(&mut self, engine: &mut Engine) {
        for p in &self.processes {
            p.place_ports(&mut engine.gm);
        }
    }

    fn post_process_topology(&mut self, engine: &mut Engine) {
        self.stats.fullness = self
            .complexes
            .repopulate(&mut engine.gm, self.options.compaction);
        engine.gm.calc_inclusion_tree_depths();
        tracing::info!(
            proper_edges = self.stats.proper_edge_count,
            oriented_edges = self.stats.total_edge_count_to_be_oriented,
            success_ratio = self.stats.success_ratio,
            enhanced_ratio = self.stats.enhanced_ratio,
            effectors = self.stats.total_effector_count,
            fullness = self.stats.fullness,
            "sbgn refinement finished"
        );
    }

    /// Port synthesis and complex packing work on the real graph only.
    fn supports_multi_level(&self) -> bool {
        false
    }
}

impl Layout<SbgnPd> {
    pub fn sbgn(gm: GraphManager, options: LayoutOptions, sbgn: SbgnOptions) -> Self {
        Self::new(gm, options, SbgnPd::new(sbgn))
    }
}

/// Runs the SBGN process-description layout over `gm` in place.
pub fn layout_sbgn(
    gm: &mut GraphManager,
    options: LayoutOptions,
    sbgn: SbgnOptions,
) -> Result<(LayoutStats, SbgnStats)> {
    let mut layout = Layout::sbgn(std::mem::take(gm), options, sbgn);
    let result = layout.try_run_layout();
    let stats = layout.policy().stats().clone();
    *gm = layout.into_graph();
    result.map(|run| (run, stats))
}

#[cfg(test)]
mod tests {
    use super::roulette_wheel;

    #[test]
    fn roulette_wheel_slots_follow_weights() {
        let weights = [90.0, 30.0, 60.0];
        assert_eq!(roulette_wheel(&weights, 0.0), Some(0));
        assert_eq!(roulette_wheel(&weights, 0.49), Some(0));
        assert_eq!(roulette_wheel(&weights, 0.5), Some(1));
        assert_eq!(roulette_wheel(&weights, 0.99), Some(2));
        assert_eq!(roulette_wheel(&[], 0.3), None);
    }
}
