//! Force-directed layout constants.
//!
//! Model-level constants (margins, world bounds) live in [`narwhal_graph::constants`] and are
//! re-exported here for convenience.

pub use narwhal_graph::constants::*;

pub const DEFAULT_EDGE_LENGTH: f64 = 50.0;
pub const DEFAULT_SPRING_STRENGTH: f64 = 0.45;
pub const DEFAULT_REPULSION_STRENGTH: f64 = 4500.0;
pub const DEFAULT_GRAVITY_STRENGTH: f64 = 0.4;
pub const DEFAULT_COMPOUND_GRAVITY_STRENGTH: f64 = 1.0;
pub const DEFAULT_GRAVITY_RANGE_FACTOR: f64 = 3.8;
pub const DEFAULT_COMPOUND_GRAVITY_RANGE_FACTOR: f64 = 1.5;
pub const DEFAULT_COOLING_FACTOR_INCREMENTAL: f64 = 0.8;
pub const MAX_NODE_DISPLACEMENT_INCREMENTAL: f64 = 100.0;
pub const MAX_NODE_DISPLACEMENT: f64 = MAX_NODE_DISPLACEMENT_INCREMENTAL * 3.0;
pub const MIN_REPULSION_DIST: f64 = DEFAULT_EDGE_LENGTH / 10.0;
pub const CONVERGENCE_CHECK_PERIOD: usize = 100;
pub const PER_LEVEL_IDEAL_EDGE_LENGTH_FACTOR: f64 = 0.1;
pub const GRID_CALCULATION_CHECK_PERIOD: usize = 10;
pub const MAX_ITERATIONS: usize = 2500;
/// Per-node share of the total displacement below which a run counts as converged.
pub const DISPLACEMENT_THRESHOLD_PER_NODE: f64 = (3.0 * DEFAULT_EDGE_LENGTH) / 100.0;

pub const DEFAULT_RADIAL_SEPARATION: f64 = DEFAULT_EDGE_LENGTH;
pub const DEFAULT_COMPONENT_SEPERATION: f64 = 60.0;
pub const DEFAULT_ANIMATION_PERIOD: f64 = 50.0;
pub const DEFAULT_RANDOM_SEED: u64 = 1;

/// Quality adjustments: the threshold delta and the iteration multiplier.
pub const PROOF_THRESHOLD_DELTA: f64 = -0.3;
pub const PROOF_ITERATION_FACTOR: f64 = 1.2;
pub const DRAFT_THRESHOLD_DELTA: f64 = 0.3;
pub const DRAFT_ITERATION_FACTOR: f64 = 0.8;
