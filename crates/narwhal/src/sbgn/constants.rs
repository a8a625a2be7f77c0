//! Tuning constants of the SBGN process-description layout.

/// Gap kept between neighboring complex members when they are packed.
pub const COMPLEX_MEM_HORIZONTAL_BUFFER: f64 = 15.0;
pub const COMPLEX_MEM_VERTICAL_BUFFER: f64 = 15.0;
/// Inner margin between a packed complex and its members.
pub const COMPLEX_MEM_MARGIN: f64 = 10.0;
pub const COMPLEX_MIN_WIDTH: f64 = COMPLEX_MEM_MARGIN * 2.0;
/// Buffer handed to the polyomino packer around every member.
pub const POLYOMINO_BUFFER: f64 = 15.0;

pub const PORT_NODE_DEFAULT_WIDTH: f64 = 3.0;
pub const PORT_NODE_DEFAULT_HEIGHT: f64 = 3.0;
/// Gap between a process body and each of its ports.
pub const RIGID_EDGE_LENGTH: f64 = 10.0;

pub const PHASE1_MAX_ITERATION_COUNT: usize = 200;
pub const PHASE2_INITIAL_COOLING_FACTOR: f64 = 0.3;
pub const PHASE2_ITERATIONS_PER_LOG_STEP: usize = 400;
pub const PHASE2_MAX_ITERATION_COUNT: usize = 2500;

/// Degrees within which an edge counts as properly oriented.
pub const ANGLE_TOLERANCE: f64 = 45.0;
pub const EFFECTOR_ANGLE_TOLERANCE: f64 = 45.0;
/// Net rotational force, in degrees, above which a process asks to be turned.
pub const ROTATION_90_DEGREE: f64 = 60.0;
/// A rotation slot comes up every this many phase 2 iterations.
pub const ROTATIONAL_FORCE_ITERATION_COUNT: usize = 2;
/// Share of properly oriented edges required before phase 2 may stop.
pub const ROTATIONAL_FORCE_CONVERGENCE: f64 = 1.0;

/// Single neighbors are snapped onto their port targets when the iteration count modulo
/// [`crate::constants::CONVERGENCE_CHECK_PERIOD`] hits this value.
pub const APPROXIMATION_PERIOD: usize = 30;
pub const APPROXIMATION_MIN_COOLING: f64 = 0.02;
