//! Model-level layout constants shared by the graph model and the layout engine.

/// Margin between a graph's members and its bounding rectangle.
pub const DEFAULT_GRAPH_MARGIN: f64 = 15.0;

/// Padding between a compound node's rectangle and its children.
pub const COMPOUND_NODE_MARGIN: f64 = 10.0;

/// Extra height reserved below the children of a compound node for its label.
pub const LABEL_HEIGHT: f64 = 20.0;

pub const SIMPLE_NODE_SIZE: f64 = 40.0;
pub const SIMPLE_NODE_HALF_SIZE: f64 = SIMPLE_NODE_SIZE / 2.0;
pub const EMPTY_COMPOUND_NODE_SIZE: f64 = 40.0;
pub const MIN_EDGE_LENGTH: f64 = 1.0;

/// Coordinates are clamped to `[-WORLD_BOUNDARY, WORLD_BOUNDARY]` when transformed back.
pub const WORLD_BOUNDARY: f64 = 1_000_000.0;
/// Half extent of the square random placement scatters nodes into.
pub const INITIAL_WORLD_BOUNDARY: f64 = WORLD_BOUNDARY / 1000.0;
pub const WORLD_CENTER_X: f64 = 1200.0;
pub const WORLD_CENTER_Y: f64 = 900.0;
