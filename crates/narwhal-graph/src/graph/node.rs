use crate::cluster::ClusterId;
use crate::constants::{INITIAL_WORLD_BOUNDARY, WORLD_BOUNDARY, WORLD_CENTER_X, WORLD_CENTER_Y};
use crate::geometry::{Dimension, Point, Rect};
use crate::transform::Transform;
use crate::view::ViewRef;

use super::{EdgeId, GraphId};

/// A node record. Structural fields (owner, child graph, incident edges) are maintained by the
/// [`super::GraphManager`]; geometry and tags are free to edit.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub(crate) owner: Option<GraphId>,
    pub(crate) child: Option<GraphId>,
    pub(crate) edges: Vec<EdgeId>,
    pub(crate) inclusion_tree_depth: u32,
    pub(crate) estimated_size: f64,
    pub(crate) clusters: Vec<ClusterId>,
    pub rect: Rect,
    /// Free-form type tag interpreted by layout variants (e.g. an SBGN glyph class).
    pub kind: Option<String>,
    pub label: Option<String>,
    pub view: Option<ViewRef>,
}

impl Node {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            ..Self::default()
        }
    }

    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(Rect::new(0.0, 0.0, width, height))
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_view(mut self, view: ViewRef) -> Self {
        self.view = Some(view);
        self
    }

    pub fn owner(&self) -> Option<GraphId> {
        self.owner
    }

    pub fn child(&self) -> Option<GraphId> {
        self.child
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn clusters(&self) -> &[ClusterId] {
        &self.clusters
    }

    /// Depth in the inclusion tree; `1` for members of the root graph, `0` until computed.
    pub fn inclusion_tree_depth(&self) -> u32 {
        self.inclusion_tree_depth
    }

    pub fn estimated_size(&self) -> f64 {
        self.estimated_size
    }

    pub fn kind_is(&self, kind: &str) -> bool {
        self.kind.as_deref() == Some(kind)
    }

    pub fn left(&self) -> f64 {
        self.rect.left()
    }

    pub fn right(&self) -> f64 {
        self.rect.right()
    }

    pub fn top(&self) -> f64 {
        self.rect.top()
    }

    pub fn bottom(&self) -> f64 {
        self.rect.bottom()
    }

    pub fn width(&self) -> f64 {
        self.rect.width
    }

    pub fn height(&self) -> f64 {
        self.rect.height
    }

    pub fn set_width(&mut self, width: f64) {
        self.rect.width = width;
    }

    pub fn set_height(&mut self, height: f64) {
        self.rect.height = height;
    }

    pub fn size(&self) -> Dimension {
        Dimension::new(self.rect.width, self.rect.height)
    }

    pub fn center(&self) -> Point {
        self.rect.center()
    }

    pub fn center_x(&self) -> f64 {
        self.rect.center_x()
    }

    pub fn center_y(&self) -> f64 {
        self.rect.center_y()
    }

    pub fn location(&self) -> Point {
        Point::new(self.rect.x, self.rect.y)
    }

    pub fn set_location(&mut self, x: f64, y: f64) {
        self.rect.x = x;
        self.rect.y = y;
    }

    pub fn set_center(&mut self, cx: f64, cy: f64) {
        self.rect.x = cx - self.rect.width / 2.0;
        self.rect.y = cy - self.rect.height / 2.0;
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.rect.x += dx;
        self.rect.y += dy;
    }

    pub fn diagonal(&self) -> f64 {
        self.rect.diagonal()
    }

    pub fn half_the_diagonal(&self) -> f64 {
        self.rect.diagonal() / 2.0
    }

    /// Places the top-left corner in the initial world square. `unit_x`/`unit_y` are uniform
    /// samples from `[0, 1)`.
    pub fn scatter(&mut self, unit_x: f64, unit_y: f64) {
        let min_x = WORLD_CENTER_X - INITIAL_WORLD_BOUNDARY;
        let min_y = WORLD_CENTER_Y - INITIAL_WORLD_BOUNDARY;
        self.rect.x = min_x + unit_x * (2.0 * INITIAL_WORLD_BOUNDARY);
        self.rect.y = min_y + unit_y * (2.0 * INITIAL_WORLD_BOUNDARY);
    }

    /// Clamps the top-left corner into the world and relocates it through the inverse of
    /// `trans`.
    pub fn transform(&mut self, trans: &Transform) {
        let left = self.rect.x.clamp(-WORLD_BOUNDARY, WORLD_BOUNDARY);
        let top = self.rect.y.clamp(-WORLD_BOUNDARY, WORLD_BOUNDARY);
        let p = trans.inverse_transform_point(Point::new(left, top));
        self.set_location(p.x, p.y);
    }
}
