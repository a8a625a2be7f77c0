//! Plain geometry values plus the rectangle helpers the force computations rely on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: f64,
    pub height: f64,
}

impl Dimension {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner (y grows downwards).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_corners(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    pub fn diagonal(&self) -> f64 {
        (self.width * self.width + self.height * self.height).sqrt()
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.left(), self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
    }

    /// Strict overlap test: rectangles that only touch do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Smallest rectangle covering both inputs.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_corners(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Bounding rectangle of a set of rectangles, `None` when the set is empty.
    pub fn bounding<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects.into_iter().fold(None, |acc, r| match acc {
            None => Some(*r),
            Some(b) => Some(b.union(r)),
        })
    }

    /// The point on this rectangle's boundary hit by the ray from its center towards
    /// `other`'s center.
    pub fn clip_point_towards(&self, other: &Rect) -> Point {
        let (ax, ay) = (self.center_x(), self.center_y());
        let dx = other.center_x() - ax;
        let dy = other.center_y() - ay;

        if dx == 0.0 && dy == 0.0 {
            return Point::new(ax, ay);
        }

        let mut t_x = f64::INFINITY;
        let mut t_y = f64::INFINITY;
        if dx != 0.0 {
            t_x = (self.half_width() / dx.abs()).max(0.0);
        }
        if dy != 0.0 {
            t_y = (self.half_height() / dy.abs()).max(0.0);
        }
        let t = t_x.min(t_y);
        Point::new(ax + t * dx, ay + t * dy)
    }
}

/// Three-way sign: `0.0` stays `0.0`, unlike [`f64::signum`].
pub fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Boundary points of the segment joining the centers of `a` and `b`, clipped by both
/// rectangles. Returns `None` when the rectangles overlap.
///
/// The first point lies on `a`, the second on `b`.
pub fn clipping_points(a: &Rect, b: &Rect) -> Option<(Point, Point)> {
    if a.intersects(b) {
        return None;
    }
    Some((a.clip_point_towards(b), b.clip_point_towards(a)))
}

/// Direction signs pushing `a` away from `b` (per axis).
pub fn directions_for_overlapping(a: &Rect, b: &Rect) -> (f64, f64) {
    let dir_x = if a.center_x() < b.center_x() {
        -1.0
    } else {
        1.0
    };
    let dir_y = if a.center_y() < b.center_y() {
        -1.0
    } else {
        1.0
    };
    (dir_x, dir_y)
}

/// Separation for two overlapping rectangles: the returned vector moves `a` out of `b`
/// (apply its negation to `b`). `buffer` is added on each axis.
pub fn separation_amount(a: &Rect, b: &Rect, buffer: f64) -> (f64, f64) {
    debug_assert!(a.intersects(b));

    let (dir_x, dir_y) = directions_for_overlapping(a, b);

    let mut overlap_x = a.right().min(b.right()) - a.left().max(b.left());
    let mut overlap_y = a.bottom().min(b.bottom()) - a.top().max(b.top());

    // One rectangle fully containing the other along an axis needs the extra distance to
    // clear the nearer side.
    if a.left() <= b.left() && a.right() >= b.right() {
        overlap_x += (b.left() - a.left()).min(a.right() - b.right());
    } else if b.left() <= a.left() && b.right() >= a.right() {
        overlap_x += (a.left() - b.left()).min(b.right() - a.right());
    }
    if a.top() <= b.top() && a.bottom() >= b.bottom() {
        overlap_y += (b.top() - a.top()).min(a.bottom() - b.bottom());
    } else if b.top() <= a.top() && b.bottom() >= a.bottom() {
        overlap_y += (a.top() - b.top()).min(b.bottom() - a.bottom());
    }

    let mut slope = ((b.center_y() - a.center_y()) / (b.center_x() - a.center_x())).abs();
    if b.center_y() == a.center_y() && b.center_x() == a.center_x() {
        slope = 1.0;
    }

    let mut move_by_y = slope * overlap_x;
    let mut move_by_x = overlap_y / slope;
    if overlap_x < move_by_x {
        move_by_x = overlap_x;
    } else {
        move_by_y = overlap_y;
    }

    (
        dir_x * (move_by_x / 2.0 + buffer),
        dir_y * (move_by_y / 2.0 + buffer),
    )
}

/// Unsigned angle in degrees, normalized to `[0, 180]`, between the rays `center → target`
/// and `center → other`.
pub fn angle_between(target: Point, center: Point, other: Point) -> f64 {
    let a = (target.y - center.y).atan2(target.x - center.x);
    let b = (other.y - center.y).atan2(other.x - center.x);
    let deg = (a - b).abs().to_degrees() % 360.0;
    if deg > 180.0 { 360.0 - deg } else { deg }
}

/// Signed angle in degrees, normalized to `(-180, 180]`, rotating `from` onto `to`.
pub fn signed_angle(from: Point, to: Point) -> f64 {
    let a = from.y.atan2(from.x);
    let b = to.y.atan2(to.x);
    let mut deg = (b - a).to_degrees() % 360.0;
    if deg > 180.0 {
        deg -= 360.0;
    } else if deg <= -180.0 {
        deg += 360.0;
    }
    deg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_point_lands_on_facing_side() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(40.0, 0.0, 10.0, 10.0);
        let (pa, pb) = clipping_points(&a, &b).unwrap();
        assert_eq!(pa, Point::new(10.0, 5.0));
        assert_eq!(pb, Point::new(40.0, 5.0));
    }

    #[test]
    fn overlapping_rects_have_no_clipping_points() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(clipping_points(&a, &b).is_none());
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&touching));
    }

    #[test]
    fn separation_pushes_left_rect_further_left() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(6.0, 0.0, 10.0, 10.0);
        let (dx, _dy) = separation_amount(&a, &b, 0.0);
        assert!(dx < 0.0, "dx = {dx}");
    }

    #[test]
    fn angles_are_normalized() {
        let c = Point::new(0.0, 0.0);
        assert!((angle_between(Point::new(1.0, 0.0), c, Point::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((angle_between(Point::new(1.0, 0.1), c, Point::new(1.0, -0.1)) - 11.42).abs() < 0.01);
        assert!((angle_between(Point::new(-1.0, 0.01), c, Point::new(-1.0, -0.01))).abs() < 2.0);
        assert!((signed_angle(Point::new(1.0, 0.0), Point::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((signed_angle(Point::new(-1.0, 0.01), Point::new(-1.0, -0.01))).abs() < 2.0);
    }

    #[test]
    fn sign_keeps_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(sign(0.2), 1.0);
    }
}
