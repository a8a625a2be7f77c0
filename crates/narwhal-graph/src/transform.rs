//! World/device coordinate mapping.
//!
//! A transform maps a world window (origin + extent) onto a device window. Layouts use the
//! inverse direction to relocate a drawing: with unit extents it is a pure translation that
//! sends the device origin to the world origin.

use nalgebra::{Matrix3, Vector3};

use crate::geometry::{Dimension, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub world_origin: Point,
    pub world_extent: Dimension,
    pub device_origin: Point,
    pub device_extent: Dimension,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            world_origin: Point::default(),
            world_extent: Dimension::new(1.0, 1.0),
            device_origin: Point::default(),
            device_extent: Dimension::new(1.0, 1.0),
        }
    }
}

impl Transform {
    /// Translation-only transform mapping `device_origin` (world → device) from `world_origin`.
    pub fn translation(world_origin: Point, device_origin: Point) -> Self {
        Self {
            world_origin,
            device_origin,
            ..Self::default()
        }
    }

    /// Homogeneous world → device matrix.
    pub fn matrix(&self) -> Matrix3<f64> {
        let sx = self.device_extent.width / self.world_extent.width;
        let sy = self.device_extent.height / self.world_extent.height;
        Matrix3::new(
            sx,
            0.0,
            self.device_origin.x - self.world_origin.x * sx,
            0.0,
            sy,
            self.device_origin.y - self.world_origin.y * sy,
            0.0,
            0.0,
            1.0,
        )
    }

    pub fn transform_point(&self, p: Point) -> Point {
        apply(&self.matrix(), p)
    }

    /// Device → world. Degenerate (zero) extents leave the point unchanged.
    pub fn inverse_transform_point(&self, p: Point) -> Point {
        match self.matrix().try_inverse() {
            Some(inv) => apply(&inv, p),
            None => p,
        }
    }
}

fn apply(m: &Matrix3<f64>, p: Point) -> Point {
    let v = m * Vector3::new(p.x, p.y, 1.0);
    Point::new(v.x / v.z, v.y / v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_translation_moves_device_origin_to_world_origin() {
        let t = Transform::translation(Point::new(0.0, 0.0), Point::new(120.0, -40.0));
        let p = t.inverse_transform_point(Point::new(120.0, -40.0));
        assert!((p.x).abs() < 1e-9 && (p.y).abs() < 1e-9);
        let q = t.inverse_transform_point(Point::new(130.0, -35.0));
        assert!((q.x - 10.0).abs() < 1e-9 && (q.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn scaled_transform_round_trips() {
        let t = Transform {
            world_origin: Point::new(5.0, 5.0),
            world_extent: Dimension::new(2.0, 4.0),
            device_origin: Point::new(-3.0, 1.0),
            device_extent: Dimension::new(6.0, 2.0),
        };
        let p = Point::new(17.0, -8.0);
        let back = t.inverse_transform_point(t.transform_point(p));
        assert!((back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9);
    }
}
