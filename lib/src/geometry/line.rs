//! Line segment type.

use super::{Point, PointF};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A line segment defined by two endpoints.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Line {
    #[inline]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Direction vector (b - a).
    #[inline]
    pub fn direction(&self) -> Point {
        self.b - self.a
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        self.a.distance(&self.b)
    }

    /// Point at parameter `t` along the segment, in unscaled coordinates.
    #[inline]
    pub fn point_at(&self, t: CoordF) -> PointF {
        self.a.to_f64().lerp(&self.b.to_f64(), t)
    }

    /// Check if two line segments intersect.
    pub fn intersects(&self, other: &Line) -> bool {
        self.intersection(other).is_some()
    }

    /// Intersection point of two segments, or None if they don't touch.
    /// Parallel segments never intersect.
    pub fn intersection(&self, other: &Line) -> Option<Point> {
        self.intersection_param(other).map(|(p, _)| p)
    }

    /// Intersection point together with its parameter along `self`.
    pub fn intersection_param(&self, other: &Line) -> Option<(Point, CoordF)> {
        let d1 = self.direction();
        let d2 = other.direction();

        let cross = d1.cross(&d2);
        if cross == 0 {
            return None;
        }

        let diff = other.a - self.a;
        let t = diff.cross(&d2) as CoordF / cross as CoordF;
        let u = diff.cross(&d1) as CoordF / cross as CoordF;

        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            let p = Point::new(
                (self.a.x as CoordF + t * d1.x as CoordF).round() as Coord,
                (self.a.y as CoordF + t * d1.y as CoordF).round() as Coord,
            );
            Some((p, t))
        } else {
            None
        }
    }

    /// Squared distance from a point to this segment, in scaled units.
    pub fn distance_to_squared(&self, p: &Point) -> CoordF {
        let (projected, _) = p.project_onto_segment(self.a, self.b);
        projected.distance_squared(p) as CoordF
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?} -> {:?})", self.a, self.b)
    }
}
