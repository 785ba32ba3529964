//! Point types for 2D geometry.
//!
//! Two representations coexist: [`Point`] with scaled integer coordinates,
//! used for anything that is stored or compared exactly, and [`PointF`] in
//! unscaled millimetres, used for distance scoring and interpolation.
//! Converting between them always goes through [`crate::scale`] /
//! [`crate::unscale`] so rounding happens in exactly one place.

use crate::{scale, unscale, Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A 2D point with scaled integer coordinates.
///
/// # Example
/// ```
/// use slicer_seams::geometry::Point;
/// use slicer_seams::scale;
///
/// let p = Point::new(scale(1.0), scale(2.0));
/// assert_eq!(p, Point::new_scale(1.0, 2.0));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

/// A list of scaled points.
pub type Points = Vec<Point>;

impl Point {
    /// Create a new point with the given coordinates.
    #[inline]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Create a new point from floating-point coordinates (in mm), scaling them.
    #[inline]
    pub fn new_scale(x: CoordF, y: CoordF) -> Self {
        Self {
            x: scale(x),
            y: scale(y),
        }
    }

    /// Convert to floating-point coordinates (in mm).
    #[inline]
    pub fn to_f64(&self) -> PointF {
        PointF {
            x: unscale(self.x),
            y: unscale(self.y),
        }
    }

    /// Squared distance to another point.
    /// Returns i128 to avoid overflow with large coordinates.
    #[inline]
    pub fn distance_squared(&self, other: &Point) -> i128 {
        let dx = (other.x - self.x) as i128;
        let dy = (other.y - self.y) as i128;
        dx * dx + dy * dy
    }

    /// Distance to another point, in scaled units.
    #[inline]
    pub fn distance(&self, other: &Point) -> CoordF {
        (self.distance_squared(other) as CoordF).sqrt()
    }

    /// 2D pseudo-cross product.
    #[inline]
    pub fn cross(&self, other: &Point) -> i128 {
        (self.x as i128) * (other.y as i128) - (self.y as i128) * (other.x as i128)
    }

    #[inline]
    pub fn dot(&self, other: &Point) -> i128 {
        (self.x as i128) * (other.x as i128) + (self.y as i128) * (other.y as i128)
    }

    /// Index of the nearest point in `points`, first index on ties.
    pub fn nearest_point_index(&self, points: &[Point]) -> Option<usize> {
        let mut best: Option<(usize, i128)> = None;
        for (i, p) in points.iter().enumerate() {
            let dist = self.distance_squared(p);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((i, dist));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Project this point onto the segment `a`-`b`, returning the projection
    /// and the segment parameter in [0, 1].
    pub fn project_onto_segment(&self, a: Point, b: Point) -> (Point, CoordF) {
        let ab = b - a;
        let ap = *self - a;

        let ab_len_sq = ab.dot(&ab);
        if ab_len_sq == 0 {
            return (a, 0.0);
        }

        let t = (ap.dot(&ab) as CoordF / ab_len_sq as CoordF).clamp(0.0, 1.0);
        let projected = Point::new(
            (a.x as CoordF + t * ab.x as CoordF).round() as Coord,
            (a.y as CoordF + t * ab.y as CoordF).round() as Coord,
        );
        (projected, t)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", unscale(self.x), unscale(self.y))
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Neg for Point {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<(Coord, Coord)> for Point {
    #[inline]
    fn from((x, y): (Coord, Coord)) -> Self {
        Self { x, y }
    }
}

impl From<PointF> for Point {
    #[inline]
    fn from(p: PointF) -> Self {
        Point::new_scale(p.x, p.y)
    }
}

/// A 2D point with floating-point coordinates (in mm, unscaled).
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointF {
    pub x: CoordF,
    pub y: CoordF,
}

impl PointF {
    #[inline]
    pub const fn new(x: CoordF, y: CoordF) -> Self {
        Self { x, y }
    }

    /// Convert to scaled integer coordinates.
    #[inline]
    pub fn to_scaled(&self) -> Point {
        Point::from(*self)
    }

    #[inline]
    pub fn distance_squared(&self, other: &PointF) -> CoordF {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(&self, other: &PointF) -> CoordF {
        self.distance_squared(other).sqrt()
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Normalize to unit length. Zero vectors are returned unchanged.
    #[inline]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len)
        } else {
            *self
        }
    }

    #[inline]
    pub fn dot(&self, other: &PointF) -> CoordF {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn cross(&self, other: &PointF) -> CoordF {
        self.x * other.y - self.y * other.x
    }

    /// Linear interpolation between `self` (t = 0) and `other` (t = 1).
    #[inline]
    pub fn lerp(&self, other: &PointF, t: CoordF) -> PointF {
        PointF::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Check if approximately equal to another point.
    #[inline]
    pub fn approx_eq(&self, other: &PointF, epsilon: CoordF) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl fmt::Debug for PointF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PointF({:.6}, {:.6})", self.x, self.y)
    }
}

impl Add for PointF {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for PointF {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<CoordF> for PointF {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: CoordF) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl From<Point> for PointF {
    #[inline]
    fn from(p: Point) -> Self {
        p.to_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversions() {
        let p = Point::new_scale(1.5, -2.25);
        assert_eq!(p, Point::new(1_500_000, -2_250_000));
        let f = p.to_f64();
        assert!(f.approx_eq(&PointF::new(1.5, -2.25), 1e-9));
        assert_eq!(f.to_scaled(), p);
    }

    #[test]
    fn test_nearest_point_index_prefers_first_on_ties() {
        let points = vec![
            Point::new(10, 0),
            Point::new(-10, 0),
            Point::new(0, 50),
        ];
        assert_eq!(Point::new(0, 0).nearest_point_index(&points), Some(0));
        assert_eq!(Point::new(0, 0).nearest_point_index(&[]), None);
    }

    #[test]
    fn test_project_onto_segment() {
        let (p, t) = Point::new(5, 7).project_onto_segment(Point::new(0, 0), Point::new(10, 0));
        assert_eq!(p, Point::new(5, 0));
        assert!((t - 0.5).abs() < 1e-12);

        let (p, t) = Point::new(-5, 7).project_onto_segment(Point::new(0, 0), Point::new(10, 0));
        assert_eq!(p, Point::new(0, 0));
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_pointf_lerp() {
        let a = PointF::new(0.0, 0.0);
        let b = PointF::new(2.0, 4.0);
        assert!(a.lerp(&b, 0.25).approx_eq(&PointF::new(0.5, 1.0), 1e-12));
    }
}
