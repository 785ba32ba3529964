//! Axis-aligned bounding boxes and the box-to-box distance used to match
//! contours across layers.

use super::{Point, PointF};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D axis-aligned bounding box with scaled integer coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
    defined: bool,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingBox {
    /// Create a new empty (undefined) bounding box.
    #[inline]
    pub fn new() -> Self {
        Self {
            min: Point::new(Coord::MAX, Coord::MAX),
            max: Point::new(Coord::MIN, Coord::MIN),
            defined: false,
        }
    }

    #[inline]
    pub fn from_points_minmax(min: Point, max: Point) -> Self {
        Self {
            min,
            max,
            defined: true,
        }
    }

    pub fn from_points(points: &[Point]) -> Self {
        let mut bb = Self::new();
        for p in points {
            bb.merge_point(*p);
        }
        bb
    }

    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.defined
    }

    /// Merge a point into the bounding box. The first merge defines the box.
    pub fn merge_point(&mut self, p: Point) {
        if self.defined {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }

    pub fn merge(&mut self, other: &BoundingBox) {
        if other.defined {
            self.merge_point(other.min);
            self.merge_point(other.max);
        }
    }

    #[inline]
    pub fn width(&self) -> Coord {
        if self.defined {
            self.max.x - self.min.x
        } else {
            0
        }
    }

    #[inline]
    pub fn height(&self) -> Coord {
        if self.defined {
            self.max.y - self.min.y
        } else {
            0
        }
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2, (self.min.y + self.max.y) / 2)
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        self.defined
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }

    /// Grow the box by `margin` on every side.
    pub fn expanded(&self, margin: Coord) -> Self {
        if !self.defined {
            return *self;
        }
        Self::from_points_minmax(
            Point::new(self.min.x - margin, self.min.y - margin),
            Point::new(self.max.x + margin, self.max.y + margin),
        )
    }

    pub fn to_f64(&self) -> BoundingBoxF {
        if !self.defined {
            return BoundingBoxF::new();
        }
        BoundingBoxF::from_points_minmax(self.min.to_f64(), self.max.to_f64())
    }
}

impl fmt::Debug for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(f, "BoundingBox({:?} - {:?})", self.min, self.max)
        } else {
            write!(f, "BoundingBox(undefined)")
        }
    }
}

/// A 2D axis-aligned bounding box with floating-point coordinates (mm).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxF {
    pub min: PointF,
    pub max: PointF,
    defined: bool,
}

impl Default for BoundingBoxF {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingBoxF {
    pub fn new() -> Self {
        Self {
            min: PointF::new(CoordF::MAX, CoordF::MAX),
            max: PointF::new(CoordF::MIN, CoordF::MIN),
            defined: false,
        }
    }

    pub fn from_points_minmax(min: PointF, max: PointF) -> Self {
        Self {
            min,
            max,
            defined: true,
        }
    }

    pub fn from_points(points: &[PointF]) -> Self {
        let mut bb = Self::new();
        for p in points {
            bb.merge_point(*p);
        }
        bb
    }

    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub fn merge_point(&mut self, p: PointF) {
        if self.defined {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }

    pub fn merge(&mut self, other: &BoundingBoxF) {
        if other.defined {
            self.merge_point(other.min);
            self.merge_point(other.max);
        }
    }

    #[inline]
    pub fn height(&self) -> CoordF {
        if self.defined {
            self.max.y - self.min.y
        } else {
            0.0
        }
    }

    #[inline]
    pub fn center(&self) -> PointF {
        PointF::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }
}

impl From<BoundingBox> for BoundingBoxF {
    fn from(bb: BoundingBox) -> Self {
        bb.to_f64()
    }
}

/// Distance between two boxes, in mm: the larger of the distances between
/// their minimum corners and between their maximum corners.
///
/// Identical boxes are at distance zero; a box nested in another with margin
/// `m` on every side is at distance `m * sqrt(2)`.
pub fn bounding_box_distance(a: &BoundingBox, b: &BoundingBox) -> CoordF {
    let a = a.to_f64();
    let b = b.to_f64();
    a.min.distance(&b.min).max(a.max.distance(&b.max))
}

/// Index of the candidate box closest to `to` and its distance.
///
/// Ties resolve to the lowest index, so when the candidates are an island's
/// contour followed by its holes an exact tie picks the contour.
pub fn pick_closest_bounding_box(
    to: &BoundingBox,
    candidates: &[BoundingBox],
) -> Option<(usize, CoordF)> {
    let mut best: Option<(usize, CoordF)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let distance = bounding_box_distance(to, candidate);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox_mm(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox::from_points_minmax(
            Point::new_scale(min_x, min_y),
            Point::new_scale(max_x, max_y),
        )
    }

    #[test]
    fn test_merge_defines_box() {
        let mut bb = BoundingBox::new();
        assert!(bb.is_empty());
        bb.merge_point(Point::new(5, -3));
        assert!(bb.is_defined());
        assert_eq!(bb.min, Point::new(5, -3));
        bb.merge_point(Point::new(-1, 10));
        assert_eq!(bb.min, Point::new(-1, -3));
        assert_eq!(bb.max, Point::new(5, 10));
        assert_eq!(bb.width(), 6);
        assert_eq!(bb.height(), 13);
    }

    #[test]
    fn test_bounding_box_distance() {
        let a = bbox_mm(0.0, 0.0, 10.0, 10.0);
        assert_eq!(bounding_box_distance(&a, &a), 0.0);

        let nested = bbox_mm(1.0, 1.0, 9.0, 9.0);
        let d = bounding_box_distance(&a, &nested);
        assert!((d - 2.0_f64.sqrt()).abs() < 1e-9);

        let shifted = bbox_mm(3.0, 0.0, 13.0, 10.0);
        assert!((bounding_box_distance(&a, &shifted) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_pick_closest_bounding_box_ties_pick_first() {
        let to = bbox_mm(0.0, 0.0, 10.0, 10.0);
        let candidates = vec![
            bbox_mm(1.0, 0.0, 11.0, 10.0),
            bbox_mm(-1.0, 0.0, 9.0, 10.0),
            bbox_mm(5.0, 5.0, 20.0, 20.0),
        ];
        let (index, distance) = pick_closest_bounding_box(&to, &candidates).unwrap();
        assert_eq!(index, 0);
        assert!((distance - 1.0).abs() < 1e-9);
        assert!(pick_closest_bounding_box(&to, &[]).is_none());
    }
}
