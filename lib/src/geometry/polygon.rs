//! Polygon type for closed contours.

use super::{BoundingBox, Line, Point};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed polygon defined by a sequence of points.
///
/// The polygon is implicitly closed - the last point connects back to the first.
/// Outer contours are counter-clockwise (positive area), holes clockwise.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

/// A list of polygons.
pub type Polygons = Vec<Polygon>;

impl Polygon {
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Consume the polygon and return its points.
    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Edge starting at point `index`, wrapping around at the end.
    #[inline]
    pub fn edge(&self, index: usize) -> Line {
        let next = (index + 1) % self.points.len();
        Line::new(self.points[index], self.points[next])
    }

    /// All edges, including the closing one.
    pub fn edges(&self) -> Vec<Line> {
        if self.points.len() < 2 {
            return Vec::new();
        }
        (0..self.points.len()).map(|i| self.edge(i)).collect()
    }

    /// Signed area (shoelace formula), positive for counter-clockwise.
    pub fn signed_area(&self) -> CoordF {
        if self.points.len() < 3 {
            return 0.0;
        }

        let mut sum: i128 = 0;
        for i in 0..self.points.len() {
            let j = (i + 1) % self.points.len();
            sum += self.points[i].x as i128 * self.points[j].y as i128;
            sum -= self.points[j].x as i128 * self.points[i].y as i128;
        }

        sum as CoordF / 2.0
    }

    #[inline]
    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Total length of the closed boundary, in scaled units.
    pub fn length(&self) -> CoordF {
        self.edges().iter().map(Line::length).sum()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Check if a point is inside the polygon using ray casting.
    pub fn contains_point(&self, p: &Point) -> bool {
        if self.points.len() < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = self.points.len() - 1;

        for i in 0..self.points.len() {
            let pi = &self.points[i];
            let pj = &self.points[j];

            if ((pi.y > p.y) != (pj.y > p.y))
                && (p.x as i128)
                    < (pj.x as i128 - pi.x as i128) * (p.y as i128 - pi.y as i128)
                        / (pj.y as i128 - pi.y as i128)
                        + pi.x as i128
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }

    /// Closest point on the polygon boundary to `p`.
    pub fn closest_point(&self, p: &Point) -> Option<Point> {
        match self.points.len() {
            0 => None,
            1 => Some(self.points[0]),
            _ => {
                let mut closest = self.points[0];
                let mut min_dist = i128::MAX;
                for edge in self.edges() {
                    let (proj, _) = p.project_onto_segment(edge.a, edge.b);
                    let dist = p.distance_squared(&proj);
                    if dist < min_dist {
                        min_dist = dist;
                        closest = proj;
                    }
                }
                Some(closest)
            }
        }
    }

    pub fn translate(&mut self, v: Point) {
        for p in &mut self.points {
            *p += v;
        }
    }

    /// Copy of the polygon scaled about `center`.
    pub fn scaled_about(&self, center: Point, factor: CoordF) -> Self {
        let points = self
            .points
            .iter()
            .map(|p| {
                Point::new(
                    center.x + ((p.x - center.x) as CoordF * factor).round() as Coord,
                    center.y + ((p.y - center.y) as CoordF * factor).round() as Coord,
                )
            })
            .collect();
        Self::from_points(points)
    }

    /// Copy of the polygon with extra points inserted so that no edge is
    /// longer than `max_edge_length` (scaled units).
    pub fn densified(&self, max_edge_length: CoordF) -> Self {
        if self.points.len() < 2 || max_edge_length <= 0.0 {
            return self.clone();
        }
        let mut points = Vec::with_capacity(self.points.len());
        for edge in self.edges() {
            points.push(edge.a);
            let splits = (edge.length() / max_edge_length).ceil() as usize;
            for k in 1..splits {
                let t = k as CoordF / splits as CoordF;
                points.push(Point::new(
                    edge.a.x + ((edge.b.x - edge.a.x) as CoordF * t).round() as Coord,
                    edge.a.y + ((edge.b.y - edge.a.y) as CoordF * t).round() as Coord,
                ));
            }
        }
        Self::from_points(points)
    }

    /// Axis-aligned rectangle, counter-clockwise.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::from_points(vec![
            min,
            Point::new(max.x, min.y),
            max,
            Point::new(min.x, max.y),
        ])
    }

    /// Square centered at a point.
    pub fn square(center: Point, half_size: Coord) -> Self {
        Self::rectangle(
            Point::new(center.x - half_size, center.y - half_size),
            Point::new(center.x + half_size, center.y + half_size),
        )
    }
}

impl fmt::Debug for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polygon({:?})", self.points)
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_square(size: Coord) -> Polygon {
        Polygon::rectangle(Point::new(0, 0), Point::new(size, size))
    }

    #[test]
    fn test_area_and_orientation() {
        let mut square = make_square(10);
        assert_eq!(square.signed_area(), 100.0);
        assert!(square.is_counter_clockwise());
        square.reverse();
        assert!(!square.is_counter_clockwise());
    }

    #[test]
    fn test_contains_point() {
        let square = make_square(10);
        assert!(square.contains_point(&Point::new(5, 5)));
        assert!(!square.contains_point(&Point::new(15, 5)));
    }

    #[test]
    fn test_closest_point() {
        let square = make_square(10);
        assert_eq!(square.closest_point(&Point::new(5, 20)), Some(Point::new(5, 10)));
        assert_eq!(Polygon::new().closest_point(&Point::new(0, 0)), None);
    }

    #[test]
    fn test_scaled_about_center() {
        let square = Polygon::square(Point::new(0, 0), 100);
        let bigger = square.scaled_about(Point::new(0, 0), 2.0);
        assert_eq!(bigger.points()[0], Point::new(-200, -200));
    }

    #[test]
    fn test_densified() {
        let square = make_square(10);
        let dense = square.densified(5.0);
        assert_eq!(dense.len(), 8);
        assert!(dense.edges().iter().all(|e| e.length() <= 5.0 + 1e-9));
    }
}
