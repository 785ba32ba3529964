//! Polygon offsetting on top of the geo-clipper library.
//!
//! Only inflation/deflation of single contours is needed here: the shell
//! builder grows a raw extrusion loop by half its width when no island
//! boundary is close enough to stand in for it.

use crate::geometry::{ExPolygon, ExPolygons, Point, Polygon};
use crate::{scale, unscale, CoordF};
use geo::{Coord as GeoCoord, LineString, MultiPolygon, Polygon as GeoPolygon};
use geo_clipper::{Clipper, EndType, JoinType};

/// Factor geo-clipper uses to convert mm into its own integer space.
const CLIPPER_FACTOR: f64 = 1000.0;

/// Join type for offset corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetJoinType {
    Square,
    #[default]
    Round,
    Miter,
}

impl From<OffsetJoinType> for JoinType {
    fn from(jt: OffsetJoinType) -> Self {
        match jt {
            OffsetJoinType::Square => JoinType::Square,
            OffsetJoinType::Round => JoinType::Round(0.25),
            OffsetJoinType::Miter => JoinType::Miter(2.0),
        }
    }
}

fn ring_to_geo(points: &[Point]) -> LineString<f64> {
    let mut ring: Vec<GeoCoord<f64>> = points
        .iter()
        .map(|p| GeoCoord {
            x: unscale(p.x),
            y: unscale(p.y),
        })
        .collect();
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last()) {
        if first != *last {
            ring.push(first);
        }
    }
    LineString::new(ring)
}

fn geo_to_ring(line: &LineString<f64>) -> Polygon {
    let mut points: Vec<Point> = line
        .coords()
        .map(|c| Point::new(scale(c.x), scale(c.y)))
        .collect();
    // geo rings repeat the first point at the end
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    Polygon::from_points(points)
}

fn geo_multi_to_expolygons(multi: &MultiPolygon<f64>) -> ExPolygons {
    multi
        .iter()
        .map(|p| {
            ExPolygon::with_holes(
                geo_to_ring(p.exterior()),
                p.interiors().iter().map(geo_to_ring).collect(),
            )
        })
        .collect()
}

/// Offset a polygon by `delta` millimetres.
///
/// Positive delta inflates, negative deflates. Orientation of the input does
/// not matter; the result uses canonical orientation (contours CCW).
pub fn offset_polygon(polygon: &Polygon, delta: CoordF, join_type: OffsetJoinType) -> ExPolygons {
    if polygon.len() < 3 {
        return Vec::new();
    }
    let mut input = polygon.clone();
    if !input.is_counter_clockwise() {
        input.reverse();
    }
    let geo_poly = GeoPolygon::new(ring_to_geo(input.points()), vec![]);
    let result = geo_poly.offset(delta, join_type.into(), EndType::ClosedPolygon, CLIPPER_FACTOR);
    geo_multi_to_expolygons(&result)
}

/// Grow a polygon by `delta` millimetres and keep the outer contour of the
/// largest resulting piece, reoriented to match the input.
///
/// Returns None when the offset collapses the polygon.
pub fn expand_polygon(polygon: &Polygon, delta: CoordF) -> Option<Polygon> {
    let was_ccw = polygon.is_counter_clockwise();
    let mut expanded = offset_polygon(polygon, delta, OffsetJoinType::Miter)
        .into_iter()
        .map(|ex| ex.contour)
        .max_by(|a, b| a.signed_area().abs().total_cmp(&b.signed_area().abs()))?;
    if expanded.is_counter_clockwise() != was_ccw {
        expanded.reverse();
    }
    Some(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_square(half_mm: f64) -> Polygon {
        Polygon::square(Point::new(0, 0), scale(half_mm))
    }

    #[test]
    fn test_expand_square_grows_bounding_box() {
        let square = make_square(1.0);
        let expanded = expand_polygon(&square, 0.5).unwrap();
        let bb = expanded.bounding_box();
        assert!((unscale(bb.max.x) - 1.5).abs() < 0.01);
        assert!((unscale(bb.min.y) + 1.5).abs() < 0.01);
        assert!(expanded.is_counter_clockwise());
    }

    #[test]
    fn test_expand_keeps_orientation_of_holes() {
        let mut hole = make_square(1.0);
        hole.reverse();
        let expanded = expand_polygon(&hole, 0.2).unwrap();
        assert!(!expanded.is_counter_clockwise());
    }

    #[test]
    fn test_deflate_to_nothing() {
        let square = make_square(0.1);
        assert!(expand_polygon(&square, -1.0).is_none());
        assert!(offset_polygon(&Polygon::new(), 1.0, OffsetJoinType::Round).is_empty());
    }
}
