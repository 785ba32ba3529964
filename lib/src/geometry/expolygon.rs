//! Polygon with holes.

use super::{BoundingBox, Point, Polygon};
use serde::{Deserialize, Serialize};

/// A polygon with holes: one counter-clockwise contour and any number of
/// clockwise hole contours.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExPolygon {
    pub contour: Polygon,
    pub holes: Vec<Polygon>,
}

/// A list of polygons with holes.
pub type ExPolygons = Vec<ExPolygon>;

impl ExPolygon {
    pub fn new(contour: Polygon) -> Self {
        Self {
            contour,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(contour: Polygon, holes: Vec<Polygon>) -> Self {
        Self { contour, holes }
    }

    pub fn is_empty(&self) -> bool {
        self.contour.is_empty()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.contour.bounding_box()
    }

    /// Inside the contour and outside every hole.
    pub fn contains_point(&self, p: &Point) -> bool {
        self.contour.contains_point(p) && !self.holes.iter().any(|h| h.contains_point(p))
    }

    /// Contour followed by holes, the order every per-boundary index uses.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        std::iter::once(&self.contour).chain(self.holes.iter())
    }

    /// Consume into contour followed by holes.
    pub fn into_polygons(self) -> Vec<Polygon> {
        let mut polygons = Vec::with_capacity(1 + self.holes.len());
        polygons.push(self.contour);
        polygons.extend(self.holes);
        polygons
    }

    pub fn translate(&mut self, v: Point) {
        self.contour.translate(v);
        for hole in &mut self.holes {
            hole.translate(v);
        }
    }
}
