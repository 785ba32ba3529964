//! Geometry primitives used by the seam and ordering passes.
//!
//! - [`Point`] / [`PointF`] - scaled integer and unscaled float 2D points
//! - [`Line`] - segment between two points
//! - [`Polygon`] / [`ExPolygon`] - closed contours, with or without holes
//! - [`BoundingBox`] / [`BoundingBoxF`] - axis-aligned boxes
//!
//! ## Coordinate System
//!
//! Coordinates are scaled by `SCALING_FACTOR` (1,000,000), so 1 unit = 1 nanometer.
//! Use `scale()` to convert from mm to internal units and `unscale()` back.

mod bounding_box;
mod expolygon;
mod line;
mod point;
mod polygon;

pub use bounding_box::{
    bounding_box_distance, pick_closest_bounding_box, BoundingBox, BoundingBoxF,
};
pub use expolygon::{ExPolygon, ExPolygons};
pub use line::Line;
pub use point::{Point, PointF, Points};
pub use polygon::{Polygon, Polygons};
