//! Perimeters: shell outlines annotated for seam search.
//!
//! Every position of a perimeter carries three tags:
//! - [`PointType`] from user painting (enforcer, common, blocker),
//! - [`PointClassification`] from the neighbouring geometry (embedded in the
//!   layer, common, overhanging the layer below),
//! - [`AngleType`] from the turning angle at that position.

use log::trace;

use super::shells::{Shells, ShellPolygon, Slice};
use crate::config::SeamConfig;
use crate::edge_grid::EdgeGrid;
use crate::geometry::{BoundingBox, BoundingBoxF, Point, PointF, Polygon};
use crate::print::Layer;
use crate::{scale, CoordF};

/// User painting, in search priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointType {
    Enforcer,
    Common,
    Blocker,
}

/// Relation of a point to the surrounding geometry, in search priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointClassification {
    Embedded,
    Common,
    Overhang,
}

/// Shape of the perimeter at a point, relative to the printed material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AngleType {
    Convex,
    Concave,
    Smooth,
}

/// Source of enforcer/blocker annotations.
pub trait SeamPainting {
    /// Type of the point at `position` (mm) on layer `layer_index`.
    fn point_type(&self, layer_index: usize, position: &PointF) -> PointType;
}

/// No painting: every point is common.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPainting;

impl SeamPainting for NoPainting {
    fn point_type(&self, _layer_index: usize, _position: &PointF) -> PointType {
        PointType::Common
    }
}

/// Painting given as enforcer and blocker areas per layer.
#[derive(Clone, Debug, Default)]
pub struct PaintedAreas {
    enforcers: Vec<Vec<Polygon>>,
    blockers: Vec<Vec<Polygon>>,
}

impl PaintedAreas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_enforcer(&mut self, layer_index: usize, area: Polygon) {
        Self::add(&mut self.enforcers, layer_index, area);
    }

    pub fn add_blocker(&mut self, layer_index: usize, area: Polygon) {
        Self::add(&mut self.blockers, layer_index, area);
    }

    fn add(areas: &mut Vec<Vec<Polygon>>, layer_index: usize, area: Polygon) {
        if areas.len() <= layer_index {
            areas.resize(layer_index + 1, Vec::new());
        }
        areas[layer_index].push(area);
    }

    fn hits(areas: &[Vec<Polygon>], layer_index: usize, point: &Point) -> bool {
        areas
            .get(layer_index)
            .map_or(false, |layer| layer.iter().any(|a| a.contains_point(point)))
    }
}

impl SeamPainting for PaintedAreas {
    /// Enforcers win over blockers where both are painted.
    fn point_type(&self, layer_index: usize, position: &PointF) -> PointType {
        let point = position.to_scaled();
        if Self::hits(&self.enforcers, layer_index, &point) {
            PointType::Enforcer
        } else if Self::hits(&self.blockers, layer_index, &point) {
            PointType::Blocker
        } else {
            PointType::Common
        }
    }
}

/// Outline of one layer, indexed for distance queries.
#[derive(Clone, Debug)]
pub struct LayerInfo {
    outline: EdgeGrid,
}

impl LayerInfo {
    pub fn from_layer(layer: &Layer) -> Self {
        let polygons: Vec<Polygon> = layer
            .lslices
            .iter()
            .flat_map(|ex| ex.polygons().cloned())
            .collect();
        Self {
            outline: EdgeGrid::from_polygons(&polygons, scale(2.0)),
        }
    }

    fn is_empty(&self) -> bool {
        self.outline.contours().is_empty()
    }

    /// Outside the outline by more than `distance` (mm).
    fn is_outside_by(&self, point: &Point, distance: CoordF) -> bool {
        !self.is_empty()
            && !self.outline.point_inside(point)
            && self.outline.closest_point(point, scale(distance)).is_none()
    }

    /// Inside the outline by more than `distance` (mm).
    fn is_inside_by(&self, point: &Point, distance: CoordF) -> bool {
        !self.is_empty()
            && self.outline.point_inside(point)
            && self.outline.closest_point(point, scale(distance)).is_none()
    }
}

/// A closed loop of annotated positions. All per-point vectors have the
/// same length as `positions`.
#[derive(Clone, Debug)]
pub struct Perimeter {
    pub layer_index: usize,
    pub is_hole: bool,
    /// Fewer than three distinct positions; seams resolve to the first one.
    pub is_degenerate: bool,
    /// Positions (mm).
    pub positions: Vec<PointF>,
    pub point_types: Vec<PointType>,
    pub point_classifications: Vec<PointClassification>,
    pub angle_types: Vec<AngleType>,
    edges: EdgeGrid,
}

impl Perimeter {
    pub fn new(
        layer_index: usize,
        positions: Vec<PointF>,
        point_types: Vec<PointType>,
        point_classifications: Vec<PointClassification>,
        angle_types: Vec<AngleType>,
    ) -> Self {
        debug_assert_eq!(positions.len(), point_types.len());
        debug_assert_eq!(positions.len(), point_classifications.len());
        debug_assert_eq!(positions.len(), angle_types.len());
        let is_degenerate = count_distinct(&positions) < 3;
        let edges = if is_degenerate {
            EdgeGrid::new()
        } else {
            build_edge_grid(&positions)
        };
        Self {
            layer_index,
            is_hole: false,
            is_degenerate,
            positions,
            point_types,
            point_classifications,
            angle_types,
            edges,
        }
    }

    /// Perimeter with every point common and smooth.
    pub fn common(layer_index: usize, positions: Vec<PointF>) -> Self {
        let n = positions.len();
        Self::new(
            layer_index,
            positions,
            vec![PointType::Common; n],
            vec![PointClassification::Common; n],
            vec![AngleType::Smooth; n],
        )
    }

    /// Builder method: replace the point types.
    pub fn with_point_types(mut self, point_types: Vec<PointType>) -> Self {
        debug_assert_eq!(point_types.len(), self.positions.len());
        self.point_types = point_types;
        self
    }

    /// Builder method: replace the point classifications.
    pub fn with_point_classifications(mut self, classifications: Vec<PointClassification>) -> Self {
        debug_assert_eq!(classifications.len(), self.positions.len());
        self.point_classifications = classifications;
        self
    }

    /// Builder method: replace the angle types.
    pub fn with_angle_types(mut self, angle_types: Vec<AngleType>) -> Self {
        debug_assert_eq!(angle_types.len(), self.positions.len());
        self.angle_types = angle_types;
        self
    }

    /// Build an annotated perimeter from a shell outline.
    ///
    /// The outline is resampled to `config.max_edge_length`, painted, and
    /// classified against this layer's outline and the previous one.
    pub fn create(
        polygon: &Polygon,
        is_hole: bool,
        layer_index: usize,
        layer_infos: &[LayerInfo],
        painting: &dyn SeamPainting,
        config: &SeamConfig,
    ) -> Self {
        let resampled = polygon.densified(scale(config.max_edge_length) as CoordF);
        let positions: Vec<PointF> = resampled.points().iter().map(Point::to_f64).collect();
        if count_distinct(&positions) < 3 {
            let mut perimeter = Self::common(layer_index, positions);
            perimeter.is_hole = is_hole;
            return perimeter;
        }

        let point_types = positions
            .iter()
            .map(|p| painting.point_type(layer_index, p))
            .collect();

        let previous = layer_index.checked_sub(1).and_then(|i| layer_infos.get(i));
        let current = layer_infos.get(layer_index);
        let point_classifications = resampled
            .points()
            .iter()
            .map(|p| classify_point(p, previous, current, config))
            .collect();

        // Angles are measured relative to the material: positive turns are
        // convex whether the loop is a contour or a hole.
        let flip = is_hole == polygon.is_counter_clockwise();
        let angle_types = vertex_angles(&positions, config.min_arm_length)
            .into_iter()
            .map(|angle| {
                let angle = if flip { -angle } else { angle };
                angle_type(angle, config.convex_threshold, config.concave_threshold)
            })
            .collect();

        let mut perimeter = Self::new(
            layer_index,
            positions,
            point_types,
            point_classifications,
            angle_types,
        );
        perimeter.is_hole = is_hole;
        perimeter
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Index of the point after `index`, wrapping.
    pub fn next_index(&self, index: usize) -> usize {
        if index + 1 >= self.positions.len() {
            0
        } else {
            index + 1
        }
    }

    /// Both ends of edge `index` have the given tags.
    pub fn edge_matches(
        &self,
        index: usize,
        point_type: PointType,
        point_classification: PointClassification,
    ) -> bool {
        let next = self.next_index(index);
        self.point_matches(index, point_type, point_classification)
            && self.point_matches(next, point_type, point_classification)
    }

    pub fn point_matches(
        &self,
        index: usize,
        point_type: PointType,
        point_classification: PointClassification,
    ) -> bool {
        self.point_types[index] == point_type
            && self.point_classifications[index] == point_classification
    }

    /// Edge index of the perimeter, for segment queries.
    pub fn edges(&self) -> &EdgeGrid {
        &self.edges
    }

    pub fn bounding_box(&self) -> BoundingBoxF {
        BoundingBoxF::from_points(&self.positions)
    }

    /// Box in scaled coordinates, for matching against extrusions.
    pub fn scaled_bounding_box(&self) -> BoundingBox {
        let points: Vec<Point> = self.positions.iter().map(PointF::to_scaled).collect();
        BoundingBox::from_points(&points)
    }
}

fn count_distinct(positions: &[PointF]) -> usize {
    let mut distinct: Vec<Point> = positions.iter().map(PointF::to_scaled).collect();
    distinct.sort_by_key(|p| (p.x, p.y));
    distinct.dedup();
    distinct.len()
}

fn build_edge_grid(positions: &[PointF]) -> EdgeGrid {
    let polygon = Polygon::from_points(positions.iter().map(PointF::to_scaled).collect());
    let bb = polygon.bounding_box();
    let resolution = (bb.width().max(bb.height()) / 16).max(scale(0.5));
    EdgeGrid::from_polygons(&[polygon], resolution)
}

fn classify_point(
    point: &Point,
    previous: Option<&LayerInfo>,
    current: Option<&LayerInfo>,
    config: &SeamConfig,
) -> PointClassification {
    if previous.map_or(false, |info| info.is_outside_by(point, config.overhang_threshold)) {
        PointClassification::Overhang
    } else if current.map_or(false, |info| info.is_inside_by(point, config.embedding_threshold)) {
        PointClassification::Embedded
    } else {
        PointClassification::Common
    }
}

fn angle_type(angle: f64, convex_threshold_deg: f64, concave_threshold_deg: f64) -> AngleType {
    if angle > convex_threshold_deg.to_radians() {
        AngleType::Convex
    } else if angle < -concave_threshold_deg.to_radians() {
        AngleType::Concave
    } else {
        AngleType::Smooth
    }
}

/// Signed turning angle (radians, left turns positive) at each vertex of a
/// closed loop. The arms reach back and forward along the loop until they
/// are at least `min_arm_length` (mm) long, so dense resampling does not
/// hide corners.
pub fn vertex_angles(points: &[PointF], min_arm_length: f64) -> Vec<f64> {
    let n = points.len();
    if n < 3 {
        return vec![0.0; n];
    }
    // lengths[i] is the edge from point i to point i + 1.
    let lengths: Vec<f64> = (0..n).map(|i| points[i].distance(&points[(i + 1) % n])).collect();
    if lengths.iter().sum::<f64>() <= 0.0 {
        return vec![0.0; n];
    }

    let mut result = vec![0.0; n];
    let mut idx_prev = 0;
    let mut idx_next = 0;
    let mut distance_to_prev = 0.0;
    let mut distance_to_next = 0.0;

    while distance_to_prev < min_arm_length {
        idx_prev = if idx_prev == 0 { n - 1 } else { idx_prev - 1 };
        distance_to_prev += lengths[idx_prev];
        if idx_prev == 0 {
            break;
        }
    }

    for idx_curr in 0..n {
        while distance_to_prev - lengths[idx_prev] > min_arm_length {
            distance_to_prev -= lengths[idx_prev];
            idx_prev = (idx_prev + 1) % n;
        }
        while distance_to_next < min_arm_length {
            distance_to_next += lengths[idx_next];
            idx_next = (idx_next + 1) % n;
        }

        let incoming = points[idx_curr] - points[idx_prev];
        let outgoing = points[idx_next] - points[idx_curr];
        result[idx_curr] = incoming.cross(&outgoing).atan2(incoming.dot(&outgoing));

        distance_to_prev += lengths[idx_curr];
        distance_to_next -= lengths[idx_curr];
    }
    result
}

/// Layer outlines of a whole object, one per layer.
pub fn layer_infos(layers: &[Layer]) -> Vec<LayerInfo> {
    layers.iter().map(LayerInfo::from_layer).collect()
}

/// Turn shell outlines into annotated perimeters.
pub fn create_perimeters(
    shells: Shells<ShellPolygon>,
    layer_infos: &[LayerInfo],
    painting: &dyn SeamPainting,
    config: &SeamConfig,
) -> Shells<Perimeter> {
    let result: Shells<Perimeter> = shells
        .into_iter()
        .map(|shell| {
            shell
                .into_iter()
                .map(|slice| Slice {
                    boundary: Perimeter::create(
                        &slice.boundary.polygon,
                        slice.boundary.is_hole,
                        slice.layer_index,
                        layer_infos,
                        painting,
                        config,
                    ),
                    layer_index: slice.layer_index,
                })
                .collect()
        })
        .collect();
    trace!(
        "annotated {} perimeter(s)",
        result.iter().map(Vec::len).sum::<usize>()
    );
    result
}
