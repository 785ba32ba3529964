//! Extrusion entities: paths, multi-paths, loops and collections.
//!
//! The four kinds form a closed sum type, [`ExtrusionEntity`]; consumers
//! match on the variant instead of downcasting. Whether a collection may be
//! flattened and reordered is explicit data (`no_sort`).

use super::ExtrusionRole;
use crate::geometry::{BoundingBox, Point, Polygon};
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// An open extrusion along a polyline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionPath {
    /// Path points in scaled coordinates.
    pub polyline: Vec<Point>,
    pub role: ExtrusionRole,
    /// Extrusion width (mm).
    pub width: CoordF,
    /// Layer height (mm).
    pub height: CoordF,
}

impl ExtrusionPath {
    pub fn new(polyline: Vec<Point>, role: ExtrusionRole, width: CoordF, height: CoordF) -> Self {
        Self {
            polyline,
            role,
            width,
            height,
        }
    }
}

/// Consecutive paths printed without lifting, e.g. a thin wall changing width.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionMultiPath {
    pub paths: Vec<ExtrusionPath>,
}

/// A closed extrusion. Each path ends where the next one starts and the last
/// path ends at the first point of the first path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionLoop {
    pub paths: Vec<ExtrusionPath>,
}

impl ExtrusionLoop {
    /// Single-path loop around `polygon`.
    pub fn from_polygon(polygon: &Polygon, role: ExtrusionRole, width: CoordF, height: CoordF) -> Self {
        let mut polyline = polygon.points().to_vec();
        if let Some(&first) = polyline.first() {
            polyline.push(first);
        }
        Self {
            paths: vec![ExtrusionPath::new(polyline, role, width, height)],
        }
    }

    /// The loop as a polygon (no repeated closing point).
    pub fn polygon(&self) -> Polygon {
        let mut points = Vec::new();
        for path in &self.paths {
            if let Some((_, head)) = path.polyline.split_last() {
                points.extend_from_slice(head);
            }
        }
        if points.is_empty() {
            // A loop made of single-point paths.
            points.extend(self.paths.iter().filter_map(|p| p.polyline.first().copied()));
        }
        Polygon::from_points(points)
    }

    pub fn role(&self) -> ExtrusionRole {
        self.paths.first().map_or(ExtrusionRole::None, |p| p.role)
    }

    /// Width of the first path (mm).
    pub fn width(&self) -> CoordF {
        self.paths.first().map_or(0.0, |p| p.width)
    }
}

/// A group of entities. `no_sort` collections are printed as one unit in
/// their stored order and are never flattened.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionEntityCollection {
    /// Stable identity used to key per-instance extruder overrides.
    pub id: u64,
    pub entities: Vec<ExtrusionEntity>,
    pub no_sort: bool,
}

impl ExtrusionEntityCollection {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            entities: Vec::new(),
            no_sort: false,
        }
    }

    pub fn with_entities(id: u64, entities: Vec<ExtrusionEntity>) -> Self {
        Self {
            id,
            entities,
            no_sort: false,
        }
    }

    /// Builder method: mark the collection as unsortable.
    pub fn no_sort(mut self) -> Self {
        self.no_sort = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Common role of the entities, `Mixed` when they differ.
    pub fn role(&self) -> ExtrusionRole {
        self.entities
            .iter()
            .fold(ExtrusionRole::None, |acc, e| acc.combine(e.role()))
    }

    pub fn can_reverse(&self) -> bool {
        !self.no_sort
    }
}

/// Any printable extrusion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExtrusionEntity {
    Path(ExtrusionPath),
    MultiPath(ExtrusionMultiPath),
    Loop(ExtrusionLoop),
    Collection(ExtrusionEntityCollection),
}

impl ExtrusionEntity {
    pub fn role(&self) -> ExtrusionRole {
        match self {
            ExtrusionEntity::Path(path) => path.role,
            ExtrusionEntity::MultiPath(multi) => {
                multi.paths.first().map_or(ExtrusionRole::None, |p| p.role)
            }
            ExtrusionEntity::Loop(lp) => lp.role(),
            ExtrusionEntity::Collection(collection) => collection.role(),
        }
    }

    pub fn first_point(&self) -> Option<Point> {
        match self {
            ExtrusionEntity::Path(path) => path.polyline.first().copied(),
            ExtrusionEntity::MultiPath(multi) => multi
                .paths
                .first()
                .and_then(|p| p.polyline.first().copied()),
            ExtrusionEntity::Loop(lp) => lp.paths.first().and_then(|p| p.polyline.first().copied()),
            ExtrusionEntity::Collection(collection) => {
                collection.entities.first().and_then(|e| e.first_point())
            }
        }
    }

    pub fn last_point(&self) -> Option<Point> {
        match self {
            ExtrusionEntity::Path(path) => path.polyline.last().copied(),
            ExtrusionEntity::MultiPath(multi) => {
                multi.paths.last().and_then(|p| p.polyline.last().copied())
            }
            // A loop ends where it starts.
            ExtrusionEntity::Loop(_) => self.first_point(),
            ExtrusionEntity::Collection(collection) => {
                collection.entities.last().and_then(|e| e.last_point())
            }
        }
    }

    /// Whether the entity may be printed back to front.
    pub fn can_reverse(&self) -> bool {
        match self {
            ExtrusionEntity::Path(_) | ExtrusionEntity::MultiPath(_) => true,
            ExtrusionEntity::Loop(_) => false,
            ExtrusionEntity::Collection(collection) => collection.can_reverse(),
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, ExtrusionEntity::Loop(_))
    }

    pub fn as_collection(&self) -> Option<&ExtrusionEntityCollection> {
        match self {
            ExtrusionEntity::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn as_loop(&self) -> Option<&ExtrusionLoop> {
        match self {
            ExtrusionEntity::Loop(lp) => Some(lp),
            _ => None,
        }
    }

    /// Visit every point of the entity, depth first.
    pub fn for_each_point(&self, f: &mut dyn FnMut(Point)) {
        let visit_paths = |paths: &[ExtrusionPath], f: &mut dyn FnMut(Point)| {
            for path in paths {
                for &p in &path.polyline {
                    f(p);
                }
            }
        };
        match self {
            ExtrusionEntity::Path(path) => visit_paths(std::slice::from_ref(path), f),
            ExtrusionEntity::MultiPath(multi) => visit_paths(&multi.paths, f),
            ExtrusionEntity::Loop(lp) => visit_paths(&lp.paths, f),
            ExtrusionEntity::Collection(collection) => {
                for entity in &collection.entities {
                    entity.for_each_point(f);
                }
            }
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::new();
        self.for_each_point(&mut |p| bb.merge_point(p));
        bb
    }
}

impl From<ExtrusionPath> for ExtrusionEntity {
    fn from(path: ExtrusionPath) -> Self {
        ExtrusionEntity::Path(path)
    }
}

impl From<ExtrusionLoop> for ExtrusionEntity {
    fn from(lp: ExtrusionLoop) -> Self {
        ExtrusionEntity::Loop(lp)
    }
}

impl From<ExtrusionEntityCollection> for ExtrusionEntity {
    fn from(collection: ExtrusionEntityCollection) -> Self {
        ExtrusionEntity::Collection(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_path(points: &[(i64, i64)], role: ExtrusionRole) -> ExtrusionPath {
        ExtrusionPath::new(
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            role,
            0.45,
            0.2,
        )
    }

    #[test]
    fn test_loop_polygon_drops_closing_point() {
        let square = Polygon::rectangle(Point::new(0, 0), Point::new(10, 10));
        let lp = ExtrusionLoop::from_polygon(&square, ExtrusionRole::ExternalPerimeter, 0.45, 0.2);
        assert_eq!(lp.paths[0].polyline.len(), 5);
        assert_eq!(lp.polygon(), square);
        let entity = ExtrusionEntity::Loop(lp);
        assert_eq!(entity.first_point(), entity.last_point());
        assert!(!entity.can_reverse());
    }

    #[test]
    fn test_collection_role_and_endpoints() {
        let collection = ExtrusionEntityCollection::with_entities(
            7,
            vec![
                make_path(&[(0, 0), (10, 0)], ExtrusionRole::SupportMaterial).into(),
                make_path(&[(20, 0), (30, 0)], ExtrusionRole::SupportMaterialInterface).into(),
            ],
        );
        assert_eq!(collection.role(), ExtrusionRole::Mixed);
        let entity = ExtrusionEntity::Collection(collection.clone());
        assert_eq!(entity.first_point(), Some(Point::new(0, 0)));
        assert_eq!(entity.last_point(), Some(Point::new(30, 0)));
        assert!(entity.can_reverse());
        assert!(!ExtrusionEntity::Collection(collection.no_sort()).can_reverse());
    }

    #[test]
    fn test_bounding_box_of_nested_collection() {
        let inner = ExtrusionEntityCollection::with_entities(
            1,
            vec![make_path(&[(-5, 3), (4, 9)], ExtrusionRole::InternalInfill).into()],
        );
        let outer = ExtrusionEntity::Collection(ExtrusionEntityCollection::with_entities(
            2,
            vec![inner.into()],
        ));
        let bb = outer.bounding_box();
        assert_eq!(bb.min, Point::new(-5, 3));
        assert_eq!(bb.max, Point::new(4, 9));
    }
}
