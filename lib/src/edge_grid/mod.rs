//! EdgeGrid - spatial acceleration structure for polygon edge queries.
//!
//! The grid divides the bounding box of a set of contours into square cells
//! and records, for every cell, which contour edges may pass through it.
//! Seam strategies use it for three queries:
//!
//! - closest point on an accepted edge to a query point,
//! - intersections of a segment (typically a ray cast across the object)
//!   with accepted edges, ordered along the segment,
//! - even-odd point containment.
//!
//! "Accepted" is decided by a caller predicate on `(contour_idx, segment_idx)`,
//! which lets a single grid serve every (point type, classification) pair.
//!
//! # Example
//!
//! ```
//! use slicer_seams::edge_grid::EdgeGrid;
//! use slicer_seams::geometry::{Point, Polygon};
//!
//! let square = Polygon::rectangle(Point::new(0, 0), Point::new(1_000_000, 1_000_000));
//! let grid = EdgeGrid::from_polygons(&[square], 100_000);
//! assert!(grid.line_intersects_any(&Point::new(500_000, -100_000), &Point::new(500_000, 500_000)));
//! ```

use crate::geometry::{BoundingBox, Line, Point, Polygon};
use std::collections::HashSet;

/// A closed contour stored in the grid.
#[derive(Clone, Debug)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub fn from_polygon(polygon: &Polygon) -> Self {
        Self {
            points: polygon.points().to_vec(),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of edges, including the closing one.
    pub fn num_segments(&self) -> usize {
        if self.points.len() < 2 {
            0
        } else {
            self.points.len()
        }
    }

    /// Edge `idx` runs from point `idx` to point `idx + 1` (wrapping).
    pub fn segment(&self, idx: usize) -> Line {
        let next = if idx + 1 >= self.points.len() { 0 } else { idx + 1 };
        Line::new(self.points[idx], self.points[next])
    }
}

/// Range into the cell data array.
#[derive(Clone, Copy, Debug, Default)]
struct Cell {
    begin: usize,
    end: usize,
}

/// Result of a closest point query.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosestPointResult {
    /// Index of the contour.
    pub contour_idx: usize,
    /// Index of the segment start point; the segment ends at the next point.
    pub start_point_idx: usize,
    /// Distance to the closest point, in scaled units.
    pub distance: f64,
    /// Parameter on the segment in [0, 1].
    pub t: f64,
    /// The closest point itself.
    pub point: Point,
}

/// Segment intersection result.
#[derive(Clone, Debug, PartialEq)]
pub struct Intersection {
    pub contour_idx: usize,
    pub segment_idx: usize,
    pub point: Point,
    /// Parameter along the query segment, 0 at its start and 1 at its end.
    pub distance: f64,
}

/// Grid of polygon edges.
#[derive(Clone, Debug)]
pub struct EdgeGrid {
    bbox: BoundingBox,
    /// Cell size in scaled coordinates.
    resolution: i64,
    rows: usize,
    cols: usize,
    contours: Vec<Contour>,
    /// (contour_idx, segment_idx) pairs, grouped by cell.
    cell_data: Vec<(usize, usize)>,
    cells: Vec<Cell>,
}

impl Default for EdgeGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeGrid {
    pub fn new() -> Self {
        Self {
            bbox: BoundingBox::new(),
            resolution: 1,
            rows: 0,
            cols: 0,
            contours: Vec::new(),
            cell_data: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Build a grid over closed polygons with the given cell size.
    pub fn from_polygons(polygons: &[Polygon], resolution: i64) -> Self {
        let mut grid = Self::new();
        grid.contours = polygons.iter().map(Contour::from_polygon).collect();
        grid.build(resolution);
        grid
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    fn build(&mut self, resolution: i64) {
        self.resolution = resolution.max(1);

        let mut bbox = BoundingBox::new();
        for contour in &self.contours {
            for point in contour.points() {
                bbox.merge_point(*point);
            }
        }
        if bbox.is_empty() {
            self.rows = 0;
            self.cols = 0;
            self.cells.clear();
            self.cell_data.clear();
            return;
        }
        self.bbox = bbox.expanded(self.resolution);

        self.cols = ((self.bbox.width() + self.resolution - 1) / self.resolution).max(1) as usize;
        self.rows = ((self.bbox.height() + self.resolution - 1) / self.resolution).max(1) as usize;

        // Two passes: count edges per cell, then fill. Each edge is registered
        // in every cell its bounding box overlaps.
        let mut counts = vec![0usize; self.rows * self.cols];
        for contour in &self.contours {
            for seg_idx in 0..contour.num_segments() {
                for cell_idx in self.cells_for_segment(&contour.segment(seg_idx)) {
                    counts[cell_idx] += 1;
                }
            }
        }

        self.cells = Vec::with_capacity(counts.len());
        let mut offset = 0;
        for count in &counts {
            self.cells.push(Cell {
                begin: offset,
                end: offset,
            });
            offset += count;
        }
        self.cell_data = vec![(0, 0); offset];

        for contour_idx in 0..self.contours.len() {
            for seg_idx in 0..self.contours[contour_idx].num_segments() {
                let segment = self.contours[contour_idx].segment(seg_idx);
                for cell_idx in self.cells_for_segment(&segment) {
                    let cell = &mut self.cells[cell_idx];
                    self.cell_data[cell.end] = (contour_idx, seg_idx);
                    cell.end += 1;
                }
            }
        }
    }

    /// (row, col) of the cell containing `point`, clamped to the grid.
    fn point_to_cell(&self, point: &Point) -> (usize, usize) {
        let x = ((point.x - self.bbox.min.x) / self.resolution).max(0) as usize;
        let y = ((point.y - self.bbox.min.y) / self.resolution).max(0) as usize;
        (
            y.min(self.rows.saturating_sub(1)),
            x.min(self.cols.saturating_sub(1)),
        )
    }

    fn cells_in_box(&self, min: &Point, max: &Point) -> impl Iterator<Item = usize> + '_ {
        let (row_min, col_min) = self.point_to_cell(min);
        let (row_max, col_max) = self.point_to_cell(max);
        let cols = self.cols;
        (row_min..=row_max).flat_map(move |row| (col_min..=col_max).map(move |col| row * cols + col))
    }

    fn cells_for_segment(&self, segment: &Line) -> Vec<usize> {
        let min = Point::new(segment.a.x.min(segment.b.x), segment.a.y.min(segment.b.y));
        let max = Point::new(segment.a.x.max(segment.b.x), segment.a.y.max(segment.b.y));
        self.cells_in_box(&min, &max).collect()
    }

    fn cell_entries(&self, cell_idx: usize) -> &[(usize, usize)] {
        match self.cells.get(cell_idx) {
            Some(cell) => &self.cell_data[cell.begin..cell.end],
            None => &[],
        }
    }

    /// Check if the segment `p1`-`p2` crosses any edge in the grid.
    pub fn line_intersects_any(&self, p1: &Point, p2: &Point) -> bool {
        !self
            .find_intersections_filtered(p1, p2, |_, _| true)
            .is_empty()
    }

    /// Intersections of `p1`-`p2` with every edge, ordered along the segment.
    pub fn find_intersections(&self, p1: &Point, p2: &Point) -> Vec<Intersection> {
        self.find_intersections_filtered(p1, p2, |_, _| true)
    }

    /// Intersections of `p1`-`p2` with accepted edges, ordered along the
    /// segment. Ties keep the lowest (contour, segment) pair first.
    pub fn find_intersections_filtered<F>(&self, p1: &Point, p2: &Point, accept: F) -> Vec<Intersection>
    where
        F: Fn(usize, usize) -> bool,
    {
        let mut intersections = Vec::new();
        if self.cells.is_empty() {
            return intersections;
        }

        let query = Line::new(*p1, *p2);
        let mut seen = HashSet::new();
        for cell_idx in self.cells_for_segment(&query) {
            for &(contour_idx, seg_idx) in self.cell_entries(cell_idx) {
                if !seen.insert((contour_idx, seg_idx)) || !accept(contour_idx, seg_idx) {
                    continue;
                }
                let segment = self.contours[contour_idx].segment(seg_idx);
                if let Some((point, t)) = query.intersection_param(&segment) {
                    intersections.push(Intersection {
                        contour_idx,
                        segment_idx: seg_idx,
                        point,
                        distance: t,
                    });
                }
            }
        }

        intersections.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.contour_idx.cmp(&b.contour_idx))
                .then(a.segment_idx.cmp(&b.segment_idx))
        });
        intersections
    }

    /// Closest point on any edge within `search_radius` of `query`.
    pub fn closest_point(&self, query: &Point, search_radius: i64) -> Option<ClosestPointResult> {
        self.closest_point_filtered(query, search_radius, |_, _| true)
    }

    /// Closest point on an accepted edge within `search_radius` of `query`.
    /// Ties keep the lowest (contour, segment) pair.
    pub fn closest_point_filtered<F>(
        &self,
        query: &Point,
        search_radius: i64,
        accept: F,
    ) -> Option<ClosestPointResult>
    where
        F: Fn(usize, usize) -> bool,
    {
        if self.cells.is_empty() {
            return None;
        }

        let min = Point::new(query.x - search_radius, query.y - search_radius);
        let max = Point::new(query.x + search_radius, query.y + search_radius);
        let radius_sq = (search_radius as f64) * (search_radius as f64);

        let mut candidates: Vec<(usize, usize)> = self
            .cells_in_box(&min, &max)
            .flat_map(|cell_idx| self.cell_entries(cell_idx).iter().copied())
            .filter(|&(c, s)| accept(c, s))
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let mut best: Option<(f64, ClosestPointResult)> = None;
        for (contour_idx, seg_idx) in candidates {
            let segment = self.contours[contour_idx].segment(seg_idx);
            let (point, t) = query.project_onto_segment(segment.a, segment.b);
            let dist_sq = query.distance_squared(&point) as f64;
            if dist_sq > radius_sq {
                continue;
            }
            if best.as_ref().map_or(true, |(d, _)| dist_sq < *d) {
                best = Some((
                    dist_sq,
                    ClosestPointResult {
                        contour_idx,
                        start_point_idx: seg_idx,
                        distance: dist_sq.sqrt(),
                        t,
                        point,
                    },
                ));
            }
        }
        best.map(|(_, result)| result)
    }

    /// Even-odd containment test against all contours.
    pub fn point_inside(&self, point: &Point) -> bool {
        let mut crossings = 0;
        for contour in &self.contours {
            for seg_idx in 0..contour.num_segments() {
                let segment = contour.segment(seg_idx);
                let (p1, p2) = (segment.a, segment.b);
                if (p1.y > point.y) != (p2.y > point.y) {
                    let slope = (p2.x - p1.x) as f64 / (p2.y - p1.y) as f64;
                    let x_intersect = p1.x as f64 + (point.y - p1.y) as f64 * slope;
                    if (point.x as f64) < x_intersect {
                        crossings += 1;
                    }
                }
            }
        }
        crossings % 2 == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_square(size: i64) -> Polygon {
        Polygon::rectangle(Point::new(0, 0), Point::new(size, size))
    }

    #[test]
    fn test_empty_grid() {
        let grid = EdgeGrid::from_polygons(&[], 100);
        assert!(grid.closest_point(&Point::new(0, 0), 1000).is_none());
        assert!(grid.find_intersections(&Point::new(0, 0), &Point::new(10, 10)).is_empty());
        assert!(!grid.point_inside(&Point::new(0, 0)));
    }

    #[test]
    fn test_vertical_ray_through_square() {
        let grid = EdgeGrid::from_polygons(&[make_square(1000)], 100);
        let hits = grid.find_intersections(&Point::new(500, 2000), &Point::new(500, -1000));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].point, Point::new(500, 1000));
        assert_eq!(hits[0].segment_idx, 2);
        assert_eq!(hits[1].point, Point::new(500, 0));
    }

    #[test]
    fn test_filtered_intersections_skip_rejected_edges() {
        let grid = EdgeGrid::from_polygons(&[make_square(1000)], 100);
        let hits = grid.find_intersections_filtered(
            &Point::new(500, 2000),
            &Point::new(500, -1000),
            |_, seg| seg != 2,
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].segment_idx, 0);
    }

    #[test]
    fn test_closest_point() {
        let grid = EdgeGrid::from_polygons(&[make_square(1000)], 100);
        let result = grid.closest_point(&Point::new(500, 1100), 500).unwrap();
        assert_eq!(result.point, Point::new(500, 1000));
        assert_eq!(result.start_point_idx, 2);
        assert!((result.distance - 100.0).abs() < 1e-9);
        assert!((result.t - 0.5).abs() < 1e-9);

        assert!(grid.closest_point(&Point::new(500, 5000), 500).is_none());
    }

    #[test]
    fn test_closest_point_on_diagonal_edge() {
        let triangle = Polygon::from_points(vec![
            Point::new(0, 0),
            Point::new(10_000, 0),
            Point::new(0, 10_000),
        ]);
        let grid = EdgeGrid::from_polygons(&[triangle], 500);
        let result = grid.closest_point(&Point::new(6_000, 6_000), 3_000).unwrap();
        assert_eq!(result.start_point_idx, 1);
        assert_eq!(result.point, Point::new(5_000, 5_000));
    }

    #[test]
    fn test_point_inside() {
        let grid = EdgeGrid::from_polygons(&[make_square(1000)], 100);
        assert!(grid.point_inside(&Point::new(500, 500)));
        assert!(!grid.point_inside(&Point::new(1500, 500)));
    }
}
