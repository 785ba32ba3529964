//! Seam placer: runs the whole-object seam pass once and then cuts every
//! perimeter loop at its seam while the layers are being ordered.

use std::collections::HashMap;

use log::{debug, trace};

use super::choice::{
    choose_seam_point, get_object_seams, get_shell_seam, SeamChoice, SeamPerimeterChoice,
};
use super::geometry::get_extrusions;
use super::nearest::{get_aligned_object_seams, nearest_point};
use super::perimeters::{create_perimeters, layer_infos, SeamPainting};
use super::rear::rearest_point;
use super::shells::create_shells_with_holes;
use super::{random, rear};
use crate::config::{SeamConfig, SeamPosition};
use crate::extrusion::ExtrusionLoop;
use crate::geometry::{pick_closest_bounding_box, BoundingBox, Point};
use crate::print::{Layer, Print, PrintObject, PrintRegion};
use crate::Result;

/// A loop cut at its seam.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeamPlacement {
    /// Loop points starting at the seam and closing back on it.
    pub points: Vec<Point>,
    pub seam: Point,
}

/// Chooses where a perimeter loop starts.
///
/// `previous_position` is the nozzle position in the coordinates of the
/// loop.
pub trait PlaceSeam {
    fn place_seam(
        &mut self,
        object_id: u64,
        layer: &Layer,
        extrusion_loop: &ExtrusionLoop,
        previous_position: Option<Point>,
    ) -> SeamPlacement;
}

impl<F> PlaceSeam for F
where
    F: FnMut(u64, &Layer, &ExtrusionLoop, Option<Point>) -> SeamPlacement,
{
    fn place_seam(
        &mut self,
        object_id: u64,
        layer: &Layer,
        extrusion_loop: &ExtrusionLoop,
        previous_position: Option<Point>,
    ) -> SeamPlacement {
        self(object_id, layer, extrusion_loop, previous_position)
    }
}

/// Seam choices of every object, by layer.
#[derive(Clone, Debug, Default)]
pub struct Placer {
    config: SeamConfig,
    seams_per_object: HashMap<u64, Vec<Vec<SeamPerimeterChoice>>>,
}

impl Placer {
    pub fn new(config: SeamConfig) -> Self {
        Self {
            config,
            seams_per_object: HashMap::new(),
        }
    }

    /// Placer for every object of `print`, all sharing `painting`.
    pub fn init(print: &Print, config: &SeamConfig, painting: &dyn SeamPainting) -> Result<Self> {
        config.validate()?;
        let mut placer = Self::new(config.clone());
        for object in &print.objects {
            placer.add_object(object, &print.regions, painting)?;
        }
        Ok(placer)
    }

    /// Run the seam pass for one object.
    pub fn add_object(
        &mut self,
        object: &PrintObject,
        regions: &[PrintRegion],
        painting: &dyn SeamPainting,
    ) -> Result<()> {
        let seams = Self::object_seams(&object.layers, regions, &self.config, painting)?;
        debug!(
            "object {}: seams for {} perimeter(s)",
            object.id,
            seams.iter().map(Vec::len).sum::<usize>()
        );
        self.seams_per_object.insert(object.id, seams);
        Ok(())
    }

    fn object_seams(
        layers: &[Layer],
        regions: &[PrintRegion],
        config: &SeamConfig,
        painting: &dyn SeamPainting,
    ) -> Result<Vec<Vec<SeamPerimeterChoice>>> {
        let extrusions = get_extrusions(layers, regions)?;
        let shells = create_shells_with_holes(&extrusions, config.max_shell_distance);
        let perimeters = create_perimeters(shells, &layer_infos(layers), painting, config);

        Ok(match config.seam_position {
            SeamPosition::Rear => rear::get_object_seams(perimeters, config.rear_project_threshold),
            SeamPosition::Aligned => get_aligned_object_seams(perimeters, config.max_nearest_detour),
            SeamPosition::Random => random::get_object_seams(perimeters),
            // Provisional; redone against the nozzle position at placement.
            SeamPosition::Nearest => get_object_seams(perimeters, |shell| {
                get_shell_seam(shell, |perimeter, _| choose_seam_point(perimeter, rearest_point))
            }),
        })
    }

    pub fn config(&self) -> &SeamConfig {
        &self.config
    }

    /// Seam choices of `object_id` on layer `layer_index`.
    pub fn layer_seams(&self, object_id: u64, layer_index: usize) -> &[SeamPerimeterChoice] {
        self.seams_per_object
            .get(&object_id)
            .and_then(|layers| layers.get(layer_index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn seam_for_loop(
        &self,
        object_id: u64,
        layer: &Layer,
        loop_box: &BoundingBox,
        previous_position: Option<Point>,
    ) -> Option<Point> {
        let choices = self.layer_seams(object_id, layer.id);
        let boxes: Vec<BoundingBox> = choices.iter().map(|c| c.bounding_box).collect();
        let (index, _) = pick_closest_bounding_box(loop_box, &boxes)?;
        let chosen = &choices[index];

        let choice: SeamChoice = match (self.config.seam_position, previous_position) {
            (SeamPosition::Nearest, Some(previous)) if !chosen.perimeter.is_degenerate => {
                let reference = previous.to_f64();
                let max_detour = self.config.max_nearest_detour;
                choose_seam_point(&chosen.perimeter, |p, t, c| {
                    nearest_point(p, reference, max_detour, t, c)
                })
            }
            _ => chosen.choice,
        };
        Some(choice.position.to_scaled())
    }

    /// Cut `extrusion_loop` at the seam stored for the closest perimeter.
    ///
    /// Loops of a layer with no stored seams start at the vertex closest to
    /// `previous_position`.
    pub fn place_seam(
        &self,
        object_id: u64,
        layer: &Layer,
        extrusion_loop: &ExtrusionLoop,
        previous_position: Option<Point>,
    ) -> SeamPlacement {
        let polygon = extrusion_loop.polygon();
        let points = polygon.points();
        if points.is_empty() {
            return SeamPlacement {
                points: Vec::new(),
                seam: previous_position.unwrap_or_default(),
            };
        }

        match self.seam_for_loop(object_id, layer, &polygon.bounding_box(), previous_position) {
            Some(seam) => cut_at_projection(points, seam),
            None => {
                trace!("layer {}: no stored seam for loop, starting near nozzle", layer.id);
                let start = previous_position
                    .and_then(|p| p.nearest_point_index(points))
                    .unwrap_or(0);
                rotate_to(points, start)
            }
        }
    }
}

impl PlaceSeam for Placer {
    fn place_seam(
        &mut self,
        object_id: u64,
        layer: &Layer,
        extrusion_loop: &ExtrusionLoop,
        previous_position: Option<Point>,
    ) -> SeamPlacement {
        Placer::place_seam(self, object_id, layer, extrusion_loop, previous_position)
    }
}

fn rotate_to(points: &[Point], start: usize) -> SeamPlacement {
    let mut rotated = Vec::with_capacity(points.len() + 1);
    rotated.extend_from_slice(&points[start..]);
    rotated.extend_from_slice(&points[..start]);
    rotated.push(points[start]);
    SeamPlacement {
        points: rotated,
        seam: points[start],
    }
}

/// Start the loop at the point of its outline closest to `seam`, inserting
/// a vertex when that point lies inside an edge.
fn cut_at_projection(points: &[Point], seam: Point) -> SeamPlacement {
    let n = points.len();
    let mut best: Option<(i128, usize, Point)> = None;
    for i in 0..n {
        let next = (i + 1) % n;
        let (projected, _) = seam.project_onto_segment(points[i], points[next]);
        let distance = seam.distance_squared(&projected);
        if best.map_or(true, |(d, _, _)| distance < d) {
            best = Some((distance, i, projected));
        }
    }
    let Some((_, edge, projected)) = best else {
        return rotate_to(points, 0);
    };

    let next = (edge + 1) % n;
    if projected == points[edge] {
        return rotate_to(points, edge);
    }
    if projected == points[next] {
        return rotate_to(points, next);
    }

    let mut rotated = Vec::with_capacity(n + 2);
    rotated.push(projected);
    rotated.extend_from_slice(&points[next..]);
    rotated.extend_from_slice(&points[..next]);
    rotated.push(projected);
    SeamPlacement {
        points: rotated,
        seam: projected,
    }
}
