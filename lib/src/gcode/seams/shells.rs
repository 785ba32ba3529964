//! Shells: external perimeters chained across layers.
//!
//! A shell follows one physical wall up through the print. Consecutive
//! layers are matched greedily by bounding box distance, so a shell never
//! splits or merges; a gap simply ends it.

use log::debug;

use super::geometry::{get_mapping, project_to_geometry, BoundedPolygons, Extrusions};
use crate::geometry::{pick_closest_bounding_box, BoundingBox, Polygon};

/// One layer of a shell.
#[derive(Clone, Debug, PartialEq)]
pub struct Slice<T = Polygon> {
    pub boundary: T,
    /// Index of the layer the boundary was taken from.
    pub layer_index: usize,
}

/// Slices of one shell, bottom to top.
pub type Shell<T = Polygon> = Vec<Slice<T>>;

pub type Shells<T = Polygon> = Vec<Shell<T>>;

/// A polygon in a shell that also remembers whether it bounds a hole.
#[derive(Clone, Debug, PartialEq)]
pub struct ShellPolygon {
    pub polygon: Polygon,
    pub is_hole: bool,
}

/// Build shells from the external perimeters of every layer.
///
/// Each extrusion is first replaced by the island outline it runs along,
/// then each outline is linked to the closest outline of the next layer,
/// unless that one is farther than `max_distance` (mm).
pub fn create_shells(extrusions: &[Extrusions], max_distance: f64) -> Shells {
    create_shells_with_holes(extrusions, max_distance)
        .into_iter()
        .map(|shell| {
            shell
                .into_iter()
                .map(|slice| Slice {
                    boundary: slice.boundary.polygon,
                    layer_index: slice.layer_index,
                })
                .collect()
        })
        .collect()
}

/// [`create_shells`], keeping the hole flag of every outline.
pub fn create_shells_with_holes(extrusions: &[Extrusions], max_distance: f64) -> Shells<ShellPolygon> {
    let projected: Vec<BoundedPolygons> = extrusions
        .iter()
        .map(|layer| project_to_geometry(layer, max_distance))
        .collect();

    let layer_sizes: Vec<usize> = projected.iter().map(Vec::len).collect();
    let next_layer_boxes: Vec<Vec<BoundingBox>> = projected
        .iter()
        .map(|layer| layer.iter().map(|p| p.bounding_box).collect())
        .collect();

    let (shell_mapping, shell_count) = get_mapping(&layer_sizes, |layer_index, item_index| {
        let candidates = next_layer_boxes.get(layer_index + 1)?;
        let (perimeter_index, distance) =
            pick_closest_bounding_box(&projected[layer_index][item_index].bounding_box, candidates)?;
        if distance > max_distance {
            return None;
        }
        Some((perimeter_index, 1.0 / distance))
    });

    let mut shells: Shells<ShellPolygon> = vec![Vec::new(); shell_count];
    for (layer_index, layer) in projected.into_iter().enumerate() {
        for (item_index, bounded) in layer.into_iter().enumerate() {
            let shell_id = shell_mapping[layer_index][item_index];
            shells[shell_id].push(Slice {
                boundary: ShellPolygon {
                    polygon: bounded.polygon,
                    is_hole: bounded.is_hole,
                },
                layer_index,
            });
        }
    }
    debug!("created {} shell(s) over {} layer(s)", shells.len(), layer_sizes.len());
    shells
}
