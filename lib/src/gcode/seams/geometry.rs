//! Geometry gathered for seam placement.
//!
//! External perimeters are collected per layer together with the outline of
//! the island they belong to, then projected onto that outline. The greedy
//! list-to-list [`get_mapping`] used to chain them into shells lives here too.

use log::{debug, trace};

use crate::clipper::expand_polygon;
use crate::extrusion::{ExtrusionEntity, ExtrusionRole};
use crate::geometry::{pick_closest_bounding_box, BoundingBox, ExPolygon, Polygon};
use crate::print::{Layer, PrintRegion};
use crate::{CoordF, Error, Result};

/// An external perimeter and the island outline it was printed around.
#[derive(Clone, Debug)]
pub struct Extrusion {
    pub polygon: Polygon,
    pub bounding_box: BoundingBox,
    /// Extrusion width (mm).
    pub width: CoordF,
    pub island_boundary: ExPolygon,
    /// Boxes of the island contour followed by its holes.
    pub island_boundary_bounding_boxes: Vec<BoundingBox>,
}

impl Extrusion {
    pub fn new(polygon: Polygon, width: CoordF, island_boundary: ExPolygon) -> Self {
        let island_boundary_bounding_boxes = if island_boundary.is_empty() {
            Vec::new()
        } else {
            island_boundary.polygons().map(Polygon::bounding_box).collect()
        };
        Self {
            bounding_box: polygon.bounding_box(),
            polygon,
            width,
            island_boundary,
            island_boundary_bounding_boxes,
        }
    }
}

/// External perimeters of one layer.
pub type Extrusions = Vec<Extrusion>;

/// A closed outline with its box and whether it bounds a hole.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundedPolygon {
    pub polygon: Polygon,
    pub bounding_box: BoundingBox,
    pub is_hole: bool,
}

pub type BoundedPolygons = Vec<BoundedPolygon>;

/// Collect the external perimeters of every layer, walking slices, islands
/// and the island's perimeter collections in print order.
///
/// Loops and closed paths are accepted. Any other entity carrying the
/// external perimeter role cannot be turned into a closed outline and aborts
/// the whole object.
pub fn get_extrusions(layers: &[Layer], regions: &[PrintRegion]) -> Result<Vec<Extrusions>> {
    let mut result = Vec::with_capacity(layers.len());
    for (layer_index, layer) in layers.iter().enumerate() {
        let mut extrusions = Extrusions::new();
        for slice in &layer.lslices_ex {
            for island in &slice.islands {
                let Some(layer_region) = layer.get_region(island.perimeters.region) else {
                    continue;
                };
                let default_width = regions
                    .get(layer_region.region_id)
                    .map_or(0.0, |r| r.config.external_perimeter_extrusion_width);
                for perimeter_id in island.perimeters.indices() {
                    let Some(entity) = layer_region.perimeters.entities.get(perimeter_id) else {
                        continue;
                    };
                    collect_external_perimeters(
                        entity,
                        layer_index,
                        default_width,
                        &island.boundary,
                        &mut extrusions,
                    )?;
                }
            }
        }
        trace!(
            "layer {layer_index}: {} external perimeter(s)",
            extrusions.len()
        );
        result.push(extrusions);
    }
    Ok(result)
}

fn collect_external_perimeters(
    entity: &ExtrusionEntity,
    layer_index: usize,
    default_width: CoordF,
    island_boundary: &ExPolygon,
    out: &mut Extrusions,
) -> Result<()> {
    let width_or_default = |width: CoordF| if width > 0.0 { width } else { default_width };
    match entity {
        ExtrusionEntity::Collection(collection) => {
            for child in &collection.entities {
                collect_external_perimeters(child, layer_index, default_width, island_boundary, out)?;
            }
        }
        ExtrusionEntity::Loop(lp) if lp.role().is_external_perimeter() => {
            out.push(Extrusion::new(
                lp.polygon(),
                width_or_default(lp.width()),
                island_boundary.clone(),
            ));
        }
        ExtrusionEntity::Path(path) if path.role.is_external_perimeter() => {
            let closed = path.polyline.len() > 2 && path.polyline.first() == path.polyline.last();
            if !closed {
                return Err(Error::UnexpectedExtrusionEntity {
                    layer: layer_index,
                    role: path.role,
                });
            }
            let points = path.polyline[..path.polyline.len() - 1].to_vec();
            out.push(Extrusion::new(
                Polygon::from_points(points),
                width_or_default(path.width),
                island_boundary.clone(),
            ));
        }
        ExtrusionEntity::MultiPath(multi) if entity.role().is_external_perimeter() => {
            return Err(Error::UnexpectedExtrusionEntity {
                layer: layer_index,
                role: multi.paths.first().map_or(ExtrusionRole::None, |p| p.role),
            });
        }
        _ => {}
    }
    Ok(())
}

/// Replace every extrusion by the island outline it runs along.
///
/// The outline is the contour or hole whose box is closest to the
/// extrusion's box. When even that one is farther than `max_bb_distance`
/// (mm), the extrusion itself grown by half its width stands in for it.
pub fn project_to_geometry(extrusions: &[Extrusion], max_bb_distance: CoordF) -> BoundedPolygons {
    let mut result = BoundedPolygons::with_capacity(extrusions.len());
    for extrusion in extrusions {
        let closest = pick_closest_bounding_box(
            &extrusion.bounding_box,
            &extrusion.island_boundary_bounding_boxes,
        );
        match closest {
            Some((index, distance)) if distance <= max_bb_distance => {
                let is_hole = index != 0;
                let polygon = if is_hole {
                    extrusion.island_boundary.holes[index - 1].clone()
                } else {
                    extrusion.island_boundary.contour.clone()
                };
                result.push(BoundedPolygon {
                    polygon,
                    bounding_box: extrusion.island_boundary_bounding_boxes[index],
                    is_hole,
                });
            }
            _ => {
                debug!(
                    "no island outline near extrusion {:?}, using the expanded extrusion",
                    extrusion.bounding_box
                );
                if let Some(polygon) = expand_polygon(&extrusion.polygon, extrusion.width / 2.0) {
                    result.push(BoundedPolygon {
                        bounding_box: polygon.bounding_box(),
                        is_hole: !polygon.is_counter_clockwise(),
                        polygon,
                    });
                }
            }
        }
    }
    result
}

/// For each list, the id of the chain every item belongs to.
pub type Mapping = Vec<Vec<usize>>;

/// Chain items of consecutive lists.
///
/// `mapping_operator(list, item)` proposes the item of list `list + 1` that
/// `item` continues into, with a weight (higher is better), or None. Links
/// are accepted greedily by decreasing weight, each item taking part in at
/// most one link in each direction. Items of the first list and items left
/// unlinked start new chains.
///
/// Returns the chain ids per list and the number of chains.
pub fn get_mapping<F>(list_sizes: &[usize], mut mapping_operator: F) -> (Mapping, usize)
where
    F: FnMut(usize, usize) -> Option<(usize, f64)>,
{
    let Some(&first_size) = list_sizes.first() else {
        return (Mapping::new(), 0);
    };
    let mut result: Mapping = Vec::with_capacity(list_sizes.len());
    result.push((0..first_size).collect());
    let mut next_id = first_size;

    for index in 0..list_sizes.len() - 1 {
        let mut links: Vec<(usize, usize, f64)> = (0..list_sizes[index])
            .filter_map(|from| {
                mapping_operator(index, from)
                    .filter(|&(to, _)| to < list_sizes[index + 1])
                    .map(|(to, weight)| (from, to, weight))
            })
            .collect();
        // Stable, so equal weights keep item order.
        links.sort_by(|a, b| b.2.total_cmp(&a.2));

        let mut linked_current = vec![false; list_sizes[index]];
        let mut next: Vec<Option<usize>> = vec![None; list_sizes[index + 1]];
        for (from, to, _) in links {
            if !linked_current[from] && next[to].is_none() {
                linked_current[from] = true;
                next[to] = Some(result[index][from]);
            }
        }

        let ids = next
            .into_iter()
            .map(|id| {
                id.unwrap_or_else(|| {
                    next_id += 1;
                    next_id - 1
                })
            })
            .collect();
        result.push(ids);
    }
    (result, next_id)
}
