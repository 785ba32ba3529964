//! Extrusion order of one layer.
//!
//! [`get_extrusions`] turns the objects, supports, skirt and brim printed at
//! one height into a plan grouped by extruder. Inside every island the
//! extrusions keep the order the slicing stage gave them; only infill and
//! support are chained to shorten travel. The nozzle position is threaded
//! through the whole plan so that each chaining step starts where the
//! previous extrusion ended.

use std::collections::BTreeMap;

use log::{debug, trace};

use super::seams::PlaceSeam;
use super::tool_ordering::LayerTools;
use super::wipe_tower::{is_toolchange_required, WipeTowerIntegration};
use crate::extrusion::{
    chain_extrusion_references, ExtrusionEntity, ExtrusionEntityReference, ExtrusionRole,
};
use crate::geometry::Point;
use crate::print::{Layer, LayerIsland, LayerSlice, Print, PrintObject, PrintRegion, SupportLayer};

// ============================================================================
// Inputs
// ============================================================================

/// Everything one object prints at the current height.
#[derive(Clone, Copy, Debug)]
pub struct ObjectLayerToPrint<'a> {
    pub object: &'a PrintObject,
    pub object_layer: Option<&'a Layer>,
    pub support_layer: Option<&'a SupportLayer>,
}

impl<'a> ObjectLayerToPrint<'a> {
    pub fn new(object: &'a PrintObject) -> Self {
        Self {
            object,
            object_layer: None,
            support_layer: None,
        }
    }

    /// Builder method: print this object layer.
    pub fn with_layer(mut self, layer: &'a Layer) -> Self {
        self.object_layer = Some(layer);
        self
    }

    /// Builder method: print this support layer.
    pub fn with_support(mut self, support_layer: &'a SupportLayer) -> Self {
        self.support_layer = Some(support_layer);
        self
    }

    pub fn print_z(&self) -> f64 {
        self.object_layer
            .map(|l| l.print_z)
            .or_else(|| self.support_layer.map(|l| l.print_z))
            .unwrap_or(0.0)
    }
}

/// One copy of an object layer, in printing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceToPrint {
    /// Index into the layers passed to [`get_extrusions`].
    pub object_layer_to_print_id: usize,
    /// Index into the object's instances.
    pub instance_id: usize,
}

impl InstanceToPrint {
    pub fn new(object_layer_to_print_id: usize, instance_id: usize) -> Self {
        Self {
            object_layer_to_print_id,
            instance_id,
        }
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Consecutive infill of one region, chained.
#[derive(Clone, Debug)]
pub struct InfillRange<'a> {
    pub items: Vec<ExtrusionEntityReference<'a>>,
    pub region: &'a PrintRegion,
}

/// A perimeter extrusion with the points in printing order. Loops start and
/// end at their seam.
#[derive(Clone, Debug)]
pub struct PerimeterExtrusion<'a> {
    pub entity: &'a ExtrusionEntity,
    pub points: Vec<Point>,
    pub seam: Option<Point>,
}

#[derive(Clone, Debug)]
pub struct IslandExtrusions<'a> {
    pub island: &'a LayerIsland,
    pub perimeters: Vec<PerimeterExtrusion<'a>>,
    pub infill_ranges: Vec<InfillRange<'a>>,
    pub infill_first: bool,
}

impl IslandExtrusions<'_> {
    fn is_empty(&self) -> bool {
        self.perimeters.is_empty() && self.infill_ranges.is_empty()
    }
}

/// Islands of one layer slice, then its ironing.
#[derive(Clone, Debug, Default)]
pub struct SliceExtrusions<'a> {
    pub common_extrusions: Vec<IslandExtrusions<'a>>,
    pub ironing_extrusions: Vec<InfillRange<'a>>,
}

#[derive(Clone, Copy, Debug)]
pub struct SupportExtrusion<'a> {
    pub reference: ExtrusionEntityReference<'a>,
    pub is_interface: bool,
}

/// Support and object extrusions of one instance.
#[derive(Clone, Debug, Default)]
pub struct NormalExtrusions<'a> {
    pub instance_offset: Point,
    pub support_extrusions: Vec<SupportExtrusion<'a>>,
    pub slices_extrusions: Vec<SliceExtrusions<'a>>,
}

impl NormalExtrusions<'_> {
    fn is_empty(&self) -> bool {
        self.support_extrusions.is_empty() && self.slices_extrusions.is_empty()
    }
}

/// Extrusions of one instance reassigned to this extruder for wiping.
#[derive(Clone, Debug, Default)]
pub struct OverriddenExtrusions<'a> {
    pub instance_offset: Point,
    pub slices_extrusions: Vec<SliceExtrusions<'a>>,
}

/// Everything one extruder prints on a layer, in order.
#[derive(Clone, Debug, Default)]
pub struct ExtruderExtrusions<'a> {
    pub extruder_id: u32,
    /// Skirt loops with their index in the print's skirt.
    pub skirt: Vec<(usize, &'a ExtrusionEntity)>,
    pub brim: Vec<ExtrusionEntityReference<'a>>,
    pub overridden_extrusions: Vec<OverriddenExtrusions<'a>>,
    pub normal_extrusions: Vec<NormalExtrusions<'a>>,
    /// Where the nozzle enters the wipe tower before this extruder prints.
    pub wipe_tower_start: Option<Point>,
}

impl<'a> ExtruderExtrusions<'a> {
    pub fn new(extruder_id: u32) -> Self {
        Self {
            extruder_id,
            ..Default::default()
        }
    }
}

// ============================================================================
// Extruder attribution
// ============================================================================

/// Zero-based extruder printing `entity` of `region` for one instance.
///
/// A wiping override of a collection wins unless the layer has a layer-wide
/// extruder. Entities outside a collection carry no id and are never
/// overridden. An extruder not scheduled on the layer falls back to the
/// layer's last one.
pub fn get_extruder_id(
    entity: &ExtrusionEntity,
    layer_tools: &LayerTools,
    region: &PrintRegion,
    object_id: u64,
    instance_id: usize,
) -> u32 {
    if layer_tools.extruder_override == 0 {
        let wiping = layer_tools.wiping_extrusions();
        if let Some(extruder) = entity
            .as_collection()
            .and_then(|collection| wiping.get_extruder_override(collection.id, object_id, instance_id))
        {
            return extruder;
        }
    }
    let extruder = layer_tools.extruder(entity, &region.config);
    if layer_tools.has_extruder(extruder) {
        return extruder;
    }
    match layer_tools.extruders.last() {
        Some(&last) => {
            debug!("extruder {extruder} is not printing at z={}, using {last}", layer_tools.print_z);
            last
        }
        None => extruder,
    }
}

fn is_overridden(
    entity: &ExtrusionEntity,
    layer_tools: &LayerTools,
    object_id: u64,
    instance_id: usize,
) -> bool {
    layer_tools.extruder_override == 0
        && entity.as_collection().map_or(false, |collection| {
            layer_tools
                .wiping_extrusions()
                .is_entity_overridden(collection.id, object_id, instance_id)
        })
}

// ============================================================================
// Per instance
// ============================================================================

/// Decides whether a top-level perimeter or fill entity of a region belongs
/// to the current pass.
type EntityFilter<'f> = dyn Fn(&ExtrusionEntity, &PrintRegion) -> bool + 'f;

/// Conversion between the bed and an instance's own coordinates.
#[derive(Clone, Copy, Debug)]
struct InstanceFrame {
    offset: Point,
}

impl InstanceFrame {
    fn to_local(self, position: Option<Point>) -> Option<Point> {
        position.map(|p| p - self.offset)
    }

    fn to_bed(self, position: Point) -> Point {
        position + self.offset
    }
}

fn entity_points(entity: &ExtrusionEntity) -> Vec<Point> {
    let mut points = Vec::new();
    entity.for_each_point(&mut |p| points.push(p));
    points
}

/// Perimeters of one island in stored order; loops are cut by `place_seam`.
#[allow(clippy::too_many_arguments)]
fn extract_perimeter_extrusions<'a>(
    print: &'a Print,
    object: &'a PrintObject,
    layer: &'a Layer,
    island: &'a LayerIsland,
    predicate: &EntityFilter<'_>,
    frame: InstanceFrame,
    previous_position: &mut Option<Point>,
    place_seam: &mut dyn PlaceSeam,
) -> Vec<PerimeterExtrusion<'a>> {
    let mut result = Vec::new();
    let Some(layer_region) = layer.get_region(island.perimeters.region) else {
        return result;
    };
    let Some(region) = print.get_region(layer_region.region_id) else {
        return result;
    };

    fn visit<'a>(
        entity: &'a ExtrusionEntity,
        object_id: u64,
        layer: &Layer,
        frame: InstanceFrame,
        previous_position: &mut Option<Point>,
        place_seam: &mut dyn PlaceSeam,
        out: &mut Vec<PerimeterExtrusion<'a>>,
    ) {
        match entity {
            ExtrusionEntity::Collection(collection) => {
                for child in &collection.entities {
                    visit(child, object_id, layer, frame, previous_position, place_seam, out);
                }
            }
            ExtrusionEntity::Loop(extrusion_loop) => {
                let placement = place_seam.place_seam(
                    object_id,
                    layer,
                    extrusion_loop,
                    frame.to_local(*previous_position),
                );
                if let Some(&end) = placement.points.last() {
                    *previous_position = Some(frame.to_bed(end));
                }
                out.push(PerimeterExtrusion {
                    entity,
                    points: placement.points,
                    seam: Some(placement.seam),
                });
            }
            _ => {
                let points = entity_points(entity);
                if let Some(&end) = points.last() {
                    *previous_position = Some(frame.to_bed(end));
                }
                out.push(PerimeterExtrusion {
                    entity,
                    points,
                    seam: None,
                });
            }
        }
    }

    for perimeter_id in island.perimeters.indices() {
        let Some(entity) = layer_region.perimeters.entities.get(perimeter_id) else {
            continue;
        };
        if predicate(entity, region) {
            visit(entity, object.id, layer, frame, previous_position, place_seam, &mut result);
        }
    }
    result
}

/// Fill ranges of one island, either without or with only ironing. Runs of
/// fills from the same region are chained together; sortable collections
/// are flattened first.
fn extract_infill_ranges<'a>(
    print: &'a Print,
    layer: &'a Layer,
    island: &'a LayerIsland,
    predicate: &EntityFilter<'_>,
    ironing: bool,
    frame: InstanceFrame,
    previous_position: &mut Option<Point>,
) -> Vec<InfillRange<'a>> {
    let mut result = Vec::new();
    let mut i = 0;
    while i < island.fills.len() {
        let region_index = island.fills[i].region;
        let mut j = i;
        while j < island.fills.len() && island.fills[j].region == region_index {
            j += 1;
        }
        let group = &island.fills[i..j];
        i = j;

        let Some(layer_region) = layer.get_region(region_index) else {
            continue;
        };
        let Some(region) = print.get_region(layer_region.region_id) else {
            continue;
        };

        let mut candidates: Vec<&'a ExtrusionEntity> = Vec::new();
        for range in group {
            for fill_id in range.indices() {
                let Some(entity) = layer_region.fills.entities.get(fill_id) else {
                    continue;
                };
                let is_ironing = entity.role() == ExtrusionRole::Ironing;
                if is_ironing != ironing || !predicate(entity, region) {
                    continue;
                }
                match entity {
                    ExtrusionEntity::Collection(collection) if collection.can_reverse() => {
                        candidates.extend(collection.entities.iter());
                    }
                    _ => candidates.push(entity),
                }
            }
        }
        if candidates.is_empty() {
            continue;
        }

        let items = chain_extrusion_references(&candidates, frame.to_local(*previous_position));
        if let Some(end) = items.last().and_then(ExtrusionEntityReference::last_point) {
            *previous_position = Some(frame.to_bed(end));
        }
        result.push(InfillRange { items, region });
    }
    result
}

#[allow(clippy::too_many_arguments)]
fn extract_island_extrusions<'a>(
    print: &'a Print,
    object: &'a PrintObject,
    layer: &'a Layer,
    slice: &'a LayerSlice,
    predicate: &EntityFilter<'_>,
    frame: InstanceFrame,
    previous_position: &mut Option<Point>,
    place_seam: &mut dyn PlaceSeam,
) -> Vec<IslandExtrusions<'a>> {
    let infill_first = print.config.infill_first;
    let mut result = Vec::new();
    for island in &slice.islands {
        let mut extrusions = IslandExtrusions {
            island,
            perimeters: Vec::new(),
            infill_ranges: Vec::new(),
            infill_first,
        };
        if infill_first {
            extrusions.infill_ranges =
                extract_infill_ranges(print, layer, island, predicate, false, frame, previous_position);
            extrusions.perimeters = extract_perimeter_extrusions(
                print, object, layer, island, predicate, frame, previous_position, place_seam,
            );
        } else {
            extrusions.perimeters = extract_perimeter_extrusions(
                print, object, layer, island, predicate, frame, previous_position, place_seam,
            );
            extrusions.infill_ranges =
                extract_infill_ranges(print, layer, island, predicate, false, frame, previous_position);
        }
        if !extrusions.is_empty() {
            result.push(extrusions);
        }
    }
    result
}

fn extract_ironing_extrusions<'a>(
    print: &'a Print,
    layer: &'a Layer,
    slice: &'a LayerSlice,
    predicate: &EntityFilter<'_>,
    frame: InstanceFrame,
    previous_position: &mut Option<Point>,
) -> Vec<InfillRange<'a>> {
    let mut result = Vec::new();
    for island in &slice.islands {
        result.extend(extract_infill_ranges(
            print,
            layer,
            island,
            predicate,
            true,
            frame,
            previous_position,
        ));
    }
    result
}

/// Extrusions of every slice of `layer` accepted by `predicate`, slices in
/// print order.
#[allow(clippy::too_many_arguments)]
fn get_slices_extrusions<'a>(
    print: &'a Print,
    object: &'a PrintObject,
    layer: &'a Layer,
    predicate: &EntityFilter<'_>,
    frame: InstanceFrame,
    previous_position: &mut Option<Point>,
    place_seam: &mut dyn PlaceSeam,
) -> Vec<SliceExtrusions<'a>> {
    let mut result = Vec::new();
    for &slice_index in &layer.lslice_indices_sorted_by_print_order {
        let Some(slice) = layer.lslices_ex.get(slice_index) else {
            continue;
        };
        let common_extrusions = extract_island_extrusions(
            print, object, layer, slice, predicate, frame, previous_position, place_seam,
        );
        let ironing_extrusions =
            extract_ironing_extrusions(print, layer, slice, predicate, frame, previous_position);
        if !common_extrusions.is_empty() || !ironing_extrusions.is_empty() {
            result.push(SliceExtrusions {
                common_extrusions,
                ironing_extrusions,
            });
        }
    }
    result
}

/// Support extrusions printed by `extruder_id`, chained.
///
/// A support extruder of 0 means "any": it resolves to the first extruder
/// of the layer with non-soluble filament, or the first one if all are
/// soluble.
pub fn get_support_extrusions<'a>(
    print: &Print,
    extruder_id: u32,
    layer_to_print: &ObjectLayerToPrint<'a>,
    layer_tools: &LayerTools,
    previous_position: Option<Point>,
) -> Vec<SupportExtrusion<'a>> {
    let Some(support_layer) = layer_to_print.support_layer else {
        return Vec::new();
    };
    let support_fills = &support_layer.support_fills;
    if support_fills.is_empty() {
        return Vec::new();
    }

    let role = support_fills.role();
    let has_support = role.is_mixed() || role.is_support_base();
    let has_interface = role.is_mixed() || role.is_support_interface();

    let config = &layer_to_print.object.config;
    let dontcare_extruder = layer_tools
        .extruders
        .iter()
        .copied()
        .find(|&e| !print.config.is_filament_soluble(e))
        .or_else(|| layer_tools.extruders.first().copied());
    // Extruders are configured 1-based, 0 meaning "any".
    let resolve = |configured: u32| configured.checked_sub(1).or(dontcare_extruder);
    let support_extruder = resolve(config.support_material_extruder);
    let interface_extruder = resolve(config.support_material_interface_extruder);

    let extrude_support = has_support && support_extruder == Some(extruder_id);
    let extrude_interface = has_interface && interface_extruder == Some(extruder_id);
    if !extrude_support && !extrude_interface {
        return Vec::new();
    }

    let entities: Vec<&'a ExtrusionEntity> = support_fills
        .entities
        .iter()
        .filter(|e| {
            let role = e.role();
            (extrude_support && extrude_interface)
                || (extrude_support && role.is_support_base())
                || (extrude_interface && role.is_support_interface())
        })
        .collect();

    let mut result = Vec::new();
    for reference in chain_extrusion_references(&entities, previous_position) {
        match reference.entity {
            ExtrusionEntity::Collection(collection) if reference.flipped => {
                for child in collection.entities.iter().rev() {
                    result.push(ExtrusionEntityReference::new(child, true));
                }
            }
            ExtrusionEntity::Collection(collection) => {
                for child in &collection.entities {
                    result.push(ExtrusionEntityReference::new(child, false));
                }
            }
            _ => result.push(reference),
        }
    }
    result
        .into_iter()
        .map(|reference| SupportExtrusion {
            reference,
            is_interface: reference.entity.role().is_support_interface(),
        })
        .collect()
}

/// Extrusions of every instance reassigned to `extruder_id` by wiping.
#[allow(clippy::too_many_arguments)]
pub fn get_overridden_extrusions<'a>(
    print: &'a Print,
    layers: &[ObjectLayerToPrint<'a>],
    layer_tools: &LayerTools,
    instances_to_print: &[InstanceToPrint],
    extruder_id: u32,
    place_seam: &mut dyn PlaceSeam,
    previous_position: &mut Option<Point>,
) -> Vec<OverriddenExtrusions<'a>> {
    let mut result = Vec::new();
    for instance in instances_to_print {
        let Some(layer_to_print) = layers.get(instance.object_layer_to_print_id) else {
            continue;
        };
        let Some(layer) = layer_to_print.object_layer else {
            continue;
        };
        let object = layer_to_print.object;
        let instance_id = instance.instance_id;
        let predicate = |entity: &ExtrusionEntity, region: &PrintRegion| {
            is_overridden(entity, layer_tools, object.id, instance_id)
                && get_extruder_id(entity, layer_tools, region, object.id, instance_id) == extruder_id
        };
        let frame = InstanceFrame {
            offset: object.instance_shift(instance_id),
        };
        let slices_extrusions =
            get_slices_extrusions(print, object, layer, &predicate, frame, previous_position, place_seam);
        if !slices_extrusions.is_empty() {
            result.push(OverriddenExtrusions {
                instance_offset: frame.offset,
                slices_extrusions,
            });
        }
    }
    result
}

/// Support and object extrusions of every instance for `extruder_id`,
/// leaving out what wiping reassigned.
#[allow(clippy::too_many_arguments)]
pub fn get_normal_extrusions<'a>(
    print: &'a Print,
    layers: &[ObjectLayerToPrint<'a>],
    layer_tools: &LayerTools,
    instances_to_print: &[InstanceToPrint],
    extruder_id: u32,
    place_seam: &mut dyn PlaceSeam,
    previous_position: &mut Option<Point>,
) -> Vec<NormalExtrusions<'a>> {
    let mut result = Vec::new();
    for instance in instances_to_print {
        let Some(layer_to_print) = layers.get(instance.object_layer_to_print_id) else {
            continue;
        };
        let object = layer_to_print.object;
        let instance_id = instance.instance_id;
        let frame = InstanceFrame {
            offset: object.instance_shift(instance_id),
        };
        let mut extrusions = NormalExtrusions {
            instance_offset: frame.offset,
            ..Default::default()
        };

        extrusions.support_extrusions = get_support_extrusions(
            print,
            extruder_id,
            layer_to_print,
            layer_tools,
            frame.to_local(*previous_position),
        );
        if let Some(end) = extrusions
            .support_extrusions
            .last()
            .and_then(|s| s.reference.last_point())
        {
            *previous_position = Some(frame.to_bed(end));
        }

        if let Some(layer) = layer_to_print.object_layer {
            let predicate = |entity: &ExtrusionEntity, region: &PrintRegion| {
                !is_overridden(entity, layer_tools, object.id, instance_id)
                    && get_extruder_id(entity, layer_tools, region, object.id, instance_id) == extruder_id
            };
            extrusions.slices_extrusions =
                get_slices_extrusions(print, object, layer, &predicate, frame, previous_position, place_seam);
        }

        if !extrusions.is_empty() {
            result.push(extrusions);
        }
    }
    result
}

// ============================================================================
// Per layer
// ============================================================================

/// Plan one layer: one entry per extruder of `layer_tools`, in that order.
///
/// For each extruder the plan holds, in printing order, the wipe tower entry
/// point (if a toolchange goes through the tower), its skirt loops, the brim
/// (whatever `get_brim` hands out for it), extrusions reassigned to it for
/// wiping, and its regular extrusions. `previous_position` is read as the
/// starting nozzle position and left at the end of the plan.
#[allow(clippy::too_many_arguments)]
pub fn get_extrusions<'a>(
    print: &'a Print,
    wipe_tower: Option<&WipeTowerIntegration>,
    layers: &[ObjectLayerToPrint<'a>],
    is_first_layer: bool,
    layer_tools: &LayerTools,
    instances_to_print: &[InstanceToPrint],
    skirt_loops_per_extruder: &BTreeMap<u32, (usize, usize)>,
    current_extruder_id: Option<u32>,
    place_seam: &mut dyn PlaceSeam,
    get_brim: &mut dyn FnMut(u32) -> Vec<ExtrusionEntityReference<'a>>,
    previous_position: &mut Option<Point>,
) -> Vec<ExtruderExtrusions<'a>> {
    let mut current_extruder_id = current_extruder_id;
    let mut toolchange_number = 0;
    let mut result = Vec::with_capacity(layer_tools.extruders.len());

    for &extruder_id in &layer_tools.extruders {
        let mut extrusions = ExtruderExtrusions::new(extruder_id);

        let tower = wipe_tower.filter(|_| layer_tools.has_wipe_tower);
        if let (Some(tower), Some(&last_extruder)) = (tower, layer_tools.extruders.last()) {
            let finish_layer = extruder_id == last_extruder;
            if finish_layer
                || is_toolchange_required(is_first_layer, last_extruder, extruder_id, current_extruder_id)
            {
                if let Some(tool_change) = tower.get_toolchange(toolchange_number) {
                    toolchange_number += 1;
                    extrusions.wipe_tower_start = Some(tower.transform_wt_pt(tool_change.start_pos));
                    *previous_position = Some(tower.transform_wt_pt(tool_change.end_pos));
                    current_extruder_id = Some(tool_change.new_tool);
                }
            }
        }

        if let Some(&(begin, end)) = skirt_loops_per_extruder.get(&extruder_id) {
            for index in begin..end {
                let Some(entity) = print.skirt.entities.get(index) else {
                    continue;
                };
                if let Some(point) = entity.last_point() {
                    *previous_position = Some(point);
                }
                extrusions.skirt.push((index, entity));
            }
        }

        extrusions.brim = get_brim(extruder_id);
        if let Some(point) = extrusions.brim.last().and_then(ExtrusionEntityReference::last_point) {
            *previous_position = Some(point);
        }

        if layer_tools.has_extruder(extruder_id) && layer_tools.wiping_extrusions().is_anything_overridden() {
            extrusions.overridden_extrusions = get_overridden_extrusions(
                print,
                layers,
                layer_tools,
                instances_to_print,
                extruder_id,
                place_seam,
                previous_position,
            );
        }

        extrusions.normal_extrusions = get_normal_extrusions(
            print,
            layers,
            layer_tools,
            instances_to_print,
            extruder_id,
            place_seam,
            previous_position,
        );

        trace!(
            "z={}: extruder {extruder_id} prints {} instance(s)",
            layer_tools.print_z,
            extrusions.normal_extrusions.len()
        );
        current_extruder_id = Some(extruder_id);
        result.push(extrusions);
    }
    result
}

// ============================================================================
// First point
// ============================================================================

fn island_first_point(island: &IslandExtrusions<'_>) -> Option<Point> {
    let perimeters = || island.perimeters.iter().find_map(|p| p.points.first().copied());
    let infill = || {
        island
            .infill_ranges
            .iter()
            .flat_map(|range| range.items.iter())
            .find_map(ExtrusionEntityReference::first_point)
    };
    if island.infill_first {
        infill().or_else(perimeters)
    } else {
        perimeters().or_else(infill)
    }
}

fn slices_first_point(slices: &[SliceExtrusions<'_>]) -> Option<Point> {
    slices.iter().find_map(|slice| {
        slice
            .common_extrusions
            .iter()
            .find_map(island_first_point)
            .or_else(|| {
                slice
                    .ironing_extrusions
                    .iter()
                    .flat_map(|range| range.items.iter())
                    .find_map(ExtrusionEntityReference::first_point)
            })
    })
}

fn extruder_first_point(extrusions: &ExtruderExtrusions<'_>) -> Option<Point> {
    if let Some(point) = extrusions.skirt.iter().find_map(|(_, e)| e.first_point()) {
        return Some(point);
    }
    if let Some(point) = extrusions.brim.iter().find_map(ExtrusionEntityReference::first_point) {
        return Some(point);
    }
    for overridden in &extrusions.overridden_extrusions {
        if let Some(point) = slices_first_point(&overridden.slices_extrusions) {
            return Some(point + overridden.instance_offset);
        }
    }
    for normal in &extrusions.normal_extrusions {
        let support = normal
            .support_extrusions
            .iter()
            .find_map(|s| s.reference.first_point());
        if let Some(point) = support.or_else(|| slices_first_point(&normal.slices_extrusions)) {
            return Some(point + normal.instance_offset);
        }
    }
    None
}

/// First point on the bed that the plan extrudes at.
pub fn get_first_point(extrusions: &[ExtruderExtrusions<'_>]) -> Option<Point> {
    extrusions.iter().find_map(extruder_first_point)
}

// ============================================================================
// Tests
// ============================================================================
