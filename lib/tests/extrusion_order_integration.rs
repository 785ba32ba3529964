//! End-to-end extrusion ordering tests.
//!
//! A placer is built for a small print and drives `get_extrusions` the way
//! a G-code writer would, one layer at a time.

use std::collections::BTreeMap;

use slicer_seams::gcode::extrusion_order::{
    get_extrusions, get_first_point, ExtruderExtrusions, InstanceToPrint, ObjectLayerToPrint,
};
use slicer_seams::gcode::seams::{NoPainting, Placer};
use slicer_seams::gcode::wipe_tower::{Vec2f, WipeTowerIntegration};
use slicer_seams::print::{LayerExtrusionRange, LayerIsland, LayerRegion, LayerSlice};
use slicer_seams::{
    scale, ExPolygon, ExtrusionEntity, ExtrusionEntityCollection, ExtrusionEntityReference,
    ExtrusionLoop, ExtrusionPath, ExtrusionRole, Layer, LayerTools, Point, Polygon, Print,
    PrintConfig, PrintObject, PrintRegion, PrintRegionConfig, SeamConfig, ToolOrdering,
};

const PERIMETERS_ID: u64 = 10;
const INFILL_ID: u64 = 20;

fn cube_layer(index: usize) -> Layer {
    let mut layer = Layer::new(index, 0.2 * (index + 1) as f64);
    let mut region = LayerRegion::new(0);
    let wall = Polygon::square(Point::new(0, 0), scale(10.0));
    region
        .perimeters
        .entities
        .push(ExtrusionEntity::Collection(ExtrusionEntityCollection::with_entities(
            PERIMETERS_ID,
            vec![ExtrusionEntity::Loop(ExtrusionLoop::from_polygon(
                &wall,
                ExtrusionRole::ExternalPerimeter,
                0.45,
                0.2,
            ))],
        )));
    let lines = (0..5)
        .map(|i| {
            let y = scale(-8.0 + 4.0 * i as f64);
            ExtrusionEntity::Path(ExtrusionPath::new(
                vec![Point::new(scale(-8.0), y), Point::new(scale(8.0), y)],
                ExtrusionRole::InternalInfill,
                0.45,
                0.2,
            ))
        })
        .collect();
    region
        .fills
        .entities
        .push(ExtrusionEntity::Collection(ExtrusionEntityCollection::with_entities(
            INFILL_ID, lines,
        )));
    layer.regions.push(region);

    let outline = ExPolygon::new(Polygon::square(Point::new(0, 0), scale(10.2)));
    layer.push_slice(
        outline.clone(),
        LayerSlice {
            islands: vec![LayerIsland {
                boundary: outline,
                perimeters: LayerExtrusionRange::new(0, 0..1),
                fills: vec![LayerExtrusionRange::new(0, 0..1)],
            }],
        },
    );
    layer
}

fn cube_print(region_config: PrintRegionConfig, shifts: &[Point]) -> Print {
    cube_print_with(PrintConfig::new(), region_config, shifts)
}

fn cube_print_with(config: PrintConfig, region_config: PrintRegionConfig, shifts: &[Point]) -> Print {
    let mut object = PrintObject::new(1).with_instances(shifts);
    object.layers = (0..3).map(cube_layer).collect();
    let mut print = Print::new(config);
    print.regions.push(PrintRegion::new(region_config));
    print.objects.push(object);
    print
}

fn plan<'a>(
    print: &'a Print,
    placer: &mut Placer,
    tools: &LayerTools,
    layer_index: usize,
    position: &mut Option<Point>,
) -> Vec<ExtruderExtrusions<'a>> {
    let object = &print.objects[0];
    let layers = vec![ObjectLayerToPrint::new(object).with_layer(&object.layers[layer_index])];
    let instances: Vec<InstanceToPrint> = (0..object.instances.len())
        .map(|i| InstanceToPrint::new(0, i))
        .collect();
    get_extrusions(
        print,
        None,
        &layers,
        layer_index == 0,
        tools,
        &instances,
        &BTreeMap::new(),
        None,
        placer,
        &mut |_: u32| Vec::<ExtrusionEntityReference>::new(),
        position,
    )
}

/// Every instance starts its perimeter at the same rear seam, shifted with
/// the instance.
#[test]
fn test_instances_share_seams() {
    let shifts = [Point::new(0, 0), Point::new(scale(50.0), 0)];
    let print = cube_print(PrintRegionConfig::new(), &shifts);
    let mut placer = Placer::init(&print, &SeamConfig::rear(), &NoPainting).unwrap();
    let tools = LayerTools::new(0.2).with_extruders(vec![0]);

    let mut position = None;
    let extrusions = plan(&print, &mut placer, &tools, 0, &mut position);

    assert_eq!(extrusions.len(), 1);
    let normal = &extrusions[0].normal_extrusions;
    assert_eq!(normal.len(), 2);
    assert_eq!(normal[1].instance_offset, shifts[1]);
    for instance in normal {
        let island = &instance.slices_extrusions[0].common_extrusions[0];
        assert_eq!(island.perimeters[0].seam, Some(Point::new(0, scale(10.0))));
        assert_eq!(island.infill_ranges[0].items.len(), 5);
    }
    assert_eq!(get_first_point(&extrusions), Some(Point::new(0, scale(10.0))));
    // The nozzle ends on the second instance.
    assert!(position.map_or(false, |p| p.x > scale(40.0)));
}

/// A wall loop stored straight in the region's perimeters gets the same
/// seam from the placer and is planned like a collected one.
#[test]
fn test_bare_perimeter_loop_is_planned() {
    let mut print = cube_print(PrintRegionConfig::new(), &[Point::new(0, 0)]);
    for layer in &mut print.objects[0].layers {
        let region = &mut layer.regions[0];
        let wall = region.perimeters.entities[0]
            .as_collection()
            .map(|collection| collection.entities[0].clone());
        region.perimeters.entities = wall.into_iter().collect();
    }
    let mut placer = Placer::init(&print, &SeamConfig::rear(), &NoPainting).unwrap();
    let tools = LayerTools::new(0.2).with_extruders(vec![0]);

    let mut position = None;
    let extrusions = plan(&print, &mut placer, &tools, 0, &mut position);

    let island = &extrusions[0].normal_extrusions[0].slices_extrusions[0].common_extrusions[0];
    assert_eq!(island.perimeters.len(), 1);
    assert!(island.perimeters[0].entity.is_loop());
    assert_eq!(island.perimeters[0].seam, Some(Point::new(0, scale(10.0))));
}

/// Infill starts next to the seam the perimeter ended on.
#[test]
fn test_infill_follows_perimeter() {
    let print = cube_print(PrintRegionConfig::new(), &[Point::new(0, 0)]);
    let mut placer = Placer::init(&print, &SeamConfig::rear(), &NoPainting).unwrap();
    let tools = LayerTools::new(0.2).with_extruders(vec![0]);

    let mut position = None;
    let extrusions = plan(&print, &mut placer, &tools, 1, &mut position);
    let island = &extrusions[0].normal_extrusions[0].slices_extrusions[0].common_extrusions[0];
    let first_line = island.infill_ranges[0].items[0];
    assert_eq!(first_line.first_point().map(|p| p.y), Some(scale(8.0)));
}

#[test]
fn test_regions_split_by_extruder() {
    let config = PrintRegionConfig::new().perimeter_extruder(1).infill_extruder(2);
    let print = cube_print(config, &[Point::new(0, 0)]);
    let mut placer = Placer::init(&print, &SeamConfig::default(), &NoPainting).unwrap();
    let tools = LayerTools::new(0.2).with_extruders(vec![0, 1]);

    let mut position = None;
    let extrusions = plan(&print, &mut placer, &tools, 0, &mut position);

    assert_eq!(extrusions.len(), 2);
    let first = &extrusions[0].normal_extrusions[0].slices_extrusions[0].common_extrusions[0];
    assert_eq!(first.perimeters.len(), 1);
    assert!(first.infill_ranges.is_empty());
    let second = &extrusions[1].normal_extrusions[0].slices_extrusions[0].common_extrusions[0];
    assert!(second.perimeters.is_empty());
    assert_eq!(second.infill_ranges.len(), 1);
}

/// Infill reassigned for wiping moves to the other extruder's overridden
/// extrusions and out of its own normal extrusions.
#[test]
fn test_wiping_override_moves_infill() {
    let config = PrintRegionConfig::new().perimeter_extruder(1).infill_extruder(2);
    let print = cube_print(config, &[Point::new(0, 0)]);
    let mut placer = Placer::init(&print, &SeamConfig::default(), &NoPainting).unwrap();
    let mut tools = LayerTools::new(0.2).with_extruders(vec![0, 1]);
    tools
        .wiping_extrusions_mut()
        .set_extruder_override(INFILL_ID, print.objects[0].id, 0, 0);

    let mut position = None;
    let extrusions = plan(&print, &mut placer, &tools, 0, &mut position);

    let overridden = &extrusions[0].overridden_extrusions;
    assert_eq!(overridden.len(), 1);
    let island = &overridden[0].slices_extrusions[0].common_extrusions[0];
    assert!(island.perimeters.is_empty());
    assert_eq!(island.infill_ranges[0].items.len(), 5);

    assert!(extrusions[1].normal_extrusions.is_empty());
}

/// The schedule from tool ordering drives the wipe tower: each extruder of
/// the first layer enters the tower before printing.
#[test]
fn test_scheduled_wipe_tower() {
    let region_config = PrintRegionConfig::new().perimeter_extruder(1).infill_extruder(2);
    let print = cube_print_with(PrintConfig::new().wipe_tower(true), region_config, &[Point::new(0, 0)]);
    let object = &print.objects[0];
    let ordering = ToolOrdering::for_object(&print.config, object, &print.regions);
    let tools = &ordering.layer_tools()[0];
    assert_eq!(tools.extruders, vec![0, 1]);
    assert!(tools.has_wipe_tower);

    let tower = WipeTowerIntegration::plan(&ordering, Vec2f::new(150.0, 150.0), 0.0, 20.0, 10.0);
    let mut placer = Placer::init(&print, &SeamConfig::rear(), &NoPainting).unwrap();
    let layers = vec![ObjectLayerToPrint::new(object).with_layer(&object.layers[0])];
    let mut position = None;

    let extrusions = get_extrusions(
        &print,
        Some(&tower),
        &layers,
        true,
        tools,
        &[InstanceToPrint::new(0, 0)],
        &BTreeMap::new(),
        None,
        &mut placer,
        &mut |_: u32| Vec::<ExtrusionEntityReference>::new(),
        &mut position,
    );

    assert_eq!(extrusions.len(), 2);
    for extruder in &extrusions {
        let start = extruder.wipe_tower_start.unwrap();
        assert!(start.x >= scale(150.0) && start.y >= scale(150.0));
    }
    // The perimeter is printed straight after leaving the tower.
    assert_eq!(get_first_point(&extrusions[..1]), Some(Point::new(0, scale(10.0))));
}
