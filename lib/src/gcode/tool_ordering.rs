//! Tool ordering for multi-extruder prints.
//!
//! Decides, for every print height, which extruders print and in which order:
//!
//! - **LayerTools**: extruders of one layer, the layer-wide override and the
//!   per-instance wiping overrides
//! - **WipingExtrusions**: collections whose extruder was reassigned so that
//!   they purge the previous material
//! - **ToolOrdering**: builds the per-layer schedule from a print object
//!
//! Extruder ids stored in [`LayerTools::extruders`] are zero-based. While the
//! schedule is being collected they are one-based, with 0 meaning "any
//! extruder"; [`ToolOrdering::handle_dontcare_extruders`] resolves those and
//! switches to zero-based ids.

use std::collections::HashMap;

use crate::config::{PrintConfig, PrintRegionConfig};
use crate::extrusion::ExtrusionEntity;
use crate::print::{PrintObject, PrintRegion};

/// Small epsilon for floating point layer height comparisons
const LAYER_HEIGHT_EPSILON: f64 = 1e-6;

// ============================================================================
// Wiping Extrusions
// ============================================================================

/// Extruder overrides of collections used for wiping during tool changes.
#[derive(Debug, Clone, Default)]
pub struct WipingExtrusions {
    /// (collection id, object id) -> zero-based extruder per instance
    entity_overrides: HashMap<(u64, u64), Vec<Option<u32>>>,
    something_overridden: bool,
}

impl WipingExtrusions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any extrusions have been overridden
    pub fn is_anything_overridden(&self) -> bool {
        self.something_overridden
    }

    /// Print instance `instance_id` of collection `collection_id` with
    /// `extruder` (zero-based).
    pub fn set_extruder_override(
        &mut self,
        collection_id: u64,
        object_id: u64,
        instance_id: usize,
        extruder: u32,
    ) {
        self.something_overridden = true;
        let overrides = self
            .entity_overrides
            .entry((collection_id, object_id))
            .or_default();
        if overrides.len() <= instance_id {
            overrides.resize(instance_id + 1, None);
        }
        overrides[instance_id] = Some(extruder);
    }

    /// Overridden extruder of one instance of a collection.
    pub fn get_extruder_override(
        &self,
        collection_id: u64,
        object_id: u64,
        instance_id: usize,
    ) -> Option<u32> {
        self.entity_overrides
            .get(&(collection_id, object_id))
            .and_then(|overrides| overrides.get(instance_id).copied().flatten())
    }

    pub fn is_entity_overridden(&self, collection_id: u64, object_id: u64, instance_id: usize) -> bool {
        self.get_extruder_override(collection_id, object_id, instance_id)
            .is_some()
    }

    /// Clear all overrides
    pub fn clear(&mut self) {
        self.entity_overrides.clear();
        self.something_overridden = false;
    }
}

// ============================================================================
// Layer Tools
// ============================================================================

/// Per-layer information about extruders and toolchanges
#[derive(Debug, Clone)]
pub struct LayerTools {
    /// Print Z height of this layer
    pub print_z: f64,
    /// Whether this layer has object extrusions
    pub has_object: bool,
    /// Whether this layer has support extrusions
    pub has_support: bool,
    /// Extruder ids in printing order
    pub extruders: Vec<u32>,
    /// Extruder override for the whole layer (0 = no override, 1-based otherwise)
    pub extruder_override: u32,
    /// Whether wipe tower is active at this layer
    pub has_wipe_tower: bool,
    /// Number of toolchanges the wipe tower must absorb at this layer
    pub wipe_tower_partitions: usize,
    wiping_extrusions: WipingExtrusions,
}

impl LayerTools {
    /// Create new layer tools for a given Z height
    pub fn new(print_z: f64) -> Self {
        Self {
            print_z,
            has_object: false,
            has_support: false,
            extruders: Vec::new(),
            extruder_override: 0,
            has_wipe_tower: false,
            wipe_tower_partitions: 0,
            wiping_extrusions: WipingExtrusions::new(),
        }
    }

    /// Builder method: set the zero-based extruder order.
    pub fn with_extruders(mut self, extruders: Vec<u32>) -> Self {
        self.extruders = extruders;
        self
    }

    /// Check if this layer uses a specific extruder
    pub fn has_extruder(&self, extruder: u32) -> bool {
        self.extruders.contains(&extruder)
    }

    /// Zero-based extruder that prints `entity` of a region with
    /// `region_config`, ignoring wiping overrides.
    ///
    /// A layer-wide override wins. Otherwise infill goes to the solid or
    /// sparse infill extruder (a collection by its first entity), and
    /// everything else to the perimeter extruder.
    pub fn extruder(&self, entity: &ExtrusionEntity, region_config: &PrintRegionConfig) -> u32 {
        let extruder = if self.extruder_override != 0 {
            self.extruder_override
        } else if entity.role().is_infill() {
            let leading = match entity {
                ExtrusionEntity::Collection(collection) => {
                    collection.entities.first().map(ExtrusionEntity::role)
                }
                other => Some(other.role()),
            };
            if leading.map_or(false, |role| role.is_solid_infill()) {
                region_config.solid_infill_extruder
            } else {
                region_config.infill_extruder
            }
        } else {
            region_config.perimeter_extruder
        };
        extruder.saturating_sub(1)
    }

    /// Get mutable reference to wiping extrusions
    pub fn wiping_extrusions_mut(&mut self) -> &mut WipingExtrusions {
        &mut self.wiping_extrusions
    }

    /// Get reference to wiping extrusions
    pub fn wiping_extrusions(&self) -> &WipingExtrusions {
        &self.wiping_extrusions
    }
}

impl PartialEq for LayerTools {
    fn eq(&self, other: &Self) -> bool {
        (self.print_z - other.print_z).abs() < LAYER_HEIGHT_EPSILON
    }
}

impl PartialOrd for LayerTools {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.print_z.partial_cmp(&other.print_z)
    }
}

// ============================================================================
// Tool Ordering
// ============================================================================

/// Extruder schedule of a whole print.
#[derive(Debug, Clone, Default)]
pub struct ToolOrdering {
    layer_tools: Vec<LayerTools>,
    first_printing_extruder: Option<u32>,
    last_printing_extruder: Option<u32>,
    enable_wipe_tower: bool,
    filament_soluble: Vec<bool>,
}

impl ToolOrdering {
    pub fn new(config: &PrintConfig) -> Self {
        Self {
            enable_wipe_tower: config.wipe_tower,
            filament_soluble: config.filament_soluble.clone(),
            ..Default::default()
        }
    }

    /// Schedule for a single object: one entry per object or support layer
    /// height, extruders collected from its regions and support settings.
    pub fn for_object(config: &PrintConfig, object: &PrintObject, regions: &[PrintRegion]) -> Self {
        let mut ordering = Self::new(config);
        let heights = object
            .layers
            .iter()
            .map(|l| l.print_z)
            .chain(object.support_layers.iter().map(|l| l.print_z))
            .collect();
        ordering.initialize_layers(heights);
        ordering.collect_extruders(object, regions);
        ordering.handle_dontcare_extruders(None);
        ordering.fill_wipe_tower_partitions();
        ordering
    }

    /// Initialize layers from a list of Z heights
    pub fn initialize_layers(&mut self, mut z_heights: Vec<f64>) {
        z_heights.sort_by(|a, b| a.total_cmp(b));

        // Merge numerically very close Z values
        self.layer_tools.clear();
        let mut i = 0;
        while i < z_heights.len() {
            let z_max = z_heights[i] + LAYER_HEIGHT_EPSILON;
            let mut j = i + 1;
            while j < z_heights.len() && z_heights[j] <= z_max {
                j += 1;
            }
            let avg_z = 0.5 * (z_heights[i] + z_heights[j - 1]);
            self.layer_tools.push(LayerTools::new(avg_z));
            i = j;
        }
    }

    /// Collect one-based extruders of every object and support layer.
    pub fn collect_extruders(&mut self, object: &PrintObject, regions: &[PrintRegion]) {
        for layer in &object.layers {
            for layer_region in &layer.regions {
                let Some(region) = regions.get(layer_region.region_id) else {
                    continue;
                };
                let config = &region.config;
                if !layer_region.perimeters.is_empty() {
                    self.add_extruder_to_layer(layer.print_z, config.perimeter_extruder, true);
                }
                for fill in &layer_region.fills.entities {
                    let extruder = if fill.role().is_solid_infill() {
                        config.solid_infill_extruder
                    } else {
                        config.infill_extruder
                    };
                    self.add_extruder_to_layer(layer.print_z, extruder, true);
                }
            }
        }

        for support_layer in &object.support_layers {
            let role = support_layer.support_fills.role();
            let base = object.config.support_material_extruder;
            let interface = object.config.support_material_interface_extruder;
            let has_base = role.is_support_base() || role.is_mixed();
            let has_interface = role.is_support_interface() || role.is_mixed();
            if has_base {
                self.add_support_extruder_to_layer(support_layer.print_z, base);
            }
            if has_interface {
                self.add_support_extruder_to_layer(support_layer.print_z, interface);
            }
        }
    }

    /// Add a one-based extruder requirement (0 = any) to a specific layer
    pub fn add_extruder_to_layer(&mut self, print_z: f64, extruder: u32, has_object: bool) {
        if let Some(layer) = self.layer_tools_for_layer_mut(print_z) {
            if !layer.extruders.contains(&extruder) {
                layer.extruders.push(extruder);
            }
            if has_object {
                layer.has_object = true;
            }
        }
    }

    /// Add support extruder requirement to a specific layer
    pub fn add_support_extruder_to_layer(&mut self, print_z: f64, extruder: u32) {
        if let Some(layer) = self.layer_tools_for_layer_mut(print_z) {
            if !layer.extruders.contains(&extruder) {
                layer.extruders.push(extruder);
            }
            layer.has_support = true;
        }
    }

    /// Find the layer tools for a given Z height
    pub fn layer_tools_for_layer(&self, print_z: f64) -> Option<&LayerTools> {
        self.layer_tools
            .iter()
            .find(|lt| (lt.print_z - print_z).abs() < LAYER_HEIGHT_EPSILON)
    }

    /// Find the layer tools for a given Z height (mutable)
    pub fn layer_tools_for_layer_mut(&mut self, print_z: f64) -> Option<&mut LayerTools> {
        self.layer_tools
            .iter_mut()
            .find(|lt| (lt.print_z - print_z).abs() < LAYER_HEIGHT_EPSILON)
    }

    /// Resolve "don't care" extruders (value 0) and switch to zero-based ids.
    ///
    /// A layer printing only with "any extruder" keeps the extruder the
    /// previous layer ended with. Otherwise the previous extruder, when it is
    /// needed anyway, moves to the front to save a toolchange.
    pub fn handle_dontcare_extruders(&mut self, first_extruder: Option<u32>) {
        if self.layer_tools.is_empty() {
            return;
        }

        let first_real = self
            .layer_tools
            .iter()
            .flat_map(|l| l.extruders.iter().copied())
            .find(|&e| e > 0);
        let Some(mut last_ext) = first_extruder.or(first_real) else {
            // Nothing but "don't care" anywhere: print with the first extruder.
            for layer in &mut self.layer_tools {
                layer.extruders.iter_mut().for_each(|e| *e = 0);
                layer.extruders.dedup();
            }
            self.update_first_and_last();
            return;
        };

        for (layer_idx, layer) in self.layer_tools.iter_mut().enumerate() {
            if layer.extruders.is_empty() {
                continue;
            }

            if layer.extruders.len() == 1 && layer.extruders[0] == 0 {
                layer.extruders[0] = last_ext;
            } else {
                layer.extruders.retain(|&e| e != 0);

                if let Some(pos) = layer.extruders.iter().position(|&e| e == last_ext) {
                    if pos > 0 {
                        let ext = layer.extruders.remove(pos);
                        layer.extruders.insert(0, ext);
                    }
                }

                // On first layer with wipe tower, prefer soluble extruder at the beginning
                if self.enable_wipe_tower && layer_idx == 0 {
                    let soluble = &self.filament_soluble;
                    let is_soluble =
                        |e: u32| soluble.get(e.saturating_sub(1) as usize).copied().unwrap_or(false);
                    if let Some(i) = layer.extruders.iter().position(|&e| is_soluble(e)) {
                        layer.extruders.swap(0, i);
                    }
                }
            }

            if let Some(&ext) = layer.extruders.last() {
                last_ext = ext;
            }
        }

        for layer in &mut self.layer_tools {
            for extruder in &mut layer.extruders {
                *extruder -= 1;
            }
        }
        self.update_first_and_last();
    }

    fn update_first_and_last(&mut self) {
        self.first_printing_extruder = self
            .layer_tools
            .iter()
            .find_map(|l| l.extruders.first().copied());
        self.last_printing_extruder = self
            .layer_tools
            .iter()
            .rev()
            .find_map(|l| l.extruders.last().copied());
    }

    /// Count toolchanges per layer and mark the layers that carry the wipe
    /// tower. The tower is continuous, so every layer below one that needs
    /// it gets it too.
    pub fn fill_wipe_tower_partitions(&mut self) {
        if self.layer_tools.is_empty() {
            return;
        }

        let mut last_extruder: Option<u32> = None;
        for layer in &mut self.layer_tools {
            layer.wipe_tower_partitions = layer.extruders.len();
            if !layer.extruders.is_empty() {
                if last_extruder.is_none() || last_extruder == Some(layer.extruders[0]) {
                    // First extruder matches last, no initial tool change needed
                    layer.wipe_tower_partitions = layer.wipe_tower_partitions.saturating_sub(1);
                }
                last_extruder = layer.extruders.last().copied();
            }
        }

        // Lower layers must support upper ones
        for i in (0..self.layer_tools.len().saturating_sub(1)).rev() {
            let next_partitions = self.layer_tools[i + 1].wipe_tower_partitions;
            let layer = &mut self.layer_tools[i];
            layer.wipe_tower_partitions = layer.wipe_tower_partitions.max(next_partitions);
        }

        let enabled = self.enable_wipe_tower;
        for layer in &mut self.layer_tools {
            layer.has_wipe_tower = enabled && layer.wipe_tower_partitions > 0;
        }
    }

    /// Get the first printing extruder
    pub fn first_extruder(&self) -> Option<u32> {
        self.first_printing_extruder
    }

    /// Get the last printing extruder
    pub fn last_extruder(&self) -> Option<u32> {
        self.last_printing_extruder
    }

    /// Get all layer tools
    pub fn layer_tools(&self) -> &[LayerTools] {
        &self.layer_tools
    }

    /// Get mutable reference to all layer tools
    pub fn layer_tools_mut(&mut self) -> &mut Vec<LayerTools> {
        &mut self.layer_tools
    }

    /// Check if there's a wipe tower in the print
    pub fn has_wipe_tower(&self) -> bool {
        self.first_printing_extruder.is_some()
            && self.layer_tools.first().map_or(false, |l| l.has_wipe_tower)
    }

    pub fn len(&self) -> usize {
        self.layer_tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layer_tools.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrintObjectConfig;
    use crate::extrusion::{ExtrusionEntityCollection, ExtrusionPath, ExtrusionRole};
    use crate::geometry::Point;
    use crate::print::{Layer, LayerRegion, SupportLayer};

    fn fill_collection(id: u64, role: ExtrusionRole) -> ExtrusionEntityCollection {
        ExtrusionEntityCollection::with_entities(
            id,
            vec![ExtrusionEntity::Path(ExtrusionPath::new(
                vec![Point::new(0, 0), Point::new(1_000_000, 0)],
                role,
                0.45,
                0.2,
            ))],
        )
    }

    #[test]
    fn test_wiping_extrusions() {
        let mut wiping = WipingExtrusions::new();
        assert!(!wiping.is_anything_overridden());

        wiping.set_extruder_override(1, 1, 2, 3);
        assert!(wiping.is_anything_overridden());
        assert!(wiping.is_entity_overridden(1, 1, 2));
        assert!(!wiping.is_entity_overridden(1, 1, 0));
        assert!(!wiping.is_entity_overridden(1, 2, 2));
        assert_eq!(wiping.get_extruder_override(1, 1, 2), Some(3));

        wiping.clear();
        assert!(!wiping.is_anything_overridden());
        assert_eq!(wiping.get_extruder_override(1, 1, 2), None);
    }

    #[test]
    fn test_layer_tools_extruder_for_entity() {
        let region = PrintRegionConfig::new()
            .perimeter_extruder(1)
            .infill_extruder(2)
            .solid_infill_extruder(3);
        let mut layer = LayerTools::new(0.2).with_extruders(vec![0, 1, 2]);

        let sparse = ExtrusionEntity::from(fill_collection(1, ExtrusionRole::InternalInfill));
        let solid = ExtrusionEntity::from(fill_collection(2, ExtrusionRole::TopSolidInfill));
        let support = ExtrusionEntity::from(fill_collection(3, ExtrusionRole::SupportMaterial));
        let bare_solid = ExtrusionEntity::Path(ExtrusionPath::new(
            vec![Point::new(0, 0), Point::new(1_000_000, 0)],
            ExtrusionRole::SolidInfill,
            0.45,
            0.2,
        ));
        assert_eq!(layer.extruder(&bare_solid, &region), 2);
        assert_eq!(layer.extruder(&sparse, &region), 1);
        assert_eq!(layer.extruder(&solid, &region), 2);
        assert_eq!(layer.extruder(&support, &region), 0);

        layer.extruder_override = 3;
        assert_eq!(layer.extruder(&sparse, &region), 2);
        assert!(layer.has_extruder(2));
        assert!(!layer.has_extruder(3));
    }

    #[test]
    fn test_tool_ordering_initialize_layers() {
        let mut ordering = ToolOrdering::new(&PrintConfig::default());

        ordering.initialize_layers(vec![0.2, 0.4, 0.6, 0.4, 0.2]); // With duplicates
        assert_eq!(ordering.len(), 3);
        assert!((ordering.layer_tools()[0].print_z - 0.2).abs() < 0.001);
        assert!((ordering.layer_tools()[1].print_z - 0.4).abs() < 0.001);
        assert!((ordering.layer_tools()[2].print_z - 0.6).abs() < 0.001);
        assert!(ordering.layer_tools_for_layer(0.4).is_some());
        assert!(ordering.layer_tools_for_layer(0.5).is_none());
    }

    #[test]
    fn test_handle_dontcare_extruders() {
        let mut ordering = ToolOrdering::new(&PrintConfig::default());

        ordering.initialize_layers(vec![0.2, 0.4, 0.6]);
        ordering.layer_tools_mut()[0].extruders = vec![0, 1]; // Don't care (0) and extruder 1
        ordering.layer_tools_mut()[1].extruders = vec![2];
        ordering.layer_tools_mut()[2].extruders = vec![0]; // Don't care

        ordering.handle_dontcare_extruders(Some(1));

        // Zero-based from here on
        assert_eq!(ordering.layer_tools()[0].extruders, vec![0]);
        assert_eq!(ordering.layer_tools()[1].extruders, vec![1]);
        // Third layer keeps the extruder the second one ended with
        assert_eq!(ordering.layer_tools()[2].extruders, vec![1]);
        assert_eq!(ordering.first_extruder(), Some(0));
        assert_eq!(ordering.last_extruder(), Some(1));
    }

    #[test]
    fn test_handle_dontcare_moves_previous_extruder_first() {
        let mut ordering = ToolOrdering::new(&PrintConfig::default());
        ordering.initialize_layers(vec![0.2, 0.4]);
        ordering.layer_tools_mut()[0].extruders = vec![1, 2];
        ordering.layer_tools_mut()[1].extruders = vec![1, 2];

        ordering.handle_dontcare_extruders(None);

        assert_eq!(ordering.layer_tools()[0].extruders, vec![0, 1]);
        assert_eq!(ordering.layer_tools()[1].extruders, vec![1, 0]);
    }

    #[test]
    fn test_fill_wipe_tower_partitions() {
        let mut ordering = ToolOrdering::new(&PrintConfig::new().wipe_tower(true));
        ordering.initialize_layers(vec![0.2, 0.4, 0.6]);
        ordering.layer_tools_mut()[0].extruders = vec![0];
        ordering.layer_tools_mut()[1].extruders = vec![0, 1];
        ordering.layer_tools_mut()[2].extruders = vec![1];

        ordering.fill_wipe_tower_partitions();

        let partitions: Vec<_> = ordering
            .layer_tools()
            .iter()
            .map(|l| l.wipe_tower_partitions)
            .collect();
        assert_eq!(partitions, vec![1, 1, 0]);
        assert!(ordering.layer_tools()[0].has_wipe_tower);
        assert!(!ordering.layer_tools()[2].has_wipe_tower);
    }

    #[test]
    fn test_for_object_collects_region_and_support_extruders() {
        let regions = vec![PrintRegion::new(
            PrintRegionConfig::new().perimeter_extruder(1).infill_extruder(2),
        )];
        let mut object = PrintObject::new(1);
        object.config = PrintObjectConfig::new().support_extruders(0, 3);

        let mut layer = Layer::new(0, 0.2);
        let mut region = LayerRegion::new(0);
        region
            .perimeters
            .entities
            .push(fill_collection(10, ExtrusionRole::ExternalPerimeter).into());
        region
            .fills
            .entities
            .push(fill_collection(11, ExtrusionRole::InternalInfill).into());
        layer.regions.push(region);
        object.layers.push(layer);
        object.support_layers.push(SupportLayer::new(
            0,
            0.4,
            ExtrusionEntityCollection::with_entities(
                12,
                vec![
                    fill_collection(13, ExtrusionRole::SupportMaterial).into(),
                    fill_collection(14, ExtrusionRole::SupportMaterialInterface).into(),
                ],
            ),
        ));

        let ordering = ToolOrdering::for_object(&PrintConfig::default(), &object, &regions);

        assert_eq!(ordering.len(), 2);
        assert_eq!(ordering.layer_tools()[0].extruders, vec![0, 1]);
        assert!(ordering.layer_tools()[0].has_object);
        // The "any" base extruder gives way to the interface extruder.
        assert_eq!(ordering.layer_tools()[1].extruders, vec![2]);
        assert!(ordering.layer_tools()[1].has_support);
        assert!(!ordering.has_wipe_tower());
    }
}
