//! Print model consumed by the seam and ordering passes.
//!
//! - [`Print`] - the whole job: regions, objects, skirt and brim
//! - [`PrintObject`] - one object with its layers and placed instances
//! - [`Layer`] / [`SupportLayer`] - per-layer extrusions

mod layer;

pub use layer::{
    Layer, LayerExtrusionRange, LayerIsland, LayerRegion, LayerSlice, SupportLayer,
};

use crate::config::{PrintConfig, PrintObjectConfig, PrintRegionConfig};
use crate::extrusion::ExtrusionEntityCollection;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Settings shared by every part of the print assigned to one region.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintRegion {
    pub config: PrintRegionConfig,
}

impl PrintRegion {
    pub fn new(config: PrintRegionConfig) -> Self {
        Self { config }
    }
}

/// A placed copy of an object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintInstance {
    /// Offset of this copy from the object's own coordinates.
    pub shift: Point,
}

/// A single object to be printed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintObject {
    /// Object identity, used to key per-instance extruder overrides.
    pub id: u64,
    pub config: PrintObjectConfig,
    pub instances: Vec<PrintInstance>,
    pub layers: Vec<Layer>,
    pub support_layers: Vec<SupportLayer>,
}

impl PrintObject {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            instances: vec![PrintInstance::default()],
            ..Default::default()
        }
    }

    /// Builder method: place copies at the given shifts.
    pub fn with_instances(mut self, shifts: &[Point]) -> Self {
        self.instances = shifts.iter().map(|&shift| PrintInstance { shift }).collect();
        self
    }

    /// Instance shift, or zero for an unknown instance.
    pub fn instance_shift(&self, instance_id: usize) -> Point {
        self.instances
            .get(instance_id)
            .map_or(Point::default(), |i| i.shift)
    }
}

/// An entire print job.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Print {
    pub config: PrintConfig,
    pub regions: Vec<PrintRegion>,
    pub objects: Vec<PrintObject>,
    pub skirt: ExtrusionEntityCollection,
    pub brim: ExtrusionEntityCollection,
}

impl Print {
    pub fn new(config: PrintConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn get_region(&self, index: usize) -> Option<&PrintRegion> {
        self.regions.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_object_instances() {
        let object = PrintObject::new(3);
        assert_eq!(object.instances.len(), 1);
        assert_eq!(object.instance_shift(0), Point::new(0, 0));

        let object = object.with_instances(&[Point::new(10, 0), Point::new(0, 20)]);
        assert_eq!(object.instance_shift(1), Point::new(0, 20));
        assert_eq!(object.instance_shift(9), Point::new(0, 0));
    }
}
