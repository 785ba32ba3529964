//! Print region configuration.

use crate::CoordF;
use serde::{Deserialize, Serialize};

/// Configuration for a specific print region.
///
/// A region is a part of an object printed with its own settings; here only
/// the extruder assignment and the external perimeter width matter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintRegionConfig {
    /// Extruder for perimeters (1-based).
    pub perimeter_extruder: u32,
    /// Extruder for sparse infill (1-based).
    pub infill_extruder: u32,
    /// Extruder for solid infill (1-based).
    pub solid_infill_extruder: u32,
    /// External perimeter extrusion width (mm).
    pub external_perimeter_extrusion_width: CoordF,
}

impl Default for PrintRegionConfig {
    fn default() -> Self {
        Self {
            perimeter_extruder: 1,
            infill_extruder: 1,
            solid_infill_extruder: 1,
            external_perimeter_extrusion_width: 0.45,
        }
    }
}

impl PrintRegionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: use the same extruder for every role.
    pub fn extruder(mut self, extruder: u32) -> Self {
        self.perimeter_extruder = extruder;
        self.infill_extruder = extruder;
        self.solid_infill_extruder = extruder;
        self
    }

    /// Builder method: set perimeter extruder.
    pub fn perimeter_extruder(mut self, extruder: u32) -> Self {
        self.perimeter_extruder = extruder;
        self
    }

    /// Builder method: set sparse infill extruder.
    pub fn infill_extruder(mut self, extruder: u32) -> Self {
        self.infill_extruder = extruder;
        self
    }

    /// Builder method: set solid infill extruder.
    pub fn solid_infill_extruder(mut self, extruder: u32) -> Self {
        self.solid_infill_extruder = extruder;
        self
    }
}
