//! Print-wide and per-object configuration.

use serde::{Deserialize, Serialize};

/// Global settings that affect the whole print.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Print infill before perimeters within each island.
    pub infill_first: bool,
    /// Per-filament solubility flags, indexed by zero-based extruder id.
    pub filament_soluble: Vec<bool>,
    /// Enable the wipe (prime) tower.
    pub wipe_tower: bool,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            infill_first: false,
            filament_soluble: vec![false],
            wipe_tower: false,
        }
    }
}

impl PrintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set infill ordering.
    pub fn infill_first(mut self, infill_first: bool) -> Self {
        self.infill_first = infill_first;
        self
    }

    /// Builder method: set filament solubility flags.
    pub fn filament_soluble(mut self, soluble: Vec<bool>) -> Self {
        self.filament_soluble = soluble;
        self
    }

    /// Builder method: enable the wipe tower.
    pub fn wipe_tower(mut self, enabled: bool) -> Self {
        self.wipe_tower = enabled;
        self
    }

    /// Check if a zero-based extruder prints soluble material.
    pub fn is_filament_soluble(&self, extruder_id: u32) -> bool {
        self.filament_soluble
            .get(extruder_id as usize)
            .copied()
            .unwrap_or(false)
    }
}

/// Settings of a single print object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintObjectConfig {
    /// Support base extruder, 1-based; 0 picks a non-soluble extruder automatically.
    pub support_material_extruder: u32,
    /// Support interface extruder, 1-based; 0 picks automatically.
    pub support_material_interface_extruder: u32,
}

impl Default for PrintObjectConfig {
    fn default() -> Self {
        Self {
            support_material_extruder: 1,
            support_material_interface_extruder: 1,
        }
    }
}

impl PrintObjectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set support extruders (1-based, 0 = auto).
    pub fn support_extruders(mut self, base: u32, interface: u32) -> Self {
        self.support_material_extruder = base;
        self.support_material_interface_extruder = interface;
        self
    }
}
