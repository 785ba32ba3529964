//! Extrusion roles.

use serde::{Deserialize, Serialize};

/// What an extrusion is for. Drives extruder assignment and filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtrusionRole {
    #[default]
    None,
    /// Internal perimeter.
    Perimeter,
    /// External (outer) perimeter.
    ExternalPerimeter,
    /// Perimeter printed over air.
    OverhangPerimeter,
    /// Sparse infill.
    InternalInfill,
    /// Solid infill.
    SolidInfill,
    /// Top solid infill (visible surface).
    TopSolidInfill,
    /// Bridge infill (over gaps).
    BridgeInfill,
    /// Gap fill (thin areas).
    GapFill,
    /// Ironing pass over top surfaces.
    Ironing,
    /// Skirt loops.
    Skirt,
    /// Brim loops.
    Brim,
    /// Support material base.
    SupportMaterial,
    /// Support interface.
    SupportMaterialInterface,
    /// Wipe tower extrusions.
    WipeTower,
    /// A collection holding entities of different roles.
    Mixed,
}

impl ExtrusionRole {
    pub fn is_perimeter(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::Perimeter
                | ExtrusionRole::ExternalPerimeter
                | ExtrusionRole::OverhangPerimeter
        )
    }

    pub fn is_external_perimeter(&self) -> bool {
        matches!(self, ExtrusionRole::ExternalPerimeter)
    }

    /// Any infill, including gap fill and ironing.
    pub fn is_infill(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::InternalInfill
                | ExtrusionRole::SolidInfill
                | ExtrusionRole::TopSolidInfill
                | ExtrusionRole::BridgeInfill
                | ExtrusionRole::GapFill
                | ExtrusionRole::Ironing
        )
    }

    pub fn is_solid_infill(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::SolidInfill
                | ExtrusionRole::TopSolidInfill
                | ExtrusionRole::BridgeInfill
                | ExtrusionRole::GapFill
                | ExtrusionRole::Ironing
        )
    }

    pub fn is_support(&self) -> bool {
        self.is_support_base() || self.is_support_interface()
    }

    pub fn is_support_base(&self) -> bool {
        matches!(self, ExtrusionRole::SupportMaterial)
    }

    pub fn is_support_interface(&self) -> bool {
        matches!(self, ExtrusionRole::SupportMaterialInterface)
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, ExtrusionRole::Mixed)
    }

    /// Role of a group made of `self` and `other`.
    pub fn combine(self, other: ExtrusionRole) -> ExtrusionRole {
        match (self, other) {
            (ExtrusionRole::None, role) | (role, ExtrusionRole::None) => role,
            (a, b) if a == b => a,
            _ => ExtrusionRole::Mixed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_predicates() {
        assert!(ExtrusionRole::ExternalPerimeter.is_perimeter());
        assert!(ExtrusionRole::ExternalPerimeter.is_external_perimeter());
        assert!(!ExtrusionRole::Perimeter.is_external_perimeter());
        assert!(ExtrusionRole::InternalInfill.is_infill());
        assert!(!ExtrusionRole::InternalInfill.is_solid_infill());
        assert!(ExtrusionRole::TopSolidInfill.is_solid_infill());
        assert!(ExtrusionRole::SupportMaterial.is_support_base());
        assert!(ExtrusionRole::SupportMaterialInterface.is_support());
        assert!(!ExtrusionRole::Skirt.is_support());
    }

    #[test]
    fn test_combine() {
        use ExtrusionRole::*;
        assert_eq!(None.combine(Perimeter), Perimeter);
        assert_eq!(Perimeter.combine(Perimeter), Perimeter);
        assert_eq!(SupportMaterial.combine(SupportMaterialInterface), Mixed);
    }
}
