//! Seam placer configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Seam position preference mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeamPosition {
    /// Align seams vertically across layers.
    #[default]
    Aligned,
    /// Place seam nearest to a reference position, preferring corners.
    Nearest,
    /// Scatter seams (deterministically, seeded by geometry).
    Random,
    /// Place seam at the rear of the object (highest Y).
    Rear,
}

/// Tunables of the seam placer. Lengths are in mm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeamConfig {
    /// Seam position preference mode.
    pub seam_position: SeamPosition,

    /// Fraction of the shell bounding box height, measured from the top, in
    /// which a straight-line rear projection is accepted.
    pub rear_project_threshold: f64,

    /// Maximum bounding box distance for chaining perimeters into one shell.
    /// Also bounds how far an extrusion may be from the island boundary it
    /// is projected onto.
    pub max_shell_distance: f64,

    /// Distance outside the previous layer's outline beyond which a point
    /// counts as overhanging.
    pub overhang_threshold: f64,

    /// Distance inside the layer outline beyond which a point counts as
    /// embedded (e.g. where two regions touch).
    pub embedding_threshold: f64,

    /// Minimum arm length for corner angle measurement.
    pub min_arm_length: f64,

    /// Turning angle (degrees) above which a point is a convex corner.
    pub convex_threshold: f64,

    /// Turning angle (degrees) above which a point is a concave corner.
    pub concave_threshold: f64,

    /// How far a corner may be from the nearest point before the nearest
    /// strategy stops preferring it.
    pub max_nearest_detour: f64,

    /// Perimeters are resampled so that no edge exceeds this length.
    pub max_edge_length: f64,
}

impl Default for SeamConfig {
    fn default() -> Self {
        Self {
            seam_position: SeamPosition::Aligned,
            rear_project_threshold: 0.05,
            max_shell_distance: 5.0,
            overhang_threshold: 0.55,
            embedding_threshold: 0.5,
            min_arm_length: 0.5,
            convex_threshold: 10.0,
            concave_threshold: 10.0,
            max_nearest_detour: 1.0,
            max_edge_length: 0.5,
        }
    }
}

impl SeamConfig {
    /// Configuration for nearest seam mode.
    pub fn nearest() -> Self {
        Self {
            seam_position: SeamPosition::Nearest,
            ..Default::default()
        }
    }

    /// Configuration for aligned seam mode.
    pub fn aligned() -> Self {
        Self {
            seam_position: SeamPosition::Aligned,
            ..Default::default()
        }
    }

    /// Configuration for random seam mode.
    pub fn random() -> Self {
        Self {
            seam_position: SeamPosition::Random,
            ..Default::default()
        }
    }

    /// Configuration for rear seam mode.
    pub fn rear() -> Self {
        Self {
            seam_position: SeamPosition::Rear,
            ..Default::default()
        }
    }

    /// Reject values the placer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.rear_project_threshold) {
            return Err(Error::InvalidConfig(format!(
                "rear_project_threshold must be within [0, 1], got {}",
                self.rear_project_threshold
            )));
        }
        let distances = [
            ("max_shell_distance", self.max_shell_distance),
            ("overhang_threshold", self.overhang_threshold),
            ("embedding_threshold", self.embedding_threshold),
            ("min_arm_length", self.min_arm_length),
            ("max_edge_length", self.max_edge_length),
            ("max_nearest_detour", self.max_nearest_detour),
        ];
        for (name, value) in distances {
            if !(value > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}
