//! # Slicer Seams
//!
//! Seam placement and extrusion ordering for a layer-based slicer.
//!
//! The library sits between the slicing stage (which produces per-layer
//! islands, perimeters and fills) and the G-code emitter. It provides:
//! - Shell building: chaining external perimeters across layers
//! - Seam choice: picking the start point of every perimeter loop
//! - Extrusion ordering: turning one layer into an ordered, per-extruder plan
//!
//! ## Example
//!
//! ```rust,ignore
//! use slicer_seams::gcode::seams::{NoPainting, Placer};
//! use slicer_seams::gcode::extrusion_order::{get_extrusions, get_first_point};
//!
//! let mut placer = Placer::init(&print, &config.seam, &NoPainting)?;
//! let plan = get_extrusions(&print, Some(&wipe_tower), &layers, first, &tools,
//!     &instances, &skirt, current_extruder, &mut placer, &mut get_brim, &mut position);
//! let start = get_first_point(&plan);
//! ```

pub mod clipper;
pub mod config;
pub mod edge_grid;
pub mod extrusion;
pub mod gcode;
pub mod geometry;
pub mod print;

pub use config::{PrintConfig, PrintObjectConfig, PrintRegionConfig, SeamConfig, SeamPosition};
pub use extrusion::{
    ExtrusionEntity, ExtrusionEntityCollection, ExtrusionEntityReference, ExtrusionLoop,
    ExtrusionMultiPath, ExtrusionPath, ExtrusionRole,
};
pub use geometry::{BoundingBox, BoundingBoxF, ExPolygon, Line, Point, PointF, Polygon};
pub use print::{Layer, Print, PrintObject, PrintRegion, SupportLayer};

// Re-export the seam pipeline
pub use gcode::seams::{
    choose_seam_point, create_shells, get_object_seams, get_shell_seam, maybe_choose_seam_point,
    maybe_get_shell_seam, Perimeter, PlaceSeam, Placer, PointClassification, PointType,
    SeamChoice, SeamPerimeterChoice, Shell, Shells, Slice,
};

// Re-export extrusion ordering
pub use gcode::extrusion_order::{
    get_extrusions, get_first_point, ExtruderExtrusions, InfillRange, InstanceToPrint,
    IslandExtrusions, NormalExtrusions, ObjectLayerToPrint, OverriddenExtrusions,
    PerimeterExtrusion, SliceExtrusions, SupportExtrusion,
};
pub use gcode::tool_ordering::{LayerTools, ToolOrdering, WipingExtrusions};

/// Coordinate type for scaled integer coordinates.
pub type Coord = i64;

/// Floating-point coordinate type for unscaled values.
pub type CoordF = f64;

/// Scaling factor: coordinates are stored as integers scaled by this factor.
/// 1 unit = 1 nanometer, so 1mm = 1_000_000 units.
pub const SCALING_FACTOR: f64 = 1_000_000.0;

/// Scale a floating-point coordinate to integer.
#[inline]
pub fn scale(v: CoordF) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Unscale an integer coordinate to floating-point.
#[inline]
pub fn unscale(v: Coord) -> CoordF {
    v as CoordF / SCALING_FACTOR
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for seam and ordering operations.
///
/// Most situations this crate meets are recovered locally (missing matches,
/// pruned extruders, broken shell chains). Only data-model violations and
/// invalid configuration surface here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected extrusion entity on layer {layer}: {role:?} is not a loop")]
    UnexpectedExtrusionEntity { layer: usize, role: ExtrusionRole },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
