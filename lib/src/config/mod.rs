//! Configuration module.
//!
//! Global print flags, per-object and per-region extruder assignment, and the
//! tunables of the seam placer. Every struct is serde-(de)serializable with
//! `#[serde(default)]`, so partial profiles fill in production defaults.

mod print_config;
mod region_config;
mod seam_config;

pub use print_config::{PrintConfig, PrintObjectConfig};
pub use region_config::PrintRegionConfig;
pub use seam_config::{SeamConfig, SeamPosition};
