//! Extrusion data model.
//!
//! - [`ExtrusionRole`] - what an extrusion is for
//! - [`ExtrusionEntity`] - path, multi-path, loop or collection
//! - [`ExtrusionEntityReference`] - an entity plus print direction
//! - [`chain_extrusion_references`] - greedy travel-minimizing order

mod chain;
mod entity;
mod role;

pub use chain::{chain_extrusion_references, ExtrusionEntityReference};
pub use entity::{
    ExtrusionEntity, ExtrusionEntityCollection, ExtrusionLoop, ExtrusionMultiPath, ExtrusionPath,
};
pub use role::ExtrusionRole;
