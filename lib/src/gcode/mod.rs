//! Layer-to-G-code preparation: seams, tool ordering, the wipe tower and the
//! per-layer extrusion order.

pub mod extrusion_order;
pub mod seams;
pub mod tool_ordering;
pub mod wipe_tower;
