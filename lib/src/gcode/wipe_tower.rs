//! Wipe tower bookkeeping for extrusion ordering.
//!
//! The wipe tower is a sacrificial structure printed next to the objects. On
//! every layer where it is active, each toolchange (and the final "finish
//! layer" pass) is one block of tower printing. The ordering pass only needs
//! to know where those blocks start and end, so this module keeps a planned
//! list of [`ToolChangeResult`]s per layer and maps tower-local coordinates
//! onto the bed.

use log::trace;

use super::tool_ordering::ToolOrdering;
use crate::geometry::{Point, PointF};

// ============================================================================
// Core Data Structures
// ============================================================================

/// 2D vector for wipe tower coordinates (mm, tower-local)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Vec2f {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn rotate(&self, angle: f32) -> Self {
        let cos_a = angle.cos();
        let sin_a = angle.sin();
        Self::new(
            self.x * cos_a - self.y * sin_a,
            self.x * sin_a + self.y * cos_a,
        )
    }
}

impl std::ops::Add for Vec2f {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl From<Vec2f> for PointF {
    fn from(v: Vec2f) -> Self {
        PointF::new(v.x as f64, v.y as f64)
    }
}

/// One block of wipe tower printing.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolChangeResult {
    /// Print height of this tool change
    pub print_z: f32,
    /// Where the nozzle enters the tower
    pub start_pos: Vec2f,
    /// Where the nozzle leaves the tower
    pub end_pos: Vec2f,
    /// Tool loaded before the block, None before the first toolchange
    pub initial_tool: Option<u32>,
    /// Tool loaded after the block
    pub new_tool: u32,
}

impl ToolChangeResult {
    /// Whether the block actually swaps filament (a finish-layer pass doesn't).
    pub fn is_tool_change(&self) -> bool {
        self.initial_tool != Some(self.new_tool)
    }
}

/// A toolchange through the tower is needed before printing with
/// `extruder_id`. The first layer always primes through the tower with its
/// last extruder.
pub fn is_toolchange_required(
    first_layer: bool,
    last_extruder_id: u32,
    extruder_id: u32,
    current_extruder_id: Option<u32>,
) -> bool {
    (first_layer && extruder_id == last_extruder_id) || current_extruder_id != Some(extruder_id)
}

// ============================================================================
// Integration
// ============================================================================

/// Places planned tower blocks on the bed and hands them out per layer.
#[derive(Debug, Clone, Default)]
pub struct WipeTowerIntegration {
    /// Tower origin on the bed (mm)
    position: Vec2f,
    /// Tower rotation (degrees)
    rotation: f32,
    /// Planned blocks, one list per layer that carries the tower
    tool_changes: Vec<Vec<ToolChangeResult>>,
    layer_idx: usize,
}

impl WipeTowerIntegration {
    pub fn new(position: Vec2f, rotation: f32, tool_changes: Vec<Vec<ToolChangeResult>>) -> Self {
        Self {
            position,
            rotation,
            tool_changes,
            layer_idx: 0,
        }
    }

    /// Plan a rectangular tower of `width` x `depth` mm for `ordering`.
    ///
    /// Every layer with a tower gets one block per toolchange, the last one
    /// doubling as the finish-layer pass. Blocks are stacked along the tower
    /// depth and each runs from its left edge to its right edge.
    pub fn plan(ordering: &ToolOrdering, position: Vec2f, rotation: f32, width: f32, depth: f32) -> Self {
        let mut tool_changes = Vec::new();
        let mut current: Option<u32> = None;
        for (layer_idx, layer) in ordering.layer_tools().iter().enumerate() {
            if !layer.has_wipe_tower {
                if let Some(&last) = layer.extruders.last() {
                    current = Some(last);
                }
                continue;
            }
            let Some(&last) = layer.extruders.last() else {
                tool_changes.push(Vec::new());
                continue;
            };

            let mut blocks = Vec::new();
            for &extruder in &layer.extruders {
                if extruder == last || is_toolchange_required(layer_idx == 0, last, extruder, current) {
                    blocks.push((current, extruder));
                    current = Some(extruder);
                }
            }

            let band = depth / blocks.len().max(1) as f32;
            let layer_changes = blocks
                .into_iter()
                .enumerate()
                .map(|(i, (initial_tool, new_tool))| ToolChangeResult {
                    print_z: layer.print_z as f32,
                    start_pos: Vec2f::new(0.0, band * i as f32),
                    end_pos: Vec2f::new(width, band * (i + 1) as f32),
                    initial_tool,
                    new_tool,
                })
                .collect::<Vec<_>>();
            trace!(
                "wipe tower layer {layer_idx}: {} block(s)",
                layer_changes.len()
            );
            tool_changes.push(layer_changes);
        }
        Self::new(position, rotation, tool_changes)
    }

    /// Block `toolchange_number` of the current layer.
    pub fn get_toolchange(&self, toolchange_number: usize) -> Option<&ToolChangeResult> {
        self.tool_changes
            .get(self.layer_idx)
            .and_then(|layer| layer.get(toolchange_number))
    }

    /// Move on to the next layer that carries the tower.
    pub fn next_layer(&mut self) {
        self.layer_idx += 1;
    }

    /// Map a tower-local point onto the bed.
    pub fn transform_wt_pt(&self, pt: Vec2f) -> Point {
        let on_bed = pt.rotate(self.rotation.to_radians()) + self.position;
        PointF::from(on_bed).to_scaled()
    }
}

// ============================================================================
// Tests
// ============================================================================
