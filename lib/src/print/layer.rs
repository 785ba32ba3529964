//! Layer data structures.
//!
//! A [`Layer`] is one horizontal slice of an object after perimeter and infill
//! generation. Its extrusions live in per-region collections; islands refer to
//! them through index ranges, so the same storage can be walked per island
//! without copying.

use crate::extrusion::{ExtrusionEntity, ExtrusionEntityCollection};
use crate::geometry::ExPolygon;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A run of entities in one region's perimeter or fill collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerExtrusionRange {
    /// Index into [`Layer::regions`].
    pub region: usize,
    /// Indices into the region's collection.
    pub range: Range<usize>,
}

impl LayerExtrusionRange {
    pub fn new(region: usize, range: Range<usize>) -> Self {
        Self { region, range }
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn indices(&self) -> Range<usize> {
        self.range.clone()
    }
}

/// A connected printable region inside one layer slice.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerIsland {
    /// Outline of the island as sliced from the mesh.
    pub boundary: ExPolygon,
    /// Perimeter collections of the island, all from one region.
    pub perimeters: LayerExtrusionRange,
    /// Fill collections, possibly from several regions.
    pub fills: Vec<LayerExtrusionRange>,
}

/// A connected part of the layer outline and the islands inside it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerSlice {
    pub islands: Vec<LayerIsland>,
}

/// Extrusions of one print region on one layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerRegion {
    /// Index into [`crate::print::Print::regions`].
    pub region_id: usize,
    /// Usually one collection per perimeter group; bare loops are allowed.
    pub perimeters: ExtrusionEntityCollection,
    /// Usually one collection per fill surface; bare paths are allowed.
    pub fills: ExtrusionEntityCollection,
}

impl LayerRegion {
    pub fn new(region_id: usize) -> Self {
        Self {
            region_id,
            ..Default::default()
        }
    }

    /// Fill collection `index`, if it is a collection.
    pub fn fill_collection(&self, index: usize) -> Option<&ExtrusionEntityCollection> {
        self.fills
            .entities
            .get(index)
            .and_then(ExtrusionEntity::as_collection)
    }
}

/// One object layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Position of the layer in [`crate::print::PrintObject::layers`].
    pub id: usize,
    /// Top of the layer (mm).
    pub print_z: f64,
    pub regions: Vec<LayerRegion>,
    /// Layer outline, one entry per slice.
    pub lslices: Vec<ExPolygon>,
    /// Islands of each slice, parallel to `lslices`.
    pub lslices_ex: Vec<LayerSlice>,
    /// Order in which the slices are printed.
    pub lslice_indices_sorted_by_print_order: Vec<usize>,
}

impl Layer {
    pub fn new(id: usize, print_z: f64) -> Self {
        Self {
            id,
            print_z,
            ..Default::default()
        }
    }

    pub fn get_region(&self, index: usize) -> Option<&LayerRegion> {
        self.regions.get(index)
    }

    /// Add a slice with its outline and islands; it is printed after the
    /// slices already present.
    pub fn push_slice(&mut self, outline: ExPolygon, slice: LayerSlice) {
        self.lslice_indices_sorted_by_print_order
            .push(self.lslices.len());
        self.lslices.push(outline);
        self.lslices_ex.push(slice);
    }
}

/// Support material printed on one layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportLayer {
    pub id: usize,
    pub print_z: f64,
    pub support_fills: ExtrusionEntityCollection,
}

impl SupportLayer {
    pub fn new(id: usize, print_z: f64, support_fills: ExtrusionEntityCollection) -> Self {
        Self {
            id,
            print_z,
            support_fills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrusion::{ExtrusionPath, ExtrusionRole};
    use crate::geometry::{Point, Polygon};

    #[test]
    fn test_push_slice_keeps_print_order() {
        let mut layer = Layer::new(0, 0.2);
        let square = Polygon::rectangle(Point::new(0, 0), Point::new(10, 10));
        layer.push_slice(ExPolygon::new(square.clone()), LayerSlice::default());
        layer.push_slice(ExPolygon::new(square), LayerSlice::default());
        assert_eq!(layer.lslice_indices_sorted_by_print_order, vec![0, 1]);
        assert_eq!(layer.lslices.len(), layer.lslices_ex.len());
    }

    #[test]
    fn test_region_collection_lookup() {
        let mut region = LayerRegion::new(0);
        region.fills.entities.push(ExtrusionEntity::Path(ExtrusionPath::new(
            vec![Point::new(0, 0), Point::new(1, 0)],
            ExtrusionRole::InternalInfill,
            0.45,
            0.2,
        )));
        region
            .fills
            .entities
            .push(ExtrusionEntityCollection::new(4).into());
        assert!(region.fill_collection(0).is_none());
        assert_eq!(region.fill_collection(1).map(|c| c.id), Some(4));
        assert!(region.fill_collection(2).is_none());
    }
}
