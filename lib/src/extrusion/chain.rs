//! Greedy nearest-endpoint chaining of extrusions.

use super::ExtrusionEntity;
use crate::geometry::Point;

/// An entity to print, possibly back to front.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtrusionEntityReference<'a> {
    pub entity: &'a ExtrusionEntity,
    pub flipped: bool,
}

impl<'a> ExtrusionEntityReference<'a> {
    pub fn new(entity: &'a ExtrusionEntity, flipped: bool) -> Self {
        Self { entity, flipped }
    }

    /// Where the nozzle starts printing this reference.
    pub fn first_point(&self) -> Option<Point> {
        if self.flipped {
            self.entity.last_point()
        } else {
            self.entity.first_point()
        }
    }

    /// Where the nozzle ends up after printing this reference.
    pub fn last_point(&self) -> Option<Point> {
        if self.flipped {
            self.entity.first_point()
        } else {
            self.entity.last_point()
        }
    }
}

/// Order `entities` as a greedy tour.
///
/// Starting from `start` (or, without one, from the first entity as stored),
/// repeatedly pick the remaining entity whose start point, or end point when
/// it can be reversed, is closest to the current position. Ties go to the
/// lowest index, and to the start point over the end point, so the result only
/// depends on the input order and `start`.
pub fn chain_extrusion_references<'a>(
    entities: &[&'a ExtrusionEntity],
    start: Option<Point>,
) -> Vec<ExtrusionEntityReference<'a>> {
    let mut result = Vec::with_capacity(entities.len());
    let mut remaining: Vec<usize> = (0..entities.len()).collect();

    let mut current = match start {
        Some(point) => Some(point),
        None => {
            if remaining.is_empty() {
                return result;
            }
            let first = ExtrusionEntityReference::new(entities[remaining.remove(0)], false);
            result.push(first);
            first.last_point()
        }
    };

    while !remaining.is_empty() {
        let mut best: Option<(usize, bool, i128)> = None;
        for (slot, &index) in remaining.iter().enumerate() {
            let entity = entities[index];
            let mut candidates = vec![(false, entity.first_point())];
            if entity.can_reverse() {
                candidates.push((true, entity.last_point()));
            }
            for (flipped, point) in candidates {
                let distance = match (current, point) {
                    (Some(from), Some(to)) => from.distance_squared(&to),
                    _ => i128::MAX,
                };
                if best.map_or(true, |(_, _, d)| distance < d) {
                    best = Some((slot, flipped, distance));
                }
            }
        }
        let Some((slot, flipped, _)) = best else {
            break;
        };
        let reference = ExtrusionEntityReference::new(entities[remaining.remove(slot)], flipped);
        if let Some(end) = reference.last_point() {
            current = Some(end);
        }
        result.push(reference);
    }

    result
}
