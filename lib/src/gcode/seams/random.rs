//! Scattered seams.
//!
//! Points are drawn from a small linear congruential generator seeded by
//! the layer and the perimeter size, so the same model always slices to the
//! same G-code.

use super::choice::{choose_seam_point, get_shell_seam, pick_matching_point, SeamChoice, SeamPerimeterChoice};
use super::perimeters::{Perimeter, PointClassification, PointType};
use super::shells::{Shell, Shells};

const MULTIPLIER: u64 = 6364136223846793005;
const INCREMENT: u64 = 1442695040888963407;

#[derive(Clone, Copy, Debug)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        let mut lcg = Self { state: seed };
        lcg.next_u64();
        lcg
    }

    /// Generator for one perimeter.
    pub fn for_perimeter(perimeter: &Perimeter) -> Self {
        Self::new(((perimeter.layer_index as u64) << 32) ^ perimeter.len() as u64)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        self.state
    }

    /// Index in `0..count`; `count` must be positive.
    pub fn next_index(&mut self, count: usize) -> usize {
        ((self.next_u64() >> 33) % count as u64) as usize
    }
}

/// A pseudo-random matching point.
pub fn random_point(
    perimeter: &Perimeter,
    point_type: PointType,
    classification: PointClassification,
) -> Option<SeamChoice> {
    pick_matching_point(perimeter, point_type, classification, |matching| {
        let mut rng = Lcg::for_perimeter(perimeter);
        matching.get(rng.next_index(matching.len())).copied()
    })
}

pub fn get_shell_seams(shell: &Shell<Perimeter>) -> Vec<SeamChoice> {
    get_shell_seam(shell, |perimeter, _| choose_seam_point(perimeter, random_point))
}

pub fn get_object_seams(shells: Shells<Perimeter>) -> Vec<Vec<SeamPerimeterChoice>> {
    super::choice::get_object_seams(shells, get_shell_seams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PointF;

    fn circle(layer_index: usize, n: usize) -> Perimeter {
        let positions = (0..n)
            .map(|i| {
                let a = i as f64 / n as f64 * std::f64::consts::TAU;
                PointF::new(10.0 * a.cos(), 10.0 * a.sin())
            })
            .collect();
        Perimeter::common(layer_index, positions)
    }

    #[test]
    fn test_random_point_is_deterministic() {
        let perimeter = circle(4, 64);
        let a = random_point(&perimeter, PointType::Common, PointClassification::Common).unwrap();
        let b = random_point(&perimeter, PointType::Common, PointClassification::Common).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_point_respects_tags() {
        let mut types = vec![PointType::Blocker; 32];
        types[7] = PointType::Common;
        let perimeter = circle(0, 32).with_point_types(types);
        let choice = random_point(&perimeter, PointType::Common, PointClassification::Common).unwrap();
        assert_eq!(choice.previous_index, 7);
    }

    #[test]
    fn test_random_scatters_across_layers() {
        let picks: Vec<usize> = (0..16)
            .map(|layer| {
                random_point(&circle(layer, 64), PointType::Common, PointClassification::Common)
                    .unwrap()
                    .previous_index
            })
            .collect();
        let mut distinct = picks.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert!(distinct.len() > 1);
    }
}
