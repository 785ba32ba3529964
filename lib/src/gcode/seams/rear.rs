//! Rear seams: a vertical line through the back of the shell, or failing
//! that the rearmost usable point of every slice.

use log::debug;

use super::choice::{
    choose_seam_point, get_shell_seam, maybe_choose_seam_point, maybe_get_shell_seam,
    pick_matching_point, SeamChoice, SeamPerimeterChoice,
};
use super::perimeters::{Perimeter, PointClassification, PointType};
use super::shells::{Shell, Shells};
use crate::geometry::{BoundingBoxF, PointF};

/// The projection ray starts this far (mm) behind the shell.
const RAY_START_OFFSET: f64 = 1.0;

/// Projects a vertical ray at `x` from behind the shell towards the front
/// and takes the first matching edge it crosses.
#[derive(Clone, Copy, Debug)]
pub struct StraightLine {
    pub x: f64,
    pub max_y: f64,
    pub min_y: f64,
    /// Lowest acceptable y of a projected seam.
    pub min_accepted_y: f64,
}

impl StraightLine {
    /// Ray at `x` behind the shell, accepting points within `threshold` of
    /// the shell height from the back.
    pub fn for_shell(shell: &Shell<Perimeter>, x: f64, threshold: f64) -> Option<Self> {
        let mut shell_box = BoundingBoxF::new();
        for slice in shell.iter().filter(|slice| !slice.boundary.is_empty()) {
            shell_box.merge(&slice.boundary.bounding_box());
        }
        if !shell_box.is_defined() {
            return None;
        }
        Some(Self {
            x,
            max_y: shell_box.max.y,
            min_y: shell_box.min.y,
            min_accepted_y: shell_box.max.y - threshold * shell_box.height(),
        })
    }

    pub fn pick(
        &self,
        perimeter: &Perimeter,
        point_type: PointType,
        classification: PointClassification,
    ) -> Option<SeamChoice> {
        let from = PointF::new(self.x, self.max_y + RAY_START_OFFSET).to_scaled();
        let to = PointF::new(self.x, self.min_y - RAY_START_OFFSET).to_scaled();
        let hit = perimeter
            .edges()
            .find_intersections_filtered(&from, &to, |_, segment| {
                perimeter.edge_matches(segment, point_type, classification)
            })
            .into_iter()
            .next()?;

        let position = hit.point.to_f64();
        if position.y < self.min_accepted_y {
            return None;
        }
        Some(SeamChoice {
            previous_index: hit.segment_idx,
            next_index: perimeter.next_index(hit.segment_idx),
            position,
        })
    }
}

/// Matching point with the largest y; the first one on ties.
pub fn rearest_point(
    perimeter: &Perimeter,
    point_type: PointType,
    classification: PointClassification,
) -> Option<SeamChoice> {
    pick_matching_point(perimeter, point_type, classification, |matching| {
        let mut best: Option<usize> = None;
        for &index in matching {
            if best.map_or(true, |b| perimeter.positions[index].y > perimeter.positions[b].y) {
                best = Some(index);
            }
        }
        best
    })
}

/// Mean x of the box centers of every slice of every shell.
pub fn average_center_x(shells: &Shells<Perimeter>) -> Option<f64> {
    let centers: Vec<f64> = shells
        .iter()
        .flatten()
        .filter(|slice| !slice.boundary.is_empty())
        .map(|slice| slice.boundary.bounding_box().center().x)
        .collect();
    if centers.is_empty() {
        None
    } else {
        Some(centers.iter().sum::<f64>() / centers.len() as f64)
    }
}

/// Seams of one shell with the rear strategy, projecting at `center_x`.
pub fn get_shell_seams(shell: &Shell<Perimeter>, center_x: f64, rear_project_threshold: f64) -> Vec<SeamChoice> {
    let projected = StraightLine::for_shell(shell, center_x, rear_project_threshold).and_then(|line| {
        maybe_get_shell_seam(shell, |perimeter, _| {
            maybe_choose_seam_point(perimeter, |p, t, c| line.pick(p, t, c))
        })
    });
    projected.unwrap_or_else(|| {
        debug!("rear projection failed for a shell of {} slice(s), using rearmost points", shell.len());
        get_shell_seam(shell, |perimeter, _| choose_seam_point(perimeter, rearest_point))
    })
}

pub fn get_object_seams(shells: Shells<Perimeter>, rear_project_threshold: f64) -> Vec<Vec<SeamPerimeterChoice>> {
    let center_x = average_center_x(&shells).unwrap_or_default();
    super::choice::get_object_seams(shells, |shell| {
        get_shell_seams(shell, center_x, rear_project_threshold)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::seams::shells::Slice;

    fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<PointF> {
        vec![
            PointF::new(min_x, min_y),
            PointF::new(max_x, min_y),
            PointF::new(max_x, max_y),
            PointF::new(min_x, max_y),
        ]
    }

    fn slice(layer_index: usize, positions: Vec<PointF>) -> Slice<Perimeter> {
        Slice {
            boundary: Perimeter::common(layer_index, positions),
            layer_index,
        }
    }

    #[test]
    fn test_rearest_point_first_on_ties() {
        let perimeter = Perimeter::common(0, rectangle(0.0, 0.0, 4.0, 2.0));
        let choice = rearest_point(&perimeter, PointType::Common, PointClassification::Common).unwrap();
        // Points 2 and 3 share the largest y.
        assert_eq!(choice.previous_index, 2);
        assert_eq!(choice.position, PointF::new(4.0, 2.0));
    }

    #[test]
    fn test_straight_line_hits_back_edge() {
        let shell = vec![slice(0, rectangle(0.0, 0.0, 4.0, 2.0)), slice(1, rectangle(0.0, 0.0, 4.0, 2.0))];
        let seams = get_shell_seams(&shell, 2.0, 0.05);

        assert_eq!(seams.len(), 2);
        for seam in seams {
            // Back edge runs from point 2 to point 3.
            assert_eq!((seam.previous_index, seam.next_index), (2, 3));
            assert!((seam.position.x - 2.0).abs() < 1e-6);
            assert!((seam.position.y - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_straight_line_falls_back_for_whole_shell() {
        // The slices drift apart so the ray through their mean center
        // misses both.
        let shell = vec![
            slice(0, rectangle(0.0, 0.0, 4.0, 2.0)),
            slice(1, rectangle(10.0, 0.0, 14.0, 2.0)),
        ];
        assert_eq!(average_center_x(&vec![shell.clone()]), Some(7.0));
        let seams = get_shell_seams(&shell, 7.0, 0.05);

        // Both slices use the rearmost vertex, not just the one that missed.
        assert_eq!(seams[0], SeamChoice::at(2, PointF::new(4.0, 2.0)));
        assert_eq!(seams[1], SeamChoice::at(2, PointF::new(14.0, 2.0)));
    }

    #[test]
    fn test_straight_line_rejects_front_hits() {
        // The back of the perimeter is painted as blocker, so the ray only
        // matches common edges at the front, which lie below the threshold.
        let perimeter = Perimeter::common(0, rectangle(0.0, 0.0, 4.0, 2.0)).with_point_types(vec![
            PointType::Common,
            PointType::Common,
            PointType::Blocker,
            PointType::Blocker,
        ]);
        let shell = vec![Slice {
            boundary: perimeter,
            layer_index: 0,
        }];
        let line = StraightLine::for_shell(&shell, 2.0, 0.05).unwrap();
        assert!(line
            .pick(&shell[0].boundary, PointType::Common, PointClassification::Common)
            .is_none());
    }
}
