//! Nearest and aligned seams.
//!
//! The nearest picker chases a reference position (usually where the
//! nozzle is) and snaps to a close corner when there is one. Aligned seams
//! reuse it, using the seam of the slice below as the reference.

use super::choice::{choose_seam_point, get_shell_seam, pick_matching_point, SeamChoice, SeamPerimeterChoice};
use super::perimeters::{AngleType, Perimeter, PointClassification, PointType};
use super::rear::rearest_point;
use super::shells::{Shell, Shells};
use crate::geometry::PointF;
use crate::scale;

/// `t` below this counts as the start of an edge, above `1 - T_EPSILON` as
/// its end.
const T_EPSILON: f64 = 1e-4;

/// Seam closest to `reference` on the matching part of the perimeter.
///
/// A matching corner wins if it is less than `max_detour` (mm) away from
/// `reference`; otherwise the seam goes to the closest point of any edge
/// whose both ends match.
pub fn nearest_point(
    perimeter: &Perimeter,
    reference: PointF,
    max_detour: f64,
    point_type: PointType,
    classification: PointClassification,
) -> Option<SeamChoice> {
    let corner = (0..perimeter.len())
        .filter(|&i| {
            perimeter.angle_types[i] != AngleType::Smooth
                && perimeter.point_matches(i, point_type, classification)
        })
        .map(|i| (i, perimeter.positions[i].distance(&reference)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((index, distance)) = corner {
        if distance < max_detour {
            return Some(SeamChoice::at(index, perimeter.positions[index]));
        }
    }

    let bb = perimeter.bounding_box();
    let reach = reference.distance(&bb.center()) + bb.min.distance(&bb.max) + 1.0;
    let hit = perimeter.edges().closest_point_filtered(&reference.to_scaled(), scale(reach), |_, segment| {
        perimeter.edge_matches(segment, point_type, classification)
    });
    let Some(hit) = hit else {
        // Single matching points have no matching edge.
        return pick_matching_point(perimeter, point_type, classification, |matching| {
            matching.iter().copied().min_by(|&a, &b| {
                let da = perimeter.positions[a].distance_squared(&reference);
                let db = perimeter.positions[b].distance_squared(&reference);
                da.total_cmp(&db)
            })
        });
    };

    let previous = hit.start_point_idx;
    let next = perimeter.next_index(previous);
    Some(if hit.t < T_EPSILON {
        SeamChoice::at(previous, perimeter.positions[previous])
    } else if hit.t > 1.0 - T_EPSILON {
        SeamChoice::at(next, perimeter.positions[next])
    } else {
        SeamChoice {
            previous_index: previous,
            next_index: next,
            position: hit.point.to_f64(),
        }
    })
}

/// Seams of one shell lined up from the bottom: the first slice takes its
/// rearmost point, every later one the nearest point to the seam below.
pub fn get_aligned_shell_seams(shell: &Shell<Perimeter>, max_detour: f64) -> Vec<SeamChoice> {
    let mut previous: Option<PointF> = None;
    get_shell_seam(shell, |perimeter, _| {
        let choice = match previous {
            None => choose_seam_point(perimeter, rearest_point),
            Some(reference) => choose_seam_point(perimeter, |p, t, c| {
                nearest_point(p, reference, max_detour, t, c)
            }),
        };
        previous = Some(choice.position);
        choice
    })
}

pub fn get_aligned_object_seams(shells: Shells<Perimeter>, max_detour: f64) -> Vec<Vec<SeamPerimeterChoice>> {
    super::choice::get_object_seams(shells, |shell| get_aligned_shell_seams(shell, max_detour))
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

    #[test]
    fn test_nearest_point_on_edge() {
        let perimeter = Perimeter::common(0, rectangle(0.0, 0.0, 10.0, 10.0));
        let choice = nearest_point(
            &perimeter,
            PointF::new(5.0, -3.0),
            1.0,
            PointType::Common,
            PointClassification::Common,
        )
        .unwrap();
        assert_eq!((choice.previous_index, choice.next_index), (0, 1));
        assert!(choice.position.approx_eq(&PointF::new(5.0, 0.0), 1e-6));
    }

    #[test]
    fn test_nearest_point_snaps_to_corner() {
        let perimeter = Perimeter::common(0, rectangle(0.0, 0.0, 10.0, 10.0))
            .with_angle_types(vec![AngleType::Convex; 4]);
        let near = nearest_point(
            &perimeter,
            PointF::new(9.5, -0.5),
            1.0,
            PointType::Common,
            PointClassification::Common,
        )
        .unwrap();
        assert_eq!(near, SeamChoice::at(1, PointF::new(10.0, 0.0)));

        // Too far from any corner: back to the closest edge point.
        let far = nearest_point(
            &perimeter,
            PointF::new(5.0, -3.0),
            1.0,
            PointType::Common,
            PointClassification::Common,
        )
        .unwrap();
        assert_eq!((far.previous_index, far.next_index), (0, 1));
    }

    #[test]
    fn test_nearest_point_at_vertex() {
        let perimeter = Perimeter::common(0, rectangle(0.0, 0.0, 10.0, 10.0));
        let choice = nearest_point(
            &perimeter,
            PointF::new(12.0, 12.0),
            1.0,
            PointType::Common,
            PointClassification::Common,
        )
        .unwrap();
        assert_eq!(choice.previous_index, 2);
        assert_eq!(choice.next_index, 2);
    }

    #[test]
    fn test_aligned_follows_previous_seam() {
        let shell: Shell<Perimeter> = (0..3)
            .map(|layer_index| {
                let shift = layer_index as f64 * 0.2;
                Slice {
                    boundary: Perimeter::common(layer_index, rectangle(shift, 0.0, 10.0 + shift, 10.0)),
                    layer_index,
                }
            })
            .collect();

        let seams = get_aligned_shell_seams(&shell, 1.0);

        // Rearmost point of the first slice, then straight up.
        assert_eq!(seams[0], SeamChoice::at(2, PointF::new(10.0, 10.0)));
        for seam in &seams[1..] {
            assert!(seam.position.approx_eq(&PointF::new(10.0, 10.0), 1e-6));
            assert_eq!((seam.previous_index, seam.next_index), (2, 3));
        }
    }
}
