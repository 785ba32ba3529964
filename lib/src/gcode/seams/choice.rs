//! Prioritized seam search over one perimeter, and its lift to whole shells.

use super::perimeters::{Perimeter, PointClassification, PointType};
use super::shells::{Shell, Shells};
use crate::geometry::{BoundingBox, PointF};

/// A seam position on a perimeter.
///
/// `previous_index == next_index` means the seam sits on that point;
/// otherwise it lies on the edge between the two.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SeamChoice {
    pub previous_index: usize,
    pub next_index: usize,
    /// Position (mm).
    pub position: PointF,
}

impl SeamChoice {
    pub fn at(index: usize, position: PointF) -> Self {
        Self {
            previous_index: index,
            next_index: index,
            position,
        }
    }
}

/// A seam choice together with the perimeter it was made on.
#[derive(Clone, Debug)]
pub struct SeamPerimeterChoice {
    pub choice: SeamChoice,
    pub perimeter: Perimeter,
    /// Scaled box of the perimeter, used to find the choice for a loop.
    pub bounding_box: BoundingBox,
}

impl SeamPerimeterChoice {
    pub fn new(choice: SeamChoice, perimeter: Perimeter) -> Self {
        let bounding_box = perimeter.scaled_bounding_box();
        Self {
            choice,
            perimeter,
            bounding_box,
        }
    }
}

const TYPE_SEARCH_ORDER: [PointType; 3] = [PointType::Enforcer, PointType::Common, PointType::Blocker];

const CLASSIFICATION_SEARCH_ORDER: [PointClassification; 3] = [
    PointClassification::Embedded,
    PointClassification::Common,
    PointClassification::Overhang,
];

/// Ask `chooser` for a seam over (type, classification) pairs in priority
/// order and return the first answer.
///
/// Once a point type is present on the perimeter the search stops at that
/// type: painted enforcers never fall through to common points, and common
/// points never fall through to blockers. Degenerate perimeters never reach
/// `chooser`.
pub fn maybe_choose_seam_point<F>(perimeter: &Perimeter, mut chooser: F) -> Option<SeamChoice>
where
    F: FnMut(&Perimeter, PointType, PointClassification) -> Option<SeamChoice>,
{
    if perimeter.is_degenerate {
        return choose_degenerate_seam_point(perimeter);
    }
    for point_type in TYPE_SEARCH_ORDER {
        for classification in CLASSIFICATION_SEARCH_ORDER {
            if let Some(choice) = chooser(perimeter, point_type, classification) {
                return Some(choice);
            }
        }
        if perimeter.point_types.contains(&point_type) {
            return None;
        }
    }
    None
}

/// [`maybe_choose_seam_point`], falling back to the first position.
pub fn choose_seam_point<F>(perimeter: &Perimeter, chooser: F) -> SeamChoice
where
    F: FnMut(&Perimeter, PointType, PointClassification) -> Option<SeamChoice>,
{
    maybe_choose_seam_point(perimeter, chooser).unwrap_or_else(|| {
        SeamChoice::at(0, perimeter.positions.first().copied().unwrap_or_default())
    })
}

/// Seam of a degenerate perimeter: its first position, if it has one.
pub fn choose_degenerate_seam_point(perimeter: &Perimeter) -> Option<SeamChoice> {
    perimeter
        .positions
        .first()
        .map(|&position| SeamChoice::at(0, position))
}

/// One seam per slice of `shell`, or None as soon as `chooser` fails on a
/// regular slice. `chooser` also receives the slice index.
pub fn maybe_get_shell_seam<F>(shell: &Shell<Perimeter>, mut chooser: F) -> Option<Vec<SeamChoice>>
where
    F: FnMut(&Perimeter, usize) -> Option<SeamChoice>,
{
    let mut result = Vec::with_capacity(shell.len());
    for (index, slice) in shell.iter().enumerate() {
        let perimeter = &slice.boundary;
        if perimeter.is_degenerate {
            result.push(choose_degenerate_seam_point(perimeter).unwrap_or_default());
        } else {
            result.push(chooser(perimeter, index)?);
        }
    }
    Some(result)
}

/// One seam per slice of `shell`, with a chooser that always answers.
pub fn get_shell_seam<F>(shell: &Shell<Perimeter>, mut chooser: F) -> Vec<SeamChoice>
where
    F: FnMut(&Perimeter, usize) -> SeamChoice,
{
    maybe_get_shell_seam(shell, |perimeter, index| Some(chooser(perimeter, index)))
        .unwrap_or_else(|| vec![SeamChoice::default(); shell.len()])
}

/// Run `get_shell_seams` on every shell and regroup the results by layer.
pub fn get_object_seams<F>(shells: Shells<Perimeter>, mut get_shell_seams: F) -> Vec<Vec<SeamPerimeterChoice>>
where
    F: FnMut(&Shell<Perimeter>) -> Vec<SeamChoice>,
{
    let mut layers: Vec<Vec<SeamPerimeterChoice>> = Vec::new();
    for shell in shells {
        let choices = get_shell_seams(&shell);
        for (slice, choice) in shell.into_iter().zip(choices) {
            if layers.len() <= slice.layer_index {
                layers.resize_with(slice.layer_index + 1, Vec::new);
            }
            layers[slice.layer_index].push(SeamPerimeterChoice::new(choice, slice.boundary));
        }
    }
    layers
}

/// Picker over the points of a perimeter that carry the given tags.
///
/// Returns the index selected by `pick` among the matching indices.
pub fn pick_matching_point<F>(
    perimeter: &Perimeter,
    point_type: PointType,
    classification: PointClassification,
    pick: F,
) -> Option<SeamChoice>
where
    F: FnOnce(&[usize]) -> Option<usize>,
{
    let matching: Vec<usize> = (0..perimeter.len())
        .filter(|&i| perimeter.point_matches(i, point_type, classification))
        .collect();
    if matching.is_empty() {
        return None;
    }
    let index = pick(&matching)?;
    Some(SeamChoice::at(index, perimeter.positions[index]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::seams::shells::Slice;

    fn square() -> Vec<PointF> {
        vec![
            PointF::new(0.0, 0.0),
            PointF::new(1.0, 0.0),
            PointF::new(1.0, 1.0),
            PointF::new(0.0, 1.0),
        ]
    }

    fn first_matching(
        perimeter: &Perimeter,
        point_type: PointType,
        classification: PointClassification,
    ) -> Option<SeamChoice> {
        pick_matching_point(perimeter, point_type, classification, |m| m.first().copied())
    }

    #[test]
    fn test_enforcer_wins() {
        let perimeter = Perimeter::common(0, square()).with_point_types(vec![
            PointType::Common,
            PointType::Blocker,
            PointType::Enforcer,
            PointType::Common,
        ]);
        let choice = maybe_choose_seam_point(&perimeter, first_matching).unwrap();
        assert_eq!(choice.previous_index, 2);
        assert_eq!(choice.position, PointF::new(1.0, 1.0));
    }

    #[test]
    fn test_embedded_before_overhang() {
        let perimeter = Perimeter::common(0, square()).with_point_classifications(vec![
            PointClassification::Overhang,
            PointClassification::Overhang,
            PointClassification::Embedded,
            PointClassification::Common,
        ]);
        let choice = choose_seam_point(&perimeter, first_matching);
        assert_eq!(choice.previous_index, 2);
    }

    #[test]
    fn test_enforcer_does_not_fall_through() {
        let perimeter = Perimeter::common(0, square()).with_point_types(vec![
            PointType::Enforcer,
            PointType::Common,
            PointType::Common,
            PointType::Common,
        ]);
        // A picker that rejects every enforcer.
        let picker = |p: &Perimeter, t: PointType, c: PointClassification| {
            if t == PointType::Enforcer {
                None
            } else {
                first_matching(p, t, c)
            }
        };
        assert!(maybe_choose_seam_point(&perimeter, picker).is_none());
        // The total version still lands on the first position.
        let choice = choose_seam_point(&perimeter, picker);
        assert_eq!(choice, SeamChoice::at(0, PointF::new(0.0, 0.0)));
    }

    #[test]
    fn test_blockers_used_when_nothing_else() {
        let perimeter = Perimeter::common(0, square())
            .with_point_types(vec![PointType::Blocker; 4]);
        let choice = maybe_choose_seam_point(&perimeter, first_matching).unwrap();
        assert_eq!(choice.previous_index, 0);
    }

    #[test]
    fn test_degenerate_shell_slice() {
        let single = Perimeter::common(3, vec![PointF::new(2.0, 5.0)]);
        let shell = vec![Slice {
            boundary: single,
            layer_index: 3,
        }];
        // The chooser is never consulted for degenerate slices.
        let seams = maybe_get_shell_seam(&shell, |_, _| None).unwrap();
        assert_eq!(seams, vec![SeamChoice::at(0, PointF::new(2.0, 5.0))]);

        let empty = Perimeter::common(0, Vec::new());
        assert!(choose_degenerate_seam_point(&empty).is_none());
    }

    #[test]
    fn test_degenerate_perimeter_ignores_chooser() {
        let single = Perimeter::common(0, vec![PointF::new(2.0, 5.0)]);
        assert!(single.is_degenerate);
        let elsewhere = |_: &Perimeter, _: PointType, _: PointClassification| {
            Some(SeamChoice::at(0, PointF::new(99.0, 99.0)))
        };
        assert_eq!(
            maybe_choose_seam_point(&single, elsewhere),
            Some(SeamChoice::at(0, PointF::new(2.0, 5.0)))
        );
        assert_eq!(
            choose_seam_point(&single, elsewhere),
            SeamChoice::at(0, PointF::new(2.0, 5.0))
        );

        let empty = Perimeter::common(0, Vec::new());
        assert!(maybe_choose_seam_point(&empty, elsewhere).is_none());
    }

    #[test]
    fn test_shell_seam_fails_as_a_whole() {
        let shell = vec![
            Slice {
                boundary: Perimeter::common(0, square()),
                layer_index: 0,
            },
            Slice {
                boundary: Perimeter::common(1, square()),
                layer_index: 1,
            },
        ];
        let result = maybe_get_shell_seam(&shell, |_, index| {
            (index == 0).then(|| SeamChoice::at(0, PointF::new(0.0, 0.0)))
        });
        assert!(result.is_none());

        let seams = get_shell_seam(&shell, |p, _| SeamChoice::at(1, p.positions[1]));
        assert_eq!(seams.len(), 2);
        assert_eq!(seams[1].position, PointF::new(1.0, 0.0));
    }

    #[test]
    fn test_object_seams_keyed_by_layer() {
        let shells = vec![
            vec![Slice {
                boundary: Perimeter::common(1, square()),
                layer_index: 1,
            }],
            vec![
                Slice {
                    boundary: Perimeter::common(0, square()),
                    layer_index: 0,
                },
                Slice {
                    boundary: Perimeter::common(1, square()),
                    layer_index: 1,
                },
            ],
        ];
        let layers = get_object_seams(shells, |shell| {
            get_shell_seam(shell, |p, _| SeamChoice::at(0, p.positions[0]))
        });
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].len(), 1);
        assert_eq!(layers[1].len(), 2);
    }
}
