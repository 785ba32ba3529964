//! Seam placement.
//!
//! External perimeters are chained across layers into shells, each shell
//! slice becomes an annotated [`Perimeter`], and one of the seam strategies
//! picks a start point per perimeter. The [`Placer`] keeps the result and
//! cuts perimeter loops at their seams during extrusion ordering.

pub mod choice;
pub mod geometry;
pub mod nearest;
pub mod perimeters;
pub mod placer;
pub mod random;
pub mod rear;
pub mod shells;

pub use choice::{
    choose_degenerate_seam_point, choose_seam_point, get_object_seams, get_shell_seam,
    maybe_choose_seam_point, maybe_get_shell_seam, SeamChoice, SeamPerimeterChoice,
};
pub use perimeters::{
    AngleType, NoPainting, PaintedAreas, Perimeter, PointClassification, PointType, SeamPainting,
};
pub use placer::{PlaceSeam, Placer, SeamPlacement};
pub use shells::{create_shells, create_shells_with_holes, Shell, ShellPolygon, Shells, Slice};
