//! Locality-aware non-maximum suppression (LANMS) over scored quadrilaterals.
//!
//! Dense text detectors emit many overlapping quads for the same object.
//! LANMS first walks the candidates in input order and folds runs of
//! overlapping neighbours into a score-weighted average quad, then runs
//! standard greedy NMS over the (much smaller) merged set.
//!
//! ## Quickstart
//!
//! ```
//! use lanms_core::{merge_quadrilaterals_standard, LanmsParams, Quad};
//!
//! let square = |x: f64, score: f32| {
//!     Quad::from_coords([x, 0.0, x + 100.0, 0.0, x + 100.0, 100.0, x, 100.0], score)
//! };
//! let candidates = [square(0.0, 0.9), square(2.0, 0.8), square(500.0, 0.7)];
//!
//! let kept = merge_quadrilaterals_standard(&candidates, &LanmsParams::with_threshold(0.5))?;
//! assert_eq!(kept.len(), 2);
//! # Ok::<(), lanms_core::LanmsError>(())
//! ```
//!
//! The crate is purely geometric and holds no global state apart from the
//! optional stderr logger.

mod error;
mod logger;
mod merger;
mod nms;
mod overlap;
mod params;
mod quad;

pub use error::LanmsError;
pub use merger::{align_vertices, alignment_cost, PolyMerger, VertexAlignment};
pub use nms::{locality_merge, merge_quadrilaterals_standard, run, standard_nms, LanmsOutput};
pub use overlap::{paths_area, quad_iou, should_merge, MIN_UNION_AREA};
pub use params::{LanmsParams, MergeReference};
pub use quad::{Quad, COORDINATE_LIMIT};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
