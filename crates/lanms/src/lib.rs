//! Locality-aware NMS for quadrilateral text detections.
//!
//! This crate provides:
//! - re-exports of the `lanms-core` algorithm crate,
//! - a flat `N x 9` row codec with fixed-point scaling ([`rows`]), matching the
//!   layout most EAST-style detectors emit,
//! - JSON config/report helpers and a text/JSON candidate reader ([`io`]),
//! - (feature `cli`) the `lanms` command line tool.
//!
//! ## Quickstart
//!
//! ```
//! use lanms::{merge_quadrangle_n9, LanmsParams};
//!
//! let candidates: [f32; 18] = [
//!     0.0, 0.0, 10.0, 0.0, 10.0, 4.0, 0.0, 4.0, 0.9,
//!     0.2, 0.0, 10.2, 0.0, 10.2, 4.0, 0.2, 4.0, 0.8,
//! ];
//! let kept = merge_quadrangle_n9(&candidates, &LanmsParams::default())?;
//! assert_eq!(kept.len(), 1);
//! assert!((kept[0][8] - 1.7).abs() < 1e-5);
//! # Ok::<(), lanms::core::LanmsError>(())
//! ```
//!
//! ## Python bindings
//!
//! `crates/lanms-py` builds the `_lanms` extension module exposing
//! `merge_quadrangle_n9(polys, thres=0.3, precision=10000.0, nms_thres=None)`
//! over `float32[N, 9]` numpy arrays.

pub use lanms_core as core;

pub use lanms_core::{
    merge_quadrilaterals_standard, quad_iou, should_merge, LanmsError, LanmsParams,
    MergeReference, Quad,
};

pub mod io;
pub mod rows;

pub use io::{process_rows, read_rows, LanmsIoError, LanmsReport, LanmsRunConfig};
pub use rows::{merge_quadrangle_n9, quads_from_rows, quads_to_rows, Row, ROW_LEN};
