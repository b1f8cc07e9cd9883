//! Polygon overlap (IoU) between two quads using exact integer clipping.
//!
//! Intersection and union are computed by Clipper's integer engine through
//! `geo-clipper`. Clipper fills with the non-zero rule; for simple quads this
//! is identical to even-odd. Self-intersecting ("bow-tie") quads are passed
//! through untouched and their overlap is whatever the clipper makes of them.

use crate::Quad;
use geo_clipper::ClipperInt;
use geo_types::{LineString, MultiPolygon};
use log::warn;

/// Lower bound on the union area used as the IoU denominator.
///
/// Expressed in squared fixed-point units; it only matters for degenerate
/// (zero or near-zero area) inputs.
pub const MIN_UNION_AREA: f64 = 1.0;

// Partial sums may wrap near the coordinate limit; the final twice-area of a
// ring inside the clipping range always fits in i128.
fn ring_area2(ring: &LineString<i64>) -> i128 {
    ring.0.windows(2).fold(0_i128, |acc, w| {
        let (a, b) = (w[0], w[1]);
        acc.wrapping_add(a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128)
    })
}

/// Area covered by a clipping result.
///
/// Each polygon contributes its outer ring minus its holes. Ring areas are
/// accumulated exactly in `i128` before the final conversion.
pub fn paths_area(paths: &MultiPolygon<i64>) -> f64 {
    let twice = paths.0.iter().fold(0_i128, |acc, poly| {
        let holes = poly
            .interiors()
            .iter()
            .fold(0_i128, |h, r| h.wrapping_add(ring_area2(r).abs()));
        acc.wrapping_add(ring_area2(poly.exterior()).abs().wrapping_sub(holes))
    });
    twice as f64 * 0.5
}

/// Intersection-over-union of two quads, in `[0, 1]`.
///
/// A quad with a NaN coordinate or one outside [`COORDINATE_LIMIT`] cannot be
/// clipped; its overlap with anything is reported as 0.
///
/// [`COORDINATE_LIMIT`]: crate::COORDINATE_LIMIT
pub fn quad_iou(a: &Quad, b: &Quad) -> f32 {
    let (Some(pa), Some(pb)) = (a.to_clipper_polygon(), b.to_clipper_polygon()) else {
        warn!("quad outside the clipping range; treating overlap as 0");
        return 0.0;
    };

    let inter = paths_area(&pa.intersection(&pb));
    let uni = paths_area(&pa.union(&pb));

    if uni.abs() < MIN_UNION_AREA {
        warn!("degenerate union area {uni}; clamping denominator to {MIN_UNION_AREA}");
    }
    let iou = inter.abs() / uni.abs().max(MIN_UNION_AREA);
    iou.clamp(0.0, 1.0) as f32
}

/// `true` when the overlap of `a` and `b` strictly exceeds `threshold`.
#[inline]
pub fn should_merge(a: &Quad, b: &Quad, threshold: f32) -> bool {
    quad_iou(a, b) > threshold
}
