//! Locality-aware merge pass followed by greedy NMS.
//!
//! The merge pass only ever compares a candidate with the group opened by its
//! predecessors in input order. Callers are expected to supply candidates in
//! a spatially coherent order (e.g. the raster order of a dense detector);
//! overlapping candidates that are far apart in the sequence end up in
//! separate groups and are left to the NMS pass.

use crate::{should_merge, LanmsError, LanmsParams, MergeReference, PolyMerger, Quad};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Result of [`run`]: the merged set and the survivors of suppression.
#[derive(Clone, Debug, Default)]
pub struct LanmsOutput {
    pub merged: Vec<Quad>,
    pub kept: Vec<Quad>,
}

/// An open merge group.
struct MergeGroup {
    merger: PolyMerger,
    last: Quad,
}

impl MergeGroup {
    fn start(first: &Quad) -> Self {
        let mut merger = PolyMerger::new();
        merger.add(first);
        Self {
            merger,
            last: *first,
        }
    }

    fn reference(&self, mode: MergeReference) -> Quad {
        match mode {
            MergeReference::LastMember => self.last,
            MergeReference::MergedView => self.merger.merged().unwrap_or(self.last),
        }
    }

    fn add(&mut self, quad: &Quad) {
        self.merger.add(quad);
        self.last = *quad;
    }

    fn finalize(self) -> Option<Quad> {
        self.merger.finalize()
    }
}

/// Merge runs of adjacent, overlapping candidates into weighted quads.
///
/// Each output quad carries the summed score of its members.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(candidates), fields(n = candidates.len()))
)]
pub fn locality_merge(
    candidates: &[Quad],
    merge_threshold: f32,
    reference: MergeReference,
) -> Vec<Quad> {
    let mut merged = Vec::new();
    let mut group: Option<MergeGroup> = None;

    for candidate in candidates {
        let joins = group
            .as_ref()
            .is_some_and(|g| should_merge(&g.reference(reference), candidate, merge_threshold));
        if joins {
            if let Some(g) = group.as_mut() {
                g.add(candidate);
            }
            continue;
        }
        if let Some(done) = group.take().and_then(MergeGroup::finalize) {
            merged.push(done);
        }
        group = Some(MergeGroup::start(candidate));
    }
    if let Some(done) = group.and_then(MergeGroup::finalize) {
        merged.push(done);
    }

    debug!(
        "locality merge: {} candidates -> {} groups",
        candidates.len(),
        merged.len()
    );
    merged
}

/// Greedy non-maximum suppression.
///
/// Quads are visited by descending score (ties keep input order); each kept
/// quad removes every remaining one whose IoU with it exceeds
/// `nms_threshold`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(quads), fields(n = quads.len()))
)]
pub fn standard_nms(quads: &[Quad], nms_threshold: f32) -> Vec<Quad> {
    let mut order: Vec<usize> = (0..quads.len()).collect();
    order.sort_by(|&a, &b| quads[b].score.total_cmp(&quads[a].score));

    let mut kept = Vec::new();
    while let Some((&best, rest)) = order.split_first() {
        kept.push(quads[best]);
        order = rest
            .iter()
            .copied()
            .filter(|&i| !should_merge(&quads[best], &quads[i], nms_threshold))
            .collect();
    }

    debug!("nms: {} quads -> {} kept", quads.len(), kept.len());
    kept
}

/// Run both passes and keep the intermediate merged set.
///
/// Fails if `params` is invalid or a candidate has a coordinate the clipping
/// engine cannot represent.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(candidates, params), fields(n = candidates.len()))
)]
pub fn run(candidates: &[Quad], params: &LanmsParams) -> Result<LanmsOutput, LanmsError> {
    params.validate()?;
    for (index, candidate) in candidates.iter().enumerate() {
        candidate.check_coordinates(index)?;
    }
    let merged = locality_merge(candidates, params.merge_threshold, params.reference);
    let kept = standard_nms(&merged, params.nms_threshold);
    Ok(LanmsOutput { merged, kept })
}

/// Locality-aware NMS over scored quads.
///
/// Adjacent candidates overlapping by more than `params.merge_threshold` are
/// averaged (weighted by score, scores summed), then greedy NMS with
/// `params.nms_threshold` is applied to the merged set.
pub fn merge_quadrilaterals_standard(
    candidates: &[Quad],
    params: &LanmsParams,
) -> Result<Vec<Quad>, LanmsError> {
    run(candidates, params).map(|out| out.kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64, side: f64, score: f32) -> Quad {
        Quad::from_coords([x, y, x + side, y, x + side, y + side, x, y + side], score)
    }

    #[test]
    fn empty_input_is_empty_output() {
        let out = run(&[], &LanmsParams::default()).expect("run");
        assert!(out.merged.is_empty());
        assert!(out.kept.is_empty());
    }

    #[test]
    fn rejects_candidates_beyond_clipping_range() {
        let candidates = [
            square(0.0, 0.0, 100.0, 0.9),
            square(0.0, 0.0, 5e18, 0.8),
        ];
        let err = run(&candidates, &LanmsParams::default()).unwrap_err();
        assert_eq!(err, LanmsError::CoordinateOutOfRange { index: 1 });

        let nan = Quad::from_coords([0.0, f64::NAN, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0], 0.5);
        let err = merge_quadrilaterals_standard(&[nan], &LanmsParams::default()).unwrap_err();
        assert_eq!(err, LanmsError::NonFiniteCoordinate { index: 0 });
    }

    #[test]
    fn single_candidate_passes_through() {
        let q = square(3.0, 4.0, 20.0, 0.7);
        let out = merge_quadrilaterals_standard(&[q], &LanmsParams::default()).expect("run");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].score, 0.7);
        for (a, b) in out[0].coords().iter().zip(q.coords().iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn merges_only_adjacent_candidates() {
        let a = square(0.0, 0.0, 100.0, 1.0);
        let far = square(1000.0, 1000.0, 100.0, 1.0);
        // Same place as `a`, but separated from it by `far` in input order.
        let a2 = square(2.0, 0.0, 100.0, 1.0);

        let merged = locality_merge(&[a, far, a2], 0.5, MergeReference::MergedView);
        assert_eq!(merged.len(), 3);

        let merged = locality_merge(&[a, a2, far], 0.5, MergeReference::MergedView);
        assert_eq!(merged.len(), 2);
        assert_relative_eq!(merged[0].score, 2.0);
        assert_relative_eq!(merged[0].points[0].x, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn last_member_reference_follows_a_drifting_chain() {
        // Each step has IoU 0.6 with its predecessor but drifts away from
        // the group average.
        let chain: Vec<Quad> = (0..4)
            .map(|i| square(25.0 * i as f64, 0.0, 100.0, 1.0))
            .collect();

        let by_last = locality_merge(&chain, 0.55, MergeReference::LastMember);
        assert_eq!(by_last.len(), 1);
        assert_relative_eq!(by_last[0].score, 4.0);

        let by_view = locality_merge(&chain, 0.55, MergeReference::MergedView);
        assert!(by_view.len() >= by_last.len());
        let total: f32 = by_view.iter().map(|q| q.score).sum();
        assert_relative_eq!(total, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn nms_keeps_highest_score_and_drops_overlaps() {
        let low = square(0.0, 0.0, 100.0, 0.4);
        let high = square(5.0, 0.0, 100.0, 0.9);
        let other = square(500.0, 0.0, 100.0, 0.1);
        let kept = standard_nms(&[low, other, high], 0.5);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], high);
        assert_eq!(kept[1], other);
    }

    #[test]
    fn nms_ties_keep_input_order() {
        let a = square(0.0, 0.0, 100.0, 0.5);
        let b = square(1.0, 0.0, 100.0, 0.5);
        let kept = standard_nms(&[a, b], 0.5);
        assert_eq!(kept, vec![a]);
    }

    #[test]
    fn nms_threshold_is_independent_of_merge_threshold() {
        // Non-adjacent duplicates survive the merge pass; a permissive NMS
        // threshold keeps both, a strict one suppresses the weaker copy.
        let a = square(0.0, 0.0, 100.0, 0.9);
        let gap = square(1000.0, 0.0, 100.0, 0.8);
        let b = square(10.0, 0.0, 100.0, 0.7);
        let input = [a, gap, b];

        let loose = LanmsParams {
            merge_threshold: 0.3,
            nms_threshold: 0.95,
            ..LanmsParams::default()
        };
        assert_eq!(merge_quadrilaterals_standard(&input, &loose).unwrap().len(), 3);

        let strict = LanmsParams {
            merge_threshold: 0.3,
            nms_threshold: 0.3,
            ..LanmsParams::default()
        };
        assert_eq!(merge_quadrilaterals_standard(&input, &strict).unwrap().len(), 2);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = LanmsParams::with_threshold(-0.1);
        let err = run(&[square(0.0, 0.0, 1.0, 1.0)], &params).unwrap_err();
        assert!(matches!(err, LanmsError::InvalidThreshold { .. }));
    }
}
