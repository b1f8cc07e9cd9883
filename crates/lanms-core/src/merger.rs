//! Incremental score-weighted averaging of quads.
//!
//! The same physical quadrilateral may be reported starting from any of its
//! four corners and with either winding. Before averaging, each incoming quad
//! is re-ordered to best match the current merged view (see
//! [`align_vertices`]).

use crate::Quad;
use nalgebra::Point2;

/// One of the 8 ways to map a quad's vertices onto a reference quad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VertexAlignment {
    /// Index of the source vertex mapped onto reference vertex 0.
    pub start: usize,
    /// Walk the source vertices backwards.
    pub reversed: bool,
}

impl VertexAlignment {
    /// All alignments in evaluation order: each start, forward then reversed.
    pub const ALL: [VertexAlignment; 8] = [
        VertexAlignment { start: 0, reversed: false },
        VertexAlignment { start: 0, reversed: true },
        VertexAlignment { start: 1, reversed: false },
        VertexAlignment { start: 1, reversed: true },
        VertexAlignment { start: 2, reversed: false },
        VertexAlignment { start: 2, reversed: true },
        VertexAlignment { start: 3, reversed: false },
        VertexAlignment { start: 3, reversed: true },
    ];

    /// Source index that lands on reference vertex `k`.
    #[inline]
    pub fn source_index(&self, k: usize) -> usize {
        if self.reversed {
            (self.start + 4 - k) % 4
        } else {
            (self.start + k) % 4
        }
    }

    pub fn apply(&self, points: &[Point2<f64>; 4]) -> [Point2<f64>; 4] {
        std::array::from_fn(|k| points[self.source_index(k)])
    }
}

/// Sum of squared vertex distances between `reference` and `points` under
/// `alignment`.
pub fn alignment_cost(
    reference: &[Point2<f64>; 4],
    points: &[Point2<f64>; 4],
    alignment: VertexAlignment,
) -> f64 {
    (0..4)
        .map(|k| (reference[k] - points[alignment.source_index(k)]).norm_squared())
        .sum()
}

/// Pick the vertex alignment of `points` closest to `reference`.
///
/// Candidates are evaluated in [`VertexAlignment::ALL`] order and only a
/// strictly smaller cost replaces the current best, so exact ties resolve to
/// the first candidate.
pub fn align_vertices(reference: &[Point2<f64>; 4], points: &[Point2<f64>; 4]) -> VertexAlignment {
    let mut best = VertexAlignment::ALL[0];
    let mut best_cost = f64::INFINITY;
    for alignment in VertexAlignment::ALL {
        let cost = alignment_cost(reference, points, alignment);
        if cost < best_cost {
            best_cost = cost;
            best = alignment;
        }
    }
    best
}

/// Running weighted average of a group of quads.
///
/// `add` is O(1); members are never revisited.
#[derive(Clone, Debug, Default)]
pub struct PolyMerger {
    weighted: [f64; 8],
    plain: [f64; 8],
    score: f64,
    count: usize,
}

impl PolyMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of quads folded in so far.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Fold `quad` into the group.
    pub fn add(&mut self, quad: &Quad) {
        let points = match self.merged() {
            Some(reference) => {
                let alignment = align_vertices(&reference.points, &quad.points);
                alignment.apply(&quad.points)
            }
            None => quad.points,
        };

        let s = quad.score as f64;
        for (k, p) in points.iter().enumerate() {
            self.weighted[2 * k] += p.x * s;
            self.weighted[2 * k + 1] += p.y * s;
            self.plain[2 * k] += p.x;
            self.plain[2 * k + 1] += p.y;
        }
        self.score += s;
        self.count += 1;
    }

    /// Current merged quad, or `None` if nothing was added yet.
    ///
    /// Vertices are the score-weighted mean of the members; the score is the
    /// summed member score. If all member scores are zero the plain vertex
    /// mean is used instead.
    pub fn merged(&self) -> Option<Quad> {
        if self.count == 0 {
            return None;
        }
        let coords: [f64; 8] = if self.score > 0.0 {
            std::array::from_fn(|i| self.weighted[i] / self.score)
        } else {
            let n = self.count as f64;
            std::array::from_fn(|i| self.plain[i] / n)
        };
        Some(Quad::from_coords(coords, self.score as f32))
    }

    /// Consume the accumulator and return the merged quad.
    pub fn finalize(self) -> Option<Quad> {
        self.merged()
    }
}
