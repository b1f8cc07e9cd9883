use crate::LanmsError;
use geo_types::{Coord, LineString, Polygon};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Exclusive bound on coordinate magnitude accepted by the clipping engine
/// (`2^62` fixed-point units).
pub const COORDINATE_LIMIT: f64 = 4_611_686_018_427_387_904.0;

fn clippable(v: f64) -> bool {
    v.abs() < COORDINATE_LIMIT
}

/// A scored quadrilateral.
///
/// Coordinates are expressed in fixed-point units: callers working in pixels
/// scale them up (see `LanmsParams::precision`) so that the exact integer
/// clipping used by the overlap engine keeps sub-pixel detail. Vertex order is
/// expected to be consistent (clockwise or counter-clockwise) but is not
/// validated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub points: [Point2<f64>; 4],
    pub score: f32,
}

impl Quad {
    pub fn new(points: [Point2<f64>; 4], score: f32) -> Self {
        Self { points, score }
    }

    /// Build a quad from an arbitrary vertex slice.
    ///
    /// Fails with [`LanmsError::MalformedPolygon`] unless exactly 4 vertices
    /// are given.
    pub fn from_slice(points: &[Point2<f64>], score: f32) -> Result<Self, LanmsError> {
        let points: [Point2<f64>; 4] =
            points
                .try_into()
                .map_err(|_| LanmsError::MalformedPolygon {
                    vertices: points.len(),
                })?;
        Ok(Self::new(points, score))
    }

    /// Build a quad from `[x0, y0, x1, y1, x2, y2, x3, y3]`.
    pub fn from_coords(coords: [f64; 8], score: f32) -> Self {
        Self::new(
            [
                Point2::new(coords[0], coords[1]),
                Point2::new(coords[2], coords[3]),
                Point2::new(coords[4], coords[5]),
                Point2::new(coords[6], coords[7]),
            ],
            score,
        )
    }

    /// Flatten the vertices into `[x0, y0, x1, y1, x2, y2, x3, y3]`.
    pub fn coords(&self) -> [f64; 8] {
        let mut out = [0.0; 8];
        for (k, p) in self.points.iter().enumerate() {
            out[2 * k] = p.x;
            out[2 * k + 1] = p.y;
        }
        out
    }

    /// Check that every vertex is finite and within [`COORDINATE_LIMIT`].
    ///
    /// `index` is the candidate position reported in the error.
    pub fn check_coordinates(&self, index: usize) -> Result<(), LanmsError> {
        for v in self.coords() {
            if !v.is_finite() {
                return Err(LanmsError::NonFiniteCoordinate { index });
            }
            if !clippable(v) {
                return Err(LanmsError::CoordinateOutOfRange { index });
            }
        }
        Ok(())
    }

    /// Closed integer path consumed by the clipping engine.
    ///
    /// Coordinates are rounded to the nearest integer unit. Returns `None`
    /// if any coordinate is NaN or outside [`COORDINATE_LIMIT`], which the
    /// engine cannot represent.
    pub(crate) fn to_clipper_polygon(&self) -> Option<Polygon<i64>> {
        let mut ring: Vec<Coord<i64>> = Vec::with_capacity(5);
        for p in &self.points {
            if !(clippable(p.x) && clippable(p.y)) {
                return None;
            }
            ring.push(Coord {
                x: p.x.round() as i64,
                y: p.y.round() as i64,
            });
        }
        Some(Polygon::new(LineString::from(ring), vec![]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_rejects_wrong_vertex_count() {
        let pts = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)];
        let err = Quad::from_slice(&pts, 1.0).unwrap_err();
        assert_eq!(err, LanmsError::MalformedPolygon { vertices: 3 });
    }

    #[test]
    fn coords_roundtrip_keeps_vertex_order() {
        let coords = [0.0, 0.0, 4.0, 0.0, 4.0, 2.0, 0.0, 2.0];
        let q = Quad::from_coords(coords, 0.5);
        assert_eq!(q.coords(), coords);
        assert_eq!(q.points[2], Point2::new(4.0, 2.0));
    }

    #[test]
    fn check_coordinates_reports_unclippable_vertices() {
        let ok = Quad::from_coords([0.0, 0.0, 4e18, 0.0, 4e18, 4e18, 0.0, 4e18], 1.0);
        assert_eq!(ok.check_coordinates(0), Ok(()));

        let mut coords = ok.coords();
        coords[5] = COORDINATE_LIMIT;
        assert_eq!(
            Quad::from_coords(coords, 1.0).check_coordinates(3),
            Err(LanmsError::CoordinateOutOfRange { index: 3 })
        );

        coords[5] = f64::NAN;
        assert_eq!(
            Quad::from_coords(coords, 1.0).check_coordinates(1),
            Err(LanmsError::NonFiniteCoordinate { index: 1 })
        );
    }

    #[test]
    fn unclippable_quads_have_no_clipper_polygon() {
        let huge = Quad::from_coords([0.0, 0.0, 5e18, 0.0, 5e18, 5e18, 0.0, 5e18], 1.0);
        assert!(huge.to_clipper_polygon().is_none());

        let nan = Quad::from_coords([f64::NAN, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0], 1.0);
        assert!(nan.to_clipper_polygon().is_none());
    }

    #[test]
    fn clipper_polygon_is_closed_and_rounded() {
        let q = Quad::from_coords([0.4, 0.6, 9.5, 0.0, 9.5, 9.5, 0.0, 9.5], 1.0);
        let poly = q.to_clipper_polygon().expect("in range");
        let ring: Vec<_> = poly.exterior().coords().copied().collect();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], Coord { x: 0, y: 1 });
        assert_eq!(ring[1], Coord { x: 10, y: 0 });
        assert_eq!(ring.first(), ring.last());
    }
}
