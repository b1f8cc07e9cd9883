//! Flat `N x 9` row buffers (`x0 y0 x1 y1 x2 y2 x3 y3 score`).
//!
//! Row coordinates are in pixels. On the way in they are multiplied by the
//! fixed-point `precision` and truncated toward zero; on the way out they are
//! divided by it again.

use crate::core::{merge_quadrilaterals_standard, LanmsError, LanmsParams, Quad};

/// Number of values per candidate row.
pub const ROW_LEN: usize = 9;

pub type Row = [f32; ROW_LEN];

/// Decode a row-major buffer into fixed-point quads.
///
/// Scaled coordinates must stay finite and below
/// [`COORDINATE_LIMIT`](crate::core::COORDINATE_LIMIT) in magnitude.
pub fn quads_from_rows(data: &[f32], precision: f32) -> Result<Vec<Quad>, LanmsError> {
    if data.len() % ROW_LEN != 0 {
        return Err(LanmsError::MalformedRow { len: data.len() });
    }
    data.chunks_exact(ROW_LEN)
        .enumerate()
        .map(|(index, row)| quad_from_row(index, row, precision))
        .collect()
}

fn quad_from_row(index: usize, row: &[f32], precision: f32) -> Result<Quad, LanmsError> {
    let score = row[8];
    if !score.is_finite() || score < 0.0 {
        return Err(LanmsError::InvalidScore { index, score });
    }
    let mut coords = [0.0_f64; 8];
    for (dst, &v) in coords.iter_mut().zip(&row[..8]) {
        *dst = (v * precision).trunc() as f64;
    }
    let quad = Quad::from_coords(coords, score);
    quad.check_coordinates(index)?;
    Ok(quad)
}

/// Encode quads back into pixel-space rows.
pub fn quads_to_rows(quads: &[Quad], precision: f32) -> Vec<Row> {
    let precision = precision as f64;
    quads
        .iter()
        .map(|q| {
            let c = q.coords();
            let mut row = [0.0_f32; ROW_LEN];
            for (dst, v) in row.iter_mut().zip(c.iter()) {
                *dst = (v / precision) as f32;
            }
            row[8] = q.score;
            row
        })
        .collect()
}

/// Locality-aware NMS over a flat row buffer.
///
/// `data` holds `N * 9` values; the result holds one row per surviving
/// (possibly merged) quad, with merged scores summed.
pub fn merge_quadrangle_n9(data: &[f32], params: &LanmsParams) -> Result<Vec<Row>, LanmsError> {
    params.validate()?;
    let quads = quads_from_rows(data, params.precision)?;
    let kept = merge_quadrilaterals_standard(&quads, params)?;
    Ok(quads_to_rows(&kept, params.precision))
}
