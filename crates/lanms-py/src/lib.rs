use lanms::{LanmsParams, MergeReference, ROW_LEN};
use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn value_error(message: impl Into<String>) -> PyErr {
    PyValueError::new_err(message.into())
}

fn parse_reference(name: &str) -> PyResult<MergeReference> {
    match name {
        "merged_view" => Ok(MergeReference::MergedView),
        "last_member" => Ok(MergeReference::LastMember),
        other => Err(value_error(format!(
            "reference must be 'merged_view' or 'last_member' (got {other:?})"
        ))),
    }
}

/// Locality-aware NMS over an `(N, 9)` float32 array of
/// `x0 y0 x1 y1 x2 y2 x3 y3 score` rows.
///
/// `nms_thres` defaults to `thres`. Returns an `(M, 9)` float32 array.
#[pyfunction]
#[pyo3(signature = (polys, thres=0.3, precision=10000.0, nms_thres=None, reference="merged_view"))]
fn merge_quadrangle_n9<'py>(
    py: Python<'py>,
    polys: PyReadonlyArray2<'py, f32>,
    thres: f32,
    precision: f32,
    nms_thres: Option<f32>,
    reference: &str,
) -> PyResult<Bound<'py, PyArray2<f32>>> {
    if polys.shape()[1] != ROW_LEN {
        return Err(value_error(format!(
            "polys must have shape (N, {ROW_LEN}), got {:?}",
            polys.shape()
        )));
    }
    let params = LanmsParams {
        merge_threshold: thres,
        nms_threshold: nms_thres.unwrap_or(thres),
        precision,
        reference: parse_reference(reference)?,
    };

    // Row-major copy regardless of the input strides.
    let data: Vec<f32> = polys.as_array().iter().copied().collect();
    let rows = lanms::merge_quadrangle_n9(&data, &params)
        .map_err(|err| value_error(err.to_string()))?;

    let n = rows.len();
    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    let out = Array2::from_shape_vec((n, ROW_LEN), flat)
        .map_err(|err| value_error(err.to_string()))?;
    Ok(out.into_pyarray(py))
}

/// IoU of two quads given as 8 pixel coordinates each.
#[pyfunction]
#[pyo3(signature = (a, b, precision=10000.0))]
fn quad_iou(a: [f32; 8], b: [f32; 8], precision: f32) -> PyResult<f32> {
    if !precision.is_finite() || precision <= 0.0 {
        return Err(value_error(format!("precision must be positive (got {precision})")));
    }
    let row = |c: [f32; 8]| {
        let mut r = [0.0_f32; ROW_LEN];
        r[..8].copy_from_slice(&c);
        r
    };
    let quads = lanms::quads_from_rows(&[row(a), row(b)].concat(), precision)
        .map_err(|err| value_error(err.to_string()))?;
    Ok(lanms::quad_iou(&quads[0], &quads[1]))
}

#[pymodule]
fn _lanms(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(merge_quadrangle_n9, m)?)?;
    m.add_function(wrap_pyfunction!(quad_iou, m)?)?;
    Ok(())
}
