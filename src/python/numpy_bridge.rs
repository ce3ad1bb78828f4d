//! Conversions between numpy arrays and allocator inputs.

use numpy::{PyArray1, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Copy a 1-D numpy array into a Vec<f64>.
pub fn numpy_to_vec_f64(arr: PyReadonlyArray1<f64>) -> PyResult<Vec<f64>> {
    arr.as_slice()
        .map(|s| s.to_vec())
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Copy a 2-D numpy array into row vectors.
pub fn numpy_to_matrix_f64(arr: PyReadonlyArray2<f64>) -> Vec<Vec<f64>> {
    arr.as_array()
        .outer_iter()
        .map(|row| row.to_vec())
        .collect()
}

pub fn vec_to_numpy_f64<'py>(py: Python<'py>, vec: Vec<f64>) -> &'py PyArray1<f64> {
    PyArray1::from_vec(py, vec)
}
