//! Small dense linear algebra helpers.
//!
//! Matrices are row-major `Vec<Vec<f64>>`; asset counts stay in the low
//! tens, so plain loops beat any BLAS call overhead here.

use crate::core::error::{AllocError, Result};

/// Guard added to denominators and variance floors.
pub const EPSILON: f64 = 1e-12;

/// Absolute tolerance used for the covariance symmetry check.
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Dot product of two equal-length slices.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Quadratic form `v' * m * v` (portfolio variance when `m` is a covariance).
pub fn quadratic_form(m: &[Vec<f64>], v: &[f64]) -> f64 {
    let mut sum = 0.0;
    for (i, row) in m.iter().enumerate() {
        sum += v[i] * dot(row, v);
    }
    sum
}

/// Euclidean distance between two vectors.
pub fn l2_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Convert a covariance matrix into a correlation matrix.
///
/// Near-zero variances are floored at [`EPSILON`] and denominators carry an
/// additional [`EPSILON`], so a degenerate asset yields finite entries.
pub fn covariance_to_correlation(cov: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = cov.len();
    let sd: Vec<f64> = (0..n).map(|i| cov[i][i].max(EPSILON).sqrt()).collect();

    let mut corr = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            corr[i][j] = cov[i][j] / (sd[i] * sd[j] + EPSILON);
        }
    }
    corr
}

/// Validate a covariance matrix against the expected dimension.
///
/// Checks squareness, finiteness, symmetry and non-negative diagonal.
pub fn validate_covariance(cov: &[Vec<f64>], n: usize) -> Result<()> {
    if cov.len() != n {
        return Err(AllocError::length_mismatch("covariance rows", n, cov.len()));
    }

    for (i, row) in cov.iter().enumerate() {
        if row.len() != n {
            return Err(AllocError::NonSquareMatrix {
                row: i,
                expected: n,
                actual: row.len(),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(AllocError::non_finite(format!("covariance row {}", i)));
        }
    }

    for i in 0..n {
        if cov[i][i] < 0.0 {
            return Err(AllocError::NegativeVariance {
                index: i,
                value: cov[i][i],
            });
        }
        for j in (i + 1)..n {
            if (cov[i][j] - cov[j][i]).abs() > SYMMETRY_TOLERANCE {
                return Err(AllocError::NonSymmetricMatrix {
                    row: i,
                    col: j,
                    upper: cov[i][j],
                    lower: cov[j][i],
                });
            }
        }
    }

    Ok(())
}
