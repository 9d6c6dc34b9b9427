//! Correlation matrices with Cholesky decomposition.
//!
//! Given `n` independent standard normal random variables `Z`, correlated
//! normals are obtained as
//!
//! ```text
//! W = L * Z
//! ```
//!
//! where `L` is the lower triangular Cholesky factor of the correlation
//! matrix `C = L * L^T`.
//!
//! ## Usage
//!
//! ```
//! use pricer_core::math::CorrelationMatrix;
//!
//! // 2x2 correlation matrix with rho = 0.5
//! let corr = CorrelationMatrix::new(&[
//!     1.0, 0.5,
//!     0.5, 1.0,
//! ], 2).unwrap();
//!
//! let cholesky = corr.cholesky().unwrap();
//! let w = cholesky.transform(&[0.5, 0.8]);
//! assert_eq!(w.len(), 2);
//! assert_eq!(w[0], 0.5);
//! ```

use thiserror::Error;

use super::matrix::Matrix;
use crate::types::SimulationError;

/// Tolerance used for the unit-diagonal and symmetry checks.
const TOLERANCE: f64 = 1e-10;

/// Error types for correlation operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorrelationError {
    /// Matrix is not positive definite
    #[error("Correlation matrix is not positive definite")]
    NotPositiveDefinite,

    /// Matrix dimensions are invalid
    #[error("Invalid matrix dimensions: expected {expected} elements, got {got}")]
    InvalidDimensions {
        /// Expected number of elements
        expected: usize,
        /// Actual number of elements
        got: usize,
    },

    /// Diagonal elements are not 1.0
    #[error("Diagonal element at index {index} is {value}, expected 1.0")]
    InvalidDiagonal {
        /// Diagonal index
        index: usize,
        /// Offending value
        value: f64,
    },

    /// Matrix is not symmetric
    #[error("Matrix is not symmetric at ({i}, {j})")]
    NotSymmetric {
        /// Row
        i: usize,
        /// Column
        j: usize,
    },

    /// Correlation value out of range [-1, 1]
    #[error("Correlation at ({i}, {j}) is {value}, must be in [-1, 1]")]
    OutOfRange {
        /// Row
        i: usize,
        /// Column
        j: usize,
        /// Offending value
        value: f64,
    },
}

/// Correlation matrix with validation and Cholesky decomposition.
///
/// A correlation matrix must satisfy:
/// - Square and symmetric
/// - Diagonal elements equal to 1.0
/// - Off-diagonal elements in [-1, 1]
/// - Positive definite (checked by [`CorrelationMatrix::cholesky`])
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix {
    /// Matrix elements in row-major order
    data: Vec<f64>,
    /// Matrix dimension (n x n)
    dim: usize,
}

impl CorrelationMatrix {
    /// Create a new correlation matrix from a flat row-major array.
    ///
    /// # Validation
    ///
    /// - Must have exactly `dim * dim` elements
    /// - Diagonal elements must be 1.0
    /// - Must be symmetric
    /// - Off-diagonal elements must be finite and in [-1, 1]
    pub fn new(data: &[f64], dim: usize) -> Result<Self, CorrelationError> {
        let expected = dim * dim;
        if data.len() != expected {
            return Err(CorrelationError::InvalidDimensions {
                expected,
                got: data.len(),
            });
        }

        for i in 0..dim {
            let diag = data[i * dim + i];
            if !((diag - 1.0).abs() <= TOLERANCE) {
                return Err(CorrelationError::InvalidDiagonal {
                    index: i,
                    value: diag,
                });
            }
        }

        for i in 0..dim {
            for j in (i + 1)..dim {
                let val_ij = data[i * dim + j];
                let val_ji = data[j * dim + i];

                if !(-1.0..=1.0).contains(&val_ij) {
                    return Err(CorrelationError::OutOfRange {
                        i,
                        j,
                        value: val_ij,
                    });
                }
                if !((val_ij - val_ji).abs() <= TOLERANCE) {
                    return Err(CorrelationError::NotSymmetric { i, j });
                }
            }
        }

        Ok(Self {
            data: data.to_vec(),
            dim,
        })
    }

    /// Create a correlation matrix from nested rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, CorrelationError> {
        let dim = rows.len();
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::new(&flat, dim)
    }

    /// Create an identity correlation matrix (no correlation).
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { data, dim }
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at (i, j).
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// Compute the Cholesky decomposition (lower triangular `L` with `C = L * L^T`).
    ///
    /// # Errors
    ///
    /// [`CorrelationError::NotPositiveDefinite`] when a pivot is not strictly
    /// positive, which includes singular matrices such as perfect correlation.
    pub fn cholesky(&self) -> Result<CholeskyFactor, CorrelationError> {
        let n = self.dim;
        let mut lower = vec![0.0; n * n];

        for i in 0..n {
            for j in 0..=i {
                if j == i {
                    let sum: f64 = (0..j).map(|k| lower[j * n + k] * lower[j * n + k]).sum();
                    let diag = self.get(j, j) - sum;
                    if diag <= TOLERANCE {
                        return Err(CorrelationError::NotPositiveDefinite);
                    }
                    lower[j * n + j] = diag.sqrt();
                } else {
                    let sum: f64 = (0..j).map(|k| lower[i * n + k] * lower[j * n + k]).sum();
                    lower[i * n + j] = (self.get(i, j) - sum) / lower[j * n + j];
                }
            }
        }

        Ok(CholeskyFactor { data: lower, dim: n })
    }
}

/// Lower triangular Cholesky factor of a correlation matrix.
///
/// Used to transform independent standard normals into correlated normals.
#[derive(Clone, Debug, PartialEq)]
pub struct CholeskyFactor {
    /// Lower triangular matrix elements (row-major)
    data: Vec<f64>,
    /// Matrix dimension
    dim: usize,
}

impl CholeskyFactor {
    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at (i, j); zero above the diagonal.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if j > i {
            0.0
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Transform one vector of independent standard normals.
    ///
    /// # Panics
    ///
    /// Panics if `z.len() < self.dim()`.
    pub fn transform(&self, z: &[f64]) -> Vec<f64> {
        assert!(
            z.len() >= self.dim,
            "Input vector length {} is less than matrix dimension {}",
            z.len(),
            self.dim
        );

        (0..self.dim)
            .map(|i| (0..=i).map(|j| self.get(i, j) * z[j]).sum())
            .collect()
    }

    /// Correlate a whole `dim × n_sims` noise matrix, one column per path.
    ///
    /// Computes `L · raw` row by row so that every path keeps its own column.
    ///
    /// # Errors
    ///
    /// [`SimulationError::ShapeMismatch`] if `raw` does not have `dim` rows.
    pub fn correlate(&self, raw: &Matrix) -> Result<Matrix, SimulationError> {
        if raw.rows() != self.dim {
            return Err(SimulationError::ShapeMismatch {
                expected: self.dim,
                got: raw.rows(),
            });
        }

        let mut out = Matrix::zeros(raw.rows(), raw.cols());
        for i in 0..self.dim {
            let target = out.row_mut(i);
            for j in 0..=i {
                let l_ij = self.get(i, j);
                if l_ij == 0.0 {
                    continue;
                }
                for (w, &z) in target.iter_mut().zip(raw.row(j)) {
                    *w += l_ij * z;
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_cholesky_is_identity() {
        let chol = CorrelationMatrix::identity(3).cholesky().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(chol.get(i, j), if i == j { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn test_two_by_two_factor() {
        let rho: f64 = 0.6;
        let corr = CorrelationMatrix::new(&[1.0, rho, rho, 1.0], 2).unwrap();
        let chol = corr.cholesky().unwrap();

        assert_relative_eq!(chol.get(0, 0), 1.0);
        assert_relative_eq!(chol.get(1, 0), rho);
        assert_relative_eq!(chol.get(1, 1), (1.0 - rho * rho).sqrt());
        assert_eq!(chol.get(0, 1), 0.0);
    }

    #[test]
    fn test_factor_reconstructs_matrix() {
        let data = [1.0, 0.3, -0.2, 0.3, 1.0, 0.5, -0.2, 0.5, 1.0];
        let corr = CorrelationMatrix::new(&data, 3).unwrap();
        let chol = corr.cholesky().unwrap();

        for i in 0..3 {
            for j in 0..3 {
                let llt: f64 = (0..3).map(|k| chol.get(i, k) * chol.get(j, k)).sum();
                assert_relative_eq!(llt, corr.get(i, j), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_invalid_dimensions() {
        let err = CorrelationMatrix::new(&[1.0, 0.5, 0.5], 2).unwrap_err();
        assert_eq!(
            err,
            CorrelationError::InvalidDimensions {
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn test_invalid_diagonal() {
        let err = CorrelationMatrix::new(&[0.9, 0.0, 0.0, 1.0], 2).unwrap_err();
        assert!(matches!(err, CorrelationError::InvalidDiagonal { index: 0, .. }));
    }

    #[test]
    fn test_not_symmetric() {
        let err = CorrelationMatrix::new(&[1.0, 0.5, 0.4, 1.0], 2).unwrap_err();
        assert_eq!(err, CorrelationError::NotSymmetric { i: 0, j: 1 });
    }

    #[test]
    fn test_out_of_range_and_nan() {
        let err = CorrelationMatrix::new(&[1.0, 1.5, 1.5, 1.0], 2).unwrap_err();
        assert!(matches!(err, CorrelationError::OutOfRange { i: 0, j: 1, .. }));

        let err = CorrelationMatrix::new(&[1.0, f64::NAN, f64::NAN, 1.0], 2).unwrap_err();
        assert!(matches!(err, CorrelationError::OutOfRange { .. }));
    }

    #[test]
    fn test_not_positive_definite() {
        // Pairwise valid, jointly inconsistent.
        let data = [1.0, 0.9, -0.9, 0.9, 1.0, 0.9, -0.9, 0.9, 1.0];
        let corr = CorrelationMatrix::new(&data, 3).unwrap();
        assert_eq!(corr.cholesky(), Err(CorrelationError::NotPositiveDefinite));

        // Perfect correlation is singular.
        let corr = CorrelationMatrix::new(&[1.0, 1.0, 1.0, 1.0], 2).unwrap();
        assert_eq!(corr.cholesky(), Err(CorrelationError::NotPositiveDefinite));
    }

    #[test]
    fn test_correlate_matches_transform_per_column() {
        let corr = CorrelationMatrix::from_rows(&[vec![1.0, 0.7], vec![0.7, 1.0]]).unwrap();
        let chol = corr.cholesky().unwrap();
        let raw = Matrix::from_rows(vec![vec![0.1, -1.2, 2.0], vec![0.4, 0.3, -0.5]]).unwrap();

        let out = chol.correlate(&raw).unwrap();
        for col in 0..3 {
            let w = chol.transform(&[raw.get(0, col), raw.get(1, col)]);
            assert_relative_eq!(out.get(0, col), w[0]);
            assert_relative_eq!(out.get(1, col), w[1]);
        }
    }

    #[test]
    fn test_correlate_rejects_wrong_row_count() {
        let chol = CorrelationMatrix::identity(2).cholesky().unwrap();
        let raw = Matrix::zeros(3, 4);
        assert!(matches!(
            chol.correlate(&raw),
            Err(SimulationError::ShapeMismatch { expected: 2, got: 3 })
        ));
    }
}
