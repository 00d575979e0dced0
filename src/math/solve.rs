//! SVD pseudo-inverse for the Lagrange-augmented warping system
//!
//! The augmented matrix is square but not always regular: the reduced
//! quadrature leaves a spurious zero-energy mode, and disconnected meshes
//! add one rigid warping mode per extra component. The pseudo-inverse
//! stays bounded in every case; the spectrum summary is kept so callers can
//! judge the quality of the solve.

use nalgebra::{DMatrix, DVector};

use crate::error::{SectionError, SectionResult};

/// Pseudo-inverse of a square matrix together with its spectrum summary
#[derive(Debug, Clone)]
pub struct PseudoInverse {
    inverse: DMatrix<f64>,
    /// Largest over smallest retained singular value
    pub condition_number: f64,
    /// Number of singular values above the cutoff
    pub rank: usize,
    /// Matrix dimension
    pub size: usize,
}

impl PseudoInverse {
    /// Compute the pseudo-inverse of `matrix`
    ///
    /// # Arguments
    /// * `matrix` - Square matrix to invert
    /// * `relative_tolerance` - Singular values below `tol * sigma_max` are treated as zero
    pub fn compute(matrix: DMatrix<f64>, relative_tolerance: f64) -> SectionResult<Self> {
        let size = matrix.nrows();
        if size == 0 || matrix.ncols() != size {
            return Err(SectionError::ShearSolveFailed(format!(
                "expected a non-empty square matrix, got {}x{}",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(SectionError::NonFiniteResult(
                "warping stiffness contains NaN or Inf".to_string(),
            ));
        }

        let svd = matrix.svd(true, true);
        let sigma = svd.singular_values.clone();
        let sigma_max = sigma.max();
        if !(sigma_max > 0.0) {
            return Err(SectionError::ShearSolveFailed(
                "warping stiffness is identically zero".to_string(),
            ));
        }

        let cutoff = relative_tolerance * sigma_max;
        let retained: Vec<f64> = sigma.iter().copied().filter(|&s| s > cutoff).collect();
        let rank = retained.len();
        let sigma_min = retained.iter().copied().fold(f64::INFINITY, f64::min);
        let condition_number = sigma_max / sigma_min;

        let inverse = svd
            .pseudo_inverse(cutoff)
            .map_err(|e| SectionError::ShearSolveFailed(e.to_string()))?;

        Ok(Self {
            inverse,
            condition_number,
            rank,
            size,
        })
    }

    /// Whether every singular value survived the cutoff
    pub fn is_full_rank(&self) -> bool {
        self.rank == self.size
    }

    /// Dimension of the numerical nullspace
    pub fn nullity(&self) -> usize {
        self.size - self.rank
    }

    /// Apply the pseudo-inverse to a right-hand side
    pub fn apply(&self, rhs: &DVector<f64>) -> DVector<f64> {
        &self.inverse * rhs
    }
}
