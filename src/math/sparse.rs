//! Sparse assembly of the warping stiffness
//!
//! Each Q9 cell couples only its 9 nodes, so the warping stiffness is
//! assembled in COO form and compressed once before the solve.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Sparse matrix builder using COO format
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new square builder
    pub fn new(size: usize) -> Self {
        // A Q9 node couples to at most 25 neighbours
        let estimated_nnz = size * 25;
        Self {
            size,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Scatter a dense cell matrix onto global node indices
    pub fn add_element_matrix<const N: usize>(&mut self, nodes: &[usize; N], k_elem: &[[f64; N]; N]) {
        for (i, &ni) in nodes.iter().enumerate() {
            for (j, &nj) in nodes.iter().enumerate() {
                self.add(ni, nj, k_elem[i][j]);
            }
        }
    }

    /// Fill row and column `index` with ones over `0..index`, leaving the
    /// diagonal empty. Used for the zero-mean Lagrange multiplier.
    pub fn add_constraint_border(&mut self, index: usize) {
        for i in 0..index {
            self.entries.push((index, i, 1.0));
            self.entries.push((i, index, 1.0));
        }
    }

    /// Convert to CSR format; duplicate entries are summed
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        CsrMatrix::from(&coo)
    }

    /// Convert to a dense matrix for the SVD
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);

        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }

        mat
    }

    /// Number of stored (uncompressed) entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Sparse matrix-vector multiplication
pub fn sparse_matvec(csr: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let n = csr.nrows();
    let mut y = DVector::zeros(n);

    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    for row in 0..n {
        let start = row_offsets[row];
        let end = row_offsets[row + 1];

        let mut sum = 0.0;
        for idx in start..end {
            sum += values[idx] * x[col_indices[idx]];
        }
        y[row] = sum;
    }

    y
}
