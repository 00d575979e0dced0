//! Mathematical utilities for section integration
//!
//! Holds the biquadratic Q9 basis, the 2x2 Gauss rule and the isoparametric
//! Jacobian helpers shared by the area and shear integrals.

pub mod solve;
pub mod sparse;

use nalgebra::{Matrix3, SMatrix};

pub use solve::PseudoInverse;
pub use sparse::{sparse_matvec, SparseMatrixBuilder};

pub type Mat3 = Matrix3<f64>;

/// 6x6 block for the nodal offset of one element end
pub type Mat6 = SMatrix<f64, 6, 6>;
/// 12x12 matrix for element end DOF transforms
pub type Mat12 = SMatrix<f64, 12, 12>;

/// Number of nodes of a Q9 cell
pub const Q9_NODES: usize = 9;

/// Q9 node positions in natural coordinates.
///
/// ```text
///  3----6----2
///  |         |
///  7    8    5
///  |         |
///  0----4----1
/// ```
pub const Q9_NODE_COORDS: [(f64, f64); Q9_NODES] = [
    (-1.0, -1.0),
    (1.0, -1.0),
    (1.0, 1.0),
    (-1.0, 1.0),
    (0.0, -1.0),
    (1.0, 0.0),
    (0.0, 1.0),
    (-1.0, 0.0),
    (0.0, 0.0),
];

/// 1D quadratic Lagrange polynomial through -1, 0, 1 and its derivative
#[inline]
fn lagrange_1d(node: f64, x: f64) -> (f64, f64) {
    if node < -0.5 {
        (0.5 * x * (x - 1.0), x - 0.5)
    } else if node > 0.5 {
        (0.5 * x * (x + 1.0), x + 0.5)
    } else {
        (1.0 - x * x, -2.0 * x)
    }
}

/// Biquadratic Q9 shape functions at natural coordinates (ksi, eta)
///
/// # Returns
/// `(phi, dphi)` where `dphi[0]` holds derivatives w.r.t. ksi and
/// `dphi[1]` derivatives w.r.t. eta
pub fn shape_function(ksi: f64, eta: f64) -> ([f64; Q9_NODES], [[f64; Q9_NODES]; 2]) {
    let mut phi = [0.0; Q9_NODES];
    let mut dphi = [[0.0; Q9_NODES]; 2];

    for (i, &(ksi_i, eta_i)) in Q9_NODE_COORDS.iter().enumerate() {
        let (lk, dlk) = lagrange_1d(ksi_i, ksi);
        let (le, dle) = lagrange_1d(eta_i, eta);
        phi[i] = lk * le;
        dphi[0][i] = dlk * le;
        dphi[1][i] = lk * dle;
    }

    (phi, dphi)
}

/// 2x2 Gauss rule on [-1, 1]²
///
/// # Returns
/// Four `(ksi, eta)` points at ±1/√3 and their unit weights
pub fn gauss_quadrature_2d() -> ([[f64; 2]; 4], [f64; 4]) {
    let c = 1.0 / 3.0_f64.sqrt();
    let points = [[-c, -c], [c, -c], [c, c], [-c, c]];
    (points, [1.0; 4])
}

/// Isoparametric mapping of one Q9 cell evaluated at a Gauss point
#[derive(Debug, Clone, Copy)]
pub struct CellPoint {
    /// Shape function values
    pub phi: [f64; Q9_NODES],
    /// Physical gradients: `dphig[0]` = d/dy, `dphig[1]` = d/dz
    pub dphig: [[f64; Q9_NODES]; 2],
    /// Jacobian determinant
    pub det_jacobian: f64,
    /// Interpolated physical `y`
    pub y: f64,
    /// Interpolated physical `z`
    pub z: f64,
}

impl CellPoint {
    /// Evaluate the mapping of `coords` at natural coordinates (ksi, eta)
    ///
    /// Returns `None` if the Jacobian determinant is not strictly positive.
    pub fn evaluate(coords: &[[f64; 2]; Q9_NODES], ksi: f64, eta: f64) -> Option<Self> {
        let (phi, dphi) = shape_function(ksi, eta);

        // J = dphi @ coords
        let mut jac = [[0.0; 2]; 2];
        let mut y = 0.0;
        let mut z = 0.0;
        for i in 0..Q9_NODES {
            jac[0][0] += dphi[0][i] * coords[i][0];
            jac[0][1] += dphi[0][i] * coords[i][1];
            jac[1][0] += dphi[1][i] * coords[i][0];
            jac[1][1] += dphi[1][i] * coords[i][1];
            y += phi[i] * coords[i][0];
            z += phi[i] * coords[i][1];
        }

        let det_jacobian = jac[0][0] * jac[1][1] - jac[0][1] * jac[1][0];
        if !(det_jacobian > 0.0) {
            return None;
        }

        let inv = [
            [jac[1][1] / det_jacobian, -jac[0][1] / det_jacobian],
            [-jac[1][0] / det_jacobian, jac[0][0] / det_jacobian],
        ];

        let mut dphig = [[0.0; Q9_NODES]; 2];
        for i in 0..Q9_NODES {
            dphig[0][i] = inv[0][0] * dphi[0][i] + inv[0][1] * dphi[1][i];
            dphig[1][i] = inv[1][0] * dphi[0][i] + inv[1][1] * dphi[1][i];
        }

        Some(Self {
            phi,
            dphig,
            det_jacobian,
            y,
            z,
        })
    }

    /// Physical gradient of a nodal field sampled on the cell
    pub fn gradient(&self, values: &[f64; Q9_NODES]) -> [f64; 2] {
        let mut g = [0.0; 2];
        for i in 0..Q9_NODES {
            g[0] += self.dphig[0][i] * values[i];
            g[1] += self.dphig[1][i] * values[i];
        }
        g
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shape_function_partition_of_unity() {
        for &(ksi, eta) in &[(0.3, -0.7), (-1.0, 1.0), (0.0, 0.0), (0.77, 0.12)] {
            let (phi, dphi) = shape_function(ksi, eta);
            assert_relative_eq!(phi.iter().sum::<f64>(), 1.0, epsilon = 1e-14);
            assert_relative_eq!(dphi[0].iter().sum::<f64>(), 0.0, epsilon = 1e-14);
            assert_relative_eq!(dphi[1].iter().sum::<f64>(), 0.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_shape_function_kronecker_delta() {
        for (j, &(ksi, eta)) in Q9_NODE_COORDS.iter().enumerate() {
            let (phi, _) = shape_function(ksi, eta);
            for (i, &value) in phi.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(value, expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_gauss_rule_integrates_cubic() {
        // ∫∫ (ksi³ + ksi² eta²) over [-1,1]² = 0 + 4/9
        let (points, weights) = gauss_quadrature_2d();
        let sum: f64 = points
            .iter()
            .zip(weights.iter())
            .map(|(p, w)| w * (p[0].powi(3) + p[0].powi(2) * p[1].powi(2)))
            .sum();
        assert_relative_eq!(sum, 4.0 / 9.0, epsilon = 1e-14);
    }

    #[test]
    fn test_cell_point_on_scaled_square() {
        // Square [0,2] x [0,4]
        let mut coords = [[0.0; 2]; Q9_NODES];
        for (i, &(k, e)) in Q9_NODE_COORDS.iter().enumerate() {
            coords[i] = [1.0 + k, 2.0 + 2.0 * e];
        }
        let p = CellPoint::evaluate(&coords, 0.5, -0.5).unwrap();
        assert_relative_eq!(p.det_jacobian, 2.0, epsilon = 1e-14);
        assert_relative_eq!(p.y, 1.5, epsilon = 1e-14);
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-14);

        // Gradient of the field f = y recovered exactly
        let values: [f64; Q9_NODES] = std::array::from_fn(|i| coords[i][0]);
        let g = p.gradient(&values);
        assert_relative_eq!(g[0], 1.0, epsilon = 1e-14);
        assert_relative_eq!(g[1], 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_reduced_rule_zero_energy_mode() {
        // Nodal pattern of (3 ksi^2 - 1)(3 eta^2 - 1): flat at every Gauss point
        let mode: [f64; Q9_NODES] = std::array::from_fn(|i| {
            let (k, e) = Q9_NODE_COORDS[i];
            (3.0 * k * k - 1.0) * (3.0 * e * e - 1.0)
        });
        let mut coords = [[0.0; 2]; Q9_NODES];
        for (i, &(k, e)) in Q9_NODE_COORDS.iter().enumerate() {
            coords[i] = [3.0 * k, 0.5 * e];
        }
        let (points, _) = gauss_quadrature_2d();
        for point in points {
            let p = CellPoint::evaluate(&coords, point[0], point[1]).unwrap();
            let g = p.gradient(&mode);
            assert!(g[0].abs() < 1e-12 && g[1].abs() < 1e-12);
            let value: f64 = p.phi.iter().zip(mode.iter()).map(|(a, b)| a * b).sum();
            assert!(value.abs() < 1e-12);
        }
    }

    #[test]
    fn test_inverted_cell_rejected() {
        let mut coords = [[0.0; 2]; Q9_NODES];
        for (i, &(k, e)) in Q9_NODE_COORDS.iter().enumerate() {
            coords[i] = [-k, e];
        }
        assert!(CellPoint::evaluate(&coords, 0.0, 0.0).is_none());
    }
}
