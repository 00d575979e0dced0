//! Shear correction factors and shear centre from warping functions
//!
//! The shear warping functions `psi_y`, `psi_z` solve a Neumann problem on
//! the section. The pure Neumann stiffness is singular (constant warping is
//! free), so one Lagrange multiplier row and column of ones is appended to
//! enforce zero-mean warping and the augmented system is solved through its
//! SVD pseudo-inverse.
//!
//! The 2x2 rule under-integrates the Q9 stiffness: the nodal pattern
//! `(3 ksi^2 - 1)(3 eta^2 - 1)` has zero gradient at every Gauss point and
//! is shared by all cells, so the augmented matrix keeps exactly one null
//! direction. The load vectors are orthogonal to it and every integrated
//! quantity only sees gradients at Gauss points, so the minimum-norm
//! solution is unaffected. Only extra null directions signal a bad mesh.
//!
//! All integrands use coordinates relative to the centroid; the resulting
//! shear centre is shifted back into the mesh frame.

use nalgebra::DVector;

use crate::analysis::EngineOptions;
use crate::error::{SectionError, SectionResult};
use crate::math::{gauss_quadrature_2d, sparse_matvec, CellPoint, PseudoInverse, SparseMatrixBuilder, Q9_NODES};
use crate::mesh::{Mesh, MAX_MESH_NODES};
use crate::properties::area::inverted_cell;
use crate::results::{AreaProperties, SectionWarning, ShearProperties};

/// Shear properties together with any solve diagnostics
#[derive(Debug, Clone, Copy)]
pub struct ShearOutcome {
    pub properties: ShearProperties,
    pub warning: Option<SectionWarning>,
}

/// Poisson coupling terms at a point with centroidal coordinates (y, z)
///
/// Returns `([d1, d2], [h1, h2])` for the y and z shear problems.
fn poisson_terms(y: f64, z: f64, iy: f64, iz: f64, iyz: f64) -> ([f64; 2], [f64; 2]) {
    let r = y * y - z * z;
    let q = 2.0 * y * z;
    (
        [iy * r - iyz * q, iyz * r + iy * q],
        [-iyz * r + iz * q, -iz * r - iyz * q],
    )
}

/// Null directions of a sound augmented system under the 2x2 rule
const REDUCED_RULE_NULLITY: usize = 1;

/// Extend a nodal vector with the zero Lagrange entry
fn augmented(v: &DVector<f64>) -> DVector<f64> {
    let n = v.len();
    DVector::from_fn(n + 1, |i, _| if i < n { v[i] } else { 0.0 })
}

/// Solve the warping problem and integrate shear properties
///
/// # Arguments
/// * `mesh` - Meshed section
/// * `area` - Area properties of the same mesh
/// * `poisson_ratio` - Poisson's ratio of the material
/// * `options` - Pseudo-inverse cutoff and degeneracy threshold
pub fn shear_properties(
    mesh: &Mesh,
    area: &AreaProperties,
    poisson_ratio: f64,
    options: &EngineOptions,
) -> SectionResult<ShearOutcome> {
    let nu = poisson_ratio;
    let ngl = mesh.node_count();
    if ngl > MAX_MESH_NODES {
        return Err(SectionError::InvalidMesh(format!(
            "{} nodes exceed the dense warping solve limit of {}",
            ngl, MAX_MESH_NODES
        )));
    }
    let (iy, iz, iyz) = area.centroidal_moments();
    let (yc, zc) = (area.y_centroid, area.z_centroid);

    let ccg = 2.0 * (1.0 + nu) * (iy * iz - iyz * iyz);
    if !(ccg.is_finite() && ccg > 0.0) {
        return Err(SectionError::DegenerateSection(format!(
            "shear normalisation 2(1+nu)(Iy*Iz - Iyz^2) is {}",
            ccg
        )));
    }

    let (points, weights) = gauss_quadrature_2d();

    let mut fy = DVector::<f64>::zeros(ngl);
    let mut fz = DVector::<f64>::zeros(ngl);
    let mut ft = DVector::<f64>::zeros(ngl);
    let mut k_lg = SparseMatrixBuilder::new(ngl + 1);

    for cell in 0..mesh.cell_count() {
        let coords = mesh.cell_coords(cell);
        let nodes = mesh.connectivity[cell];
        let mut ke = [[0.0; Q9_NODES]; Q9_NODES];

        for (point, &weight) in points.iter().zip(weights.iter()) {
            let gp = CellPoint::evaluate(&coords, point[0], point[1])
                .ok_or_else(|| inverted_cell(cell))?;
            let da = gp.det_jacobian * weight;
            let (y, z) = (gp.y - yc, gp.z - zc);
            let (d, h) = poisson_terms(y, z, iy, iz, iyz);
            let dphig = &gp.dphig;

            for i in 0..Q9_NODES {
                for j in 0..Q9_NODES {
                    ke[i][j] += (dphig[0][i] * dphig[0][j] + dphig[1][i] * dphig[1][j]) * da;
                }

                let n = nodes[i];
                fy[n] += da
                    * (0.5 * nu * (dphig[0][i] * d[0] + dphig[1][i] * d[1])
                        + 2.0 * (1.0 + nu) * gp.phi[i] * (iy * y - iyz * z));
                fz[n] += da
                    * (0.5 * nu * (dphig[0][i] * h[0] + dphig[1][i] * h[1])
                        + 2.0 * (1.0 + nu) * gp.phi[i] * (iz * z - iyz * y));
                ft[n] += da * (dphig[0][i] * z - dphig[1][i] * y);
            }
        }

        k_lg.add_element_matrix(&nodes, &ke);
    }

    k_lg.add_constraint_border(ngl);

    let pinv = PseudoInverse::compute(k_lg.to_dense(), options.pinv_tolerance)?;
    log::debug!(
        "warping system: {} unknowns, rank {}, condition number {:.3e}",
        pinv.size,
        pinv.rank,
        pinv.condition_number
    );

    let warning = if pinv.nullity() > REDUCED_RULE_NULLITY
        || pinv.condition_number > options.condition_warning
    {
        log::warn!(
            "shear solve degenerate: rank {} of {}, condition number {:.3e}",
            pinv.rank,
            pinv.size,
            pinv.condition_number
        );
        Some(SectionWarning::ShearSolveDegenerate {
            condition_number: pinv.condition_number,
            rank: pinv.rank,
            size: pinv.size,
        })
    } else {
        None
    };

    let u2 = pinv.apply(&augmented(&fy));
    let u3 = pinv.apply(&augmented(&fz));
    let u_t = pinv.apply(&augmented(&ft));
    let psi_y = u2.rows(0, ngl).into_owned();
    let psi_z = u3.rows(0, ngl).into_owned();
    let omega = u_t.rows(0, ngl).into_owned();

    // Shear form factor integrals
    let mut alpha_y = 0.0;
    let mut alpha_z = 0.0;
    let mut alpha_yz = 0.0;

    for cell in 0..mesh.cell_count() {
        let coords = mesh.cell_coords(cell);
        let nodes = mesh.connectivity[cell];
        let psi_y_el: [f64; Q9_NODES] = std::array::from_fn(|k| psi_y[nodes[k]]);
        let psi_z_el: [f64; Q9_NODES] = std::array::from_fn(|k| psi_z[nodes[k]]);

        for (point, &weight) in points.iter().zip(weights.iter()) {
            let gp = CellPoint::evaluate(&coords, point[0], point[1])
                .ok_or_else(|| inverted_cell(cell))?;
            let da = gp.det_jacobian * weight;
            let (d, h) = poisson_terms(gp.y - yc, gp.z - zc, iy, iz, iyz);

            let gy = gp.gradient(&psi_y_el);
            let gz = gp.gradient(&psi_z_el);
            let ay = [gy[0] - 0.5 * nu * d[0], gy[1] - 0.5 * nu * d[1]];
            let az = [gz[0] - 0.5 * nu * h[0], gz[1] - 0.5 * nu * h[1]];

            alpha_y += (ay[0] * ay[0] + ay[1] * ay[1]) * da;
            alpha_z += (az[0] * az[0] + az[1] * az[1]) * da;
            alpha_yz += (ay[0] * az[0] + ay[1] * az[1]) * da;
        }
    }

    let scale = area.area / (ccg * ccg);

    // Torsion constant J = Iy + Iz - omega^T K omega
    let k_omega = sparse_matvec(&k_lg.to_csr(), &augmented(&omega));
    let omega_energy = omega.dot(&k_omega.rows(0, ngl));

    let properties = ShearProperties {
        y_shear: yc - psi_z.dot(&ft) / ccg,
        z_shear: zc + psi_y.dot(&ft) / ccg,
        form_factor_y: scale * alpha_y,
        form_factor_z: scale * alpha_z,
        form_factor_yz: scale * alpha_yz,
        torsion_constant: iy + iz - omega_energy,
        condition_number: pinv.condition_number,
    };

    if !(properties.form_factor_y > 0.0 && properties.form_factor_z > 0.0) {
        return Err(SectionError::DegenerateSection(format!(
            "shear form factors are not positive ({}, {})",
            properties.form_factor_y, properties.form_factor_z
        )));
    }

    Ok(ShearOutcome {
        properties,
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Rect, RectilinearProfile};
    use crate::properties::area::area_properties;
    use approx::assert_relative_eq;

    fn rectangle_mesh(height: f64, width: f64, subdivisions: usize, center: (f64, f64)) -> Mesh {
        let profile = RectilinearProfile {
            solids: vec![Rect::centered(0.0, 0.0, height, width)],
            voids: Vec::new(),
        };
        Mesh::rectilinear(&profile, subdivisions, center).unwrap()
    }

    #[test]
    fn test_rectangle_shear_coefficient() {
        // Elasticity solution for nu = 0: k = 5/6
        let mesh = rectangle_mesh(0.1, 0.05, 6, (0.0, 0.0));
        let area = area_properties(&mesh).unwrap();
        let out = shear_properties(&mesh, &area, 0.0, &EngineOptions::default()).unwrap();

        assert!(out.warning.is_none());
        assert_relative_eq!(1.0 / out.properties.form_factor_y, 5.0 / 6.0, max_relative = 0.01);
        assert_relative_eq!(1.0 / out.properties.form_factor_z, 5.0 / 6.0, max_relative = 0.01);
        assert!(out.properties.form_factor_yz.abs() < 1e-6);
        assert!(out.properties.y_shear.abs() < 1e-9);
        assert!(out.properties.z_shear.abs() < 1e-9);
    }

    #[test]
    fn test_shear_centre_follows_translation() {
        let base = rectangle_mesh(0.1, 0.05, 3, (0.0, 0.0));
        let moved = rectangle_mesh(0.1, 0.05, 3, (0.2, -0.4));
        let opts = EngineOptions::default();

        let a0 = area_properties(&base).unwrap();
        let a1 = area_properties(&moved).unwrap();
        let s0 = shear_properties(&base, &a0, 0.3, &opts).unwrap().properties;
        let s1 = shear_properties(&moved, &a1, 0.3, &opts).unwrap().properties;

        assert_relative_eq!(s1.y_shear - s0.y_shear, 0.2, epsilon = 1e-9);
        assert_relative_eq!(s1.z_shear - s0.z_shear, -0.4, epsilon = 1e-9);
        assert_relative_eq!(s1.form_factor_y, s0.form_factor_y, max_relative = 1e-8);
        assert_relative_eq!(s1.torsion_constant, s0.torsion_constant, max_relative = 1e-8);
    }

    #[test]
    fn test_rectangle_torsion_constant() {
        // 2:1 rectangle, beta = 0.229: J = beta * b * t^3
        let mesh = rectangle_mesh(0.2, 0.1, 6, (0.0, 0.0));
        let area = area_properties(&mesh).unwrap();
        let out = shear_properties(&mesh, &area, 0.0, &EngineOptions::default()).unwrap();
        assert_relative_eq!(out.properties.torsion_constant, 0.229 * 0.2 * 0.1_f64.powi(3), max_relative = 0.02);
    }

    #[test]
    fn test_disconnected_mesh_flagged() {
        let profile = RectilinearProfile {
            solids: vec![
                Rect::new(0.0, 0.1, 0.0, 0.1),
                Rect::new(0.0, 0.1, 0.2, 0.3),
            ],
            voids: Vec::new(),
        };
        let mesh = Mesh::rectilinear(&profile, 1, (0.0, 0.0)).unwrap();
        let area = area_properties(&mesh).unwrap();
        let out = shear_properties(&mesh, &area, 0.0, &EngineOptions::default()).unwrap();
        assert!(matches!(
            out.warning,
            Some(SectionWarning::ShearSolveDegenerate { .. })
        ));
    }

    #[test]
    fn test_oversized_mesh_rejected_before_assembly() {
        let small = rectangle_mesh(0.1, 0.05, 1, (0.0, 0.0));
        let area = area_properties(&small).unwrap();
        let mesh = Mesh {
            coordinate: vec![[0.0, 0.0]; MAX_MESH_NODES + 1],
            connectivity: small.connectivity.clone(),
        };
        assert!(matches!(
            shear_properties(&mesh, &area, 0.3, &EngineOptions::default()),
            Err(SectionError::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_poisson_coupling_lowers_wide_strip_coefficient() {
        // Shear across the 0.1 depth of a 4:1 strip
        let mesh = rectangle_mesh(0.1, 0.4, 4, (0.0, 0.0));
        let area = area_properties(&mesh).unwrap();
        let opts = EngineOptions::default();
        let k = |nu: f64| {
            let s = shear_properties(&mesh, &area, nu, &opts).unwrap().properties;
            1.0 / s.form_factor_y
        };

        let (k0, k15, k30) = (k(0.0), k(0.15), k(0.3));
        assert_relative_eq!(k0, 5.0 / 6.0, max_relative = 0.01);
        assert!(k0 > k15 && k15 > k30, "{} {} {}", k0, k15, k30);
        assert_relative_eq!(k30, 0.584, max_relative = 0.03);
    }

    #[test]
    fn test_poisson_terms_symmetry() {
        let (d, h) = poisson_terms(0.3, 0.0, 2.0, 1.0, 0.0);
        assert_relative_eq!(d[0], 2.0 * 0.09);
        assert_relative_eq!(d[1], 0.0);
        assert_relative_eq!(h[0], 0.0);
        assert_relative_eq!(h[1], -0.09);
    }
}
