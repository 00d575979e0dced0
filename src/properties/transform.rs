//! Offset and principal-axis transform of element end DOFs
//!
//! Each element end carries `[u, v, w, rx, ry, rz]`. The section's centroid
//! `(yc, zc)` and shear centre `(ys, zs)` may sit away from the node, and
//! its principal bending axes may be rotated by `theta` about the element
//! axis. The transform maps nodal DOFs onto the centroid/shear-centre frame:
//!
//! ```text
//! T = diag(R, R, R, R) * diag(O, O)
//! ```

use crate::analysis::ElementType;
use crate::math::{Mat12, Mat3, Mat6};
use crate::results::SectionProperties;

/// Rotation about the element axis by `theta`
pub fn axis_rotation(theta: f64) -> Mat3 {
    let (s, c) = theta.sin_cos();
    Mat3::new(
        1.0, 0.0, 0.0,
        0.0, c, s,
        0.0, -s, c,
    )
}

/// Offset block for one element end
///
/// Axial displacement is taken at the centroid, transverse displacements
/// at the shear centre.
pub fn offset_block(y_centroid: f64, z_centroid: f64, y_shear: f64, z_shear: f64) -> Mat6 {
    let mut o = Mat6::identity();
    o[(0, 4)] = z_centroid;
    o[(0, 5)] = -y_centroid;
    o[(1, 3)] = -z_shear;
    o[(2, 3)] = y_shear;
    o
}

/// Build the 12x12 offset/rotation transform for a section
///
/// # Arguments
/// * `props` - Section properties (centroid, shear centre, centroidal moments)
/// * `element_type` - Axisymmetric `pipe_2` elements always get the identity
pub fn offset_rotation(props: &SectionProperties, element_type: ElementType) -> Mat12 {
    if element_type == ElementType::Pipe2 {
        return Mat12::identity();
    }

    let o = offset_block(props.y_centroid, props.z_centroid, props.y_shear, props.z_shear);
    let mut t = Mat12::zeros();
    t.fixed_view_mut::<6, 6>(0, 0).copy_from(&o);
    t.fixed_view_mut::<6, 6>(6, 6).copy_from(&o);

    let theta = props.principal_angle();
    if theta == 0.0 {
        return t;
    }

    let r = axis_rotation(theta);
    let mut rot = Mat12::zeros();
    for i in 0..4 {
        let offset = i * 3;
        rot.fixed_view_mut::<3, 3>(offset, offset).copy_from(&r);
    }

    rot * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn props() -> SectionProperties {
        SectionProperties {
            area: 1e-3,
            qy: 0.0,
            qz: 0.0,
            iy: 2e-6,
            iz: 2e-6,
            iyz: 0.0,
            polar_moment: 4e-6,
            y_centroid: 0.0,
            z_centroid: 0.0,
            y_shear: 0.0,
            z_shear: 0.0,
            shear_correction_y: 0.5,
            shear_correction_z: 0.5,
            shear_coupling_yz: 0.0,
            torsion_constant: Some(4e-6),
        }
    }

    #[test]
    fn test_centred_symmetric_is_identity() {
        let t = offset_rotation(&props(), ElementType::Beam1);
        assert_relative_eq!(t, Mat12::identity(), epsilon = 1e-15);
    }

    #[test]
    fn test_pipe_2_ignores_offset() {
        let mut p = props();
        p.y_centroid = 0.1;
        p.iyz = 1e-6;
        assert_eq!(offset_rotation(&p, ElementType::Pipe2), Mat12::identity());
    }

    #[test]
    fn test_translation_terms() {
        let mut p = props();
        p.y_centroid = 0.1;
        p.z_centroid = -0.2;
        p.y_shear = 0.3;
        p.z_shear = 0.4;
        let t = offset_rotation(&p, ElementType::Pipe1);

        for end in [0, 6] {
            assert_relative_eq!(t[(end, end + 4)], -0.2);
            assert_relative_eq!(t[(end, end + 5)], -0.1);
            assert_relative_eq!(t[(end + 1, end + 3)], -0.4);
            assert_relative_eq!(t[(end + 2, end + 3)], 0.3);
        }
        // No coupling between the two ends
        assert_eq!(t[(0, 10)], 0.0);
    }

    #[test]
    fn test_rotation_is_orthogonal_without_offset() {
        let mut p = props();
        p.iy = 3e-6;
        p.iyz = 5e-7;
        let t = offset_rotation(&p, ElementType::Beam1);
        let ttt = t * t.transpose();
        assert_relative_eq!(ttt, Mat12::identity(), epsilon = 1e-12);

        let theta = p.principal_angle();
        assert_relative_eq!(t[(1, 1)], theta.cos(), epsilon = 1e-14);
        assert_relative_eq!(t[(1, 2)], theta.sin(), epsilon = 1e-14);
    }
}
