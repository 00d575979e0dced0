//! Area integrals over a Q9 mesh

use crate::error::{SectionError, SectionResult};
use crate::math::{gauss_quadrature_2d, CellPoint};
use crate::mesh::Mesh;
use crate::results::AreaProperties;

/// Integrate area, first and second moments over every cell
///
/// Moments are taken about the origin of the mesh coordinates.
pub fn area_properties(mesh: &Mesh) -> SectionResult<AreaProperties> {
    let (points, weights) = gauss_quadrature_2d();

    let mut area = 0.0;
    let mut qy = 0.0;
    let mut qz = 0.0;
    let mut iy = 0.0;
    let mut iz = 0.0;
    let mut iyz = 0.0;

    for cell in 0..mesh.cell_count() {
        let coords = mesh.cell_coords(cell);
        for (point, &weight) in points.iter().zip(weights.iter()) {
            let gp = CellPoint::evaluate(&coords, point[0], point[1])
                .ok_or_else(|| inverted_cell(cell))?;
            let da = gp.det_jacobian * weight;
            let (y, z) = (gp.y, gp.z);

            area += da;
            iy += z * z * da;
            iz += y * y * da;
            iyz += y * z * da;
            qy += z * da;
            qz += y * da;
        }
    }

    if !(area.is_finite() && area > 0.0) {
        return Err(SectionError::DegenerateSection(format!(
            "integrated area is {}",
            area
        )));
    }

    Ok(AreaProperties {
        area,
        qy,
        qz,
        iy,
        iz,
        iyz,
        polar_moment: iy + iz,
        y_centroid: qz / area,
        z_centroid: qy / area,
    })
}

pub(crate) fn inverted_cell(cell: usize) -> SectionError {
    SectionError::InvalidMesh(format!(
        "cell {} has a non-positive Jacobian determinant",
        cell
    ))
}
