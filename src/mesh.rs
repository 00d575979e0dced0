//! Q9 meshes of cross-sections
//!
//! Two meshers are provided:
//! - an annular mesher that wraps `division_number` cells around a ring,
//!   one cell through the wall, with explicit wrap-around of the last cell;
//! - a rectilinear mesher that overlays a tensor grid on the breakpoints of
//!   a rectangle-based profile and keeps the cells inside the material, so
//!   strips meeting along an edge share their nodes.
//!
//! Both reject meshes above [`MAX_MESH_NODES`] before allocating anything.

use std::f64::consts::PI;

use crate::analysis::EngineOptions;
use crate::elements::{MeshRecipe, RectilinearProfile};
use crate::error::{SectionError, SectionResult};
use crate::math::Q9_NODES;

/// Largest mesh accepted by the dense warping solve
pub const MAX_MESH_NODES: usize = 4000;

/// Scratch mesh of a cross-section
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Node coordinates `(y, z)`
    pub coordinate: Vec<[f64; 2]>,
    /// Q9 connectivity, one row per cell, ordered as `math::Q9_NODE_COORDS`
    pub connectivity: Vec<[usize; Q9_NODES]>,
}

impl Mesh {
    /// Build the mesh described by `recipe`, centred on `center`
    pub fn from_recipe(recipe: &MeshRecipe, options: &EngineOptions, center: (f64, f64)) -> SectionResult<Self> {
        let mesh = match recipe {
            MeshRecipe::Annulus {
                outer_radius,
                inner_radius,
            } => Self::annulus(*outer_radius, *inner_radius, options.division_number, center)?,
            MeshRecipe::Rectilinear(profile) => {
                Self::rectilinear(profile, options.profile_subdivisions, center)?
            }
        };
        log::debug!(
            "meshed section: {} nodes, {} cells",
            mesh.node_count(),
            mesh.cell_count()
        );
        Ok(mesh)
    }

    /// Ring of Q9 cells between `inner_radius` and `outer_radius`
    ///
    /// Each division contributes six nodes: outer, mid-wall and inner at its
    /// start angle, then the same three at its mid angle. Cell `i` closes on
    /// the start nodes of division `(i + 1) % division_number`.
    pub fn annulus(
        outer_radius: f64,
        inner_radius: f64,
        division_number: usize,
        center: (f64, f64),
    ) -> SectionResult<Self> {
        if division_number < 2 {
            return Err(SectionError::InvalidMesh(format!(
                "annular mesh needs at least 2 divisions, got {}",
                division_number
            )));
        }
        if division_number > MAX_MESH_NODES / 6 {
            return Err(SectionError::InvalidMesh(format!(
                "{} divisions need {} nodes, limit is {}",
                division_number,
                division_number.saturating_mul(6),
                MAX_MESH_NODES
            )));
        }
        if !(inner_radius > 0.0 && outer_radius > inner_radius) {
            return Err(SectionError::InvalidMesh(format!(
                "ring radii must satisfy 0 < inner < outer, got {} and {}",
                inner_radius, outer_radius
            )));
        }

        let mid_radius = (outer_radius + inner_radius) / 2.0;
        let radii = [outer_radius, mid_radius, inner_radius];
        let step = 2.0 * PI / division_number as f64;

        let mut coordinate = Vec::with_capacity(6 * division_number);
        for i in 0..division_number {
            let start = i as f64 * step;
            for angle in [start, start + step / 2.0] {
                let (sin, cos) = angle.sin_cos();
                for r in radii {
                    coordinate.push([center.0 + r * cos, center.1 + r * sin]);
                }
            }
        }

        let connectivity = (0..division_number)
            .map(|i| {
                let b = 6 * i;
                let n = 6 * ((i + 1) % division_number);
                // ksi runs inner -> outer, eta runs along the angle
                [b + 2, b, n, n + 2, b + 1, b + 3, n + 1, b + 5, b + 4]
            })
            .collect();

        Ok(Self {
            coordinate,
            connectivity,
        })
    }

    /// Structured Q9 mesh of a rectangle-based profile
    pub fn rectilinear(profile: &RectilinearProfile, subdivisions: usize, center: (f64, f64)) -> SectionResult<Self> {
        if subdivisions < 1 {
            return Err(SectionError::InvalidMesh(
                "profile subdivisions must be at least 1".to_string(),
            ));
        }
        if profile.solids.is_empty() {
            return Err(SectionError::InvalidMesh("profile has no material".to_string()));
        }

        let rects = profile.solids.iter().chain(profile.voids.iter());
        let y_breaks = breakpoints(rects.clone().flat_map(|r| [r.y0, r.y1]));
        let z_breaks = breakpoints(rects.flat_map(|r| [r.z0, r.z1]));

        // The lattice bounds the node count and sizes the index table
        let lattice_size = lattice_extent(y_breaks.len(), subdivisions)
            .zip(lattice_extent(z_breaks.len(), subdivisions))
            .and_then(|(a, b)| a.checked_mul(b));
        match lattice_size {
            Some(size) if size <= MAX_MESH_NODES => {}
            _ => {
                return Err(SectionError::InvalidMesh(format!(
                    "profile grid at {} subdivisions exceeds {} nodes",
                    subdivisions, MAX_MESH_NODES
                )))
            }
        }

        let ys = refine(&y_breaks, subdivisions);
        let zs = refine(&z_breaks, subdivisions);

        let ny = ys.len() - 1;
        let nz = zs.len() - 1;
        let lattice_z = 2 * nz + 1;

        // Lattice of corner, mid-edge and centre positions
        let lattice_coord = |a: usize, b: usize| -> [f64; 2] {
            let y = if a % 2 == 0 {
                ys[a / 2]
            } else {
                0.5 * (ys[a / 2] + ys[a / 2 + 1])
            };
            let z = if b % 2 == 0 {
                zs[b / 2]
            } else {
                0.5 * (zs[b / 2] + zs[b / 2 + 1])
            };
            [y, z]
        };

        let mut index: Vec<Option<usize>> = vec![None; (2 * ny + 1) * lattice_z];
        let mut coordinate = Vec::new();
        let mut connectivity = Vec::new();

        for i in 0..ny {
            for j in 0..nz {
                let yc = 0.5 * (ys[i] + ys[i + 1]);
                let zc = 0.5 * (zs[j] + zs[j + 1]);
                if !profile.contains(yc, zc) {
                    continue;
                }

                let (a, b) = (2 * i, 2 * j);
                let lattice = [
                    (a, b),
                    (a + 2, b),
                    (a + 2, b + 2),
                    (a, b + 2),
                    (a + 1, b),
                    (a + 2, b + 1),
                    (a + 1, b + 2),
                    (a, b + 1),
                    (a + 1, b + 1),
                ];

                let mut cell = [0usize; Q9_NODES];
                for (k, &(la, lb)) in lattice.iter().enumerate() {
                    let slot = &mut index[la * lattice_z + lb];
                    cell[k] = if let Some(node) = *slot {
                        node
                    } else {
                        let node = coordinate.len();
                        let [y, z] = lattice_coord(la, lb);
                        coordinate.push([center.0 + y, center.1 + z]);
                        *slot = Some(node);
                        node
                    };
                }
                connectivity.push(cell);
            }
        }

        if connectivity.is_empty() {
            return Err(SectionError::InvalidMesh(
                "profile outline encloses no cells".to_string(),
            ));
        }

        Ok(Self {
            coordinate,
            connectivity,
        })
    }

    /// Number of nodes (NGL)
    pub fn node_count(&self) -> usize {
        self.coordinate.len()
    }

    /// Number of Q9 cells
    pub fn cell_count(&self) -> usize {
        self.connectivity.len()
    }

    /// Nodal coordinates of one cell
    pub fn cell_coords(&self, cell: usize) -> [[f64; 2]; Q9_NODES] {
        let nodes = &self.connectivity[cell];
        std::array::from_fn(|k| self.coordinate[nodes[k]])
    }
}

/// Sorted, de-duplicated breakpoints
fn breakpoints(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut breaks: Vec<f64> = values.collect();
    breaks.sort_by(|a, b| a.total_cmp(b));

    let extent = breaks.last().copied().unwrap_or(0.0) - breaks.first().copied().unwrap_or(0.0);
    let tol = 1e-12 * extent.abs().max(f64::MIN_POSITIVE);
    breaks.dedup_by(|a, b| (*a - *b).abs() <= tol);
    breaks
}

/// Lattice positions along one axis, `None` on overflow
fn lattice_extent(breaks: usize, subdivisions: usize) -> Option<usize> {
    breaks
        .saturating_sub(1)
        .checked_mul(subdivisions)?
        .checked_mul(2)?
        .checked_add(1)
}

/// Grid lines splitting each breakpoint interval into `subdivisions` equal parts
fn refine(breaks: &[f64], subdivisions: usize) -> Vec<f64> {
    let mut lines = Vec::with_capacity(breaks.len().saturating_sub(1) * subdivisions + 1);
    for w in breaks.windows(2) {
        for k in 0..subdivisions {
            lines.push(w[0] + (w[1] - w[0]) * k as f64 / subdivisions as f64);
        }
    }
    if let Some(&last) = breaks.last() {
        lines.push(last);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Rect;
    use crate::math::CellPoint;

    #[test]
    fn test_annulus_topology() {
        let mesh = Mesh::annulus(0.05, 0.04, 8, (0.0, 0.0)).unwrap();
        assert_eq!(mesh.node_count(), 48);
        assert_eq!(mesh.cell_count(), 8);

        // Last cell wraps onto the first division
        let last = mesh.connectivity[7];
        assert_eq!(last[1], 42);
        assert_eq!(last[2], 0);
        assert_eq!(last[3], 2);

        // Every node is referenced
        let mut used = vec![false; mesh.node_count()];
        for cell in &mesh.connectivity {
            for &n in cell {
                used[n] = true;
            }
        }
        assert!(used.iter().all(|&u| u));
    }

    #[test]
    fn test_annulus_cells_positively_oriented() {
        let mesh = Mesh::annulus(0.05, 0.04, 16, (0.3, -0.2)).unwrap();
        for cell in 0..mesh.cell_count() {
            let coords = mesh.cell_coords(cell);
            assert!(CellPoint::evaluate(&coords, 0.0, 0.0).is_some());
        }
    }

    #[test]
    fn test_annulus_rejects_bad_input() {
        assert!(Mesh::annulus(0.05, 0.04, 0, (0.0, 0.0)).is_err());
        assert!(Mesh::annulus(0.05, 0.06, 8, (0.0, 0.0)).is_err());
    }

    #[test]
    fn test_rectilinear_shares_interface_nodes() {
        // T shape: flange 0.1 wide on top of a 0.02 web
        let profile = RectilinearProfile {
            solids: vec![
                Rect::new(0.09, 0.1, -0.05, 0.05),
                Rect::new(0.0, 0.09, -0.01, 0.01),
            ],
            voids: Vec::new(),
        };
        let mesh = Mesh::rectilinear(&profile, 1, (0.0, 0.0)).unwrap();
        // Grid: 2 y-intervals, 3 z-intervals; flange row full, web only centre
        assert_eq!(mesh.cell_count(), 4);
        // 3x7 lattice rows for the flange, 2 more rows of 3 for the web
        assert_eq!(mesh.node_count(), 21 + 6);
    }

    #[test]
    fn test_rectilinear_hollow_excludes_void() {
        let profile = RectilinearProfile {
            solids: vec![Rect::centered(0.0, 0.0, 0.2, 0.2)],
            voids: vec![Rect::centered(0.0, 0.0, 0.1, 0.1)],
        };
        let mesh = Mesh::rectilinear(&profile, 2, (0.0, 0.0)).unwrap();
        assert_eq!(mesh.cell_count(), 36 - 4);
    }

    #[test]
    fn test_grid_lines_dedup_and_refine() {
        let breaks = breakpoints([0.0, 1.0, 1.0, 0.5].into_iter());
        assert_eq!(breaks, vec![0.0, 0.5, 1.0]);
        assert_eq!(refine(&breaks, 2), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(lattice_extent(breaks.len(), 2), Some(9));
        assert_eq!(lattice_extent(3, usize::MAX), None);
    }

    #[test]
    fn test_oversized_meshes_rejected() {
        assert!(matches!(
            Mesh::annulus(0.05, 0.04, 200_000, (0.0, 0.0)),
            Err(SectionError::InvalidMesh(_))
        ));
        assert!(Mesh::annulus(0.05, 0.04, MAX_MESH_NODES / 6, (0.0, 0.0)).is_ok());

        let profile = RectilinearProfile {
            solids: vec![Rect::centered(0.0, 0.0, 0.2, 0.1)],
            voids: Vec::new(),
        };
        for subdivisions in [32, 1 << 40, usize::MAX] {
            assert!(matches!(
                Mesh::rectilinear(&profile, subdivisions, (0.0, 0.0)),
                Err(SectionError::InvalidMesh(_))
            ));
        }
        assert!(Mesh::rectilinear(&profile, 31, (0.0, 0.0)).is_ok());
    }
}
