//! Result types for section property computations

use serde::{Deserialize, Serialize};

use crate::analysis::ElementType;
use crate::error::{SectionError, SectionResult};
use crate::math::Mat12;

/// Area integrals of a meshed section about the section reference origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaProperties {
    /// Cross-sectional area in m²
    pub area: f64,
    /// First moment of area ∫z dA in m³
    pub qy: f64,
    /// First moment of area ∫y dA in m³
    pub qz: f64,
    /// ∫z² dA in m⁴
    pub iy: f64,
    /// ∫y² dA in m⁴
    pub iz: f64,
    /// ∫yz dA in m⁴
    pub iyz: f64,
    /// iy + iz in m⁴
    pub polar_moment: f64,
    /// Centroid y coordinate in m
    pub y_centroid: f64,
    /// Centroid z coordinate in m
    pub z_centroid: f64,
}

impl AreaProperties {
    /// Second moments `(iy, iz, iyz)` shifted to the centroid
    pub fn centroidal_moments(&self) -> (f64, f64, f64) {
        let (yc, zc) = (self.y_centroid, self.z_centroid);
        (
            self.iy - self.area * zc * zc,
            self.iz - self.area * yc * yc,
            self.iyz - self.area * yc * zc,
        )
    }
}

/// Output of the warping solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShearProperties {
    /// Shear centre y coordinate in m, same frame as the centroid
    pub y_shear: f64,
    /// Shear centre z coordinate in m, same frame as the centroid
    pub z_shear: f64,
    /// Shear form factor for forces along y (>= 1)
    pub form_factor_y: f64,
    /// Shear form factor for forces along z (>= 1)
    pub form_factor_z: f64,
    /// Coupling form factor between y and z shear
    pub form_factor_yz: f64,
    /// Saint-Venant torsion constant in m⁴
    pub torsion_constant: f64,
    /// Condition number of the augmented warping system
    pub condition_number: f64,
}

/// Final, immutable section properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Cross-sectional area in m²
    pub area: f64,
    /// First moment ∫z dA about the section reference origin in m³
    pub qy: f64,
    /// First moment ∫y dA about the section reference origin in m³
    pub qz: f64,
    /// Centroidal second moment ∫z² dA in m⁴
    pub iy: f64,
    /// Centroidal second moment ∫y² dA in m⁴
    pub iz: f64,
    /// Centroidal product moment ∫yz dA in m⁴
    pub iyz: f64,
    /// iy + iz in m⁴
    pub polar_moment: f64,
    pub y_centroid: f64,
    pub z_centroid: f64,
    pub y_shear: f64,
    pub z_shear: f64,
    /// Timoshenko shear coefficient for forces along y
    pub shear_correction_y: f64,
    /// Timoshenko shear coefficient for forces along z
    pub shear_correction_z: f64,
    /// Shear coupling form factor between y and z
    pub shear_coupling_yz: f64,
    /// Saint-Venant torsion constant in m⁴, if computed
    pub torsion_constant: Option<f64>,
}

impl SectionProperties {
    /// Combine the area and shear stages
    pub fn from_stages(area: &AreaProperties, shear: &ShearProperties) -> Self {
        let (iy, iz, iyz) = area.centroidal_moments();
        Self {
            area: area.area,
            qy: area.qy,
            qz: area.qz,
            iy,
            iz,
            iyz,
            polar_moment: iy + iz,
            y_centroid: area.y_centroid,
            z_centroid: area.z_centroid,
            y_shear: shear.y_shear,
            z_shear: shear.z_shear,
            shear_correction_y: 1.0 / shear.form_factor_y,
            shear_correction_z: 1.0 / shear.form_factor_z,
            shear_coupling_yz: shear.form_factor_yz,
            torsion_constant: Some(shear.torsion_constant),
        }
    }

    /// Shear form factor along y (inverse of the correction coefficient)
    pub fn form_factor_y(&self) -> f64 {
        1.0 / self.shear_correction_y
    }

    /// Shear form factor along z (inverse of the correction coefficient)
    pub fn form_factor_z(&self) -> f64 {
        1.0 / self.shear_correction_z
    }

    /// Rotation from the section axes to the principal bending axes in radians
    ///
    /// Zero when the section is already principal-axis aligned.
    pub fn principal_angle(&self) -> f64 {
        let scale = self.iy.abs().max(self.iz.abs());
        if self.iyz.abs() <= 1e-12 * scale {
            return 0.0;
        }
        let diff = self.iz - self.iy;
        if diff.abs() <= 1e-12 * scale {
            // Equal moments with a product term: axes at 45 degrees
            return std::f64::consts::FRAC_PI_4.copysign(self.iyz);
        }
        (2.0 * self.iyz / diff).atan() / 2.0
    }

    /// Principal second moments `(i1, i2)` with `i1 >= i2`
    pub fn principal_moments(&self) -> (f64, f64) {
        let mean = 0.5 * (self.iy + self.iz);
        let radius = (0.25 * (self.iy - self.iz).powi(2) + self.iyz.powi(2)).sqrt();
        (mean + radius, mean - radius)
    }

    /// Radius of gyration about the y-axis
    pub fn ry(&self) -> f64 {
        (self.iy / self.area).sqrt()
    }

    /// Radius of gyration about the z-axis
    pub fn rz(&self) -> f64 {
        (self.iz / self.area).sqrt()
    }

    /// Fail if any field is NaN or infinite
    pub fn check_finite(&self) -> SectionResult<()> {
        let fields = [
            ("area", self.area),
            ("qy", self.qy),
            ("qz", self.qz),
            ("iy", self.iy),
            ("iz", self.iz),
            ("iyz", self.iyz),
            ("y_centroid", self.y_centroid),
            ("z_centroid", self.z_centroid),
            ("y_shear", self.y_shear),
            ("z_shear", self.z_shear),
            ("shear_correction_y", self.shear_correction_y),
            ("shear_correction_z", self.shear_correction_z),
            ("shear_coupling_yz", self.shear_coupling_yz),
            ("torsion_constant", self.torsion_constant.unwrap_or(0.0)),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, v)) => Err(SectionError::NonFiniteResult(format!("{} = {}", name, v))),
            None => Ok(()),
        }
    }
}

/// Non-fatal diagnostics attached to a result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionWarning {
    /// The augmented warping system is rank deficient or badly conditioned;
    /// shear results are the minimum-norm solution and may be meaningless
    ShearSolveDegenerate {
        condition_number: f64,
        rank: usize,
        size: usize,
    },
}

/// Complete outcome of one section evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionAnalysis {
    /// Element family the section was evaluated for
    pub element_type: ElementType,
    /// Section properties
    pub properties: SectionProperties,
    /// Offset and principal-axis transform of the element end DOFs
    pub transform: Mat12,
    /// Diagnostics raised during the solve
    pub warnings: Vec<SectionWarning>,
}

impl SectionAnalysis {
    /// Whether the shear solve was flagged
    pub fn is_degenerate(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, SectionWarning::ShearSolveDegenerate { .. }))
    }
}
