//! Cross-section geometry definitions
//!
//! Profiles use the local element frame: `y` is the height direction and
//! `z` the width direction. Beam profiles are placed so that the height
//! is centred on `y = 0`; the offsets then shift the whole outline.

use serde::{Deserialize, Serialize};

use crate::error::{SectionError, SectionResult};

/// Axis-aligned rectangle in section coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub y0: f64,
    pub y1: f64,
    pub z0: f64,
    pub z1: f64,
}

impl Rect {
    pub fn new(y0: f64, y1: f64, z0: f64, z1: f64) -> Self {
        Self { y0, y1, z0, z1 }
    }

    /// Rectangle of the given size centred on `(yc, zc)`
    pub fn centered(yc: f64, zc: f64, height: f64, width: f64) -> Self {
        Self::new(
            yc - height / 2.0,
            yc + height / 2.0,
            zc - width / 2.0,
            zc + width / 2.0,
        )
    }

    /// Strict interior test
    pub fn contains(&self, y: f64, z: f64) -> bool {
        y > self.y0 && y < self.y1 && z > self.z0 && z < self.z1
    }

    pub fn area(&self) -> f64 {
        (self.y1 - self.y0) * (self.z1 - self.z0)
    }
}

/// A profile built from solid rectangles minus void rectangles
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RectilinearProfile {
    pub solids: Vec<Rect>,
    pub voids: Vec<Rect>,
}

impl RectilinearProfile {
    /// Whether a point lies inside the material
    pub fn contains(&self, y: f64, z: f64) -> bool {
        self.solids.iter().any(|r| r.contains(y, z)) && !self.voids.iter().any(|r| r.contains(y, z))
    }
}

/// Meshing recipe derived from a geometry
#[derive(Debug, Clone, PartialEq)]
pub enum MeshRecipe {
    /// Circular ring between two radii
    Annulus { outer_radius: f64, inner_radius: f64 },
    /// Union of rectangular strips
    Rectilinear(RectilinearProfile),
}

/// Input cross-section description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CrossSectionGeometry {
    Pipe {
        outer_diameter: f64,
        thickness: f64,
        #[serde(default)]
        offset_y: f64,
        #[serde(default)]
        offset_z: f64,
    },
    Rectangular {
        base: f64,
        height: f64,
        #[serde(default)]
        base_inner: f64,
        #[serde(default)]
        height_inner: f64,
        #[serde(default)]
        offset_y: f64,
        #[serde(default)]
        offset_z: f64,
    },
    Circular {
        outer_diameter: f64,
        thickness: f64,
        #[serde(default)]
        offset_y: f64,
        #[serde(default)]
        offset_z: f64,
    },
    #[serde(rename = "c_profile")]
    CProfile {
        height: f64,
        w1: f64,
        t1: f64,
        w2: f64,
        t2: f64,
        tw: f64,
        #[serde(default)]
        offset_y: f64,
        #[serde(default)]
        offset_z: f64,
    },
    #[serde(rename = "i_profile")]
    IProfile {
        height: f64,
        w1: f64,
        t1: f64,
        w2: f64,
        t2: f64,
        tw: f64,
        #[serde(default)]
        offset_y: f64,
        #[serde(default)]
        offset_z: f64,
    },
    #[serde(rename = "t_profile")]
    TProfile {
        height: f64,
        w1: f64,
        t1: f64,
        tw: f64,
        #[serde(default)]
        offset_y: f64,
        #[serde(default)]
        offset_z: f64,
    },
    /// Properties supplied directly, no finite element solve
    Generic {
        area: f64,
        iyy: f64,
        izz: f64,
        #[serde(default)]
        iyz: f64,
        shear_coefficient: f64,
    },
}

fn positive(name: &str, value: f64) -> SectionResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SectionError::InvalidGeometry(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

fn non_negative(name: &str, value: f64) -> SectionResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SectionError::InvalidGeometry(format!(
            "{} must be non-negative, got {}",
            name, value
        )))
    }
}

impl CrossSectionGeometry {
    /// Hollow pipe with no offset
    pub fn pipe(outer_diameter: f64, thickness: f64) -> Self {
        Self::Pipe {
            outer_diameter,
            thickness,
            offset_y: 0.0,
            offset_z: 0.0,
        }
    }

    /// Solid rectangle with no offset
    pub fn rectangular(base: f64, height: f64) -> Self {
        Self::Rectangular {
            base,
            height,
            base_inner: 0.0,
            height_inner: 0.0,
            offset_y: 0.0,
            offset_z: 0.0,
        }
    }

    /// Doubly symmetric I-section with no offset
    pub fn i_profile(height: f64, flange_width: f64, flange_thickness: f64, web_thickness: f64) -> Self {
        Self::IProfile {
            height,
            w1: flange_width,
            t1: flange_thickness,
            w2: flange_width,
            t2: flange_thickness,
            tw: web_thickness,
            offset_y: 0.0,
            offset_z: 0.0,
        }
    }

    /// Replace the offset of any meshed geometry. Generic sections are unchanged.
    pub fn with_offset(mut self, y: f64, z: f64) -> Self {
        match &mut self {
            Self::Pipe { offset_y, offset_z, .. }
            | Self::Rectangular { offset_y, offset_z, .. }
            | Self::Circular { offset_y, offset_z, .. }
            | Self::CProfile { offset_y, offset_z, .. }
            | Self::IProfile { offset_y, offset_z, .. }
            | Self::TProfile { offset_y, offset_z, .. } => {
                *offset_y = y;
                *offset_z = z;
            }
            Self::Generic { .. } => {}
        }
        self
    }

    /// Short name of the profile kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pipe { .. } => "pipe",
            Self::Rectangular { .. } => "rectangular",
            Self::Circular { .. } => "circular",
            Self::CProfile { .. } => "c_profile",
            Self::IProfile { .. } => "i_profile",
            Self::TProfile { .. } => "t_profile",
            Self::Generic { .. } => "generic",
        }
    }

    /// User offset `(y, z)` of the section reference point
    pub fn offset(&self) -> (f64, f64) {
        match *self {
            Self::Pipe { offset_y, offset_z, .. }
            | Self::Rectangular { offset_y, offset_z, .. }
            | Self::Circular { offset_y, offset_z, .. }
            | Self::CProfile { offset_y, offset_z, .. }
            | Self::IProfile { offset_y, offset_z, .. }
            | Self::TProfile { offset_y, offset_z, .. } => (offset_y, offset_z),
            Self::Generic { .. } => (0.0, 0.0),
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic { .. })
    }

    pub fn is_annular(&self) -> bool {
        matches!(self, Self::Pipe { .. } | Self::Circular { .. })
    }

    /// Reject dimensions that cannot describe a physical section
    pub fn validate(&self) -> SectionResult<()> {
        let (oy, oz) = self.offset();
        if !oy.is_finite() || !oz.is_finite() {
            return Err(SectionError::InvalidGeometry(
                "offsets must be finite".to_string(),
            ));
        }

        match *self {
            Self::Pipe { outer_diameter, thickness, .. }
            | Self::Circular { outer_diameter, thickness, .. } => {
                positive("outer_diameter", outer_diameter)?;
                positive("thickness", thickness)?;
                if 2.0 * thickness >= outer_diameter {
                    return Err(SectionError::InvalidGeometry(format!(
                        "thickness {} is not smaller than the outer radius {}",
                        thickness,
                        outer_diameter / 2.0
                    )));
                }
            }
            Self::Rectangular { base, height, base_inner, height_inner, .. } => {
                positive("base", base)?;
                positive("height", height)?;
                non_negative("base_inner", base_inner)?;
                non_negative("height_inner", height_inner)?;
                let hollow = base_inner > 0.0 || height_inner > 0.0;
                if hollow && (base_inner <= 0.0 || height_inner <= 0.0) {
                    return Err(SectionError::InvalidGeometry(
                        "hollow rectangle needs both base_inner and height_inner".to_string(),
                    ));
                }
                if hollow && (base_inner >= base || height_inner >= height) {
                    return Err(SectionError::InvalidGeometry(
                        "inner rectangle must lie strictly inside the outer one".to_string(),
                    ));
                }
            }
            Self::CProfile { height, w1, t1, w2, t2, tw, .. }
            | Self::IProfile { height, w1, t1, w2, t2, tw, .. } => {
                for (name, v) in [
                    ("height", height),
                    ("w1", w1),
                    ("t1", t1),
                    ("w2", w2),
                    ("t2", t2),
                    ("tw", tw),
                ] {
                    positive(name, v)?;
                }
                if t1 + t2 >= height {
                    return Err(SectionError::InvalidGeometry(format!(
                        "flange thicknesses {} + {} leave no web in height {}",
                        t1, t2, height
                    )));
                }
                if tw > w1 || tw > w2 {
                    return Err(SectionError::InvalidGeometry(format!(
                        "web thickness {} exceeds a flange width",
                        tw
                    )));
                }
            }
            Self::TProfile { height, w1, t1, tw, .. } => {
                for (name, v) in [("height", height), ("w1", w1), ("t1", t1), ("tw", tw)] {
                    positive(name, v)?;
                }
                if t1 >= height {
                    return Err(SectionError::InvalidGeometry(format!(
                        "flange thickness {} leaves no web in height {}",
                        t1, height
                    )));
                }
                if tw > w1 {
                    return Err(SectionError::InvalidGeometry(format!(
                        "web thickness {} exceeds flange width {}",
                        tw, w1
                    )));
                }
            }
            Self::Generic { area, iyy, izz, iyz, shear_coefficient } => {
                positive("area", area)?;
                positive("iyy", iyy)?;
                positive("izz", izz)?;
                positive("shear_coefficient", shear_coefficient)?;
                if !iyz.is_finite() || iyz * iyz >= iyy * izz {
                    return Err(SectionError::InvalidGeometry(format!(
                        "iyz {} violates iyz^2 < iyy*izz",
                        iyz
                    )));
                }
            }
        }
        Ok(())
    }

    /// Meshing recipe for the outline, centred on the section's own origin.
    ///
    /// Offsets are applied by the mesher, not here.
    pub fn mesh_recipe(&self) -> SectionResult<MeshRecipe> {
        self.validate()?;
        let recipe = match *self {
            Self::Pipe { outer_diameter, thickness, .. }
            | Self::Circular { outer_diameter, thickness, .. } => {
                let outer_radius = outer_diameter / 2.0;
                MeshRecipe::Annulus {
                    outer_radius,
                    inner_radius: outer_radius - thickness,
                }
            }
            Self::Rectangular { base, height, base_inner, height_inner, .. } => {
                let mut profile = RectilinearProfile {
                    solids: vec![Rect::centered(0.0, 0.0, height, base)],
                    voids: Vec::new(),
                };
                if base_inner > 0.0 && height_inner > 0.0 {
                    profile.voids.push(Rect::centered(0.0, 0.0, height_inner, base_inner));
                }
                MeshRecipe::Rectilinear(profile)
            }
            Self::IProfile { height, w1, t1, w2, t2, tw, .. } => {
                let h2 = height / 2.0;
                MeshRecipe::Rectilinear(RectilinearProfile {
                    solids: vec![
                        Rect::new(h2 - t1, h2, -w1 / 2.0, w1 / 2.0),
                        Rect::new(-h2, -h2 + t2, -w2 / 2.0, w2 / 2.0),
                        Rect::new(-h2 + t2, h2 - t1, -tw / 2.0, tw / 2.0),
                    ],
                    voids: Vec::new(),
                })
            }
            Self::CProfile { height, w1, t1, w2, t2, tw, .. } => {
                // Web back face on z = 0, flanges open towards +z
                let h2 = height / 2.0;
                MeshRecipe::Rectilinear(RectilinearProfile {
                    solids: vec![
                        Rect::new(h2 - t1, h2, 0.0, w1),
                        Rect::new(-h2, -h2 + t2, 0.0, w2),
                        Rect::new(-h2 + t2, h2 - t1, 0.0, tw),
                    ],
                    voids: Vec::new(),
                })
            }
            Self::TProfile { height, w1, t1, tw, .. } => {
                let h2 = height / 2.0;
                MeshRecipe::Rectilinear(RectilinearProfile {
                    solids: vec![
                        Rect::new(h2 - t1, h2, -w1 / 2.0, w1 / 2.0),
                        Rect::new(-h2, h2 - t1, -tw / 2.0, tw / 2.0),
                    ],
                    voids: Vec::new(),
                })
            }
            Self::Generic { .. } => {
                return Err(SectionError::UnsupportedGeometry(
                    "generic sections carry their properties and are never meshed".to_string(),
                ))
            }
        };
        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_validation() {
        assert!(CrossSectionGeometry::pipe(0.1, 0.01).validate().is_ok());
        assert!(CrossSectionGeometry::pipe(0.1, 0.05).validate().is_err());
        assert!(CrossSectionGeometry::pipe(0.1, 0.0).validate().is_err());
        assert!(CrossSectionGeometry::pipe(-0.1, 0.01).validate().is_err());
    }

    #[test]
    fn test_rectangular_inner_must_fit() {
        let geom = CrossSectionGeometry::Rectangular {
            base: 0.2,
            height: 0.1,
            base_inner: 0.2,
            height_inner: 0.05,
            offset_y: 0.0,
            offset_z: 0.0,
        };
        assert!(geom.validate().is_err());
    }

    #[test]
    fn test_i_profile_recipe_area() {
        let geom = CrossSectionGeometry::i_profile(0.3, 0.15, 0.01, 0.006);
        match geom.mesh_recipe().unwrap() {
            MeshRecipe::Rectilinear(profile) => {
                let area: f64 = profile.solids.iter().map(Rect::area).sum();
                let expected = 2.0 * 0.15 * 0.01 + (0.3 - 0.02) * 0.006;
                assert!((area - expected).abs() < 1e-12);
            }
            other => panic!("unexpected recipe {:?}", other),
        }
    }

    #[test]
    fn test_generic_has_no_recipe() {
        let geom = CrossSectionGeometry::Generic {
            area: 0.01,
            iyy: 1e-5,
            izz: 1e-5,
            iyz: 0.0,
            shear_coefficient: 0.9,
        };
        assert!(geom.validate().is_ok());
        assert!(matches!(
            geom.mesh_recipe(),
            Err(SectionError::UnsupportedGeometry(_))
        ));
    }

    #[test]
    fn test_tagged_json() {
        let json = r#"{"kind":"pipe","outer_diameter":0.1,"thickness":0.01}"#;
        let geom: CrossSectionGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(geom, CrossSectionGeometry::pipe(0.1, 0.01));

        let json = r#"{"kind":"t_profile","height":0.2,"w1":0.1,"t1":0.01,"tw":0.008,"offset_y":0.02}"#;
        let geom: CrossSectionGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(geom.offset(), (0.02, 0.0));
    }
}
