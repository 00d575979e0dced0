//! Section property pipeline
//!
//! A call runs strictly in order:
//!
//! ```text
//! mesh -> area -> [virtual offset re-mesh, pipe_1 only] -> shear -> transform
//! ```
//!
//! Every stage returns a fresh value that the next stage consumes; nothing is
//! cached between calls, so independent sections can be evaluated from any
//! number of threads.

use serde::{Deserialize, Serialize};

use crate::analysis::{ElementType, EngineOptions};
use crate::elements::{CrossSectionGeometry, MeshRecipe, TubeSection};
use crate::error::{SectionError, SectionResult};
use crate::mesh::Mesh;
use crate::properties::{area_properties, offset_rotation, shear_properties};
use crate::results::{SectionAnalysis, SectionProperties, SectionWarning};

/// Strategy used to evaluate a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Q9 warping solve; handles every profile and offsets
    #[default]
    FiniteElement,
    /// Closed-form tube formulas; centred pipe/circular sections only
    ThinWall,
}

impl Strategy {
    /// Provider implementing this strategy
    pub fn provider(&self) -> &'static dyn SectionPropertyProvider {
        match self {
            Self::FiniteElement => &FiniteElementProvider,
            Self::ThinWall => &ThinWallProvider,
        }
    }
}

/// One section evaluation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRequest {
    pub geometry: CrossSectionGeometry,
    #[serde(default)]
    pub poisson_ratio: f64,
    #[serde(default)]
    pub element_type: ElementType,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub options: EngineOptions,
}

impl SectionRequest {
    /// Request with default options and the finite element strategy
    pub fn new(geometry: CrossSectionGeometry, poisson_ratio: f64, element_type: ElementType) -> Self {
        Self {
            geometry,
            poisson_ratio,
            element_type,
            strategy: Strategy::FiniteElement,
            options: EngineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Evaluate with the requested strategy
    pub fn evaluate(&self) -> SectionResult<SectionAnalysis> {
        let provider = self.strategy.provider();
        log::debug!(
            "evaluating {} section for {} with the {} provider",
            self.geometry.kind(),
            self.element_type,
            provider.name()
        );
        provider.compute(self)
    }
}

/// Common interface of the section evaluation strategies
pub trait SectionPropertyProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Evaluate one section
    fn compute(&self, request: &SectionRequest) -> SectionResult<SectionAnalysis>;
}

/// Finite element strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct FiniteElementProvider;

impl SectionPropertyProvider for FiniteElementProvider {
    fn name(&self) -> &'static str {
        "finite_element"
    }

    fn compute(&self, request: &SectionRequest) -> SectionResult<SectionAnalysis> {
        update_properties(
            &request.geometry,
            request.poisson_ratio,
            request.element_type,
            &request.options,
        )
    }
}

/// Closed-form strategy for centred circular tubes
#[derive(Debug, Clone, Copy, Default)]
pub struct ThinWallProvider;

impl SectionPropertyProvider for ThinWallProvider {
    fn name(&self) -> &'static str {
        "thin_wall"
    }

    fn compute(&self, request: &SectionRequest) -> SectionResult<SectionAnalysis> {
        validate_poisson(request.poisson_ratio)?;
        request.geometry.validate()?;

        let (outer_diameter, thickness) = match request.geometry {
            CrossSectionGeometry::Pipe {
                outer_diameter,
                thickness,
                offset_y,
                offset_z,
            }
            | CrossSectionGeometry::Circular {
                outer_diameter,
                thickness,
                offset_y,
                offset_z,
            } if offset_y == 0.0 && offset_z == 0.0 => (outer_diameter, thickness),
            ref other => {
                return Err(SectionError::UnsupportedGeometry(format!(
                    "closed-form tube formulas need a centred pipe or circular section, got {}",
                    other.kind()
                )))
            }
        };

        let tube = TubeSection::new(outer_diameter, thickness);
        let i = tube.second_moment();
        let k = tube.shear_coefficient(request.poisson_ratio);
        let properties = SectionProperties {
            area: tube.area(),
            qy: 0.0,
            qz: 0.0,
            iy: i,
            iz: i,
            iyz: 0.0,
            polar_moment: tube.polar_moment(),
            y_centroid: 0.0,
            z_centroid: 0.0,
            y_shear: 0.0,
            z_shear: 0.0,
            shear_correction_y: k,
            shear_correction_z: k,
            shear_coupling_yz: 0.0,
            torsion_constant: Some(tube.polar_moment()),
        };
        properties.check_finite()?;

        Ok(SectionAnalysis {
            element_type: request.element_type,
            transform: offset_rotation(&properties, request.element_type),
            properties,
            warnings: Vec::new(),
        })
    }
}

/// Reject Poisson ratios outside the isotropic range
pub fn validate_poisson(poisson_ratio: f64) -> SectionResult<()> {
    if poisson_ratio.is_finite() && poisson_ratio > -1.0 && poisson_ratio < 0.5 {
        Ok(())
    } else {
        Err(SectionError::InvalidInput(format!(
            "poisson ratio must lie in (-1, 0.5), got {}",
            poisson_ratio
        )))
    }
}

/// Properties of a generic section, passed through unchanged
pub fn generic_properties(geometry: &CrossSectionGeometry) -> SectionResult<SectionProperties> {
    match *geometry {
        CrossSectionGeometry::Generic {
            area,
            iyy,
            izz,
            iyz,
            shear_coefficient,
        } => {
            geometry.validate()?;
            Ok(SectionProperties {
                area,
                qy: 0.0,
                qz: 0.0,
                iy: iyy,
                iz: izz,
                iyz,
                polar_moment: iyy + izz,
                y_centroid: 0.0,
                z_centroid: 0.0,
                y_shear: 0.0,
                z_shear: 0.0,
                shear_correction_y: shear_coefficient,
                shear_correction_z: shear_coefficient,
                shear_coupling_yz: 0.0,
                torsion_constant: None,
            })
        }
        _ => Err(SectionError::InvalidInput(format!(
            "expected a generic section, got {}",
            geometry.kind()
        ))),
    }
}

/// Centroid of the section meshed about its own origin
///
/// First pass of the pipe refinement. Only the area stage runs: the
/// centroid depends on area integrals alone, so a shear solve here would
/// be discarded.
pub fn compute_nominal_centroid(recipe: &MeshRecipe, options: &EngineOptions) -> SectionResult<(f64, f64)> {
    let mesh = Mesh::from_recipe(recipe, options, (0.0, 0.0))?;
    let area = area_properties(&mesh)?;
    Ok((area.y_centroid, area.z_centroid))
}

/// Mesh at `virtual_offset`, then run the area and shear stages
pub fn compute_final_properties_with_virtual_offset(
    recipe: &MeshRecipe,
    virtual_offset: (f64, f64),
    poisson_ratio: f64,
    options: &EngineOptions,
) -> SectionResult<(SectionProperties, Option<SectionWarning>)> {
    let mesh = Mesh::from_recipe(recipe, options, virtual_offset)?;
    let area = area_properties(&mesh)?;
    let shear = shear_properties(&mesh, &area, poisson_ratio, options)?;
    Ok((
        SectionProperties::from_stages(&area, &shear.properties),
        shear.warning,
    ))
}

/// Compute section properties and the element transform
///
/// For `pipe_1` elements the user offset locates the centroid: the section
/// is first meshed about its own origin to find the nominal centroid, then
/// re-meshed at the virtual offset `offset - nominal_centroid` before the
/// shear solve. The first pass skips the shear stage on purpose since its
/// output is only the centroid. Every other element type meshes once at
/// the user offset.
///
/// # Arguments
/// * `geometry` - Section outline or generic properties
/// * `poisson_ratio` - Poisson's ratio (0 for acoustic-only use)
/// * `element_type` - Consuming element family
/// * `options` - Mesh refinement and solve options
pub fn update_properties(
    geometry: &CrossSectionGeometry,
    poisson_ratio: f64,
    element_type: ElementType,
    options: &EngineOptions,
) -> SectionResult<SectionAnalysis> {
    options.validate()?;
    validate_poisson(poisson_ratio)?;

    if geometry.is_generic() {
        let properties = generic_properties(geometry)?;
        return Ok(SectionAnalysis {
            element_type,
            transform: offset_rotation(&properties, element_type),
            properties,
            warnings: Vec::new(),
        });
    }

    let recipe = geometry.mesh_recipe()?;
    let offset = geometry.offset();

    let mesh_center = if element_type.needs_centroid_refinement() {
        let nominal = compute_nominal_centroid(&recipe, options)?;
        let virtual_offset = (offset.0 - nominal.0, offset.1 - nominal.1);
        log::debug!(
            "{} {}: nominal centroid ({:.6e}, {:.6e}), virtual offset ({:.6e}, {:.6e})",
            element_type,
            geometry.kind(),
            nominal.0,
            nominal.1,
            virtual_offset.0,
            virtual_offset.1
        );
        virtual_offset
    } else {
        offset
    };

    let (properties, warning) =
        compute_final_properties_with_virtual_offset(&recipe, mesh_center, poisson_ratio, options)?;
    properties.check_finite()?;

    Ok(SectionAnalysis {
        element_type,
        transform: offset_rotation(&properties, element_type),
        properties,
        warnings: warning.into_iter().collect(),
    })
}
