//! Section Solver - cross-section properties for beam and pipe elements
//!
//! Meshes a cross-section with nine-node quadrilaterals and computes:
//! - Area, first and second moments, centroid
//! - Shear warping functions through a Lagrange-constrained Neumann solve
//! - Shear correction factors and the shear centre
//! - Saint-Venant torsion constant
//! - The 12x12 offset/principal-axis transform of the element end DOFs
//!
//! ## Example
//! ```rust
//! use section_solver::prelude::*;
//!
//! let geometry = CrossSectionGeometry::pipe(0.1, 0.005);
//! let analysis = update_properties(
//!     &geometry,
//!     0.3,
//!     ElementType::Pipe1,
//!     &EngineOptions::default(),
//! )
//! .unwrap();
//!
//! let props = analysis.properties;
//! assert!(props.area > 0.0);
//! assert!(props.y_centroid.abs() < 1e-9);
//! ```

pub mod analysis;
pub mod batch;
pub mod elements;
pub mod engine;
pub mod error;
pub mod math;
pub mod mesh;
pub mod properties;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{ElementType, EngineOptions};
    pub use crate::batch::compute_all;
    pub use crate::elements::{CrossSectionGeometry, TubeSection};
    pub use crate::engine::{
        update_properties, FiniteElementProvider, SectionPropertyProvider, SectionRequest,
        Strategy, ThinWallProvider,
    };
    pub use crate::error::{SectionError, SectionResult};
    pub use crate::mesh::Mesh;
    pub use crate::results::{SectionAnalysis, SectionProperties, SectionWarning};
}
