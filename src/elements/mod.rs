//! Cross-section geometry

mod geometry;
mod section;

pub use geometry::{CrossSectionGeometry, MeshRecipe, Rect, RectilinearProfile};
pub use section::TubeSection;
