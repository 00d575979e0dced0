//! Integration stages of the section property pipeline

pub mod area;
pub mod shear;
pub mod transform;

pub use area::area_properties;
pub use shear::{shear_properties, ShearOutcome};
pub use transform::offset_rotation;
