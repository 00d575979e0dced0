//! Error types for the section property engine

use thiserror::Error;

/// Main error type for cross-section computations
#[derive(Error, Debug)]
pub enum SectionError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("Degenerate section: {0}")]
    DegenerateSection(String),

    #[error("Shear solve failed: {0}")]
    ShearSolveFailed(String),

    #[error("Non-finite result: {0}")]
    NonFiniteResult(String),

    #[error("Unsupported geometry for this strategy: {0}")]
    UnsupportedGeometry(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for section operations
pub type SectionResult<T> = Result<T, SectionError>;
