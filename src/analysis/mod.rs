//! Element types and engine options

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SectionError, SectionResult};
use crate::mesh::MAX_MESH_NODES;

/// Structural element family that consumes the section
///
/// The element type decides whether the pipe two-pass centroid refinement
/// runs and which branch of the offset/rotation transform applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// Pipe element with user offset; runs the two-pass refinement
    #[serde(rename = "pipe_1")]
    Pipe1,
    /// Axisymmetric pipe element; transform is always the identity
    #[serde(rename = "pipe_2")]
    Pipe2,
    /// Timoshenko beam element
    #[serde(rename = "beam_1")]
    Beam1,
    /// Valve element
    Valve,
    /// Expansion joint element
    ExpansionJoint,
}

impl Default for ElementType {
    fn default() -> Self {
        Self::Pipe1
    }
}

impl ElementType {
    /// Tag used in project files and JSON payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pipe1 => "pipe_1",
            Self::Pipe2 => "pipe_2",
            Self::Beam1 => "beam_1",
            Self::Valve => "valve",
            Self::ExpansionJoint => "expansion_joint",
        }
    }

    /// Whether the section must be re-meshed around a virtual offset
    pub fn needs_centroid_refinement(&self) -> bool {
        matches!(self, Self::Pipe1)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = SectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pipe_1" => Ok(Self::Pipe1),
            "pipe_2" => Ok(Self::Pipe2),
            "beam_1" => Ok(Self::Beam1),
            "valve" => Ok(Self::Valve),
            "expansion_joint" => Ok(Self::ExpansionJoint),
            other => Err(SectionError::InvalidInput(format!(
                "unknown element type '{}'",
                other
            ))),
        }
    }
}

/// Options controlling mesh refinement and the shear solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Angular divisions around annular (pipe/circular) sections
    pub division_number: usize,
    /// Q9 cells per breakpoint interval for rectilinear beam profiles
    pub profile_subdivisions: usize,
    /// Relative singular value cutoff for the pseudo-inverse
    pub pinv_tolerance: f64,
    /// Condition number above which the shear solve is flagged degenerate
    pub condition_warning: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            division_number: 64,
            profile_subdivisions: 4,
            pinv_tolerance: 1e-12,
            condition_warning: 1e10,
        }
    }
}

impl EngineOptions {
    /// Set the number of angular divisions for annular sections
    pub fn with_divisions(mut self, division_number: usize) -> Self {
        self.division_number = division_number;
        self
    }

    /// Set the number of cells per interval for beam profiles
    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.profile_subdivisions = subdivisions;
        self
    }

    /// Set the pseudo-inverse cutoff
    pub fn with_pinv_tolerance(mut self, tol: f64) -> Self {
        self.pinv_tolerance = tol;
        self
    }

    /// Set the condition number warning threshold
    pub fn with_condition_warning(mut self, threshold: f64) -> Self {
        self.condition_warning = threshold;
        self
    }

    /// Check that the options describe a usable mesh and solve
    pub fn validate(&self) -> SectionResult<()> {
        if self.division_number < 1 {
            return Err(SectionError::InvalidMesh(
                "division_number must be at least 1".to_string(),
            ));
        }
        if self.division_number > MAX_MESH_NODES / 6 {
            return Err(SectionError::InvalidMesh(format!(
                "division_number {} exceeds the limit of {}",
                self.division_number,
                MAX_MESH_NODES / 6
            )));
        }
        if self.profile_subdivisions < 1 {
            return Err(SectionError::InvalidMesh(
                "profile_subdivisions must be at least 1".to_string(),
            ));
        }
        if !(self.pinv_tolerance > 0.0 && self.pinv_tolerance < 1.0) {
            return Err(SectionError::InvalidInput(format!(
                "pinv_tolerance must lie in (0, 1), got {}",
                self.pinv_tolerance
            )));
        }
        if !(self.condition_warning > 1.0) {
            return Err(SectionError::InvalidInput(format!(
                "condition_warning must exceed 1, got {}",
                self.condition_warning
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_round_trip_tags() {
        for ty in [
            ElementType::Pipe1,
            ElementType::Pipe2,
            ElementType::Beam1,
            ElementType::Valve,
            ElementType::ExpansionJoint,
        ] {
            assert_eq!(ty.as_str().parse::<ElementType>().unwrap(), ty);
        }
        assert!("truss".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_element_type_serde_tag() {
        let json = serde_json::to_string(&ElementType::Pipe1).unwrap();
        assert_eq!(json, "\"pipe_1\"");
        let ty: ElementType = serde_json::from_str("\"beam_1\"").unwrap();
        assert_eq!(ty, ElementType::Beam1);
    }

    #[test]
    fn test_default_options() {
        let opts = EngineOptions::default();
        assert_eq!(opts.division_number, 64);
        assert!(opts.validate().is_ok());
        assert!(opts.clone().with_divisions(0).validate().is_err());
        assert!(opts.clone().with_subdivisions(0).validate().is_err());
    }

    #[test]
    fn test_division_number_bounded() {
        let opts = EngineOptions::default();
        assert!(opts.clone().with_divisions(MAX_MESH_NODES / 6).validate().is_ok());
        assert!(matches!(
            opts.with_divisions(200_000).validate(),
            Err(SectionError::InvalidMesh(_))
        ));
    }
}
