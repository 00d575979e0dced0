//! Closed-form properties for plain circular tubes

use std::f64::consts::PI;

/// Closed-form properties of a centred circular tube
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeSection {
    /// Outer radius in m
    pub outer_radius: f64,
    /// Inner radius in m
    pub inner_radius: f64,
}

impl TubeSection {
    /// Create a tube from outer diameter and wall thickness
    pub fn new(outer_diameter: f64, wall_thickness: f64) -> Self {
        let outer_radius = outer_diameter / 2.0;
        Self {
            outer_radius,
            inner_radius: outer_radius - wall_thickness,
        }
    }

    /// Cross-sectional area in m²
    pub fn area(&self) -> f64 {
        PI * (self.outer_radius.powi(2) - self.inner_radius.powi(2))
    }

    /// Second moment of area about any diameter in m⁴
    pub fn second_moment(&self) -> f64 {
        PI * (self.outer_radius.powi(4) - self.inner_radius.powi(4)) / 4.0
    }

    /// Polar moment of area in m⁴
    pub fn polar_moment(&self) -> f64 {
        2.0 * self.second_moment()
    }

    /// Timoshenko shear coefficient of a hollow circle (Cowper, 1966)
    ///
    /// # Arguments
    /// * `poisson_ratio` - Poisson's ratio of the material
    pub fn shear_coefficient(&self, poisson_ratio: f64) -> f64 {
        let nu = poisson_ratio;
        let m = self.inner_radius / self.outer_radius;
        let m2 = m * m;
        let a = (1.0 + m2).powi(2);
        6.0 * (1.0 + nu) * a / ((7.0 + 6.0 * nu) * a + (20.0 + 12.0 * nu) * m2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tube_area() {
        let tube = TubeSection::new(0.1, 0.01);
        assert_relative_eq!(tube.area(), PI / 4.0 * 0.0036, epsilon = 1e-12);
    }

    #[test]
    fn test_thin_tube_coefficient() {
        let tube = TubeSection::new(1.0, 0.001);
        assert_relative_eq!(tube.shear_coefficient(0.0), 0.5, epsilon = 1e-3);
        let nu = 0.3;
        assert_relative_eq!(
            tube.shear_coefficient(nu),
            2.0 * (1.0 + nu) / (4.0 + 3.0 * nu),
            epsilon = 1e-3
        );
    }
}
