//! Airfoil family capability.

use crate::error::{AirfoilError, AirfoilResult};
use crate::profile::AirfoilProfile;
pub use crate::profile::SectionShape;
use std::fmt;

/// Turns a section shape at a given span fraction into a concrete profile.
///
/// Implementations must be pure; blade rows evaluate sections in parallel.
pub trait AirfoilFamily: Send + Sync + fmt::Debug {
    fn profile(&self, span_fraction: f64, shape: &SectionShape) -> AirfoilResult<AirfoilProfile>;
}

/// Double-circular-arc sections with a nose radius proportional to thickness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleCircularArc {
    /// Fraction of the chord covered by the pressure and suction arcs.
    pub arc_weight: f64,
    /// Leading/trailing edge radius as a fraction of maximum thickness.
    pub edge_radius_to_thickness: f64,
}

impl Default for DoubleCircularArc {
    fn default() -> Self {
        Self {
            arc_weight: 0.8,
            edge_radius_to_thickness: 0.15,
        }
    }
}

impl AirfoilFamily for DoubleCircularArc {
    fn profile(&self, span_fraction: f64, shape: &SectionShape) -> AirfoilResult<AirfoilProfile> {
        if !(0.0..=1.0).contains(&span_fraction) {
            return Err(AirfoilError::DegenerateProfile {
                what: "span fraction must lie in [0, 1]",
            });
        }
        AirfoilProfile::new(
            *shape,
            self.edge_radius_to_thickness * shape.max_thickness,
            self.arc_weight,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_family_sizes_nose_from_thickness() {
        let shape = SectionShape {
            chord: 0.04,
            max_thickness: 0.004,
            camber: 0.3,
            stagger: 0.5,
        };
        let profile = DoubleCircularArc::default().profile(0.5, &shape).unwrap();
        assert!((profile.leading_edge_radius() - 0.0006).abs() < 1e-15);
        assert_eq!(profile.arc_weight(), 0.8);
        assert_eq!(profile.shape(), shape);
    }

    #[test]
    fn span_fraction_outside_blade_is_rejected() {
        let shape = SectionShape {
            chord: 0.04,
            max_thickness: 0.004,
            camber: 0.3,
            stagger: 0.5,
        };
        assert!(DoubleCircularArc::default().profile(1.5, &shape).is_err());
    }
}
