//! Radial equilibrium laws: how the mean-line triangle varies along the span.

use crate::design::Annulus;
use crate::triangle::VelocityTriangle;
use std::fmt;

/// Maps the mean-radius triangle to the triangle at a span fraction of an
/// annulus. Implementations must be pure.
pub trait RadialLaw: Send + Sync + fmt::Debug {
    fn triangle(
        &self,
        mean: &VelocityTriangle,
        annulus: &Annulus,
        span_fraction: f64,
    ) -> VelocityTriangle;
}

/// Free vortex: r·cθ constant, cx constant, U proportional to r.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreeVortex;

impl RadialLaw for FreeVortex {
    fn triangle(
        &self,
        mean: &VelocityTriangle,
        annulus: &Annulus,
        span_fraction: f64,
    ) -> VelocityTriangle {
        let radius = annulus.radius_at(span_fraction);
        let scale = radius / mean.radius;
        VelocityTriangle {
            radius,
            blade_speed: mean.blade_speed * scale,
            axial: mean.axial,
            tangential: mean.tangential / scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::MeanRadiusRule;

    #[test]
    fn free_vortex_reference_angles() {
        // rotor inlet of a 50 % reaction stage, hub / mean / tip
        let annulus = Annulus::new(0.05, 0.08, 0.11, MeanRadiusRule::Arithmetic).unwrap();
        let mean = VelocityTriangle::from_flow_angle(0.08, 200.0, 140.0, 0.4);
        let hub = FreeVortex.triangle(&mean, &annulus, 0.0);
        let tip = FreeVortex.triangle(&mean, &annulus, 1.0);

        assert_eq!(hub.radius, 0.05);
        assert_eq!(tip.radius, 0.11);
        assert!((hub.blade_speed - 125.0).abs() < 1e-12);
        assert!((tip.blade_speed - 275.0).abs() < 1e-12);
        assert!(hub.alpha() > mean.alpha() && mean.alpha() > tip.alpha());
        assert!((hub.swirl() - mean.swirl()).abs() < 1e-12);
    }
}
