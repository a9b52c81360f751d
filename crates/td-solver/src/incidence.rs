//! Incidence and deviation: from flow angles to blade metal angles.

use crate::error::{StageError, StageResult};
use std::fmt;
use td_core::iterate::{FixedPoint, FixedPointConfig, fixed_point};

/// Flow and metal angles of one blade section [rad].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetalAngles {
    /// Inlet flow angle (β1 for rotors, α2 for stators).
    pub inlet_flow: f64,
    /// Outlet flow angle (β2 for rotors, α3 for stators).
    pub outlet_flow: f64,
    pub incidence: f64,
    pub deviation: f64,
}

impl MetalAngles {
    /// κ1 = inlet flow angle − incidence
    pub fn inlet_metal(&self) -> f64 {
        self.inlet_flow - self.incidence
    }

    /// κ2 = outlet flow angle − deviation
    pub fn outlet_metal(&self) -> f64 {
        self.outlet_flow - self.deviation
    }

    /// θ = κ1 − κ2
    pub fn camber(&self) -> f64 {
        self.inlet_metal() - self.outlet_metal()
    }

    /// ξ = (κ1 + κ2) / 2
    pub fn stagger(&self) -> f64 {
        (self.inlet_metal() + self.outlet_metal()) / 2.0
    }
}

/// Cascade seen by one blade section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cascade {
    pub inlet_flow: f64,
    pub outlet_flow: f64,
    pub solidity: f64,
    pub thickness_to_chord: f64,
}

/// Capability: choose incidence and deviation for a cascade.
pub trait IncidenceDeviation: Send + Sync + fmt::Debug {
    fn metal_angles(&self, cascade: &Cascade) -> StageResult<MetalAngles>;
}

/// Metal angles equal to flow angles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroIncidence;

impl IncidenceDeviation for ZeroIncidence {
    fn metal_angles(&self, cascade: &Cascade) -> StageResult<MetalAngles> {
        Ok(MetalAngles {
            inlet_flow: cascade.inlet_flow,
            outlet_flow: cascade.outlet_flow,
            incidence: 0.0,
            deviation: 0.0,
        })
    }
}

/// Johnsen & Bullock (1965) design incidence and deviation.
///
/// Both correlations depend on the camber they correct, so the pair is
/// resolved by bounded fixed-point iteration on (i*, δ*) in degrees.
#[derive(Debug, Clone, Copy)]
pub struct JohnsenBullock {
    /// Blade shape parameter K_sh (1.0 NACA-65, 0.7 double circular arc).
    pub shape_factor: f64,
    pub iteration: FixedPointConfig,
}

impl Default for JohnsenBullock {
    fn default() -> Self {
        Self {
            shape_factor: 0.7,
            iteration: FixedPointConfig {
                max_iterations: 100,
                abs_tol: 1e-10,
            },
        }
    }
}

/// Correlation coefficients for one cascade, angles in degrees.
#[derive(Debug, Clone, Copy)]
struct Correlation {
    slope: f64,
    incidence_thickness: f64,
    nominal_incidence: f64,
    deviation_slope: f64,
    deviation_thickness: f64,
    nominal_deviation: f64,
    shape_factor: f64,
}

impl Correlation {
    fn new(inlet_deg: f64, solidity: f64, tbc: f64, shape_factor: f64) -> Self {
        let sigma = solidity;

        let slope = 0.025 * sigma
            - (inlet_deg / 90.0).powf(1.2 * sigma + 1.0) / (0.43 * sigma + 1.5)
            - 0.06;

        let q = 0.28 / (tbc.powf(0.3) + 0.1);
        let incidence_thickness = (10.0 * tbc).powf(q);

        let x = inlet_deg / 100.0;
        let m1 = 0.316 * x.powi(3) - 0.132 * x * x + 0.074 * x + 0.249;
        let b = -0.85 * x.powi(3) - 0.17 * x + 0.9625;
        let deviation_slope = sigma.powf(-b) * m1;

        let deviation_thickness = 37.5 * tbc * tbc + 6.25 * tbc;

        let nominal_deviation = 0.01 * inlet_deg * sigma
            + (0.74 * sigma.powf(1.9) + 3.0 * sigma)
                * (inlet_deg / 90.0).powf(1.09 * sigma + 1.67);

        let p = sigma.powi(3) / 160.0 + 0.914;
        let nominal_incidence = inlet_deg.powf(p) / (5.0 + 46.0 * (-2.3 * sigma).exp())
            - 0.1 * sigma.powi(3) * ((inlet_deg - 70.0) / 4.0).exp();

        Self {
            slope,
            incidence_thickness,
            nominal_incidence,
            deviation_slope,
            deviation_thickness,
            nominal_deviation,
            shape_factor,
        }
    }

    fn incidence_deg(&self, camber_deg: f64) -> f64 {
        camber_deg * self.slope
            + self.incidence_thickness * self.nominal_incidence * self.shape_factor
    }

    fn deviation_deg(&self, camber_deg: f64) -> f64 {
        self.shape_factor * self.deviation_thickness * self.nominal_deviation
            + camber_deg * self.deviation_slope
    }
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl IncidenceDeviation for JohnsenBullock {
    fn metal_angles(&self, cascade: &Cascade) -> StageResult<MetalAngles> {
        let inlet_deg = cascade.inlet_flow.to_degrees().abs();
        let outlet_deg = cascade.outlet_flow.to_degrees().abs();
        let correlation = Correlation::new(
            inlet_deg,
            cascade.solidity,
            cascade.thickness_to_chord,
            self.shape_factor,
        );

        let outcome = fixed_point(
            (0.0_f64, 0.0_f64),
            |&(incidence, deviation)| {
                let camber = (inlet_deg - incidence) - (outlet_deg - deviation);
                (
                    correlation.incidence_deg(camber),
                    correlation.deviation_deg(camber),
                )
            },
            |a, b| (a.0 - b.0).abs().max((a.1 - b.1).abs()),
            &self.iteration,
        );

        match outcome {
            FixedPoint::Converged {
                value: (incidence, deviation),
                ..
            } => Ok(MetalAngles {
                inlet_flow: cascade.inlet_flow,
                outlet_flow: cascade.outlet_flow,
                incidence: incidence.to_radians() * sign(cascade.inlet_flow),
                deviation: deviation.to_radians() * sign(cascade.outlet_flow),
            }),
            FixedPoint::Diverged { iterations, .. } => Err(StageError::infeasible(format!(
                "incidence/deviation correlation did not converge in {iterations} iterations"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_incidence_keeps_flow_angles() {
        let cascade = Cascade {
            inlet_flow: -0.9,
            outlet_flow: -0.5,
            solidity: 1.25,
            thickness_to_chord: 0.1,
        };
        let angles = ZeroIncidence.metal_angles(&cascade).unwrap();
        assert_eq!(angles.inlet_metal(), -0.9);
        assert_eq!(angles.outlet_metal(), -0.5);
        assert!((angles.camber() + 0.4).abs() < 1e-15);
        assert!((angles.stagger() + 0.7).abs() < 1e-15);
    }

    #[test]
    fn zero_camber_reference_values() {
        // NACA-65 shape factor, β1 = 70°, σ = 2, t/c = 0.1
        let correlation = Correlation::new(70.0, 2.0, 0.1, 1.0);
        assert!((correlation.incidence_deg(0.0) - 10.1975).abs() < 1e-4);
        assert!((correlation.deviation_deg(0.0) - 4.7296).abs() < 1e-4);
    }

    #[test]
    fn converged_rotor_section() {
        let cascade = Cascade {
            inlet_flow: (-50.0f64).to_radians(),
            outlet_flow: (-30.0f64).to_radians(),
            solidity: 1.25,
            thickness_to_chord: 0.1,
        };
        let angles = JohnsenBullock::default().metal_angles(&cascade).unwrap();
        assert!((angles.incidence.to_degrees() - 0.612_267).abs() < 1e-5);
        assert!((angles.deviation.to_degrees() + 8.077_127).abs() < 1e-5);
        // deviation adds camber beyond the flow turning
        assert!(angles.camber().abs() > (cascade.inlet_flow - cascade.outlet_flow).abs());
    }

    #[test]
    fn iteration_cap_reports_divergence() {
        let model = JohnsenBullock {
            iteration: FixedPointConfig {
                max_iterations: 2,
                abs_tol: 1e-12,
            },
            ..JohnsenBullock::default()
        };
        let cascade = Cascade {
            inlet_flow: 0.8,
            outlet_flow: 0.4,
            solidity: 1.25,
            thickness_to_chord: 0.1,
        };
        assert!(matches!(
            model.metal_angles(&cascade),
            Err(StageError::Infeasible { .. })
        ));
    }
}
