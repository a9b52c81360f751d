//! Stage design inputs: annulus geometry, sized stage designs and the
//! per-stage targets the sequencer sizes them from.

use crate::error::{StageError, StageResult};
use std::f64::consts::{FRAC_PI_2, PI};
use td_core::numeric::linspace;
use td_core::units::constants::blade_speed;

/// How the mean radius relates to hub and tip radii.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeanRadiusRule {
    /// (hub + tip) / 2
    #[default]
    Arithmetic,
    /// sqrt((hub² + tip²) / 2), splits the annulus area in halves
    RootMeanSquare,
}

impl MeanRadiusRule {
    pub fn mean(self, hub: f64, tip: f64) -> f64 {
        match self {
            MeanRadiusRule::Arithmetic => (hub + tip) / 2.0,
            MeanRadiusRule::RootMeanSquare => ((hub * hub + tip * tip) / 2.0).sqrt(),
        }
    }
}

/// Hub, mean and tip radius of a flow annulus [m].
///
/// Always satisfies `0 < hub < mean < tip`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annulus {
    hub: f64,
    mean: f64,
    tip: f64,
    rule: MeanRadiusRule,
}

impl Annulus {
    pub fn new(hub: f64, mean: f64, tip: f64, rule: MeanRadiusRule) -> StageResult<Self> {
        if !(hub.is_finite() && mean.is_finite() && tip.is_finite()) {
            return Err(StageError::infeasible("annulus radii must be finite"));
        }
        if hub <= 0.0 {
            return Err(StageError::infeasible(format!(
                "hub radius must be positive (got {hub} m)"
            )));
        }
        if !(hub < mean && mean < tip) {
            return Err(StageError::infeasible(format!(
                "annulus radii must satisfy hub < mean < tip (got {hub}, {mean}, {tip} m)"
            )));
        }
        Ok(Self {
            hub,
            mean,
            tip,
            rule,
        })
    }

    /// Annulus of the given area [m²] at a hub-to-tip ratio.
    pub fn from_hub_to_tip_ratio(
        area: f64,
        hub_to_tip_ratio: f64,
        rule: MeanRadiusRule,
    ) -> StageResult<Self> {
        if !area.is_finite() || area <= 0.0 {
            return Err(StageError::infeasible("annulus area must be positive"));
        }
        if !(hub_to_tip_ratio > 0.0 && hub_to_tip_ratio < 1.0) {
            return Err(StageError::infeasible("hub-to-tip ratio must lie in (0, 1)"));
        }
        let tip = (area / (PI * (1.0 - hub_to_tip_ratio * hub_to_tip_ratio))).sqrt();
        let hub = hub_to_tip_ratio * tip;
        Self::new(hub, rule.mean(hub, tip), tip, rule)
    }

    /// Annulus of the given area [m²] around a fixed mean radius.
    pub fn about_mean(mean: f64, area: f64, rule: MeanRadiusRule) -> StageResult<Self> {
        if !mean.is_finite() || mean <= 0.0 {
            return Err(StageError::infeasible("mean radius must be positive"));
        }
        if !area.is_finite() || area <= 0.0 {
            return Err(StageError::infeasible("annulus area must be positive"));
        }
        let (hub, tip) = match rule {
            MeanRadiusRule::Arithmetic => {
                let tip = mean + area / (4.0 * PI * mean);
                (2.0 * mean - tip, tip)
            }
            MeanRadiusRule::RootMeanSquare => {
                let half = area / (2.0 * PI);
                let hub_sq = mean * mean - half;
                if hub_sq <= 0.0 {
                    return Err(StageError::infeasible(format!(
                        "annulus area {area} m² does not fit around mean radius {mean} m"
                    )));
                }
                (hub_sq.sqrt(), (mean * mean + half).sqrt())
            }
        };
        Self::new(hub, mean, tip, rule)
    }

    pub fn hub(&self) -> f64 {
        self.hub
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn tip(&self) -> f64 {
        self.tip
    }

    pub fn rule(&self) -> MeanRadiusRule {
        self.rule
    }

    pub fn height(&self) -> f64 {
        self.tip - self.hub
    }

    pub fn area(&self) -> f64 {
        PI * (self.tip * self.tip - self.hub * self.hub)
    }

    pub fn hub_to_tip_ratio(&self) -> f64 {
        self.hub / self.tip
    }

    /// Radius at a span fraction, 0 at the hub and 1 at the tip.
    pub fn radius_at(&self, span_fraction: f64) -> f64 {
        if span_fraction >= 1.0 {
            return self.tip;
        }
        self.hub + span_fraction * (self.tip - self.hub)
    }

    /// `count` evenly spaced span fractions from hub (0) to tip (1).
    pub fn span_fractions(count: usize) -> Vec<f64> {
        linspace(0.0, 1.0, count)
    }
}

/// Rotating or stationary blade row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    Rotor,
    Stator,
}

impl RowKind {
    pub fn is_rotating(self) -> bool {
        matches!(self, RowKind::Rotor)
    }
}

/// Blade row proportions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowParameters {
    /// Blade height over chord.
    pub aspect_ratio: f64,
    /// Blade pitch over chord (inverse solidity).
    pub pitch_to_chord: f64,
    /// Maximum thickness over chord.
    pub thickness_to_chord: f64,
}

impl RowParameters {
    pub fn validate(&self) -> StageResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.aspect_ratio) {
            return Err(StageError::infeasible("aspect ratio must be positive"));
        }
        if !positive(self.pitch_to_chord) {
            return Err(StageError::infeasible("pitch-to-chord must be positive"));
        }
        if !positive(self.thickness_to_chord) || self.thickness_to_chord >= 1.0 {
            return Err(StageError::infeasible(
                "thickness-to-chord must lie in (0, 1)",
            ));
        }
        Ok(())
    }

    pub fn solidity(&self) -> f64 {
        1.0 / self.pitch_to_chord
    }
}

/// Stage loading as requested by the designer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageLoading {
    /// ψ = Δh0 / U²
    WorkCoefficient(f64),
    /// Stagnation temperature rise [K]
    TemperatureRise(f64),
    /// Stagnation pressure ratio
    PressureRatio(f64),
}

/// Per-stage input before the annulus is sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageTarget {
    pub loading: StageLoading,
    pub reaction: f64,
    /// Overrides cx / U at the mean radius when set.
    pub flow_coefficient: Option<f64>,
    pub span_stations: usize,
    pub rotor: RowParameters,
    pub stator: RowParameters,
    /// Axial gap between rotor and stator, in rotor chords.
    pub row_gap_to_chord: f64,
    /// Axial gap to the next stage, in rotor chords.
    pub stage_gap_to_chord: f64,
}

impl StageTarget {
    pub fn validate(&self) -> StageResult<()> {
        if !(0.0..=1.0).contains(&self.reaction) {
            return Err(StageError::infeasible(format!(
                "reaction must lie in [0, 1] (got {})",
                self.reaction
            )));
        }
        if self.span_stations < 2 {
            return Err(StageError::infeasible(
                "at least two span stations are required",
            ));
        }
        if let Some(phi) = self.flow_coefficient {
            if !phi.is_finite() || phi <= 0.0 {
                return Err(StageError::infeasible("flow coefficient must be positive"));
            }
        }
        if !(self.row_gap_to_chord.is_finite() && self.row_gap_to_chord >= 0.0) {
            return Err(StageError::infeasible("row gap must be non-negative"));
        }
        if !(self.stage_gap_to_chord.is_finite() && self.stage_gap_to_chord >= 0.0) {
            return Err(StageError::infeasible("stage gap must be non-negative"));
        }
        self.rotor.validate()?;
        self.stator.validate()
    }
}

/// Fully sized stage: dimensionless loading, annulus at the rotor inlet and
/// shaft speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageDesign {
    /// ψ = Δh0 / U_m²
    pub work_coefficient: f64,
    /// φ = cx / U_m
    pub flow_coefficient: f64,
    /// Degree of reaction at the mean radius.
    pub reaction: f64,
    /// Rotor inlet annulus; the mean radius is shared by the whole stage.
    pub annulus: Annulus,
    /// Shaft speed [rev/min].
    pub rpm: f64,
    pub polytropic_efficiency: f64,
    /// Physical area over flow area, minus one.
    pub blockage: f64,
    pub span_stations: usize,
    /// Stator exit absolute flow angle α3 [rad]; `None` returns the flow to
    /// the rotor inlet angle α1.
    pub outlet_angle: Option<f64>,
}

impl StageDesign {
    pub fn validate(&self) -> StageResult<()> {
        // re-checks radii in case the annulus was built for another stage
        Annulus::new(
            self.annulus.hub,
            self.annulus.mean,
            self.annulus.tip,
            self.annulus.rule,
        )?;
        if !(0.0..=1.0).contains(&self.reaction) {
            return Err(StageError::infeasible(format!(
                "reaction must lie in [0, 1] (got {})",
                self.reaction
            )));
        }
        if !self.work_coefficient.is_finite() || self.work_coefficient <= 0.0 {
            return Err(StageError::infeasible("work coefficient must be positive"));
        }
        if !self.flow_coefficient.is_finite() || self.flow_coefficient <= 0.0 {
            return Err(StageError::infeasible("flow coefficient must be positive"));
        }
        if !self.rpm.is_finite() || self.rpm <= 0.0 {
            return Err(StageError::infeasible("shaft speed must be positive"));
        }
        if !(self.polytropic_efficiency > 0.0 && self.polytropic_efficiency <= 1.0) {
            return Err(StageError::infeasible(
                "polytropic efficiency must lie in (0, 1]",
            ));
        }
        if !self.blockage.is_finite() || self.blockage < 0.0 {
            return Err(StageError::infeasible("blockage must be non-negative"));
        }
        if self.span_stations < 2 {
            return Err(StageError::infeasible(
                "at least two span stations are required",
            ));
        }
        if let Some(alpha) = self.outlet_angle {
            if !alpha.is_finite() || alpha.abs() >= FRAC_PI_2 {
                return Err(StageError::infeasible(
                    "stator exit angle must lie within 90 degrees of axial",
                ));
            }
        }
        Ok(())
    }

    /// Blade speed at the mean radius [m/s].
    pub fn blade_speed(&self) -> f64 {
        blade_speed(self.rpm, self.annulus.mean)
    }

    /// Axial velocity φ·U_m [m/s].
    pub fn axial_velocity(&self) -> f64 {
        self.flow_coefficient * self.blade_speed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_annulus_keeps_area_and_mean() {
        let annulus = Annulus::about_mean(0.2, 0.05, MeanRadiusRule::Arithmetic).unwrap();
        assert!((annulus.mean() - 0.2).abs() < 1e-15);
        assert!((annulus.area() - 0.05).abs() < 1e-12);
        let mean = MeanRadiusRule::Arithmetic.mean(annulus.hub(), annulus.tip());
        assert!((mean - 0.2).abs() < 1e-12);
    }

    #[test]
    fn rms_annulus_keeps_area_and_mean() {
        let annulus = Annulus::about_mean(0.2, 0.05, MeanRadiusRule::RootMeanSquare).unwrap();
        assert!((annulus.area() - 0.05).abs() < 1e-12);
        let rms = MeanRadiusRule::RootMeanSquare.mean(annulus.hub(), annulus.tip());
        assert!((rms - 0.2).abs() < 1e-12);
    }

    #[test]
    fn hub_to_tip_sizing() {
        let annulus =
            Annulus::from_hub_to_tip_ratio(0.03, 0.5, MeanRadiusRule::Arithmetic).unwrap();
        assert!((annulus.hub_to_tip_ratio() - 0.5).abs() < 1e-12);
        assert!((annulus.area() - 0.03).abs() < 1e-12);
        assert!(annulus.hub() < annulus.mean() && annulus.mean() < annulus.tip());
    }

    #[test]
    fn oversized_area_collapses_hub() {
        let err = Annulus::about_mean(0.05, 0.1, MeanRadiusRule::Arithmetic).unwrap_err();
        assert!(matches!(err, StageError::Infeasible { .. }));
        assert!(Annulus::about_mean(0.05, 0.1, MeanRadiusRule::RootMeanSquare).is_err());
    }

    #[test]
    fn unordered_radii_rejected() {
        assert!(Annulus::new(0.1, 0.09, 0.2, MeanRadiusRule::Arithmetic).is_err());
        assert!(Annulus::new(0.0, 0.1, 0.2, MeanRadiusRule::Arithmetic).is_err());
        assert!(Annulus::new(0.1, 0.15, 0.15, MeanRadiusRule::Arithmetic).is_err());
    }

    #[test]
    fn span_fraction_end_points_are_exact() {
        let annulus = Annulus::new(0.05, 0.08, 0.11, MeanRadiusRule::Arithmetic).unwrap();
        let spans = Annulus::span_fractions(5);
        assert_eq!(spans[0], 0.0);
        assert_eq!(spans[4], 1.0);
        assert_eq!(annulus.radius_at(0.0), annulus.hub());
        assert_eq!(annulus.radius_at(1.0), annulus.tip());
    }

    #[test]
    fn row_parameters_validation() {
        let good = RowParameters {
            aspect_ratio: 3.0,
            pitch_to_chord: 0.8,
            thickness_to_chord: 0.1,
        };
        assert!(good.validate().is_ok());
        assert!((good.solidity() - 1.25).abs() < 1e-15);
        let bad = RowParameters {
            thickness_to_chord: 1.5,
            ..good
        };
        assert!(bad.validate().is_err());
    }
}
