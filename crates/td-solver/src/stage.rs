//! Single-stage mean-line and radial solution.
//!
//! The stator turns the flow to the design's outlet angle α3, which the
//! sequencer sets to the next stage's rotor inlet angle. Without one the
//! stage repeats, α3 = α1. The mean radius is shared by rotor and stator;
//! the stator annulus is sized from continuity at the rotor exit.

use crate::design::{Annulus, RowKind, StageDesign};
use crate::error::{StageError, StageResult};
use crate::radial::{FreeVortex, RadialLaw};
use crate::triangle::{RadialStation, VelocityTriangle};
use rayon::prelude::*;
use std::sync::Arc;
use td_core::units::{Power, Torque, k, mps, newton_meter, pa, watt};
use td_gas::ThermoState;
use tracing::debug;

/// Closed-form mean-line quantities of a stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanLine {
    pub work_coefficient: f64,
    pub flow_coefficient: f64,
    pub reaction: f64,
    /// Mean radius [m].
    pub radius: f64,
    /// Blade speed at the mean radius [m/s].
    pub blade_speed: f64,
    pub polytropic_efficiency: f64,
    /// Stator exit flow angle α3 [rad]; `None` repeats α1.
    pub outlet_angle: Option<f64>,
}

impl MeanLine {
    pub fn of(design: &StageDesign) -> Self {
        Self {
            work_coefficient: design.work_coefficient,
            flow_coefficient: design.flow_coefficient,
            reaction: design.reaction,
            radius: design.annulus.mean(),
            blade_speed: design.blade_speed(),
            polytropic_efficiency: design.polytropic_efficiency,
            outlet_angle: design.outlet_angle,
        }
    }

    pub fn axial_velocity(&self) -> f64 {
        self.flow_coefficient * self.blade_speed
    }

    /// Rotor inlet absolute flow angle α1.
    pub fn inlet_angle(&self) -> f64 {
        ((1.0 - self.reaction - self.work_coefficient / 2.0) / self.flow_coefficient).atan()
    }

    /// Rotor exit absolute flow angle α2.
    pub fn exit_angle(&self) -> f64 {
        ((1.0 - self.reaction + self.work_coefficient / 2.0) / self.flow_coefficient).atan()
    }

    /// Stator exit absolute flow angle α3.
    pub fn outlet_angle(&self) -> f64 {
        self.outlet_angle.unwrap_or_else(|| self.inlet_angle())
    }

    /// Euler work Δh0 = ψ·U² [J/kg].
    pub fn specific_work(&self) -> f64 {
        self.work_coefficient * self.blade_speed * self.blade_speed
    }

    pub fn inlet_triangle(&self) -> VelocityTriangle {
        VelocityTriangle::from_flow_angle(
            self.radius,
            self.blade_speed,
            self.axial_velocity(),
            self.inlet_angle(),
        )
    }

    pub fn exit_triangle(&self) -> VelocityTriangle {
        VelocityTriangle::from_flow_angle(
            self.radius,
            self.blade_speed,
            self.axial_velocity(),
            self.exit_angle(),
        )
    }

    pub fn outlet_triangle(&self) -> VelocityTriangle {
        VelocityTriangle::from_flow_angle(
            self.radius,
            self.blade_speed,
            self.axial_velocity(),
            self.outlet_angle(),
        )
    }

    /// Stage outlet total conditions (state at rest) and stagnation
    /// pressure ratio from the Euler work and polytropic efficiency.
    pub fn outlet_totals(&self, inlet: &ThermoState) -> StageResult<(ThermoState, f64)> {
        let gas = inlet.gas();
        let t01 = inlet.total_temperature().value;
        let t02 = t01 + self.specific_work() / gas.cp();
        let pressure_ratio =
            (t02 / t01).powf(self.polytropic_efficiency * gas.isentropic_exponent());
        if !pressure_ratio.is_finite() || pressure_ratio <= 0.0 {
            return Err(StageError::infeasible("stage pressure ratio is not finite"));
        }
        let p02 = inlet.total_pressure().value * pressure_ratio;
        let outlet = inlet.with_total_conditions(pa(p02), k(t02))?;
        Ok((outlet, pressure_ratio))
    }
}

/// Solved stage: states, triangles, annuli and radial tables.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSolution {
    /// Stage inlet as passed to the solver.
    pub inlet: ThermoState,
    /// Static state ahead of the rotor at the mean radius.
    pub rotor_inlet: ThermoState,
    /// Static state between rotor and stator at the mean radius.
    pub rotor_exit: ThermoState,
    /// Static state behind the stator at the mean radius.
    pub outlet: ThermoState,
    pub mean_inlet: VelocityTriangle,
    pub mean_exit: VelocityTriangle,
    pub mean_outlet: VelocityTriangle,
    pub rotor_annulus: Annulus,
    pub stator_annulus: Annulus,
    /// Rotor stations, hub to tip.
    pub rotor_stations: Vec<RadialStation>,
    /// Stator stations, hub to tip.
    pub stator_stations: Vec<RadialStation>,
    pub pressure_ratio: f64,
    /// Stagnation temperature rise [K].
    pub temperature_rise: f64,
    /// Euler work [J/kg].
    pub specific_work: f64,
    pub torque: Torque,
    pub power: Power,
}

/// Solves one stage at a time from its inlet state and design.
#[derive(Debug, Clone)]
pub struct StageSolver {
    radial_law: Arc<dyn RadialLaw>,
}

impl Default for StageSolver {
    fn default() -> Self {
        Self::new(Arc::new(FreeVortex))
    }
}

impl StageSolver {
    pub fn new(radial_law: Arc<dyn RadialLaw>) -> Self {
        Self { radial_law }
    }

    pub fn radial_law(&self) -> &dyn RadialLaw {
        self.radial_law.as_ref()
    }

    /// Outlet total conditions from the Euler work alone, without sizing or
    /// checking the velocity triangles.
    pub fn propagate_total_conditions(
        &self,
        inlet: &ThermoState,
        design: &StageDesign,
    ) -> StageResult<ThermoState> {
        design.validate()?;
        MeanLine::of(design)
            .outlet_totals(inlet)
            .map(|(outlet, _)| outlet)
    }

    pub fn solve(&self, inlet: &ThermoState, design: &StageDesign) -> StageResult<StageSolution> {
        design.validate()?;

        let mean = MeanLine::of(design);
        let axial = mean.axial_velocity();
        let mean_inlet = mean.inlet_triangle();
        let mean_exit = mean.exit_triangle();
        let mean_outlet = mean.outlet_triangle();

        let (outlet_totals, pressure_ratio) = mean.outlet_totals(inlet)?;

        let rotor_inlet = inlet
            .derive_static(mps(mean_inlet.absolute()))?
            .with_relative_velocity(mps(mean_inlet.relative()))?;
        let rotor_exit = outlet_totals
            .derive_static(mps(mean_exit.absolute()))?
            .with_relative_velocity(mps(mean_exit.relative()))?;
        let outlet = outlet_totals.derive_static(mps(mean_outlet.absolute()))?;

        let rotor_annulus = design.annulus;
        let stator_area = rotor_exit.flow_area(mps(axial))? * (1.0 + design.blockage);
        let stator_annulus =
            Annulus::about_mean(rotor_annulus.mean(), stator_area, rotor_annulus.rule())
                .map_err(|e| StageError::infeasible(format!("stator annulus: {e}")))?;

        let rotor_stations = self.stations(
            RowKind::Rotor,
            &rotor_annulus,
            design.span_stations,
            (&mean_inlet, inlet),
            (&mean_exit, &outlet_totals),
        )?;
        let stator_stations = self.stations(
            RowKind::Stator,
            &stator_annulus,
            design.span_stations,
            (&mean_exit, &outlet_totals),
            (&mean_outlet, &outlet_totals),
        )?;

        check_mach(RowKind::Rotor, &rotor_stations)?;
        check_mach(RowKind::Stator, &stator_stations)?;

        let mdot = inlet.mass_flow().value;
        let specific_work = mean.specific_work();
        let temperature_rise =
            outlet_totals.total_temperature().value - inlet.total_temperature().value;
        let torque = mdot * mean.radius * (mean_exit.tangential - mean_inlet.tangential);

        debug!(
            psi = mean.work_coefficient,
            phi = mean.flow_coefficient,
            reaction = mean.reaction,
            pressure_ratio,
            hub = rotor_annulus.hub(),
            tip = rotor_annulus.tip(),
            "stage solved"
        );

        Ok(StageSolution {
            inlet: *inlet,
            rotor_inlet,
            rotor_exit,
            outlet,
            mean_inlet,
            mean_exit,
            mean_outlet,
            rotor_annulus,
            stator_annulus,
            rotor_stations,
            stator_stations,
            pressure_ratio,
            temperature_rise,
            specific_work,
            torque: newton_meter(torque),
            power: watt(mdot * specific_work),
        })
    }

    /// Hub-to-tip table for one row. Each station derives its static states
    /// from the row's inlet and outlet totals independently.
    fn stations(
        &self,
        kind: RowKind,
        annulus: &Annulus,
        count: usize,
        (inlet_mean, inlet_totals): (&VelocityTriangle, &ThermoState),
        (outlet_mean, outlet_totals): (&VelocityTriangle, &ThermoState),
    ) -> StageResult<Vec<RadialStation>> {
        let law = self.radial_law.as_ref();
        let row_state = |totals: &ThermoState, t: &VelocityTriangle| -> StageResult<ThermoState> {
            let state = totals.derive_static(mps(t.absolute()))?;
            if kind.is_rotating() {
                Ok(state.with_relative_velocity(mps(t.relative()))?)
            } else {
                Ok(state)
            }
        };

        Annulus::span_fractions(count)
            .into_par_iter()
            .map(|span_fraction| {
                let inlet = law.triangle(inlet_mean, annulus, span_fraction);
                let outlet = law.triangle(outlet_mean, annulus, span_fraction);
                Ok(RadialStation {
                    span_fraction,
                    radius: inlet.radius,
                    inlet,
                    outlet,
                    inlet_state: row_state(inlet_totals, &inlet)?,
                    outlet_state: row_state(outlet_totals, &outlet)?,
                })
            })
            .collect()
    }
}

fn check_mach(kind: RowKind, stations: &[RadialStation]) -> StageResult<()> {
    for station in stations {
        let (inlet, outlet) = match kind {
            RowKind::Rotor => (
                station.inlet_state.relative_mach_number(),
                station.outlet_state.relative_mach_number(),
            ),
            // only the stator inlet is checked
            RowKind::Stator => (station.inlet_state.mach_number(), 0.0),
        };
        let worst = inlet.max(outlet);
        if !worst.is_finite() || worst >= 1.0 {
            let frame = if kind.is_rotating() {
                "relative"
            } else {
                "absolute"
            };
            return Err(StageError::infeasible(format!(
                "{kind:?} {frame} Mach number {worst:.3} at span {:.3} is not subsonic",
                station.span_fraction
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::MeanRadiusRule;
    use td_core::units::kgps;
    use td_gas::GasProperties;

    fn inlet() -> ThermoState {
        let air = GasProperties::air();
        ThermoState::from_total_conditions(pa(101_325.0), k(288.0), kgps(5.0), air).unwrap()
    }

    fn design(psi: f64) -> StageDesign {
        // 25000 rpm at r_m = 0.0847 m gives U_m ≈ 221.7 m/s; cx = 150 m/s
        let mean = 0.084_665;
        let annulus = Annulus::about_mean(mean, 0.03, MeanRadiusRule::Arithmetic).unwrap();
        let u = td_core::units::constants::blade_speed(25_000.0, mean);
        StageDesign {
            work_coefficient: psi,
            flow_coefficient: 150.0 / u,
            reaction: 0.5,
            annulus,
            rpm: 25_000.0,
            polytropic_efficiency: 0.9,
            blockage: 0.0,
            span_stations: 5,
            outlet_angle: None,
        }
    }

    #[test]
    fn fifty_percent_reaction_angles_are_symmetric() {
        let line = MeanLine::of(&design(0.35));
        let t1 = line.inlet_triangle();
        let t2 = line.exit_triangle();
        // R = 0.5: α1 = -β2 and α2 = -β1
        assert!((t1.alpha() + t2.beta()).abs() < 1e-12);
        assert!((t2.alpha() + t1.beta()).abs() < 1e-12);
    }

    #[test]
    fn euler_work_matches_swirl_change() {
        let line = MeanLine::of(&design(0.35));
        let dctheta = line.exit_triangle().tangential - line.inlet_triangle().tangential;
        assert!((line.blade_speed * dctheta - line.specific_work()).abs() < 1e-8);
    }

    #[test]
    fn solve_reports_consistent_totals() {
        let solution = StageSolver::default().solve(&inlet(), &design(0.35)).unwrap();
        let cp = GasProperties::air().cp();
        assert!((solution.temperature_rise - solution.specific_work / cp).abs() < 1e-9);
        assert!(solution.pressure_ratio > 1.0);
        assert_eq!(solution.outlet.mass_flow(), inlet().mass_flow());
        let p_ratio =
            solution.outlet.total_pressure().value / solution.inlet.total_pressure().value;
        assert!((p_ratio - solution.pressure_ratio).abs() < 1e-12);
        assert!((solution.power.value - 5.0 * solution.specific_work).abs() < 1e-6);
    }

    #[test]
    fn stator_annulus_shrinks_behind_rotor() {
        let solution = StageSolver::default().solve(&inlet(), &design(0.35)).unwrap();
        assert_eq!(solution.stator_annulus.mean(), solution.rotor_annulus.mean());
        assert!(solution.stator_annulus.height() < solution.rotor_annulus.height());
        assert_eq!(solution.rotor_stations.len(), 5);
        assert_eq!(solution.stator_stations.len(), 5);
    }

    #[test]
    fn stations_are_ordered_hub_to_tip() {
        let solution = StageSolver::default().solve(&inlet(), &design(0.35)).unwrap();
        let radii: Vec<f64> = solution.rotor_stations.iter().map(|s| s.radius).collect();
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(radii[0], solution.rotor_annulus.hub());
        assert_eq!(radii[4], solution.rotor_annulus.tip());
    }

    #[test]
    fn invalid_reaction_is_infeasible() {
        let mut d = design(0.35);
        d.reaction = 1.2;
        let err = StageSolver::default().solve(&inlet(), &d).unwrap_err();
        assert!(matches!(err, StageError::Infeasible { .. }));
    }

    #[test]
    fn supersonic_rotor_is_infeasible() {
        let mut d = design(0.35);
        d.rpm = 60_000.0;
        d.flow_coefficient = 150.0 / d.blade_speed();
        let err = StageSolver::default().solve(&inlet(), &d).unwrap_err();
        match err {
            StageError::Infeasible { what } => assert!(what.contains("Mach")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn repeating_stage_returns_to_inlet_angle() {
        let solution = StageSolver::default().solve(&inlet(), &design(0.35)).unwrap();
        assert_eq!(solution.mean_outlet, solution.mean_inlet);
    }

    #[test]
    fn stator_turns_to_requested_outlet_angle() {
        let alpha3 = 0.1;
        let d = StageDesign {
            outlet_angle: Some(alpha3),
            ..design(0.35)
        };
        let solution = StageSolver::default().solve(&inlet(), &d).unwrap();
        assert!((solution.mean_outlet.alpha() - alpha3).abs() < 1e-12);
        assert_eq!(solution.mean_outlet.axial, solution.mean_inlet.axial);
        // the rotor and the work it does are unchanged
        let repeating = StageSolver::default().solve(&inlet(), &design(0.35)).unwrap();
        assert_eq!(solution.mean_exit, repeating.mean_exit);
        assert_eq!(solution.pressure_ratio, repeating.pressure_ratio);
        let hub = &solution.stator_stations[0];
        assert!((hub.outlet.swirl() - solution.mean_outlet.swirl()).abs() < 1e-9);

        let sideways = StageDesign {
            outlet_angle: Some(2.0),
            ..design(0.35)
        };
        assert!(StageSolver::default().solve(&inlet(), &sideways).is_err());
    }

    #[test]
    fn propagation_matches_full_solve() {
        let solver = StageSolver::default();
        let d = design(0.35);
        let totals = solver.propagate_total_conditions(&inlet(), &d).unwrap();
        let solution = solver.solve(&inlet(), &d).unwrap();
        assert_eq!(totals.total_pressure(), solution.outlet.total_pressure());
        assert_eq!(totals.total_temperature(), solution.outlet.total_temperature());
    }
}
