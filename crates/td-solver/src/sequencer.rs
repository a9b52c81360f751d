//! Stage-by-stage sequencing of a multi-stage machine.
//!
//! Stages are solved strictly in order: each stage's inlet is the previous
//! stage's outlet total conditions, and each stator turns the flow to the
//! rotor inlet angle of the stage behind it. The mean radius is sized once at
//! the machine inlet and held for every stage.

use crate::blade::{BladeRow, BladeRowGenerator};
use crate::design::{Annulus, MeanRadiusRule, RowKind, StageDesign, StageLoading, StageTarget};
use crate::error::{SequenceError, SequenceResult, StageError, StageResult};
use crate::stage::{MeanLine, StageSolution, StageSolver};
use std::sync::OnceLock;
use td_core::numeric::{Tolerances, nearly_equal, relative_error};
use td_core::units::constants::blade_speed;
use td_core::units::{Velocity, mps};
use td_gas::ThermoState;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Relative tolerance of the closure checks unless configured otherwise.
pub const DEFAULT_CLOSURE_TOLERANCE: f64 = 1e-3;

/// Machine-level design parameters shared by all stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineSpec {
    /// Shaft speed [rev/min].
    pub rpm: f64,
    /// Axial velocity through the machine.
    pub axial_velocity: Velocity,
    /// Hub-to-tip ratio at the machine inlet.
    pub hub_to_tip_ratio: f64,
    pub mean_radius_rule: MeanRadiusRule,
    pub blockage: f64,
    pub polytropic_efficiency: f64,
    /// Overall stagnation pressure ratio the stage targets should reach.
    pub target_pressure_ratio: Option<f64>,
    pub closure_tolerance: f64,
}

impl MachineSpec {
    pub fn validate(&self) -> SequenceResult<()> {
        if !self.rpm.is_finite() || self.rpm <= 0.0 {
            return Err(SequenceError::InvalidMachine {
                what: "shaft speed must be positive",
            });
        }
        if !self.axial_velocity.value.is_finite() || self.axial_velocity.value <= 0.0 {
            return Err(SequenceError::InvalidMachine {
                what: "axial velocity must be positive",
            });
        }
        if !(self.hub_to_tip_ratio > 0.0 && self.hub_to_tip_ratio < 1.0) {
            return Err(SequenceError::InvalidMachine {
                what: "hub-to-tip ratio must lie in (0, 1)",
            });
        }
        if !self.blockage.is_finite() || self.blockage < 0.0 {
            return Err(SequenceError::InvalidMachine {
                what: "blockage must be non-negative",
            });
        }
        if !(self.polytropic_efficiency > 0.0 && self.polytropic_efficiency <= 1.0) {
            return Err(SequenceError::InvalidMachine {
                what: "polytropic efficiency must lie in (0, 1]",
            });
        }
        if let Some(target) = self.target_pressure_ratio {
            if !target.is_finite() || target < 1.0 {
                return Err(SequenceError::InvalidMachine {
                    what: "target pressure ratio must be at least one",
                });
            }
        }
        if !self.closure_tolerance.is_finite() || self.closure_tolerance <= 0.0 {
            return Err(SequenceError::InvalidMachine {
                what: "closure tolerance must be positive",
            });
        }
        Ok(())
    }
}

/// Non-fatal mismatch found after the stage chain was solved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClosureWarning {
    #[error("overall pressure ratio {achieved:.6} misses target {target:.6}")]
    PressureRatio { achieved: f64, target: f64 },

    #[error("stage {stage}: outlet mass flow {outlet} kg/s differs from inlet {inlet} kg/s")]
    MassFlow {
        stage: usize,
        inlet: f64,
        outlet: f64,
    },

    #[error(
        "sum of stage work {stage_work:.3} J/kg differs from enthalpy rise \
         {enthalpy_rise:.3} J/kg"
    )]
    Energy { stage_work: f64, enthalpy_rise: f64 },

    #[error(
        "stage {stage}: inlet totals ({pressure} Pa, {temperature} K) do not match \
         upstream outlet ({upstream_pressure} Pa, {upstream_temperature} K)"
    )]
    StageInterface {
        stage: usize,
        pressure: f64,
        temperature: f64,
        upstream_pressure: f64,
        upstream_temperature: f64,
    },

    /// Rotor inlet velocities differ from the upstream stator exit.
    #[error(
        "stage {stage}: rotor inlet (cx {axial:.3}, cθ {tangential:.3}) m/s does not match \
         upstream stator exit (cx {upstream_axial:.3}, cθ {upstream_tangential:.3}) m/s"
    )]
    FlowInterface {
        stage: usize,
        axial: f64,
        tangential: f64,
        upstream_axial: f64,
        upstream_tangential: f64,
    },

    #[error("stage chain halted at stage {halted_at} of {planned}")]
    Incomplete { halted_at: usize, planned: usize },
}

/// A stage that solved and produced both blade rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedStage {
    pub design: StageDesign,
    pub solution: StageSolution,
    pub rotor: BladeRow,
    pub stator: BladeRow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Solved(Box<SolvedStage>),
    /// `outlet` holds the Euler-work outlet totals when they could still be
    /// derived; the chain halts when it is `None`.
    Failed {
        error: StageError,
        outlet: Option<ThermoState>,
    },
}

/// One stage of the chain with the inputs it was solved from.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub index: usize,
    pub target: StageTarget,
    pub inlet: ThermoState,
    pub outcome: StageOutcome,
}

impl StageRecord {
    pub fn solved(&self) -> Option<&SolvedStage> {
        match &self.outcome {
            StageOutcome::Solved(stage) => Some(stage),
            StageOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&StageError> {
        match &self.outcome {
            StageOutcome::Solved(_) => None,
            StageOutcome::Failed { error, .. } => Some(error),
        }
    }

    /// Outlet state carrying the stage outlet total conditions.
    pub fn outlet(&self) -> Option<ThermoState> {
        match &self.outcome {
            StageOutcome::Solved(stage) => Some(stage.solution.outlet),
            StageOutcome::Failed { outlet, .. } => *outlet,
        }
    }

    /// Stagnation enthalpy rise across the stage [J/kg].
    pub fn specific_work(&self) -> Option<f64> {
        match &self.outcome {
            StageOutcome::Solved(stage) => Some(stage.solution.specific_work),
            StageOutcome::Failed { outlet, .. } => outlet
                .map(|out| out.total_enthalpy() - self.inlet.total_enthalpy()),
        }
    }
}

/// Solves a chain of stages for one machine specification.
#[derive(Debug, Clone)]
pub struct Sequencer {
    machine: MachineSpec,
    solver: StageSolver,
    blades: BladeRowGenerator,
}

impl Sequencer {
    pub fn new(machine: MachineSpec) -> SequenceResult<Self> {
        machine.validate()?;
        Ok(Self {
            machine,
            solver: StageSolver::default(),
            blades: BladeRowGenerator::default(),
        })
    }

    pub fn with_solver(mut self, solver: StageSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_blade_generator(mut self, blades: BladeRowGenerator) -> Self {
        self.blades = blades;
        self
    }

    pub fn machine(&self) -> &MachineSpec {
        &self.machine
    }

    /// Mean radius from the inlet flow area at the hub-to-tip ratio, flow
    /// entering axially.
    pub fn mean_radius(&self, inlet: &ThermoState) -> StageResult<f64> {
        let axial = self.machine.axial_velocity;
        let moving = inlet.derive_static(axial)?;
        let area = moving.flow_area(axial)? * (1.0 + self.machine.blockage);
        let annulus = Annulus::from_hub_to_tip_ratio(
            area,
            self.machine.hub_to_tip_ratio,
            self.machine.mean_radius_rule,
        )?;
        Ok(annulus.mean())
    }

    /// ψ for a loading request at the given inlet and mean blade speed.
    pub fn work_coefficient(
        &self,
        inlet: &ThermoState,
        loading: StageLoading,
        blade_speed: f64,
    ) -> StageResult<f64> {
        let gas = inlet.gas();
        let u2 = blade_speed * blade_speed;
        let psi = match loading {
            StageLoading::WorkCoefficient(psi) => psi,
            StageLoading::TemperatureRise(dt0) => gas.cp() * dt0 / u2,
            StageLoading::PressureRatio(ratio) => {
                if !ratio.is_finite() || ratio <= 1.0 {
                    return Err(StageError::infeasible(format!(
                        "stage pressure ratio must exceed one (got {ratio})"
                    )));
                }
                let exponent =
                    1.0 / (self.machine.polytropic_efficiency * gas.isentropic_exponent());
                gas.cp() * inlet.total_temperature().value * (ratio.powf(exponent) - 1.0) / u2
            }
        };
        if !psi.is_finite() || psi <= 0.0 {
            return Err(StageError::infeasible(format!(
                "work coefficient must be positive (got {psi})"
            )));
        }
        Ok(psi)
    }

    pub fn run(
        &self,
        inlet: ThermoState,
        targets: &[StageTarget],
    ) -> SequenceResult<Turbomachinery> {
        if targets.is_empty() {
            return Err(SequenceError::InvalidMachine {
                what: "at least one stage is required",
            });
        }
        let mean_radius = self
            .mean_radius(&inlet)
            .map_err(SequenceError::InletSizing)?;

        let mut stages = Vec::with_capacity(targets.len());
        let mut stage_inlet = inlet;
        for (index, target) in targets.iter().enumerate() {
            let next = targets.get(index + 1);
            let record = self.stage(index, stage_inlet, target, next, mean_radius);
            let outlet = record.outlet();
            stages.push(record);
            match outlet {
                Some(outlet) => stage_inlet = outlet,
                None => {
                    warn!(stage = index, "stage chain halted");
                    break;
                }
            }
        }

        let mut machine = Turbomachinery {
            sequencer: self.clone(),
            inlet,
            mean_radius,
            planned: targets.len(),
            stages,
            warnings: Vec::new(),
            pressure_ratio: OnceLock::new(),
        };
        machine.refresh_closure();

        info!(
            stages = machine.stages.len(),
            planned = machine.planned,
            pressure_ratio = machine.pressure_ratio(),
            warnings = machine.warnings.len(),
            "sequence finished"
        );
        Ok(machine)
    }

    /// Solves one stage; errors are recorded on the returned record.
    ///
    /// The stator turns the flow to the rotor inlet angle of `next`; the last
    /// stage, or one whose successor cannot be resolved, repeats its own α1.
    pub fn stage(
        &self,
        index: usize,
        inlet: ThermoState,
        target: &StageTarget,
        next: Option<&StageTarget>,
        mean_radius: f64,
    ) -> StageRecord {
        let u = blade_speed(self.machine.rpm, mean_radius);
        let outcome = match self.work_coefficient(&inlet, target.loading, u) {
            Err(error) => StageOutcome::Failed {
                error,
                outlet: None,
            },
            Ok(psi) => {
                let mut mean_line = self.mean_line(target, psi, mean_radius);
                mean_line.outlet_angle =
                    next.and_then(|next| self.downstream_inlet_angle(&inlet, &mean_line, next));
                match self.solve_sized(&inlet, target, &mean_line) {
                    Ok(stage) => StageOutcome::Solved(Box::new(stage)),
                    Err(error) => StageOutcome::Failed {
                        error,
                        outlet: mean_line.outlet_totals(&inlet).ok().map(|(out, _)| out),
                    },
                }
            }
        };

        match &outcome {
            StageOutcome::Solved(stage) => debug!(
                stage = index,
                psi = stage.design.work_coefficient,
                phi = stage.design.flow_coefficient,
                pressure_ratio = stage.solution.pressure_ratio,
                "stage solved"
            ),
            StageOutcome::Failed { error, outlet } => warn!(
                stage = index,
                error = %error,
                continues = outlet.is_some(),
                "stage failed"
            ),
        }

        StageRecord {
            index,
            target: *target,
            inlet,
            outcome,
        }
    }

    fn mean_line(&self, target: &StageTarget, psi: f64, mean_radius: f64) -> MeanLine {
        let u = blade_speed(self.machine.rpm, mean_radius);
        MeanLine {
            work_coefficient: psi,
            flow_coefficient: target
                .flow_coefficient
                .unwrap_or(self.machine.axial_velocity.value / u),
            reaction: target.reaction,
            radius: mean_radius,
            blade_speed: u,
            polytropic_efficiency: self.machine.polytropic_efficiency,
            outlet_angle: None,
        }
    }

    /// α1 the next stage will be solved with, from this stage's outlet totals.
    fn downstream_inlet_angle(
        &self,
        inlet: &ThermoState,
        mean_line: &MeanLine,
        next: &StageTarget,
    ) -> Option<f64> {
        let (outlet, _) = mean_line.outlet_totals(inlet).ok()?;
        let psi = self
            .work_coefficient(&outlet, next.loading, mean_line.blade_speed)
            .ok()?;
        Some(self.mean_line(next, psi, mean_line.radius).inlet_angle())
    }

    fn size_stage(
        &self,
        inlet: &ThermoState,
        target: &StageTarget,
        mean_line: &MeanLine,
    ) -> StageResult<StageDesign> {
        let axial = mps(mean_line.axial_velocity());
        let rotor_inlet = inlet.derive_static(mps(mean_line.inlet_triangle().absolute()))?;
        let area = rotor_inlet.flow_area(axial)? * (1.0 + self.machine.blockage);
        let annulus =
            Annulus::about_mean(mean_line.radius, area, self.machine.mean_radius_rule)?;
        Ok(StageDesign {
            work_coefficient: mean_line.work_coefficient,
            flow_coefficient: mean_line.flow_coefficient,
            reaction: target.reaction,
            annulus,
            rpm: self.machine.rpm,
            polytropic_efficiency: self.machine.polytropic_efficiency,
            blockage: self.machine.blockage,
            span_stations: target.span_stations,
            outlet_angle: mean_line.outlet_angle,
        })
    }

    fn solve_sized(
        &self,
        inlet: &ThermoState,
        target: &StageTarget,
        mean_line: &MeanLine,
    ) -> StageResult<SolvedStage> {
        target.validate()?;
        let design = self.size_stage(inlet, target, mean_line)?;
        let solution = self.solver.solve(inlet, &design)?;
        let rotor = self
            .blades
            .generate(&design, RowKind::Rotor, &solution.rotor_stations, &target.rotor)?;
        let stator = self.blades.generate(
            &design,
            RowKind::Stator,
            &solution.stator_stations,
            &target.stator,
        )?;
        Ok(SolvedStage {
            design,
            solution,
            rotor,
            stator,
        })
    }
}

/// A sequenced machine. Owns every stage record; callers get shared views.
#[derive(Debug, Clone)]
pub struct Turbomachinery {
    sequencer: Sequencer,
    inlet: ThermoState,
    mean_radius: f64,
    planned: usize,
    stages: Vec<StageRecord>,
    warnings: Vec<ClosureWarning>,
    pressure_ratio: OnceLock<f64>,
}

impl PartialEq for Turbomachinery {
    fn eq(&self, other: &Self) -> bool {
        self.sequencer.machine == other.sequencer.machine
            && self.inlet == other.inlet
            && self.mean_radius == other.mean_radius
            && self.planned == other.planned
            && self.stages == other.stages
            && self.warnings == other.warnings
    }
}

impl Turbomachinery {
    pub fn machine(&self) -> &MachineSpec {
        self.sequencer.machine()
    }

    pub fn inlet(&self) -> &ThermoState {
        &self.inlet
    }

    /// Mean radius shared by every stage [m].
    pub fn mean_radius(&self) -> f64 {
        self.mean_radius
    }

    /// Mean blade speed [m/s].
    pub fn blade_speed(&self) -> f64 {
        blade_speed(self.machine().rpm, self.mean_radius)
    }

    pub fn stages(&self) -> &[StageRecord] {
        &self.stages
    }

    pub fn stage(&self, index: usize) -> Option<&StageRecord> {
        self.stages.get(index)
    }

    /// Number of stages requested, including any not reached.
    pub fn planned_stages(&self) -> usize {
        self.planned
    }

    pub fn warnings(&self) -> &[ClosureWarning] {
        &self.warnings
    }

    /// Index of the first stage whose outlet could not be derived.
    pub fn halted_at(&self) -> Option<usize> {
        self.stages
            .iter()
            .position(|record| record.outlet().is_none())
    }

    /// Every planned stage solved.
    pub fn is_complete(&self) -> bool {
        self.stages.len() == self.planned && self.stages.iter().all(|r| r.solved().is_some())
    }

    /// Outlet of the last stage reached by the chain.
    pub fn outlet(&self) -> Option<ThermoState> {
        self.stages
            .iter()
            .map_while(StageRecord::outlet)
            .last()
    }

    /// Overall stagnation pressure ratio; cached until a stage is recomputed.
    pub fn pressure_ratio(&self) -> f64 {
        *self.pressure_ratio.get_or_init(|| match self.outlet() {
            Some(outlet) => outlet.total_pressure().value / self.inlet.total_pressure().value,
            None => 1.0,
        })
    }

    /// Re-solves one stage from its recorded inlet with a new target.
    ///
    /// Downstream stages are kept as they are; a changed outlet shows up as a
    /// `StageInterface` or `FlowInterface` warning. The re-solved stator
    /// still aims at the recorded target of the stage behind it.
    pub fn retry_stage(
        &mut self,
        index: usize,
        target: StageTarget,
    ) -> SequenceResult<&StageRecord> {
        let len = self.stages.len();
        let inlet = self
            .stages
            .get(index)
            .map(|record| record.inlet)
            .ok_or(SequenceError::StageIndex { index, len })?;
        let next = self.stages.get(index + 1).map(|record| record.target);

        let record =
            self.sequencer
                .stage(index, inlet, &target, next.as_ref(), self.mean_radius);
        self.stages[index] = record;
        self.pressure_ratio = OnceLock::new();
        self.refresh_closure();
        Ok(&self.stages[index])
    }

    fn refresh_closure(&mut self) {
        self.warnings = self.closure_warnings();
        for warning in &self.warnings {
            warn!(%warning, "closure check");
        }
    }

    fn closure_warnings(&self) -> Vec<ClosureWarning> {
        let tolerance = self.machine().closure_tolerance;
        let exact = Tolerances::default();
        let mut warnings = Vec::new();

        if let Some(halted_at) = self.halted_at() {
            warnings.push(ClosureWarning::Incomplete {
                halted_at,
                planned: self.planned,
            });
        }

        if let Some(target) = self.machine().target_pressure_ratio {
            let achieved = self.pressure_ratio();
            if relative_error(achieved, target) > tolerance {
                warnings.push(ClosureWarning::PressureRatio { achieved, target });
            }
        }

        let inlet_mdot = self.inlet.mass_flow().value;
        for record in &self.stages {
            if let Some(outlet) = record.outlet() {
                let outlet_mdot = outlet.mass_flow().value;
                if !nearly_equal(outlet_mdot, inlet_mdot, exact) {
                    warnings.push(ClosureWarning::MassFlow {
                        stage: record.index,
                        inlet: inlet_mdot,
                        outlet: outlet_mdot,
                    });
                }
            }
        }

        for pair in self.stages.windows(2) {
            let (upstream, record) = (&pair[0], &pair[1]);
            let Some(upstream_outlet) = upstream.outlet() else {
                continue;
            };
            let pressure = record.inlet.total_pressure().value;
            let temperature = record.inlet.total_temperature().value;
            let upstream_pressure = upstream_outlet.total_pressure().value;
            let upstream_temperature = upstream_outlet.total_temperature().value;
            if !nearly_equal(pressure, upstream_pressure, exact)
                || !nearly_equal(temperature, upstream_temperature, exact)
            {
                warnings.push(ClosureWarning::StageInterface {
                    stage: record.index,
                    pressure,
                    temperature,
                    upstream_pressure,
                    upstream_temperature,
                });
            }

            let (Some(upstream), Some(solved)) = (upstream.solved(), record.solved()) else {
                continue;
            };
            let exit = &upstream.solution.mean_outlet;
            let entry = &solved.solution.mean_inlet;
            let allowed = tolerance * exit.absolute();
            if (entry.axial - exit.axial).abs() > allowed
                || (entry.tangential - exit.tangential).abs() > allowed
            {
                warnings.push(ClosureWarning::FlowInterface {
                    stage: record.index,
                    axial: entry.axial,
                    tangential: entry.tangential,
                    upstream_axial: exit.axial,
                    upstream_tangential: exit.tangential,
                });
            }
        }

        if let Some(outlet) = self.outlet() {
            let stage_work: f64 = self
                .stages
                .iter()
                .map_while(StageRecord::specific_work)
                .sum();
            let enthalpy_rise = outlet.total_enthalpy() - self.inlet.total_enthalpy();
            if relative_error(stage_work, enthalpy_rise) > tolerance {
                warnings.push(ClosureWarning::Energy {
                    stage_work,
                    enthalpy_rise,
                });
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::RowParameters;
    use td_core::units::{k, kgps, pa};
    use td_gas::GasProperties;

    fn machine(target: Option<f64>) -> MachineSpec {
        MachineSpec {
            rpm: 25_000.0,
            axial_velocity: mps(150.0),
            hub_to_tip_ratio: 0.5,
            mean_radius_rule: MeanRadiusRule::Arithmetic,
            blockage: 0.0,
            polytropic_efficiency: 0.9,
            target_pressure_ratio: target,
            closure_tolerance: DEFAULT_CLOSURE_TOLERANCE,
        }
    }

    fn target(loading: StageLoading) -> StageTarget {
        let row = RowParameters {
            aspect_ratio: 2.0,
            pitch_to_chord: 0.8,
            thickness_to_chord: 0.1,
        };
        StageTarget {
            loading,
            reaction: 0.5,
            flow_coefficient: None,
            span_stations: 5,
            rotor: row,
            stator: row,
            row_gap_to_chord: 0.25,
            stage_gap_to_chord: 0.5,
        }
    }

    fn inlet() -> ThermoState {
        let air = GasProperties::air();
        ThermoState::from_total_conditions(pa(101_325.0), k(288.0), kgps(5.0), air).unwrap()
    }

    #[test]
    fn mean_radius_from_hub_to_tip_ratio() {
        let sequencer = Sequencer::new(machine(None)).unwrap();
        let r_m = sequencer.mean_radius(&inlet()).unwrap();
        assert!((r_m - 0.084_665_44).abs() < 1e-6);
    }

    #[test]
    fn loading_forms_agree() {
        let sequencer = Sequencer::new(machine(None)).unwrap();
        let u = 220.0;
        let from_ratio = sequencer
            .work_coefficient(&inlet(), StageLoading::PressureRatio(1.2), u)
            .unwrap();
        let cp = GasProperties::air().cp();
        let dt0 = from_ratio * u * u / cp;
        let from_rise = sequencer
            .work_coefficient(&inlet(), StageLoading::TemperatureRise(dt0), u)
            .unwrap();
        assert!((from_ratio - from_rise).abs() < 1e-12);
        assert!(
            sequencer
                .work_coefficient(&inlet(), StageLoading::PressureRatio(0.9), u)
                .is_err()
        );
    }

    #[test]
    fn failed_stage_with_derivable_outlet_continues() {
        let sequencer = Sequencer::new(machine(None)).unwrap();
        let mut bad = target(StageLoading::PressureRatio(1.15));
        bad.rotor.aspect_ratio = -1.0;
        let good = target(StageLoading::PressureRatio(1.15));
        let machine = sequencer.run(inlet(), &[bad, good]).unwrap();

        assert_eq!(machine.stages().len(), 2);
        assert!(machine.stages()[0].error().is_some());
        assert!(machine.stages()[0].outlet().is_some());
        assert!(machine.stages()[1].solved().is_some());
        assert_eq!(machine.halted_at(), None);
        assert!(!machine.is_complete());
    }

    #[test]
    fn unresolvable_loading_halts_chain() {
        let sequencer = Sequencer::new(machine(None)).unwrap();
        let good = target(StageLoading::PressureRatio(1.15));
        let bad = target(StageLoading::WorkCoefficient(-0.2));
        let machine = sequencer.run(inlet(), &[good, bad, good]).unwrap();

        assert_eq!(machine.stages().len(), 2);
        assert_eq!(machine.halted_at(), Some(1));
        assert!(machine.warnings().contains(&ClosureWarning::Incomplete {
            halted_at: 1,
            planned: 3
        }));
        assert!((machine.pressure_ratio() - 1.15).abs() < 1e-9);
    }

    #[test]
    fn missed_target_is_a_warning() {
        let sequencer = Sequencer::new(machine(Some(1.5))).unwrap();
        let machine = sequencer
            .run(inlet(), &[target(StageLoading::PressureRatio(1.2))])
            .unwrap();
        assert!(matches!(
            machine.warnings(),
            [ClosureWarning::PressureRatio { .. }]
        ));
    }

    #[test]
    fn retry_replaces_one_stage_and_flags_interface() {
        let sequencer = Sequencer::new(machine(None)).unwrap();
        let t = target(StageLoading::PressureRatio(1.15));
        let mut machine = sequencer.run(inlet(), &[t, t]).unwrap();
        let before = machine.pressure_ratio();
        assert!(machine.warnings().is_empty());

        let stronger = target(StageLoading::PressureRatio(1.18));
        let record = machine.retry_stage(0, stronger).unwrap();
        assert!(record.solved().is_some());

        // stage 1 still starts from the old stage 0 outlet
        assert!(machine.warnings().iter().any(|w| matches!(
            w,
            ClosureWarning::StageInterface { stage: 1, .. }
        )));
        // cached overall ratio was recomputed from the chain
        assert_eq!(machine.pressure_ratio(), before);
        assert!(matches!(
            machine.retry_stage(5, t),
            Err(SequenceError::StageIndex { index: 5, len: 2 })
        ));
    }

    #[test]
    fn retried_reaction_flags_flow_interface() {
        let sequencer = Sequencer::new(machine(None)).unwrap();
        let t = target(StageLoading::PressureRatio(1.15));
        let mut machine = sequencer.run(inlet(), &[t, t]).unwrap();
        assert!(machine.warnings().is_empty());

        let skewed = StageTarget {
            reaction: 0.7,
            ..t
        };
        machine.retry_stage(1, skewed).unwrap();
        // totals still match, the swirl handed over by stage 0 does not
        assert!(matches!(
            machine.warnings(),
            [ClosureWarning::FlowInterface { stage: 1, .. }]
        ));
    }

    #[test]
    fn invalid_machine_rejected() {
        let mut spec = machine(None);
        spec.hub_to_tip_ratio = 1.2;
        assert!(Sequencer::new(spec).is_err());
        let sequencer = Sequencer::new(machine(None)).unwrap();
        assert!(sequencer.run(inlet(), &[]).is_err());
    }
}
