//! Validation of a design specification into a typed `DesignConfig`.

use crate::migrate::LATEST_VERSION;
use crate::schema::{
    DesignSpec, EfficiencyDef, GeometryDef, IncidenceDef, LoadingDef, MeanRadiusRuleDef, PerStage,
};
use std::fmt;
use std::sync::Arc;
use td_airfoil::DoubleCircularArc;
use td_core::units::{k, kgps, mps, pa};
use td_gas::{GasProperties, ThermoState};
use td_geometry::{CasingSpec, GeometryAssemblyPlanner, PlannerConfig, ShaftSpec};
use td_solver::{
    BladeRowGenerator, DEFAULT_CLOSURE_TOLERANCE, IncidenceDeviation, JohnsenBullock, MachineSpec,
    MeanRadiusRule, RowParameters, SequenceResult, Sequencer, StageLoading, StageTarget,
    ZeroIncidence,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing value: {field} ({reason})")]
    Missing { field: String, reason: String },

    #[error("Stage count mismatch: {field} has {found} entries, expected {expected}")]
    StageCount {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl fmt::Display, reason: impl fmt::Display) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl<T: Clone> PerStage<T> {
    /// One value per stage.
    pub fn resolve(&self, field: &str, count: usize) -> Result<Vec<T>, ValidationError> {
        match self {
            PerStage::Uniform(value) => Ok(vec![value.clone(); count]),
            PerStage::Each(values) if values.len() == count => Ok(values.clone()),
            PerStage::Each(values) => Err(ValidationError::StageCount {
                field: field.to_string(),
                expected: count,
                found: values.len(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IncidenceModel {
    Zero,
    JohnsenBullock { shape_factor: f64 },
}

/// Geometry section, planner already checked against its config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConfig {
    pub shaft: ShaftSpec,
    pub casing: CasingSpec,
    pub planner: GeometryAssemblyPlanner,
}

/// Validated design: everything the solver and planner need, typed.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignConfig {
    pub name: String,
    pub inlet: ThermoState,
    pub machine: MachineSpec,
    pub stages: Vec<StageTarget>,
    pub airfoil: DoubleCircularArc,
    pub incidence: IncidenceModel,
    pub geometry: Option<GeometryConfig>,
}

impl DesignConfig {
    pub fn blade_generator(&self) -> BladeRowGenerator {
        let incidence: Arc<dyn IncidenceDeviation> = match self.incidence {
            IncidenceModel::Zero => Arc::new(ZeroIncidence),
            IncidenceModel::JohnsenBullock { shape_factor } => Arc::new(JohnsenBullock {
                shape_factor,
                ..JohnsenBullock::default()
            }),
        };
        BladeRowGenerator::new(Arc::new(self.airfoil), incidence)
    }

    pub fn sequencer(&self) -> SequenceResult<Sequencer> {
        Ok(Sequencer::new(self.machine)?.with_blade_generator(self.blade_generator()))
    }

    pub fn planner(&self) -> Option<GeometryAssemblyPlanner> {
        self.geometry.map(|g| g.planner)
    }
}

pub fn validate_design(spec: &DesignSpec) -> Result<DesignConfig, ValidationError> {
    if spec.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: spec.version,
        });
    }
    if spec.name.trim().is_empty() {
        return Err(invalid("name", "\"\"", "design name must not be empty"));
    }

    let gas = GasProperties::new(spec.gas.gas_constant_j_per_kg_k, spec.gas.gamma)
        .map_err(|e| invalid("gas", format!("{:?}", spec.gas), e))?;
    let inlet = ThermoState::from_total_conditions(
        pa(spec.inlet.total_pressure_pa),
        k(spec.inlet.total_temperature_k),
        kgps(spec.inlet.mass_flow_kg_s),
        gas,
    )
    .map_err(|e| invalid("inlet", format!("{:?}", spec.inlet), e))?;

    let machine = machine_spec(spec, &gas)?;
    let stages = stage_targets(spec, &inlet, &machine)?;

    let blades = &spec.blades;
    if !(0.0..=1.0).contains(&blades.arc_weight) {
        return Err(invalid("blades.arc_weight", blades.arc_weight, "must lie in [0, 1]"));
    }
    if !(blades.edge_radius_to_thickness > 0.0 && blades.edge_radius_to_thickness < 0.5) {
        return Err(invalid(
            "blades.edge_radius_to_thickness",
            blades.edge_radius_to_thickness,
            "must lie in (0, 0.5)",
        ));
    }
    let incidence = match blades.incidence {
        IncidenceDef::Zero => IncidenceModel::Zero,
        IncidenceDef::JohnsenBullock { shape_factor } => {
            if !shape_factor.is_finite() || shape_factor <= 0.0 {
                return Err(invalid(
                    "blades.incidence.shape_factor",
                    shape_factor,
                    "must be positive",
                ));
            }
            IncidenceModel::JohnsenBullock { shape_factor }
        }
    };

    let geometry = spec.geometry.as_ref().map(geometry_config).transpose()?;

    Ok(DesignConfig {
        name: spec.name.clone(),
        inlet,
        machine,
        stages,
        airfoil: DoubleCircularArc {
            arc_weight: blades.arc_weight,
            edge_radius_to_thickness: blades.edge_radius_to_thickness,
        },
        incidence,
        geometry,
    })
}

fn machine_spec(spec: &DesignSpec, gas: &GasProperties) -> Result<MachineSpec, ValidationError> {
    let m = &spec.machine;
    let polytropic_efficiency = match m.efficiency {
        EfficiencyDef::Polytropic(eta) => eta,
        EfficiencyDef::Isentropic(eta) => {
            let ratio = m.pressure_ratio.ok_or_else(|| ValidationError::Missing {
                field: "machine.pressure_ratio".to_string(),
                reason: "needed to convert an isentropic efficiency".to_string(),
            })?;
            gas.polytropic_efficiency(ratio, eta)
                .map_err(|e| invalid("machine.efficiency", eta, e))?
        }
    };

    let machine = MachineSpec {
        rpm: m.rpm,
        axial_velocity: mps(m.axial_velocity_m_s),
        hub_to_tip_ratio: m.hub_to_tip_ratio,
        mean_radius_rule: match m.mean_radius_rule {
            MeanRadiusRuleDef::Arithmetic => MeanRadiusRule::Arithmetic,
            MeanRadiusRuleDef::RootMeanSquare => MeanRadiusRule::RootMeanSquare,
        },
        blockage: m.blockage,
        polytropic_efficiency,
        target_pressure_ratio: m.pressure_ratio,
        closure_tolerance: m.closure_tolerance.unwrap_or(DEFAULT_CLOSURE_TOLERANCE),
    };
    machine
        .validate()
        .map_err(|e| invalid("machine", format!("{m:?}"), e))?;
    Ok(machine)
}

fn loadings(
    spec: &DesignSpec,
    inlet: &ThermoState,
    machine: &MachineSpec,
) -> Result<Vec<StageLoading>, ValidationError> {
    let count = spec.stages.count;
    let field = "stages.loading";
    let loadings = match &spec.stages.loading {
        LoadingDef::Equal => {
            let ratio = machine.target_pressure_ratio.ok_or_else(|| ValidationError::Missing {
                field: "machine.pressure_ratio".to_string(),
                reason: "equal loading splits the overall temperature rise".to_string(),
            })?;
            let gas = inlet.gas();
            let t01 = inlet.total_temperature().value;
            let exponent = 1.0 / (machine.polytropic_efficiency * gas.isentropic_exponent());
            let t02 = t01 * ratio.powf(exponent);
            vec![StageLoading::TemperatureRise((t02 - t01) / count as f64); count]
        }
        LoadingDef::WorkCoefficient(values) => values
            .resolve(field, count)?
            .into_iter()
            .map(StageLoading::WorkCoefficient)
            .collect(),
        LoadingDef::TemperatureRiseK(values) => values
            .resolve(field, count)?
            .into_iter()
            .map(StageLoading::TemperatureRise)
            .collect(),
        LoadingDef::PressureRatio(values) => values
            .resolve(field, count)?
            .into_iter()
            .map(StageLoading::PressureRatio)
            .collect(),
    };
    for (i, loading) in loadings.iter().enumerate() {
        let value = match *loading {
            StageLoading::WorkCoefficient(v)
            | StageLoading::TemperatureRise(v)
            | StageLoading::PressureRatio(v) => v,
        };
        let lower = match loading {
            StageLoading::PressureRatio(_) => 1.0,
            _ => 0.0,
        };
        if !value.is_finite() || value <= lower {
            return Err(invalid(&format!("{field}[{i}]"), value, format!("must exceed {lower}")));
        }
    }
    Ok(loadings)
}

fn stage_targets(
    spec: &DesignSpec,
    inlet: &ThermoState,
    machine: &MachineSpec,
) -> Result<Vec<StageTarget>, ValidationError> {
    let s = &spec.stages;
    let n = s.count;
    if n == 0 {
        return Err(invalid("stages.count", n, "at least one stage is required"));
    }

    let loadings = loadings(spec, inlet, machine)?;
    let reaction = s.reaction.resolve("stages.reaction", n)?;
    let flow_coefficient = match &s.flow_coefficient {
        Some(values) => values
            .resolve("stages.flow_coefficient", n)?
            .into_iter()
            .map(Some)
            .collect(),
        None => vec![None; n],
    };
    let aspect = s.aspect_ratio.resolve("stages.aspect_ratio", n)?;
    let pitch = s.pitch_to_chord.resolve("stages.pitch_to_chord", n)?;
    let thickness = s.thickness_to_chord.resolve("stages.thickness_to_chord", n)?;
    let row_gap = s.row_gap_to_chord.resolve("stages.row_gap_to_chord", n)?;
    let stage_gap = s.stage_gap_to_chord.resolve("stages.stage_gap_to_chord", n)?;

    let rotor = |i: usize| RowParameters {
        aspect_ratio: aspect[i].rotor,
        pitch_to_chord: pitch[i].rotor,
        thickness_to_chord: thickness[i].rotor,
    };
    let stator = |i: usize| RowParameters {
        aspect_ratio: aspect[i].stator,
        pitch_to_chord: pitch[i].stator,
        thickness_to_chord: thickness[i].stator,
    };

    (0..n)
        .map(|i| {
            let target = StageTarget {
                loading: loadings[i],
                reaction: reaction[i],
                flow_coefficient: flow_coefficient[i],
                span_stations: s.span_stations,
                rotor: rotor(i),
                stator: stator(i),
                row_gap_to_chord: row_gap[i],
                stage_gap_to_chord: stage_gap[i],
            };
            target
                .validate()
                .map_err(|e| invalid(&format!("stages[{i}]"), format!("{target:?}"), e))?;
            Ok(target)
        })
        .collect()
}

fn geometry_config(def: &GeometryDef) -> Result<GeometryConfig, ValidationError> {
    let shaft = ShaftSpec {
        outer_radius: def.shaft_radius_m,
        clearance: def.shaft_clearance_m,
    };
    shaft
        .validate()
        .map_err(|e| invalid("geometry.shaft", format!("{shaft:?}"), e))?;
    let casing = CasingSpec {
        tip_clearance: def.tip_clearance_m,
        thickness: def.casing_thickness_m,
    };
    casing
        .validate()
        .map_err(|e| invalid("geometry.casing", format!("{casing:?}"), e))?;

    let defaults = PlannerConfig::default();
    let planner = PlannerConfig {
        min_thickness: def.min_thickness_m.unwrap_or(defaults.min_thickness),
        min_envelope_overlap: def
            .min_envelope_overlap
            .unwrap_or(defaults.min_envelope_overlap),
        ..defaults
    };
    let planner = GeometryAssemblyPlanner::new(planner)
        .map_err(|e| invalid("geometry", format!("{planner:?}"), e))?;

    Ok(GeometryConfig {
        shaft,
        casing,
        planner,
    })
}
