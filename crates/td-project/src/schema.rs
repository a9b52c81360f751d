//! Design specification file schema.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignSpec {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub gas: GasDef,
    pub inlet: InletDef,
    pub machine: MachineDef,
    pub stages: StagesDef,
    #[serde(default)]
    pub blades: BladesDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GasDef {
    pub gas_constant_j_per_kg_k: f64,
    pub gamma: f64,
}

impl Default for GasDef {
    fn default() -> Self {
        Self {
            gas_constant_j_per_kg_k: 287.05,
            gamma: 1.4,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InletDef {
    pub total_pressure_pa: f64,
    pub total_temperature_k: f64,
    pub mass_flow_kg_s: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyDef {
    Isentropic(f64),
    Polytropic(f64),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MeanRadiusRuleDef {
    #[default]
    Arithmetic,
    RootMeanSquare,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MachineDef {
    pub rpm: f64,
    pub axial_velocity_m_s: f64,
    pub hub_to_tip_ratio: f64,
    #[serde(default)]
    pub mean_radius_rule: MeanRadiusRuleDef,
    /// Flow-area blockage as a fraction of the flow area.
    #[serde(default)]
    pub blockage: f64,
    /// Overall stagnation pressure ratio target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_ratio: Option<f64>,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub efficiency: EfficiencyDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closure_tolerance: Option<f64>,
}

/// One value for every stage, or one value per stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PerStage<T> {
    Uniform(T),
    Each(Vec<T>),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RowPairDef {
    pub rotor: f64,
    pub stator: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LoadingDef {
    /// Overall temperature rise split evenly between stages.
    Equal,
    WorkCoefficient(PerStage<f64>),
    TemperatureRiseK(PerStage<f64>),
    PressureRatio(PerStage<f64>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StagesDef {
    pub count: usize,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub loading: LoadingDef,
    pub reaction: PerStage<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_coefficient: Option<PerStage<f64>>,
    #[serde(default = "default_span_stations")]
    pub span_stations: usize,
    pub aspect_ratio: PerStage<RowPairDef>,
    pub pitch_to_chord: PerStage<RowPairDef>,
    pub thickness_to_chord: PerStage<RowPairDef>,
    pub row_gap_to_chord: PerStage<f64>,
    pub stage_gap_to_chord: PerStage<f64>,
}

fn default_span_stations() -> usize {
    7
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum IncidenceDef {
    #[default]
    Zero,
    JohnsenBullock {
        #[serde(default = "default_shape_factor")]
        shape_factor: f64,
    },
}

fn default_shape_factor() -> f64 {
    0.7
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BladesDef {
    #[serde(default)]
    pub incidence: IncidenceDef,
    #[serde(default = "default_arc_weight")]
    pub arc_weight: f64,
    #[serde(default = "default_edge_radius")]
    pub edge_radius_to_thickness: f64,
}

fn default_arc_weight() -> f64 {
    0.8
}

fn default_edge_radius() -> f64 {
    0.15
}

impl Default for BladesDef {
    fn default() -> Self {
        Self {
            incidence: IncidenceDef::default(),
            arc_weight: default_arc_weight(),
            edge_radius_to_thickness: default_edge_radius(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeometryDef {
    pub shaft_radius_m: f64,
    pub shaft_clearance_m: f64,
    pub tip_clearance_m: f64,
    pub casing_thickness_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_thickness_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_envelope_overlap: Option<f64>,
}
