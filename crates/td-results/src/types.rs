use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub design_name: String,
    pub timestamp: String,
    pub solver_version: String,
    pub planned_stages: usize,
    pub solved_stages: usize,
    pub pressure_ratio: f64,
    pub warnings: usize,
    pub has_geometry: bool,
}

impl RunManifest {
    /// Manifest for a report, stamped with the current UTC time.
    pub fn new(run_id: RunId, solver_version: &str, report: &DesignReport) -> Self {
        Self {
            run_id,
            design_name: report.design_name.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            solver_version: solver_version.to_string(),
            planned_stages: report.planned_stages,
            solved_stages: report.solved_stages(),
            pressure_ratio: report.pressure_ratio,
            warnings: report.warnings.len(),
            has_geometry: report.geometry.is_some(),
        }
    }
}

/// Thermodynamic state in SI units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StateReport {
    pub total_pressure_pa: f64,
    pub total_temperature_k: f64,
    pub static_pressure_pa: f64,
    pub static_temperature_k: f64,
    pub velocity_m_s: f64,
    pub mach: f64,
    pub density_kg_m3: f64,
    pub mass_flow_kg_s: f64,
}

/// One velocity triangle, angles in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TriangleReport {
    pub radius_m: f64,
    pub blade_speed_m_s: f64,
    pub axial_m_s: f64,
    pub tangential_m_s: f64,
    pub alpha_deg: f64,
    pub beta_deg: f64,
    pub absolute_m_s: f64,
    pub relative_m_s: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MeanTriangles {
    pub rotor_inlet: TriangleReport,
    pub rotor_exit: TriangleReport,
    pub stator_exit: TriangleReport,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StationReport {
    pub span_fraction: f64,
    pub inlet: TriangleReport,
    pub outlet: TriangleReport,
    pub inlet_mach: f64,
    /// Mach number in the row frame.
    pub inlet_row_mach: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SectionReport {
    pub span_fraction: f64,
    pub radius_m: f64,
    pub incidence_deg: f64,
    pub deviation_deg: f64,
    pub inlet_metal_deg: f64,
    pub outlet_metal_deg: f64,
    pub camber_deg: f64,
    pub stagger_deg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RejectedReport {
    pub span_fraction: f64,
    pub radius_m: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowReport {
    pub hub_radius_m: f64,
    pub tip_radius_m: f64,
    pub mean_radius_m: f64,
    pub height_m: f64,
    pub chord_m: f64,
    pub max_thickness_m: f64,
    pub blade_count: u32,
    pub pitch_m: f64,
    pub solidity: f64,
    pub twist_deg: f64,
    pub disk_height_m: f64,
    /// Fir-tree root height and dovetail width.
    pub attachment_height_m: f64,
    pub attachment_bottom_width_m: f64,
    pub de_haller: Vec<f64>,
    pub diffusion_factor: Vec<f64>,
    pub stations: Vec<StationReport>,
    pub sections: Vec<SectionReport>,
    pub rejected: Vec<RejectedReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolvedStageReport {
    pub work_coefficient: f64,
    pub flow_coefficient: f64,
    pub reaction: f64,
    pub pressure_ratio: f64,
    pub temperature_rise_k: f64,
    pub specific_work_j_kg: f64,
    pub torque_n_m: f64,
    pub power_w: f64,
    pub mean: MeanTriangles,
    pub rotor: RowReport,
    pub stator: RowReport,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Solved(Box<SolvedStageReport>),
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageReport {
    pub index: usize,
    pub inlet: StateReport,
    /// Missing when the stage failed before its work was known.
    pub outlet: Option<StateReport>,
    pub status: StageStatus,
}

impl StageReport {
    pub fn solved(&self) -> Option<&SolvedStageReport> {
        match &self.status {
            StageStatus::Solved(stage) => Some(stage),
            StageStatus::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfeasibleStageReport {
    pub stage: Option<usize>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeometryReport {
    pub requests: usize,
    pub stages: Vec<usize>,
    pub infeasible: Vec<InfeasibleStageReport>,
}

/// Everything a designer reads back from one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignReport {
    pub design_name: String,
    pub rpm: f64,
    pub mean_radius_m: f64,
    pub blade_speed_m_s: f64,
    pub inlet: StateReport,
    pub outlet: Option<StateReport>,
    pub planned_stages: usize,
    pub halted_at: Option<usize>,
    pub pressure_ratio: f64,
    pub target_pressure_ratio: Option<f64>,
    pub stages: Vec<StageReport>,
    pub warnings: Vec<String>,
    pub geometry: Option<GeometryReport>,
}

impl DesignReport {
    pub fn solved_stages(&self) -> usize {
        self.stages.iter().filter(|s| s.solved().is_some()).count()
    }

    /// Indices and reasons of stages that failed to solve.
    pub fn failures(&self) -> Vec<(usize, &str)> {
        self.stages
            .iter()
            .filter_map(|s| match &s.status {
                StageStatus::Failed { reason } => Some((s.index, reason.as_str())),
                StageStatus::Solved(_) => None,
            })
            .collect()
    }
}
