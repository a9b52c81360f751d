//! Design file loading, saving, validation, and introspection.

use std::path::Path;
use td_project::{DesignConfig, DesignSpec, ProjectError};
use td_solver::StageLoading;

use crate::error::{AppError, AppResult};

/// One planned stage, as the designer requested it.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSummary {
    pub index: usize,
    pub loading: String,
    pub reaction: f64,
    pub flow_coefficient: Option<f64>,
    pub rotor_solidity: f64,
    pub stator_solidity: f64,
    pub rotor_aspect_ratio: f64,
    pub stator_aspect_ratio: f64,
}

/// Load a design file, migrating older versions. The extension picks the format.
pub fn load_design(path: &Path) -> AppResult<DesignSpec> {
    Ok(td_project::load(path)?)
}

/// Save a design file as JSON for a `.json` extension, YAML otherwise.
pub fn save_design(path: &Path, spec: &DesignSpec) -> AppResult<()> {
    let saved = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => td_project::save_json(path, spec),
        _ => td_project::save_yaml(path, spec),
    };
    saved.map_err(|err| match err {
        ProjectError::Io(source) => AppError::DesignFileWrite {
            path: path.to_path_buf(),
            source,
        },
        other => other.into(),
    })
}

pub fn validate(spec: &DesignSpec) -> AppResult<DesignConfig> {
    Ok(td_project::validate_design(spec)?)
}

pub fn list_stages(config: &DesignConfig) -> Vec<StageSummary> {
    config
        .stages
        .iter()
        .enumerate()
        .map(|(index, target)| StageSummary {
            index,
            loading: match target.loading {
                StageLoading::WorkCoefficient(psi) => format!("psi = {psi:.4}"),
                StageLoading::TemperatureRise(dt) => format!("dT0 = {dt:.3} K"),
                StageLoading::PressureRatio(pr) => format!("PR = {pr:.4}"),
            },
            reaction: target.reaction,
            flow_coefficient: target.flow_coefficient,
            rotor_solidity: target.rotor.solidity(),
            stator_solidity: target.stator.solidity(),
            rotor_aspect_ratio: target.rotor.aspect_ratio,
            stator_aspect_ratio: target.stator.aspect_ratio,
        })
        .collect()
}
