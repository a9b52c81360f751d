//! td-project: design specification file format and validation.
//!
//! Files are YAML or JSON. Loading migrates older versions, then validates;
//! `validate_design` turns a spec into the typed `DesignConfig` used by the
//! solver and the geometry planner.

pub mod migrate;
pub mod schema;
pub mod validate;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{DesignConfig, GeometryConfig, IncidenceModel, ValidationError, validate_design};

use std::path::Path;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<DesignSpec> {
    let content = std::fs::read_to_string(path)?;
    let mut spec: DesignSpec = serde_yaml::from_str(&content)?;
    spec = migrate_to_latest(spec)?;
    validate_design(&spec)?;
    Ok(spec)
}

pub fn save_yaml(path: &Path, spec: &DesignSpec) -> ProjectResult<()> {
    validate_design(spec)?;
    let content = serde_yaml::to_string(spec)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<DesignSpec> {
    let content = std::fs::read_to_string(path)?;
    let mut spec: DesignSpec = serde_json::from_str(&content)?;
    spec = migrate_to_latest(spec)?;
    validate_design(&spec)?;
    Ok(spec)
}

pub fn save_json(path: &Path, spec: &DesignSpec) -> ProjectResult<()> {
    validate_design(spec)?;
    let content = serde_json::to_string_pretty(spec)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Loads JSON for a `.json` extension, YAML otherwise.
pub fn load(path: &Path) -> ProjectResult<DesignSpec> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_yaml(path),
    }
}
