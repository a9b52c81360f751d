//! Error types for the td-app service layer.

use std::path::PathBuf;

/// Wraps the errors of the backend crates behind one interface for frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Design file error: {0}")]
    Project(String),

    #[error("Failed to write design file: {path}")]
    DesignFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Design validation failed: {0}")]
    Validation(String),

    #[error("Sequencing failed: {0}")]
    Sequence(String),

    #[error("Geometry planning failed: {0}")]
    Geometry(String),

    #[error("Design '{design}' has no geometry section")]
    NoGeometry { design: String },

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for td-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<td_project::ProjectError> for AppError {
    fn from(err: td_project::ProjectError) -> Self {
        match err {
            td_project::ProjectError::Validation(e) => e.into(),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<td_project::ValidationError> for AppError {
    fn from(err: td_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<td_solver::SequenceError> for AppError {
    fn from(err: td_solver::SequenceError) -> Self {
        AppError::Sequence(err.to_string())
    }
}

impl From<td_geometry::GeometryError> for AppError {
    fn from(err: td_geometry::GeometryError) -> Self {
        AppError::Geometry(err.to_string())
    }
}

impl From<td_results::ResultsError> for AppError {
    fn from(err: td_results::ResultsError) -> Self {
        match err {
            td_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
