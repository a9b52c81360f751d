//! Error types for geometry planning and kernel dispatch.

use td_core::TdError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The stage's solids would be invalid. Other stages are unaffected.
    #[error("Stage {stage} geometry infeasible: {reason}")]
    Infeasible { stage: usize, reason: String },

    #[error("Invalid geometry specification: {what}")]
    InvalidSpec { what: &'static str },
}

pub type GeometryResult<T> = Result<T, GeometryError>;

/// Failure reported by a geometry kernel for one request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct KernelError {
    pub message: String,
}

impl KernelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<GeometryError> for TdError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::InvalidSpec { what } => TdError::InvalidArg { what },
            GeometryError::Infeasible { .. } => TdError::Domain {
                domain: "geometry",
                message: err.to_string(),
            },
        }
    }
}
