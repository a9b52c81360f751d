//! Error types for stage solving and sequencing.

use td_airfoil::AirfoilError;
use td_core::TdError;
use td_gas::GasError;
use thiserror::Error;

/// Errors raised while solving a single stage or building its blade rows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error("Stage infeasible: {what}")]
    Infeasible { what: String },

    #[error("Gas state error: {0}")]
    Gas(#[from] GasError),

    #[error("Airfoil error: {0}")]
    Airfoil(#[from] AirfoilError),
}

impl StageError {
    pub(crate) fn infeasible(what: impl Into<String>) -> Self {
        StageError::Infeasible { what: what.into() }
    }
}

pub type StageResult<T> = Result<T, StageError>;

/// Errors raised at machine level, before or around the stage chain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    #[error("Invalid machine specification: {what}")]
    InvalidMachine { what: &'static str },

    #[error("Machine inlet sizing failed: {0}")]
    InletSizing(StageError),

    #[error("Stage index {index} out of range (stages: {len})")]
    StageIndex { index: usize, len: usize },
}

pub type SequenceResult<T> = Result<T, SequenceError>;

impl From<StageError> for TdError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::Gas(e) => e.into(),
            StageError::Airfoil(e) => e.into(),
            StageError::Infeasible { .. } => TdError::Domain {
                domain: "stage",
                message: err.to_string(),
            },
        }
    }
}

impl From<SequenceError> for TdError {
    fn from(err: SequenceError) -> Self {
        match err {
            SequenceError::InvalidMachine { what } => TdError::InvalidArg { what },
            SequenceError::InletSizing(e) => e.into(),
            SequenceError::StageIndex { index, len } => TdError::IndexOob {
                what: "stage",
                index,
                len,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_errors_keep_their_domain() {
        let err = StageError::from(GasError::InvalidGasState { what: "density" });
        let td: TdError = err.into();
        assert!(matches!(td, TdError::Domain { domain: "gas", .. }));
    }

    #[test]
    fn stage_index_maps_to_index_oob() {
        let td: TdError = SequenceError::StageIndex { index: 4, len: 2 }.into();
        assert_eq!(
            td,
            TdError::IndexOob {
                what: "stage",
                index: 4,
                len: 2
            }
        );
    }
}
