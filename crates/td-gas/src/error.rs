//! Gas state errors.

use td_core::TdError;
use thiserror::Error;

/// Result type for gas state operations.
pub type GasResult<T> = Result<T, GasError>;

/// Errors raised while constructing or transforming a gas state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GasError {
    /// Pressure, temperature, density or velocity outside the physical domain.
    #[error("Invalid gas state: {what}")]
    InvalidGasState { what: &'static str },

    /// Gas constant or ratio of specific heats outside the ideal-gas domain.
    #[error("Invalid gas properties: {what}")]
    InvalidGasProperties { what: &'static str },
}

impl From<GasError> for TdError {
    fn from(err: GasError) -> Self {
        TdError::Domain {
            domain: "gas",
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = GasError::InvalidGasState {
            what: "pressure must be positive",
        };
        assert!(err.to_string().contains("pressure"));
    }

    #[test]
    fn error_to_td_error() {
        let err: TdError = GasError::InvalidGasProperties { what: "gamma" }.into();
        assert!(matches!(err, TdError::Domain { domain: "gas", .. }));
    }
}
