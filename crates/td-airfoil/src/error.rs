use td_core::TdError;
use thiserror::Error;

pub type AirfoilResult<T> = Result<T, AirfoilError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AirfoilError {
    #[error("Degenerate profile: {what}")]
    DegenerateProfile { what: &'static str },

    #[error("Invalid blade attachment: {what}")]
    InvalidAttachment { what: &'static str },
}

impl From<AirfoilError> for TdError {
    fn from(err: AirfoilError) -> Self {
        TdError::Domain {
            domain: "airfoil",
            message: err.to_string(),
        }
    }
}
