use thiserror::Error;

/// Error every turbodesign crate converts into at its boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TdError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{domain}: {message}")]
    Domain {
        domain: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_source() {
        let err = TdError::Domain {
            domain: "gas",
            message: "negative pressure".to_string(),
        };
        assert_eq!(err.to_string(), "gas: negative pressure");
        let err = TdError::IndexOob {
            what: "stage",
            index: 4,
            len: 2,
        };
        assert_eq!(err.to_string(), "Index out of bounds: stage (index=4, len=2)");
    }
}
