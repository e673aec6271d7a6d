use thiserror::Error;

/// Top-level error type for the rxscan pipeline.
///
/// A scan that simply finds nothing is not an error; these variants cover
/// capability failures and misuse of the API.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("{capability} failed: {message}")]
    Capability { capability: String, message: String },

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScanError {
    pub fn capability(capability: impl Into<String>, message: impl ToString) -> Self {
        Self::Capability {
            capability: capability.into(),
            message: message.to_string(),
        }
    }
}
