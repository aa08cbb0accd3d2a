use thiserror::Error;

/// Error type for credential digest operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Credential digest failed: {0}")]
    HashingFailed(String),

    #[error("Stored credential digest is unusable: {0}")]
    VerificationFailed(String),
}
