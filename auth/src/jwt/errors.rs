use thiserror::Error;

/// Error type for token issuance and validation.
///
/// Variants are kept distinct for diagnostics; callers facing the network are
/// expected to collapse all validation failures into one unauthorized outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token is not yet valid")]
    NotYetValid,
}
