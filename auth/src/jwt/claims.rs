use chrono::Duration;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Bearer token payload.
///
/// Carries the subject identity as it was at issuance time together with the
/// validity window. Timestamps are Unix seconds, as in RFC 7519.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Subject email snapshot
    pub email: String,

    /// Issued at
    pub iat: i64,

    /// Not before
    pub nbf: i64,

    /// Expiration time
    pub exp: i64,
}

impl Claims {
    /// Create claims for a subject, valid from `issued_at` for `validity`.
    ///
    /// # Arguments
    /// * `subject` - Unique subject identifier
    /// * `email` - Subject email at issuance time
    /// * `issued_at` - Unix timestamp used for both `iat` and `nbf`
    /// * `validity` - Length of the validity window
    ///
    /// # Returns
    /// Claims with every field set
    pub fn for_subject(
        subject: impl ToString,
        email: impl ToString,
        issued_at: i64,
        validity: Duration,
    ) -> Self {
        Self {
            sub: subject.to_string(),
            email: email.to_string(),
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at + validity.num_seconds(),
        }
    }

    /// Check if token is expired. Expiry is inclusive.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    /// Check if token is not usable yet.
    pub fn is_premature(&self, current_timestamp: i64) -> bool {
        current_timestamp < self.nbf
    }

    /// Check the validity window against the given clock reading.
    ///
    /// # Errors
    /// * `Expired` - `current_timestamp` is at or after `exp`
    /// * `NotYetValid` - `current_timestamp` is before `nbf`
    pub fn check_window(&self, current_timestamp: i64) -> Result<(), JwtError> {
        if self.is_expired(current_timestamp) {
            return Err(JwtError::Expired);
        }
        if self.is_premature(current_timestamp) {
            return Err(JwtError::NotYetValid);
        }
        Ok(())
    }
}
