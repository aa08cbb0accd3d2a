use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Serialize;

use super::claims::Claims;
use super::errors::JwtError;

/// JWT issuer and validator bound to a single shared secret.
///
/// Uses HS256 (HMAC with SHA-256). The same secret signs and verifies; there is
/// no rotation and no second key accepted during validation.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validity: Duration,
}

impl JwtHandler {
    /// Validity window used unless overridden with [`JwtHandler::with_validity`].
    pub const DEFAULT_VALIDITY_HOURS: i64 = 24;

    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 and a 24 hour validity window
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            validity: Duration::hours(Self::DEFAULT_VALIDITY_HOURS),
        }
    }

    /// Override the validity window of issued tokens.
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// Validity window of issued tokens.
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issue a token for a subject, valid from now.
    ///
    /// # Arguments
    /// * `subject` - Subject identifier
    /// * `email` - Subject email snapshot
    ///
    /// # Returns
    /// Signed JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing key is unusable
    pub fn issue(&self, subject: impl ToString, email: &str) -> Result<String, JwtError> {
        self.issue_at(subject, email, Utc::now().timestamp())
    }

    /// Issue a token for a subject, valid from `now` (Unix seconds).
    pub fn issue_at(
        &self,
        subject: impl ToString,
        email: &str,
        now: i64,
    ) -> Result<String, JwtError> {
        let claims = Claims::for_subject(subject, email, now, self.validity);
        self.encode(&claims)
    }

    /// Encode an arbitrary payload into a signed JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Validate a token against the current clock.
    ///
    /// # Arguments
    /// * `token` - JWT token string to validate
    ///
    /// # Returns
    /// Verified claims
    ///
    /// # Errors
    /// * `Malformed` - Token cannot be parsed into the expected structure
    /// * `InvalidSignature` - Signature does not verify against the secret
    /// * `Expired` - Current time is at or after `exp`
    /// * `NotYetValid` - Current time is before `nbf`
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate a token against the given clock reading (Unix seconds).
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, JwtError> {
        // Timestamps are checked below without leeway.
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        JwtError::InvalidSignature
                    }
                    _ => JwtError::Malformed(e.to_string()),
                }
            })?;

        token_data.claims.check_window(now)?;

        Ok(token_data.claims)
    }
}
