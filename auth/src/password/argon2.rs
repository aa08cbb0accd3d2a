use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Well-formed Argon2id digest that no account owns, using the same cost
/// parameters as [`Argon2::default`]. Verifying against it costs as much as a
/// real check.
const DECOY_DIGEST: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$Y0ea1poJCyWCd+yPum+ZQQ$taLJYlBhI2bqJy/6xtl0Sq9LRarNlqp8/Lkx7jtVglk";

/// Credential digest implementation.
///
/// Produces salted Argon2id digests and checks candidate secrets against them.
/// Digests embed their own salt and cost parameters, so two digests of the same
/// secret differ; comparison always goes through [`PasswordHasher::matches`].
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a new password hasher instance.
    ///
    /// # Returns
    /// PasswordHasher instance configured with Argon2id defaults
    pub fn new() -> Self {
        Self
    }

    /// Compute the stored digest of a plaintext secret.
    ///
    /// Uses Argon2id with random salt generation.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Stored hash is not a valid PHC string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        let argon2 = Argon2::default();

        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Check a candidate secret against a stored digest.
    ///
    /// A corrupt stored digest counts as a mismatch.
    pub fn matches(&self, stored_hash: &str, candidate: &str) -> bool {
        self.verify(candidate, stored_hash).unwrap_or(false)
    }

    /// Run a full verification against a digest nobody owns.
    ///
    /// Used when there is no stored digest to check, so that the caller spends
    /// the same time as for a wrong secret.
    pub fn verify_decoy(&self, candidate: &str) {
        let _ = self.verify(candidate, DECOY_DIGEST);
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
