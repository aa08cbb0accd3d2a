//! Authentication primitives for the identity service
//!
//! - Credential digests (Argon2id)
//! - Bearer token issuance and validation (HS256 JWT)
//! - Authentication coordination
//!
//! Nothing here touches storage or transport. The service crate owns users and
//! HTTP, and adapts these types at its edges.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.matches(&hash, "my_password"));
//! assert!(!hasher.matches(&hash, "other_password"));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::JwtHandler;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let token = handler.issue("user123", "alice@example.com").unwrap();
//! let claims = handler.validate(&token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24));
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let result = auth
//!     .authenticate("password123", &hash, "user123", "alice@example.com")
//!     .unwrap();
//!
//! // Gate: validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.email, "alice@example.com");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
