//! Credential layer for the Chirpy service
//!
//! Two independent, stateless pieces:
//! - Password hashing (Argon2id, PHC string digests)
//! - Signed session tokens (HS256 compact tokens binding a subject to an expiry)
//!
//! Nothing here performs I/O or keeps shared state. The signing secret is
//! passed to every token call and never stored.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use chirpy_auth::{PasswordError, PasswordHasher};
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).is_ok());
//! assert_eq!(hasher.verify("not_my_password", &hash), Err(PasswordError::Mismatch));
//! ```
//!
//! ## Session Tokens
//! ```
//! use chrono::Duration;
//! use chirpy_auth::{SubjectId, TokenError, TokenHandler};
//!
//! let handler = TokenHandler::default();
//! let user_id = SubjectId::new();
//!
//! let token = handler.issue(user_id, b"test-secret", Duration::hours(1)).unwrap();
//! let subject: SubjectId = handler.validate(&token, b"test-secret").unwrap();
//! assert_eq!(subject, user_id);
//!
//! let expired = handler.issue(user_id, b"test-secret", Duration::hours(-1)).unwrap();
//! assert_eq!(
//!     handler.validate::<SubjectId>(&expired, b"test-secret"),
//!     Err(TokenError::Expired)
//! );
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use chirpy_auth::{Authenticator, SubjectId};
//!
//! let auth = Authenticator::default();
//! let secret = b"secret_key_at_least_32_bytes_long!";
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let user_id = SubjectId::new();
//! let result = auth.authenticate("password123", &hash, user_id, secret).unwrap();
//!
//! // Later requests: validate the bearer header
//! let header = format!("Bearer {}", result.access_token);
//! let subject: SubjectId = auth.authenticate_bearer(&header, secret).unwrap();
//! assert_eq!(subject, user_id);
//! ```

pub mod authenticator;
pub mod bearer;
pub mod config;
pub mod jwt;
pub mod password;
pub mod subject;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use bearer::extract_bearer_token;
pub use bearer::BearerError;
pub use crate::config::AuthConfig;
pub use crate::config::JwtConfig;
pub use jwt::Claims;
pub use jwt::SigningAlgorithm;
pub use jwt::TokenError;
pub use jwt::TokenHandler;
pub use jwt::TokenSettings;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordParams;
pub use subject::SubjectId;
