use std::fmt::Display;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::bearer::extract_bearer_token;
use crate::bearer::BearerError;
use crate::config::AuthConfig;
use crate::jwt::claims;
use crate::jwt::TokenError;
use crate::jwt::TokenHandler;
use crate::jwt::TokenSettings;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Holds no signing secret: every token operation takes it as an argument.
#[derive(Clone)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_handler: TokenHandler,
    token_ttl: Duration,
}

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,

    /// Instant after which the token is rejected
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Authorization header error: {0}")]
    Bearer(#[from] BearerError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `settings` - Issuer label and signing algorithm
    /// * `token_ttl` - Lifetime of tokens minted on login
    pub fn new(settings: TokenSettings, token_ttl: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_handler: TokenHandler::new(settings),
            token_ttl,
        }
    }

    /// Build an authenticator from loaded configuration.
    ///
    /// # Errors
    /// * `InvalidParams` - Configured Argon2 parameters are out of range
    pub fn from_config(config: &AuthConfig) -> Result<Self, PasswordError> {
        Ok(Self::new(config.jwt.token_settings(), config.jwt.token_ttl())
            .with_password_hasher(PasswordHasher::with_params(config.password)?))
    }

    /// Replace the password hasher.
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    /// Replace the lifetime of tokens minted by this authenticator.
    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Input rejected or hashing failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored digest.
    ///
    /// # Errors
    /// * `Mismatch` - Password does not match
    /// * `MalformedDigest` - Stored digest is unusable
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<(), PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and generate a session token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password digest
    /// * `subject` - Identifier to bind into the token
    /// * `secret` - Signing key
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `Password` - Stored digest is malformed
    /// * `Token` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: impl Display,
        secret: &[u8],
    ) -> Result<AuthenticationResult, AuthenticationError> {
        match self.verify_password(password, stored_hash) {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => return Err(AuthenticationError::InvalidCredentials),
            Err(e) => {
                tracing::debug!(error = %e, "Stored password digest could not be used");
                return Err(AuthenticationError::Password(e));
            }
        }

        Ok(self.generate_token(subject, secret)?)
    }

    /// Generate a session token without password verification.
    ///
    /// Useful when authentication has already been verified by other means.
    ///
    /// # Errors
    /// * `TokenError` - Token generation failed
    pub fn generate_token(
        &self,
        subject: impl Display,
        secret: &[u8],
    ) -> Result<AuthenticationResult, TokenError> {
        let now = Utc::now();
        let expires_at = claims::expiry(now, self.token_ttl)?;
        let access_token = self
            .token_handler
            .issue_at(subject, secret, self.token_ttl, now)?;

        Ok(AuthenticationResult {
            access_token,
            expires_at,
        })
    }

    /// Validate a session token and return its subject.
    ///
    /// # Errors
    /// * `TokenError` - Token validation or decoding failed
    pub fn validate_token<S>(&self, token: &str, secret: &[u8]) -> Result<S, TokenError>
    where
        S: FromStr,
        S::Err: Display,
    {
        self.token_handler.validate(token, secret)
    }

    /// Validate the token carried in an `Authorization: Bearer` header value.
    ///
    /// # Errors
    /// * `Bearer` - Header value is not a bearer credential
    /// * `Token` - Token validation failed
    pub fn authenticate_bearer<S>(
        &self,
        header_value: &str,
        secret: &[u8],
    ) -> Result<S, AuthenticationError>
    where
        S: FromStr,
        S::Err: Display,
    {
        let token = extract_bearer_token(header_value)?;
        Ok(self.validate_token(token, secret)?)
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new(TokenSettings::default(), Duration::hours(1))
    }
}
