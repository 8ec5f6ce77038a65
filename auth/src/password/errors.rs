use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Password too long: maximum {max} bytes, got {actual}")]
    PasswordTooLong { max: usize, actual: usize },

    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password does not match")]
    Mismatch,

    #[error("Malformed password digest: {0}")]
    MalformedDigest(String),
}

impl PasswordError {
    /// Whether the error was caused by the caller's input rather than the
    /// hashing machinery. Callers can re-prompt for these.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PasswordError::EmptyPassword | PasswordError::PasswordTooLong { .. }
        )
    }
}
