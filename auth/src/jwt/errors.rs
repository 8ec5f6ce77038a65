use thiserror::Error;

/// Error type for token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token subject is invalid: {0}")]
    InvalidSubject(String),

    #[error("Token issuer is invalid")]
    InvalidIssuer,

    #[error("Signing secret must not be empty")]
    EmptySecret,

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}

impl TokenError {
    /// Message safe to hand to an unauthenticated client.
    ///
    /// Identical for every validation failure so the client cannot tell
    /// which check rejected the token.
    pub const PUBLIC_MESSAGE: &'static str = "Invalid or expired token";

    pub fn public_message(&self) -> &'static str {
        Self::PUBLIC_MESSAGE
    }

    /// Short machine-readable reason, for diagnostics only.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Malformed(_) => "malformed",
            TokenError::BadSignature => "bad_signature",
            TokenError::Expired => "expired",
            TokenError::InvalidSubject(_) => "invalid_subject",
            TokenError::InvalidIssuer => "invalid_issuer",
            TokenError::EmptySecret => "empty_secret",
            TokenError::EncodingFailed(_) => "encoding_failed",
        }
    }
}
