use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;

/// Claim set carried by a session token.
///
/// `iat` and `exp` are Unix timestamps in seconds. `iss` and `sub` are
/// optional on the wire so that a token missing them decodes and is then
/// rejected with a precise error instead of a generic parse failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Subject (user/entity identifier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build the claim set for a token issued at `issued_at` and valid for `ttl`.
    ///
    /// A zero or negative `ttl` is accepted and yields a token that is
    /// already expired.
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry falls outside the representable time range
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let expires_at = expiry(issued_at, ttl)?;

        Ok(Self {
            iss: Some(issuer.into()),
            sub: Some(subject.into()),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Check if token is expired at the given instant.
    ///
    /// The expiry instant itself counts as expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    /// Expiration as a `DateTime`, if within chrono's range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Compute `issued_at + ttl`, rejecting overflow.
pub(crate) fn expiry(issued_at: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, TokenError> {
    issued_at
        .checked_add_signed(ttl)
        .ok_or_else(|| TokenError::EncodingFailed("token expiry out of range".to_string()))
}
