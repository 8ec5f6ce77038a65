use std::fmt;

use jsonwebtoken::Algorithm;

/// Signing algorithms this crate will issue or accept.
///
/// Closed on purpose: a token whose header names anything outside this set
/// is refused before its signature is even looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256
    #[default]
    Hs256,
}

impl SigningAlgorithm {
    /// Header name of the algorithm (`alg` field).
    pub fn name(self) -> &'static str {
        match self {
            SigningAlgorithm::Hs256 => "HS256",
        }
    }

    /// Look up an algorithm by its header name. Case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "HS256" => Some(SigningAlgorithm::Hs256),
            _ => None,
        }
    }

    pub(crate) fn to_jsonwebtoken(self) -> Algorithm {
        match self {
            SigningAlgorithm::Hs256 => Algorithm::HS256,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
