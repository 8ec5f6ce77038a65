use std::fmt::Display;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;

use super::algorithm::SigningAlgorithm;
use super::claims::Claims;
use super::errors::TokenError;

/// Issuer label used when none is configured.
pub const DEFAULT_ISSUER: &str = "chirpy";

/// Static token parameters shared by issue and validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSettings {
    /// Value written to and required in the `iss` claim
    pub issuer: String,

    /// The only algorithm tokens are signed and accepted with
    pub algorithm: SigningAlgorithm,
}

impl TokenSettings {
    pub fn with_issuer(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            ..Self::default()
        }
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            algorithm: SigningAlgorithm::default(),
        }
    }
}

/// Header fields inspected before verification.
#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
}

/// Token handler for issuing and validating signed session tokens.
///
/// Tokens use the compact `header.payload.signature` layout with each
/// segment base64url-encoded without padding.
///
/// The handler never stores the signing secret; it is supplied on every
/// call. Instances hold only immutable settings and can be shared across
/// threads without locking.
#[derive(Debug, Clone, Default)]
pub struct TokenHandler {
    settings: TokenSettings,
}

impl TokenHandler {
    pub fn new(settings: TokenSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Issue a token for `subject`, valid for `ttl` from now.
    ///
    /// # Arguments
    /// * `subject` - Identifier of the authenticated principal
    /// * `secret` - Signing key
    /// * `ttl` - Lifetime; zero or negative produces an already-expired token
    ///
    /// # Errors
    /// * `EmptySecret` - `secret` is empty
    /// * `EncodingFailed` - Serialization or signing failed
    pub fn issue(
        &self,
        subject: impl Display,
        secret: &[u8],
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_at(subject, secret, ttl, Utc::now())
    }

    /// Issue a token as if the current instant were `now`.
    pub fn issue_at(
        &self,
        subject: impl Display,
        secret: &[u8],
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        ensure_secret(secret)?;

        let claims = Claims::new(self.settings.issuer.as_str(), subject.to_string(), now, ttl)?;
        let header = Header::new(self.settings.algorithm.to_jsonwebtoken());

        encode(&header, &claims, &EncodingKey::from_secret(secret))
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Validate a token and return its subject.
    ///
    /// # Type Parameters
    /// * `S` - Expected subject shape, e.g. `SubjectId` or `String`
    ///
    /// # Errors
    /// * `Malformed` - Wrong segment count, bad base64, or undecodable JSON
    /// * `BadSignature` - Unexpected algorithm or signature mismatch
    /// * `InvalidIssuer` - `iss` missing or not the configured issuer
    /// * `Expired` - Current instant is at or past `exp`
    /// * `InvalidSubject` - `sub` missing, empty, or not parseable as `S`
    /// * `EmptySecret` - `secret` is empty
    pub fn validate<S>(&self, token: &str, secret: &[u8]) -> Result<S, TokenError>
    where
        S: FromStr,
        S::Err: Display,
    {
        self.validate_at(token, secret, Utc::now())
    }

    /// Validate a token as if the current instant were `now`.
    pub fn validate_at<S>(
        &self,
        token: &str,
        secret: &[u8],
        now: DateTime<Utc>,
    ) -> Result<S, TokenError>
    where
        S: FromStr,
        S::Err: Display,
    {
        let result = self.check(token, secret, now);

        if let Err(e) = &result {
            tracing::debug!(reason = e.reason(), "Token rejected");
        }

        result
    }

    fn check<S>(&self, token: &str, secret: &[u8], now: DateTime<Utc>) -> Result<S, TokenError>
    where
        S: FromStr,
        S::Err: Display,
    {
        ensure_secret(secret)?;

        let header = parse_segments(token)?;
        self.pin_algorithm(&header)?;
        let claims = self.verify_signature(token, secret)?;

        if claims.iss.as_deref() != Some(self.settings.issuer.as_str()) {
            return Err(TokenError::InvalidIssuer);
        }

        if claims.is_expired(now.timestamp()) {
            return Err(TokenError::Expired);
        }

        parse_subject(claims.sub)
    }

    /// Refuse any token whose header does not declare the configured algorithm.
    fn pin_algorithm(&self, header: &RawHeader) -> Result<(), TokenError> {
        match header.alg.as_deref().and_then(SigningAlgorithm::from_name) {
            Some(algorithm) if algorithm == self.settings.algorithm => Ok(()),
            _ => Err(TokenError::BadSignature),
        }
    }

    fn verify_signature(&self, token: &str, secret: &[u8]) -> Result<Claims, TokenError> {
        // Claim semantics are checked by the caller, after the signature.
        let mut validation = Validation::new(self.settings.algorithm.to_jsonwebtoken());
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName
                | ErrorKind::MissingAlgorithm => TokenError::BadSignature,
                _ => TokenError::Malformed(e.to_string()),
            })
    }
}

/// Split a compact token and base64url-decode every segment.
///
/// Returns the decoded header. Payload JSON is decoded later, after the
/// signature has been verified.
fn parse_segments(token: &str) -> Result<RawHeader, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed(format!(
            "expected 3 segments, got {}",
            segments.len()
        )));
    }

    let mut decoded = Vec::with_capacity(3);
    for (name, segment) in ["header", "payload", "signature"].iter().zip(&segments) {
        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|e| TokenError::Malformed(format!("{}: {}", name, e)))?;
        decoded.push(bytes);
    }

    serde_json::from_slice(&decoded[0])
        .map_err(|e| TokenError::Malformed(format!("header: {}", e)))
}

fn ensure_secret(secret: &[u8]) -> Result<(), TokenError> {
    if secret.is_empty() {
        return Err(TokenError::EmptySecret);
    }
    Ok(())
}

fn parse_subject<S>(subject: Option<String>) -> Result<S, TokenError>
where
    S: FromStr,
    S::Err: Display,
{
    let subject = subject
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TokenError::InvalidSubject("missing subject".to_string()))?;

    subject
        .parse()
        .map_err(|e: S::Err| TokenError::InvalidSubject(e.to_string()))
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::Algorithm;
    use serde_json::json;

    use super::*;
    use crate::subject::SubjectId;

    const SECRET: &[u8] = b"test-secret";
    const SUBJECT: &str = "11111111-1111-1111-1111-111111111111";

    fn instant(timestamp: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(timestamp, 0).unwrap()
    }

    fn segment(value: &serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    fn sign_raw(algorithm: Algorithm, claims: &serde_json::Value, secret: &[u8]) -> String {
        encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let handler = TokenHandler::default();

        let token = handler
            .issue(SUBJECT, SECRET, Duration::hours(1))
            .expect("Failed to issue token");
        assert_eq!(token.split('.').count(), 3);

        let subject: String = handler.validate(&token, SECRET).expect("Failed to validate");
        assert_eq!(subject, SUBJECT);

        let subject: SubjectId = handler.validate(&token, SECRET).expect("Failed to validate");
        assert_eq!(subject.to_string(), SUBJECT);
    }

    #[test]
    fn test_wire_layout() {
        let handler = TokenHandler::default();
        let token = handler
            .issue_at(SUBJECT, SECRET, Duration::hours(1), instant(1_700_000_000))
            .unwrap();

        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| !s.contains('=')));

        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segments[0]).unwrap()).unwrap();
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");

        let payload: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segments[1]).unwrap()).unwrap();
        assert_eq!(
            payload,
            json!({
                "iss": "chirpy",
                "sub": SUBJECT,
                "iat": 1_700_000_000,
                "exp": 1_700_003_600,
            })
        );
    }

    #[test]
    fn test_expiry_uses_logical_clock() {
        let handler = TokenHandler::default();
        let issued = instant(1_700_000_000);
        let token = handler.issue_at(SUBJECT, SECRET, Duration::hours(1), issued).unwrap();

        let before: Result<String, _> =
            handler.validate_at(&token, SECRET, issued + Duration::minutes(59));
        assert_eq!(before.unwrap(), SUBJECT);

        let at_expiry: Result<String, _> =
            handler.validate_at(&token, SECRET, issued + Duration::hours(1));
        assert_eq!(at_expiry, Err(TokenError::Expired));

        let later: Result<String, _> =
            handler.validate_at(&token, SECRET, issued + Duration::hours(2));
        assert_eq!(later, Err(TokenError::Expired));
    }

    #[test]
    fn test_negative_ttl_is_expired() {
        let handler = TokenHandler::default();
        let token = handler.issue(SUBJECT, SECRET, Duration::hours(-1)).unwrap();

        let result: Result<String, _> = handler.validate(&token, SECRET);
        assert_eq!(result, Err(TokenError::Expired));
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let handler = TokenHandler::default();
        let now = instant(1_700_000_000);
        let token = handler.issue_at(SUBJECT, SECRET, Duration::zero(), now).unwrap();

        let result: Result<String, _> = handler.validate_at(&token, SECRET, now);
        assert_eq!(result, Err(TokenError::Expired));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler = TokenHandler::default();
        let token = handler.issue(SUBJECT, SECRET, Duration::hours(1)).unwrap();

        let result: Result<String, _> = handler.validate(&token, b"another-secret");
        assert_eq!(result, Err(TokenError::BadSignature));
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let handler = TokenHandler::default();
        let token = handler.issue(SUBJECT, SECRET, Duration::hours(-1)).unwrap();

        let result: Result<String, _> = handler.validate(&token, b"another-secret");
        assert_eq!(result, Err(TokenError::BadSignature));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let handler = TokenHandler::default();
        assert_eq!(
            handler.issue(SUBJECT, b"", Duration::hours(1)),
            Err(TokenError::EmptySecret)
        );

        let token = handler.issue(SUBJECT, SECRET, Duration::hours(1)).unwrap();
        let result: Result<String, _> = handler.validate(&token, b"");
        assert_eq!(result, Err(TokenError::EmptySecret));
    }

    #[test]
    fn test_malformed_structure() {
        let handler = TokenHandler::default();

        for token in ["", "abc", "a.b", "a.b.c.d", "invalid.token.here", "!!!.e30.sig"] {
            let result: Result<String, _> = handler.validate(token, SECRET);
            assert!(
                matches!(result, Err(TokenError::Malformed(_))),
                "token {:?} gave {:?}",
                token,
                result
            );
        }
    }

    #[test]
    fn test_undecodable_payload_segment() {
        let handler = TokenHandler::default();
        let token = handler.issue(SUBJECT, SECRET, Duration::hours(1)).unwrap();
        let segments: Vec<&str> = token.split('.').collect();

        let tampered = format!("{}.!!!not*base64.{}", segments[0], segments[2]);
        let result: Result<String, _> = handler.validate(&tampered, SECRET);
        assert!(matches!(result, Err(TokenError::Malformed(_))), "{:?}", result);
    }

    #[test]
    fn test_undecodable_signature_segment() {
        let handler = TokenHandler::default();
        let token = handler.issue(SUBJECT, SECRET, Duration::hours(1)).unwrap();
        let segments: Vec<&str> = token.split('.').collect();

        let tampered = format!("{}.{}.!!!not*base64", segments[0], segments[1]);
        let result: Result<String, _> = handler.validate(&tampered, SECRET);
        assert!(matches!(result, Err(TokenError::Malformed(_))), "{:?}", result);
    }

    #[test]
    fn test_undecodable_payload_with_valid_signature() {
        let handler = TokenHandler::default();
        let token = sign_raw(Algorithm::HS256, &json!({ "iss": "chirpy", "sub": SUBJECT }), SECRET);

        // Signed correctly but `exp` is missing
        let result: Result<String, _> = handler.validate(&token, SECRET);
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_rejects_none_algorithm() {
        let handler = TokenHandler::default();
        let header = segment(&json!({ "alg": "none", "typ": "JWT" }));
        let payload = segment(&json!({ "iss": "chirpy", "sub": SUBJECT, "iat": 0, "exp": i64::MAX }));

        for token in [format!("{}.{}.", header, payload), format!("{}.{}.c2ln", header, payload)] {
            let result: Result<String, _> = handler.validate(&token, SECRET);
            assert_eq!(result, Err(TokenError::BadSignature));
        }
    }

    #[test]
    fn test_rejects_missing_algorithm() {
        let handler = TokenHandler::default();
        let header = segment(&json!({ "typ": "JWT" }));
        let payload = segment(&json!({ "iss": "chirpy", "sub": SUBJECT, "exp": i64::MAX }));

        let result: Result<String, _> =
            handler.validate(&format!("{}.{}.c2ln", header, payload), SECRET);
        assert_eq!(result, Err(TokenError::BadSignature));
    }

    #[test]
    fn test_rejects_other_hmac_algorithm() {
        let handler = TokenHandler::default();
        let claims = json!({ "iss": "chirpy", "sub": SUBJECT, "iat": 0, "exp": i64::MAX });
        let token = sign_raw(Algorithm::HS512, &claims, SECRET);

        let result: Result<String, _> = handler.validate(&token, SECRET);
        assert_eq!(result, Err(TokenError::BadSignature));
    }

    #[test]
    fn test_rejects_asymmetric_algorithm_header() {
        let handler = TokenHandler::default();
        let header = segment(&json!({ "alg": "RS256", "typ": "JWT" }));
        let payload = segment(&json!({ "iss": "chirpy", "sub": SUBJECT, "exp": i64::MAX }));

        let result: Result<String, _> =
            handler.validate(&format!("{}.{}.c2ln", header, payload), SECRET);
        assert_eq!(result, Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_payload() {
        let handler = TokenHandler::default();
        let token = handler.issue(SUBJECT, SECRET, Duration::hours(1)).unwrap();
        let (header_len, payload_len) = {
            let mut parts = token.split('.');
            (parts.next().unwrap().len(), parts.next().unwrap().len())
        };

        for offset in 0..payload_len {
            let index = header_len + 1 + offset;
            let mut bytes = token.clone().into_bytes();
            bytes[index] = if bytes[index] == b'A' { b'Q' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            let result: Result<String, _> = handler.validate(&tampered, SECRET);
            assert_eq!(result, Err(TokenError::BadSignature), "offset {}", offset);
        }
    }

    #[test]
    fn test_issuer_must_match() {
        let issuer = TokenHandler::new(TokenSettings::with_issuer("other-service"));
        let validator = TokenHandler::default();
        let token = issuer.issue(SUBJECT, SECRET, Duration::hours(1)).unwrap();

        let result: Result<String, _> = validator.validate(&token, SECRET);
        assert_eq!(result, Err(TokenError::InvalidIssuer));

        let subject: String = issuer.validate(&token, SECRET).unwrap();
        assert_eq!(subject, SUBJECT);
    }

    #[test]
    fn test_missing_issuer() {
        let handler = TokenHandler::default();
        let token = sign_raw(Algorithm::HS256, &json!({ "sub": SUBJECT, "exp": i64::MAX }), SECRET);

        let result: Result<String, _> = handler.validate(&token, SECRET);
        assert_eq!(result, Err(TokenError::InvalidIssuer));
    }

    #[test]
    fn test_invalid_subject() {
        let handler = TokenHandler::default();

        let token = handler.issue("not-a-uuid", SECRET, Duration::hours(1)).unwrap();
        let result: Result<SubjectId, _> = handler.validate(&token, SECRET);
        assert!(matches!(result, Err(TokenError::InvalidSubject(_))));

        // Any string is a valid `String` subject
        let subject: String = handler.validate(&token, SECRET).unwrap();
        assert_eq!(subject, "not-a-uuid");
    }

    #[test]
    fn test_missing_or_empty_subject() {
        let handler = TokenHandler::default();

        let missing = sign_raw(Algorithm::HS256, &json!({ "iss": "chirpy", "exp": i64::MAX }), SECRET);
        let result: Result<String, _> = handler.validate(&missing, SECRET);
        assert!(matches!(result, Err(TokenError::InvalidSubject(_))));

        let empty = handler.issue("", SECRET, Duration::hours(1)).unwrap();
        let result: Result<String, _> = handler.validate(&empty, SECRET);
        assert!(matches!(result, Err(TokenError::InvalidSubject(_))));
    }
}
