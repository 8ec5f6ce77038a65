use thiserror::Error;

/// Error for `Authorization` header parsing failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BearerError {
    #[error("Invalid Authorization header format. Expected: Bearer <token>")]
    MissingScheme,

    #[error("Bearer token is empty")]
    EmptyToken,
}

/// Extract the token from an `Authorization` header value.
///
/// Accepts `Bearer <token>`; the scheme is matched case-insensitively and
/// surrounding whitespace is ignored.
///
/// # Errors
/// * `MissingScheme` - Value does not start with the `Bearer` scheme
/// * `EmptyToken` - Scheme present but no token follows
pub fn extract_bearer_token(header_value: &str) -> Result<&str, BearerError> {
    let value = header_value.trim();
    let (scheme, rest) = value
        .split_once(char::is_whitespace)
        .unwrap_or((value, ""));

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(BearerError::MissingScheme);
    }

    let token = rest.trim();
    if token.is_empty() {
        return Err(BearerError::EmptyToken);
    }

    Ok(token)
}
