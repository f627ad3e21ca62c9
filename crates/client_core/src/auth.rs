//! Authorization header handling for the playlist backend.

use crate::error::ClientError;

const BEARER_SCHEME: &str = "Bearer";

/// Normalizes an access token into an `Authorization` header value.
///
/// Tokens from the identity provider arrive bare, while tokens restored from
/// elsewhere may already carry the scheme; both end up as `Bearer <token>`.
pub fn authorization_value(token: &str) -> Result<String, ClientError> {
    let token = token.trim();
    let bare = match token.strip_prefix(BEARER_SCHEME) {
        // The scheme only counts when followed by whitespace or nothing.
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => token,
    };
    if bare.is_empty() {
        return Err(ClientError::Validation("missing access token".into()));
    }
    Ok(format!("{BEARER_SCHEME} {bare}"))
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
