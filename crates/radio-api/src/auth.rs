//! Shared-secret admin authentication.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the admin shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Proof that the caller presented the admin key.
///
/// Add it as a handler argument to protect a route.
#[derive(Debug, Clone, Copy)]
pub struct AdminKey;

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_api_key.as_deref() else {
            warn!("ADMIN_API_KEY is not set, rejecting admin request");
            return Err(ApiError::forbidden("Admin access is not configured"));
        };

        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::forbidden("Missing x-api-key header"))?;

        if !constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
            debug!(path = %parts.uri.path(), "Rejected admin request with wrong key");
            return Err(ApiError::forbidden("Invalid API key"));
        }

        Ok(AdminKey)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret2"));
        assert!(!constant_time_eq(b"", b"x"));
    }
}
