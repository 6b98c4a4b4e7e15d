//! Bearer-token authentication.
//!
//! The incident routes sit behind [`require_bearer`], an axum middleware that
//! pulls the `Authorization: Bearer` header, asks the configured
//! [`Authenticator`] to resolve it, and attaches the resulting [`Caller`] to
//! the request. Handlers only ever see a resolved caller; they never learn
//! which authenticator variant produced it.
//!
//! Two variants ship today: [`TrustedMock`] accepts any presented token
//! (tests and local runs), and [`StaticTokenValidator`] compares the token
//! against a configured secret (deployments without a real identity
//! provider yet).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// The identity a bearer token resolves to.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub role: String,
}

impl Caller {
    /// The default service identity used by the stand-in validators.
    fn reporter() -> Self {
        Self {
            user_id: "12345".to_string(),
            role: "reporter".to_string(),
        }
    }
}

/// Authentication failures, answered with 401 at the boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid authentication credentials")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Resolves a bearer token to a caller identity.
///
/// Implementations must be safe to share across concurrent requests.
pub trait Authenticator: Send + Sync {
    /// Validate `token` and resolve the caller it belongs to.
    fn authenticate(&self, token: &str) -> Result<Caller, AuthError>;
}

/// Accepts any presented token and resolves a fixed identity.
///
/// For tests and local development only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustedMock;

impl Authenticator for TrustedMock {
    fn authenticate(&self, _token: &str) -> Result<Caller, AuthError> {
        Ok(Caller::reporter())
    }
}

/// Validates tokens by comparison against a single configured secret.
#[derive(Debug, Clone)]
pub struct StaticTokenValidator {
    token: String,
}

impl StaticTokenValidator {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Authenticator for StaticTokenValidator {
    fn authenticate(&self, token: &str) -> Result<Caller, AuthError> {
        if token == self.token {
            Ok(Caller::reporter())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

/// Middleware guarding the incident routes.
///
/// On success the resolved [`Caller`] is inserted into the request
/// extensions for handlers to pick up via `Extension<Caller>`.
pub async fn require_bearer(
    State(auth): State<Arc<dyn Authenticator>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers()).ok_or(AuthError::MissingToken)?;

    let caller = auth.authenticate(token).inspect_err(|_| {
        warn!(path = %request.uri().path(), "rejected bearer token");
    })?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn trusted_mock_accepts_any_token() {
        let caller = TrustedMock.authenticate("anything").unwrap();
        assert_eq!(caller.user_id, "12345");
        assert_eq!(caller.role, "reporter");
    }

    #[test]
    fn static_validator_accepts_matching_token() {
        let validator = StaticTokenValidator::new("secret-token");
        assert!(validator.authenticate("secret-token").is_ok());
    }

    #[test]
    fn static_validator_rejects_wrong_token() {
        let validator = StaticTokenValidator::new("secret-token");
        assert!(matches!(
            validator.authenticate("other-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn bearer_token_strips_scheme_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn bearer_token_requires_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic abc123"),
        );
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn auth_error_maps_to_401() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
