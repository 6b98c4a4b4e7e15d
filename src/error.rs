//! Service error taxonomy.
//!
//! Every fallible core operation returns [`Error`]; the HTTP boundary
//! translates each kind to its protocol status code via [`IntoResponse`].
//! Not-found is deliberately distinct from backend failure so that callers
//! can tell "that incident does not exist" apart from "the store is broken".

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by the incident core.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input: a non-finite coordinate or an empty reporter id.
    /// Unknown enum values never reach this point; serde rejects them at the
    /// boundary.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The referenced incident does not exist.
    #[error("incident {0} not found")]
    NotFound(String),

    /// Backend or transport failure, including a stored row that cannot be
    /// decoded.
    #[error("storage failure: {0}")]
    Storage(String),

    /// A stored record failed re-validation against the known enum sets.
    #[error("stored record is invalid: {0}")]
    Mapping(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Storage(_) | Error::Mapping(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match &self {
            // Not-found is a normal outcome, not a system fault; don't log it
            Error::Storage(detail) => warn!(%detail, "storage failure"),
            Error::Mapping(detail) => error!(%detail, "stored record failed validation"),
            _ => {}
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_422() {
        let response = Error::Validation("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = Error::NotFound("abc".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_and_mapping_map_to_500() {
        let response = Error::Storage("down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = Error::Mapping("drift".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn message_names_the_missing_incident() {
        let err = Error::NotFound("123e4567".to_string());
        assert_eq!(err.to_string(), "incident 123e4567 not found");
    }
}
