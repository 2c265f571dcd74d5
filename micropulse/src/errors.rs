use axum::http::{Method, StatusCode};
use thiserror::Error;

/// Error kinds produced during request dispatch. The dispatcher matches on
/// these structurally to pick the response envelope and status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no route matches {method} {path}")]
    RouteNotFound { method: Method, path: String },

    #[error("invalid JSON payload")]
    InvalidPayload(#[source] serde_json::Error),

    #[error(transparent)]
    HandlerFault(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::HandlerFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Serialization failures inside a handler are unexpected faults, not
// payload errors; handlers tag payload errors explicitly.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::HandlerFault(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("not-json").expect_err("should not parse")
    }

    #[test]
    fn status_codes_match_error_kinds() {
        let not_found = ApiError::RouteNotFound {
            method: Method::GET,
            path: "/nope".into(),
        };
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError::InvalidPayload(parse_error());
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let fault = ApiError::HandlerFault(anyhow::anyhow!("boom"));
        assert_eq!(fault.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn serde_errors_convert_to_handler_faults() {
        let err: ApiError = parse_error().into();
        match err {
            ApiError::HandlerFault(_) => {}
            other => panic!("expected HandlerFault, got {:?}", other),
        }
    }

    #[test]
    fn not_found_display_names_method_and_path() {
        let err = ApiError::RouteNotFound {
            method: Method::POST,
            path: "/missing".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("POST"), "message should carry the method: {msg}");
        assert!(msg.contains("/missing"), "message should carry the path: {msg}");
    }
}
