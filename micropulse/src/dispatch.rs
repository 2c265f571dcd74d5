use crate::errors::ApiError;
use crate::response::iso_timestamp;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

// Requests with bodies over this are refused before dispatch.
pub const MAX_BODY_BYTES: usize = 1_048_576; // 1 MiB

/// Every request reaches the dispatcher through the fallback; no routes
/// are registered with axum itself, so matching stays under our contract.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new().fallback(dispatch).with_state(state)
}

/// Request pipeline: log, short-circuit preflight, match, read body,
/// invoke, time, record, send. Failed and unmatched requests are answered
/// with an error envelope and never recorded in the registry.
pub async fn dispatch(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    let (parts, mut body) = req.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    if !state.config.environment.is_test() {
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        info!(
            method = %method,
            path = %path,
            user_agent,
            timestamp = %iso_timestamp(),
            "request"
        );
    }

    // CORS preflight: 204 with the bare CORS headers, no routing, no metrics.
    if method == Method::OPTIONS {
        return state.responses.preflight();
    }

    let route = match state.routes.find(&method, &path) {
        Ok(route) => route,
        Err(err) => return error_response(&state, &method, &path, err),
    };

    let body = match read_body(&mut body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(status) => {
            warn!(method = %method, path = %path, status = status.as_u16(), "rejected request body");
            let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
                "Payload too large"
            } else {
                "Unreadable request body"
            };
            return state.responses.error(status, message);
        }
    };

    let started = Instant::now();
    match (route.handler)(&state, &body) {
        Ok(response) => {
            let elapsed = started.elapsed().as_secs_f64();
            let status = response.status().as_u16();
            state.metrics.increment_request(method.as_str(), &path, status);
            state
                .metrics
                .observe_duration(method.as_str(), &path, status, elapsed);
            response
        }
        Err(err) => error_response(&state, &method, &path, err),
    }
}

fn error_response(state: &AppState, method: &Method, path: &str, err: ApiError) -> Response {
    match &err {
        ApiError::RouteNotFound { .. } => {
            warn!(method = %method, path, "resource not found");
            state
                .responses
                .error(StatusCode::NOT_FOUND, "Resource not found")
        }
        ApiError::InvalidPayload(source) => {
            warn!(method = %method, path, error = %source, "invalid JSON payload");
            state
                .responses
                .failure(StatusCode::BAD_REQUEST, "Invalid JSON payload")
        }
        ApiError::HandlerFault(fault) => {
            error!(method = %method, path, error = %fault, "handler fault");
            let message = if state.config.environment.is_production() {
                "Internal Server Error".to_string()
            } else {
                fault.to_string()
            };
            state
                .responses
                .error(StatusCode::INTERNAL_SERVER_ERROR, &message)
        }
    }
}

// Read the full body with a size ceiling, without buffering past it.
async fn read_body(body: &mut Body, max_size: usize) -> Result<Bytes, StatusCode> {
    use axum::body::HttpBody;
    use bytes::BytesMut;

    let mut buf = BytesMut::new();
    let mut total_size: usize = 0;

    while let Some(chunk_res) = body.data().await {
        let chunk = match chunk_res {
            Ok(chunk) => chunk,
            Err(_) => return Err(StatusCode::BAD_REQUEST),
        };

        total_size = match total_size.checked_add(chunk.len()) {
            Some(new_size) if new_size <= max_size => new_size,
            _ => return Err(StatusCode::PAYLOAD_TOO_LARGE),
        };

        buf.extend_from_slice(&chunk);
    }

    Ok(buf.freeze())
}
