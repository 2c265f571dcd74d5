use crate::errors::ApiError;
use crate::response::iso_timestamp;
use crate::state::AppState;
use axum::http::StatusCode;
use axum::response::Response;
use bytes::Bytes;
use serde_json::{json, Value};

/// Handlers are pure functions of (state, raw body) -> response. The
/// dispatcher owns timing, metrics recording and error translation.
pub type Handler = fn(&AppState, &Bytes) -> Result<Response, ApiError>;

const REPOSITORY_URL: &str = "https://github.com/micropulse/micropulse";
const ISSUES_URL: &str = "https://github.com/micropulse/micropulse/issues";

/// rustc version captured by the build script.
const RUSTC_VERSION: &str = env!("MICROPULSE_RUSTC_VERSION");

pub fn root(state: &AppState, _body: &Bytes) -> Result<Response, ApiError> {
    let endpoints = serde_json::to_value(state.routes.endpoint_docs())?;
    let welcome = json!({
        "message": format!("Welcome to {} API", state.config.app_name),
        "description": "A simple Rust microservice for learning and demonstration",
        "links": {
            "repository": REPOSITORY_URL,
            "issues": ISSUES_URL,
        },
        "endpoints": endpoints,
    });
    Ok(state.responses.success(welcome))
}

pub fn ping(state: &AppState, _body: &Bytes) -> Result<Response, ApiError> {
    Ok(state.responses.plain_text(StatusCode::OK, "pong"))
}

pub fn version(state: &AppState, _body: &Bytes) -> Result<Response, ApiError> {
    Ok(state
        .responses
        .success(json!({ "version": state.config.version })))
}

pub fn healthz(state: &AppState, _body: &Bytes) -> Result<Response, ApiError> {
    let memory = state.probe.memory();
    let health = json!({
        "status": "healthy",
        "uptime": state.uptime().as_secs_f64(),
        "timestamp": iso_timestamp(),
        "memory": {
            "usage": memory.usage,
            "peak": memory.peak,
        },
        "cpu": {
            "load": state.probe.load_average(),
        },
        "version": state.config.version,
        "environment": state.config.environment.as_str(),
    });
    Ok(state.responses.success(health))
}

pub fn info(state: &AppState, _body: &Bytes) -> Result<Response, ApiError> {
    let memory = state.probe.memory();
    let os = state.probe.os_identity();
    let info = json!({
        "application": {
            "name": state.config.app_name,
            "version": state.config.version,
            "environment": state.config.environment.as_str(),
            "timestamp": iso_timestamp(),
        },
        "system": {
            "rust_version": RUSTC_VERSION,
            "os": os.os,
            "release": os.release,
            "version": os.version,
            "machine": os.machine,
            "processor": state.probe.processor(),
            "memory": {
                "usage": memory.usage,
                "peak": memory.peak,
            },
            "cpu": {
                "load": state.probe.load_average(),
            },
        },
        "environment": {
            "port": state.config.port,
            "host": state.config.host,
        },
    });
    Ok(state.responses.success(info))
}

pub fn echo(state: &AppState, body: &Bytes) -> Result<Response, ApiError> {
    let payload: Value = serde_json::from_slice(body).map_err(ApiError::InvalidPayload)?;
    Ok(state.responses.success(payload))
}

pub fn metrics(state: &AppState, _body: &Bytes) -> Result<Response, ApiError> {
    Ok(state.responses.exposition(state.metrics.render()))
}
