use anyhow::Context;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

const ALLOWED_METHODS: &str = "GET,POST,PUT,PATCH,DELETE,OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Current time as RFC 3339 / ISO-8601 UTC with the `Z` designator.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builds HTTP responses carrying the fixed security/CORS header set and
/// the standard JSON envelopes. The CORS origin is validated once at
/// construction so handlers never deal with malformed header values.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    cors_origin: HeaderValue,
}

impl ResponseBuilder {
    pub fn new(cors_origin: &str) -> anyhow::Result<Self> {
        let cors_origin = HeaderValue::from_str(cors_origin)
            .with_context(|| format!("Invalid CORS_ORIGIN value '{cors_origin}'"))?;
        Ok(ResponseBuilder { cors_origin })
    }

    /// 200 envelope: `{success: true, data, timestamp}`.
    pub fn success(&self, data: Value) -> Response {
        self.json(
            StatusCode::OK,
            json!({
                "success": true,
                "data": data,
                "timestamp": iso_timestamp(),
            }),
        )
    }

    /// Soft failure envelope: `{success: false, message, timestamp}`.
    pub fn failure(&self, status: StatusCode, message: &str) -> Response {
        self.json(
            status,
            json!({
                "success": false,
                "message": message,
                "timestamp": iso_timestamp(),
            }),
        )
    }

    /// Hard error envelope: `{error: true, message, statusCode, timestamp}`.
    pub fn error(&self, status: StatusCode, message: &str) -> Response {
        self.json(
            status,
            json!({
                "error": true,
                "message": message,
                "statusCode": status.as_u16(),
                "timestamp": iso_timestamp(),
            }),
        )
    }

    pub fn json(&self, status: StatusCode, body: Value) -> Response {
        (status, self.security_headers(), Json(body)).into_response()
    }

    pub fn plain_text(&self, status: StatusCode, body: &'static str) -> Response {
        let mut headers = self.security_headers();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        (status, headers, body).into_response()
    }

    /// Prometheus text exposition response.
    pub fn exposition(&self, body: String) -> Response {
        let mut headers = self.security_headers();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; version=0.0.4"),
        );
        (StatusCode::OK, headers, body).into_response()
    }

    /// CORS preflight: 204, no body, only the three CORS headers.
    pub fn preflight(&self) -> Response {
        let mut headers = HeaderMap::new();
        self.apply_cors_headers(&mut headers);
        (StatusCode::NO_CONTENT, headers, ()).into_response()
    }

    fn security_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        headers.insert(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        );
        headers.insert(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        );
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'self'"),
        );
        self.apply_cors_headers(&mut headers);
        headers
    }

    fn apply_cors_headers(&self, headers: &mut HeaderMap) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            self.cors_origin.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn builder() -> ResponseBuilder {
        ResponseBuilder::new("*").expect("builder")
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = hyper::body::to_bytes(resp.into_body()).await.expect("bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn iso_timestamp_is_rfc3339_utc() {
        let ts = iso_timestamp();
        assert!(ts.ends_with('Z'), "timestamp should carry the Z designator: {ts}");
        DateTime::parse_from_rfc3339(&ts).expect("timestamp should parse as RFC 3339");
    }

    #[test]
    fn invalid_cors_origin_is_rejected_at_construction() {
        let result = ResponseBuilder::new("bad\norigin");
        assert!(result.is_err(), "control characters are not a valid origin");
    }

    #[tokio::test]
    async fn success_envelope_wraps_data_with_timestamp() {
        let resp = builder().success(json!({ "k": "v" }));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");

        let body = body_json(resp).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["k"], json!("v"));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn error_envelope_carries_status_code_field() {
        let resp = builder().error(StatusCode::NOT_FOUND, "Resource not found");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = body_json(resp).await;
        assert_eq!(body["error"], json!(true));
        assert_eq!(body["message"], json!("Resource not found"));
        assert_eq!(body["statusCode"], json!(404));
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn json_responses_carry_the_full_security_header_set() {
        let resp = builder().success(json!(null));
        let headers = resp.headers();
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[header::X_XSS_PROTECTION], "1; mode=block");
        assert_eq!(
            headers[header::REFERRER_POLICY],
            "strict-origin-when-cross-origin"
        );
        assert_eq!(
            headers[header::CONTENT_SECURITY_POLICY],
            "default-src 'self'"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            ALLOWED_METHODS
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            ALLOWED_HEADERS
        );
    }

    #[test]
    fn configured_origin_is_echoed_in_cors_header() {
        let builder = ResponseBuilder::new("https://example.com").expect("builder");
        let resp = builder.success(json!(null));
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://example.com"
        );
    }

    #[tokio::test]
    async fn preflight_is_204_with_only_cors_headers() {
        let resp = builder().preflight();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let headers = resp.headers().clone();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            ALLOWED_METHODS
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            ALLOWED_HEADERS
        );
        assert!(
            !headers.contains_key(header::X_FRAME_OPTIONS),
            "preflight should not carry the body security headers"
        );

        let bytes = hyper::body::to_bytes(resp.into_body()).await.expect("bytes");
        assert!(bytes.is_empty(), "preflight must have no body");
    }

    #[tokio::test]
    async fn plain_text_sets_bare_content_type() {
        let resp = builder().plain_text(StatusCode::OK, "pong");
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(resp.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        let bytes = hyper::body::to_bytes(resp.into_body()).await.expect("bytes");
        assert_eq!(&bytes[..], b"pong");
    }

    #[test]
    fn exposition_uses_prometheus_content_type() {
        let resp = builder().exposition("# empty\n".to_string());
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }
}
