// Control API response builders

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::ControlError;
use crate::logger;

/// Body of the generic success acknowledgment
pub const OK_BODY: &str = "OK\n";

/// Serialize `body` as the JSON response, 500 if encoding fails
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build(status, "application/json", Bytes::from(json)),
        Err(e) => error_response(&ControlError::Encode(e)),
    }
}

/// Generic success acknowledgment
pub fn ok_response() -> Response<Full<Bytes>> {
    build(
        StatusCode::OK,
        "text/plain; charset=utf-8",
        Bytes::from_static(OK_BODY.as_bytes()),
    )
}

/// Error response carrying the error message
pub fn error_response(err: &ControlError) -> Response<Full<Bytes>> {
    nack(err.status(), &err.to_string())
}

/// 404 Not Found response
pub fn not_found() -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "available_endpoints": super::ENDPOINTS.iter().map(|(path, _, _)| *path).collect::<Vec<_>>(),
    });
    build(
        StatusCode::NOT_FOUND,
        "application/json",
        Bytes::from(body.to_string()),
    )
}

/// 405 Method Not Allowed response
pub fn method_not_allowed(allow: &str) -> Response<Full<Bytes>> {
    let mut response = nack(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    if let Ok(value) = allow.parse() {
        response.headers_mut().insert(hyper::header::ALLOW, value);
    }
    response
}

/// 413 Payload Too Large response
pub fn payload_too_large(max_body_size: u64) -> Response<Full<Bytes>> {
    nack(
        StatusCode::PAYLOAD_TOO_LARGE,
        &format!("Request body exceeds {max_body_size} bytes"),
    )
}

fn nack(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "status": "NACK",
        "error_detail": {
            "code": status.as_u16(),
            "message": message
        }
    });
    build(status, "application/json", Bytes::from(body.to_string()))
}

fn build(status: StatusCode, content_type: &str, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build {status} response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        })
}
