//! server::response
//!
//! Response builders shared by the HTTP handlers.
//!
//! Every response carries `Cache-Control: no-store`. Server failures use
//! an opaque text body; the detail goes to the log, never to the client.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

/// Body type of every response this server produces.
pub type Body = Full<Bytes>;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const SERVER_ERROR_BODY: &str = "Server error";

/// A response with `body` and the no-store cache policy.
pub fn bytes_response(status: StatusCode, content_type: &str, body: Bytes) -> Response<Body> {
    let mut resp = Response::new(Full::new(body));
    *resp.status_mut() = status;
    let headers = resp.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    resp
}

/// Serialize `value` as the JSON body.
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(body) => bytes_response(status, JSON_CONTENT_TYPE, Bytes::from(body)),
        Err(e) => server_error(&e),
    }
}

/// `{"error": message}` with the given status.
pub fn json_error(status: StatusCode, message: &str) -> Response<Body> {
    json_response(status, &serde_json::json!({ "error": message }))
}

/// Plain text body.
pub fn text_response(status: StatusCode, text: &str) -> Response<Body> {
    bytes_response(status, TEXT_CONTENT_TYPE, Bytes::from(text.to_string()))
}

/// Log `err` and answer with an opaque 500.
pub fn server_error(err: &dyn std::fmt::Display) -> Response<Body> {
    error!(error = %err, "request failed");
    text_response(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_BODY)
}
