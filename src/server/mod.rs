//! server
//!
//! HTTP front for the gateway.
//!
//! # Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/api/doc` | current document |
//! | PUT | `/api/doc` | new document, or 409 with the current one |
//! | GET | `/api/tasks/inprogress` | tasks not marked done |
//! | GET | `/api/health` | `{"ok": true}` |
//! | GET | `/`, `/static/<path>`, `/<file>` | static assets |
//!
//! Store calls block on file locks and disk I/O, so each one runs on the
//! blocking pool. Unknown `/api` paths are 404; methods other than GET and
//! PUT are 501.

pub mod response;
pub mod static_files;

use std::convert::Infallible;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::store::DocumentStore;
use crate::gateway::{ConflictBody, Gateway, GatewayError, ProposeOutcome, UpdateRequest};
use response::{json_error, json_response, server_error, Body};
use static_files::StaticError;

/// Shared state for every connection.
#[derive(Debug)]
pub struct ServerState {
    store: Arc<DocumentStore>,
    static_dir: PathBuf,
    max_body_bytes: usize,
}

impl ServerState {
    pub fn new(store: DocumentStore, static_dir: impl Into<PathBuf>, max_body_bytes: usize) -> Self {
        Self {
            store: Arc::new(store),
            static_dir: static_dir.into(),
            max_body_bytes,
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }
}

/// Accept connections until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: Arc<ServerState>,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "listening");
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            _ = &mut shutdown => {
                info!("shutting down");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                }
            },
        };

        let io = TokioIo::new(stream);
        let state = state.clone();
        tokio::spawn(async move {
            let service = service_fn(move |req| handle_request(req, state.clone()));
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(%peer, error = %e, "connection error");
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    state: Arc<ServerState>,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let raw_path = req.uri().path().to_string();
    let path = percent_decode(&raw_path);

    let resp = match Limited::new(req.into_body(), state.max_body_bytes)
        .collect()
        .await
    {
        Ok(collected) => match &path {
            Some(path) => route(&state, &method, path, collected.to_bytes()).await,
            None => json_error(StatusCode::BAD_REQUEST, "Invalid path"),
        },
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            json_error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
        }
        Err(e) => {
            debug!(error = %e, "failed to read request body");
            json_error(StatusCode::BAD_REQUEST, "Missing request body")
        }
    };

    debug!(%method, path = %raw_path, status = resp.status().as_u16(), "request");
    Ok(resp)
}

/// Decode `%XX` escapes in a request path.
///
/// Malformed escapes are kept as written. Returns `None` when the decoded
/// bytes are not UTF-8.
fn percent_decode(path: &str) -> Option<String> {
    if !path.contains('%') {
        return Some(path.to_string());
    }

    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = (bytes[i] == b'%')
            .then(|| path.get(i + 1..i + 3))
            .flatten()
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match escaped {
            Some(byte) => {
                out.push(byte);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

/// Dispatch one request with an already collected body.
///
/// `path` is the decoded request path.
pub async fn route(
    state: &ServerState,
    method: &Method,
    path: &str,
    body: Bytes,
) -> Response<Body> {
    match (method, path) {
        (&Method::GET, "/api/health") => {
            json_response(StatusCode::OK, &serde_json::json!({ "ok": true }))
        }
        (&Method::GET, "/api/doc") => {
            match with_gateway(state, |gateway| gateway.get_document()).await {
                Ok(doc) => json_response(StatusCode::OK, &doc),
                Err(resp) => resp,
            }
        }
        (&Method::PUT, "/api/doc") => put_document(state, body).await,
        (&Method::GET, "/api/tasks/inprogress") => {
            match with_gateway(state, |gateway| gateway.get_in_progress()).await {
                Ok(tasks) => json_response(StatusCode::OK, &tasks),
                Err(resp) => resp,
            }
        }
        (&Method::GET, p) if p == "/api" || p.starts_with("/api/") => not_found(),
        (&Method::GET, p) => serve_static(state, p).await,
        (&Method::PUT, _) => not_found(),
        _ => json_error(StatusCode::NOT_IMPLEMENTED, "Unsupported method"),
    }
}

async fn put_document(state: &ServerState, body: Bytes) -> Response<Body> {
    let request = match UpdateRequest::from_json(&body) {
        Ok(request) => request,
        Err(e) => return gateway_error(e),
    };

    match with_gateway(state, move |gateway| gateway.propose_update(request)).await {
        Ok(ProposeOutcome::Committed(doc)) => json_response(StatusCode::OK, &doc),
        Ok(ProposeOutcome::Conflict(current)) => {
            json_response(StatusCode::CONFLICT, &ConflictBody::new(&current))
        }
        Err(resp) => resp,
    }
}

/// Static routes: `/`, `/static` and `/static/` serve the index, anything
/// under `/static/` maps into the static dir, and a single segment such as
/// `/app.js` names a file at its top level.
async fn serve_static(state: &ServerState, path: &str) -> Response<Body> {
    let relative = match path {
        "/" | "/static" | "/static/" => "index.html",
        p => match p.strip_prefix("/static/") {
            Some(rest) => rest,
            None => match p.strip_prefix('/') {
                Some(file) if !file.contains('/') => file,
                _ => return not_found(),
            },
        },
    };

    match static_files::load(&state.static_dir, relative).await {
        Ok(asset) => response::bytes_response(StatusCode::OK, asset.content_type, asset.body),
        Err(StaticError::InvalidPath) => json_error(StatusCode::BAD_REQUEST, "Invalid path"),
        Err(StaticError::NotFound) => not_found(),
        Err(e) => server_error(&e),
    }
}

/// Run `f` against the store on the blocking pool.
///
/// Failures come back as the response to send.
async fn with_gateway<T, F>(state: &ServerState, f: F) -> Result<T, Response<Body>>
where
    T: Send + 'static,
    F: FnOnce(Gateway<'_>) -> Result<T, GatewayError> + Send + 'static,
{
    let store = state.store.clone();
    match tokio::task::spawn_blocking(move || f(Gateway::new(&store))).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(gateway_error(e)),
        Err(e) => Err(server_error(&e)),
    }
}

fn gateway_error(err: GatewayError) -> Response<Body> {
    match err {
        GatewayError::InvalidRequest(msg) => json_error(StatusCode::BAD_REQUEST, &msg),
        GatewayError::StorageUnavailable(e) => server_error(&e),
    }
}

fn not_found() -> Response<Body> {
    json_error(StatusCode::NOT_FOUND, "Not found")
}
