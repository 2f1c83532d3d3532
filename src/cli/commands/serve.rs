//! serve command - Run the HTTP server
//!
//! Seeds the document eagerly so a broken data directory fails at startup
//! rather than on the first request.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::cli::Context;
use crate::server::{self, ServerState};

/// Run the server until interrupted.
pub fn serve(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let doc = store
        .load()
        .context("failed to load document at startup")?;
    info!(
        revision = %doc.revision,
        path = %store.paths().doc_path().display(),
        "document ready"
    );

    let state = Arc::new(ServerState::new(
        store,
        ctx.config.static_dir(),
        ctx.config.max_body_bytes(),
    ));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(serve_async(ctx, state))
}

async fn serve_async(ctx: &Context, state: Arc<ServerState>) -> Result<()> {
    let bind = ctx.config.bind();
    let addr = if bind.contains(':') {
        format!("[{bind}]:{}", ctx.config.port())
    } else {
        format!("{bind}:{}", ctx.config.port())
    };
    let listener = TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let bound = listener.local_addr()?;

    for url in listen_urls(bound.port(), &bound.ip().to_string(), hostname().as_deref()) {
        println!("  {url}");
    }

    server::serve(listener, state, shutdown_signal())
        .await
        .context("server failed")
}

/// URLs to show the user, without duplicates.
fn listen_urls(port: u16, ip: &str, host: Option<&str>) -> Vec<String> {
    let mut urls = vec![format!("http://localhost:{port}")];
    let unspecified = ip == "0.0.0.0" || ip == "::";
    let candidates = [(!unspecified).then_some(ip), host];
    for name in candidates.into_iter().flatten() {
        let url = if name.contains(':') {
            format!("http://[{name}]:{port}")
        } else {
            format!("http://{name}:{port}")
        };
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

fn hostname() -> Option<String> {
    std::env::var("HOSTNAME")
        .ok()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_urls_unspecified_bind() {
        assert_eq!(
            listen_urls(8000, "0.0.0.0", Some("kitchen")),
            vec!["http://localhost:8000", "http://kitchen:8000"]
        );
    }

    #[test]
    fn listen_urls_specific_bind() {
        assert_eq!(
            listen_urls(9000, "127.0.0.1", None),
            vec!["http://localhost:9000", "http://127.0.0.1:9000"]
        );
        assert_eq!(
            listen_urls(9000, "::1", Some("localhost")),
            vec!["http://localhost:9000", "http://[::1]:9000"]
        );
    }
}
