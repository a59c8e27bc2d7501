//! Dev server setup and request forwarding.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Match requests against proxy rules and forward to upstreams
//! - Rewrite paths, inject rule headers, handle the change-origin flag
//! - Notify the injected observer on upstream transport errors
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ConfigDescriptor;
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::observability::metrics;
use crate::proxy::{match_rule, ProxyRule, UpstreamErrorObserver};

/// Maximum buffered request body size.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Total time allowed for a proxied request.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub rules: Arc<Vec<ProxyRule>>,
    pub client: reqwest::Client,
    pub observer: Arc<dyn UpstreamErrorObserver>,
}

/// HTTP dev server enforcing the resolved proxy rules.
pub struct DevServer {
    router: Router,
    descriptor: ConfigDescriptor,
}

impl DevServer {
    /// Create a new dev server from a resolved descriptor.
    ///
    /// The observer is handed to the forwarding path and invoked once per
    /// upstream transport error.
    pub fn new(descriptor: ConfigDescriptor, observer: Arc<dyn UpstreamErrorObserver>) -> Self {
        // Upstream 3xx responses are relayed to the client untouched; the
        // proxy itself never follows redirects.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("upstream client builds with default TLS backend");

        let state = AppState {
            rules: Arc::new(descriptor.rules.clone()),
            client,
            observer,
        };

        let router = Self::build_router(state);
        Self { router, descriptor }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Dev server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Dev server stopped");
        Ok(())
    }

    /// Get a reference to the resolved descriptor.
    pub fn descriptor(&self) -> &ConfigDescriptor {
        &self.descriptor
    }
}

/// Main proxy handler.
/// Matches a rule, rewrites the path, and forwards the request upstream.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let path = request.uri().path().to_string();
    let method = request.method().clone();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    // 1. Match rule
    let Some(rule) = match_rule(&state.rules, &path) else {
        tracing::warn!(request_id = %request_id, path = %path, "No proxy rule matched");
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return (StatusCode::NOT_FOUND, "No matching proxy rule").into_response();
    };

    // 2. Rewrite path and build the upstream URL
    let upstream_url = match rule.upstream_url(&path_and_query) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(request_id = %request_id, rule = %rule.name, error = %e, "Invalid upstream URL");
            metrics::record_request(method.as_str(), 502, &rule.name, start_time);
            return (StatusCode::BAD_GATEWAY, "Invalid upstream URL").into_response();
        }
    };

    // 3. Buffer the request body
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            metrics::record_request(method.as_str(), 413, &rule.name, start_time);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    // 4. Assemble forwarded headers
    let mut headers = HeaderMap::new();
    for (name, value) in parts.headers.iter() {
        if is_hop_by_hop(name) || name == &header::HOST {
            continue;
        }
        headers.insert(name.clone(), value.clone());
    }
    if !rule.change_origin {
        // Keep the client's Host; with change_origin the client sets the
        // upstream authority from the URL instead.
        if let Some(host) = parts.headers.get(header::HOST) {
            headers.insert(header::HOST, host.clone());
        }
    }
    for (name, value) in rule.extra_headers.iter() {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => {
                tracing::warn!(rule = %rule.name, header = %name, "Skipping invalid extra header");
            }
        }
    }
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(X_REQUEST_ID, value);
    }

    // 5. Forward
    let upstream = state
        .client
        .request(method.clone(), upstream_url.clone())
        .headers(headers)
        .body(body_bytes)
        .send()
        .await;

    match upstream {
        Ok(response) => {
            let status = response.status();
            metrics::record_request(method.as_str(), status.as_u16(), &rule.name, start_time);

            tracing::debug!(
                request_id = %request_id,
                rule = %rule.name,
                upstream = %upstream_url,
                status = %status,
                "Upstream responded"
            );

            let mut builder = Response::builder().status(status);
            if let Some(response_headers) = builder.headers_mut() {
                for (name, value) in response.headers().iter() {
                    if is_hop_by_hop(name) {
                        continue;
                    }
                    response_headers.append(name.clone(), value.clone());
                }
            }

            match builder.body(Body::from_stream(response.bytes_stream())) {
                Ok(response) => response,
                Err(_) => (StatusCode::BAD_GATEWAY, "Invalid upstream response").into_response(),
            }
        }
        Err(e) => {
            state.observer.on_upstream_error(&rule.name, &e);
            metrics::record_request(method.as_str(), 502, &rule.name, start_time);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Hop-by-hop headers are connection-scoped and never forwarded.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hop_by_hop_headers_are_recognized() {
        assert!(is_hop_by_hop(&HeaderName::from_static("transfer-encoding")));
        assert!(is_hop_by_hop(&HeaderName::from_static("connection")));
        assert!(!is_hop_by_hop(&HeaderName::from_static("content-type")));
        assert!(!is_hop_by_hop(&HeaderName::from_static("referer")));
    }
}
