//! Upstream error observation.
//!
//! The observer is handed to the server at construction time and invoked by
//! the forwarding path once per upstream transport error, at an arbitrary
//! later time and with no ordering guarantee relative to other requests.
//! Errors are non-fatal: the client receives a 502 and the server keeps
//! running.

use std::error::Error;

/// Capability for observing upstream transport errors.
pub trait UpstreamErrorObserver: Send + Sync {
    /// Called once per failed upstream request.
    fn on_upstream_error(&self, rule: &str, error: &(dyn Error + 'static));
}

/// Default observer: logs the error to the operator console.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl UpstreamErrorObserver for TracingObserver {
    fn on_upstream_error(&self, rule: &str, error: &(dyn Error + 'static)) {
        tracing::error!(rule = %rule, error = %error, "Upstream request failed");
    }
}
