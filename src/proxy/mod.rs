//! Proxy rule subsystem.
//!
//! # Data Flow
//! ```text
//! incoming request path
//!     → rule.rs (first prefix match, declaration order)
//!     → rewrite.rs (strip/replace prefix, keep query)
//!     → upstream URL (origin base path + rewritten path)
//!
//! On upstream transport error:
//!     observer.rs (injected capability, logs by default)
//! ```
//!
//! # Design Decisions
//! - Rules are immutable after resolution; shared via Arc with the server
//! - Rewrites are total functions; the result is always "/"-anchored
//! - Error observation is a trait so tests can capture invocations

pub mod observer;
pub mod rewrite;
pub mod rule;

pub use observer::{TracingObserver, UpstreamErrorObserver};
pub use rewrite::PathRewrite;
pub use rule::{match_rule, ProxyRule};
