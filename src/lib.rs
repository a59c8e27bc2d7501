//! Development proxy server library.
//!
//! Resolves a build mode into an immutable [`ConfigDescriptor`] (server
//! binding, proxy rules, compile-time defines, path alias) and runs an HTTP
//! dev server that enforces the proxy rules.

pub mod config;
pub mod env;
pub mod http;
pub mod observability;
pub mod proxy;

pub use config::{resolve, validate_descriptor, ConfigDescriptor};
pub use env::{load_env, EnvSnapshot};
pub use http::DevServer;
pub use proxy::{TracingObserver, UpstreamErrorObserver};
