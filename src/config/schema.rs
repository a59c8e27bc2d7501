//! Configuration descriptor definitions.
//!
//! This module defines the immutable descriptor produced by the resolver.
//! All types derive Serde traits so the descriptor can be dumped as JSON.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::proxy::ProxyRule;

/// Value a define resolves to when its source variable is unset.
///
/// The literal string "undefined" is deliberate and load-bearing: consumers
/// receive a stringified placeholder, never a missing key.
pub const MISSING_DEFINE: &str = "undefined";

/// Root descriptor for one dev-server invocation.
///
/// Built once per resolution, never mutated afterwards, discarded when the
/// process exits.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigDescriptor {
    /// Mode the descriptor was resolved for (e.g. "development").
    pub mode: String,

    /// Listener binding (port, host interface).
    pub server: ServerBinding,

    /// Proxy rules, in match order.
    pub rules: Vec<ProxyRule>,

    /// Enabled framework build plugins (opaque names).
    pub plugins: Vec<String>,

    /// Compile-time symbolic constants exposed to application code.
    pub defines: DefineMap,

    /// Import-path alias exposed to application code.
    pub alias: PathAlias,
}

/// Listener binding.
#[derive(Debug, Clone, Serialize)]
pub struct ServerBinding {
    /// TCP port to listen on.
    pub port: u16,

    /// Interface address (e.g. "0.0.0.0" for all interfaces).
    pub host: String,
}

impl ServerBinding {
    /// Address string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerBinding {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Mapping of compile-time symbols to resolved string values.
///
/// Ordered map so JSON output is stable across runs.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct DefineMap {
    values: BTreeMap<String, String>,
}

impl DefineMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `symbol` to the value of `source` in `env`, falling back to the
    /// stringified [`MISSING_DEFINE`] placeholder when the variable is unset.
    pub fn define_from(
        &mut self,
        symbol: impl Into<String>,
        env: &crate::env::EnvSnapshot,
        source: &str,
    ) {
        let value = env.get(source).unwrap_or(MISSING_DEFINE).to_string();
        self.values.insert(symbol.into(), value);
    }

    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.values.get(symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Filesystem alias usable in application import paths.
#[derive(Debug, Clone, Serialize)]
pub struct PathAlias {
    /// Short symbol (e.g. "@").
    pub symbol: String,

    /// Absolute base directory the symbol resolves to.
    pub base_path: PathBuf,
}
