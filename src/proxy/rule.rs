//! Proxy rule definition and matching.
//!
//! # Responsibilities
//! - Match request paths against rule prefixes (case-sensitive)
//! - Compute the upstream URL for a matched request
//! - Carry per-rule header overrides
//!
//! # Design Decisions
//! - First match in declaration order wins; prefixes are validated unique
//! - O(n) prefix scan, acceptable for the handful of rules a dev server has
//! - Explicit no-match (`Option`) rather than a silent default
//! - No regex matching, plain prefix comparison only

use std::collections::BTreeMap;

use serde::Serialize;
use url::Url;

use crate::proxy::rewrite::PathRewrite;

/// A single path-prefix proxy rule.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyRule {
    /// Rule identifier for logging and metrics.
    pub name: String,

    /// Request path prefix to match (case-sensitive).
    pub match_prefix: String,

    /// Upstream origin, may carry a base path (e.g. ".../v1").
    pub target_origin: Url,

    /// Replace the Host header with the upstream authority.
    pub change_origin: bool,

    /// Path rewrite applied before forwarding.
    pub rewrite: PathRewrite,

    /// Fixed headers set on the forwarded request, overriding client values.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_headers: BTreeMap<String, String>,
}

impl ProxyRule {
    /// Whether this rule matches the given request path.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.match_prefix)
    }

    /// Rewritten path-and-query for a matched request.
    pub fn upstream_path(&self, path_and_query: &str) -> String {
        self.rewrite.apply(&self.match_prefix, path_and_query)
    }

    /// Full upstream URL: the origin's base path joined with the rewritten
    /// path-and-query.
    pub fn upstream_url(&self, path_and_query: &str) -> Result<Url, url::ParseError> {
        let rewritten = self.upstream_path(path_and_query);
        let base = self.target_origin.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{rewritten}"))
    }
}

/// Find the first rule whose prefix matches `path`, in declaration order.
pub fn match_rule<'a>(rules: &'a [ProxyRule], path: &str) -> Option<&'a ProxyRule> {
    rules.iter().find(|rule| rule.matches(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, prefix: &str, origin: &str, rewrite: PathRewrite) -> ProxyRule {
        ProxyRule {
            name: name.to_string(),
            match_prefix: prefix.to_string(),
            target_origin: Url::parse(origin).unwrap(),
            change_origin: true,
            rewrite,
            extra_headers: BTreeMap::new(),
        }
    }

    #[test]
    fn match_rule_picks_first_matching_prefix() {
        let rules = vec![
            rule("a", "/api/nvidia", "https://example.com", PathRewrite::StripPrefix),
            rule("b", "/api/tts", "https://example.org", PathRewrite::StripPrefix),
        ];

        assert_eq!(match_rule(&rules, "/api/nvidia/models").map(|r| r.name.as_str()), Some("a"));
        assert_eq!(match_rule(&rules, "/api/tts?q=hi").map(|r| r.name.as_str()), Some("b"));
        assert!(match_rule(&rules, "/assets/app.js").is_none());
    }

    #[test]
    fn upstream_url_joins_origin_base_path() {
        let r = rule(
            "inference",
            "/api/nvidia",
            "https://integrate.api.nvidia.com/v1",
            PathRewrite::StripPrefix,
        );

        let url = r.upstream_url("/api/nvidia/chat/completions").unwrap();
        assert_eq!(
            url.as_str(),
            "https://integrate.api.nvidia.com/v1/chat/completions"
        );
    }

    #[test]
    fn upstream_url_without_base_path_keeps_query() {
        let r = rule(
            "tts",
            "/api/tts",
            "https://translate.google.com",
            PathRewrite::ReplacePrefix {
                with: "/translate_tts".to_string(),
            },
        );

        let url = r.upstream_url("/api/tts?q=hello").unwrap();
        assert_eq!(url.as_str(), "https://translate.google.com/translate_tts?q=hello");
    }

    #[test]
    fn upstream_url_for_bare_prefix_hits_origin_root() {
        let r = rule(
            "inference",
            "/api/nvidia",
            "https://integrate.api.nvidia.com/v1",
            PathRewrite::StripPrefix,
        );

        let url = r.upstream_url("/api/nvidia").unwrap();
        assert_eq!(url.as_str(), "https://integrate.api.nvidia.com/v1/");
    }
}
