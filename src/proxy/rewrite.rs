//! Path rewriting applied before forwarding to an upstream.
//!
//! Rewrites operate on the request's path-and-query so query strings pass
//! through untouched. The result is always anchored at "/": an empty or
//! query-only remainder is normalized so the upstream never sees an empty
//! request target.

use serde::Serialize;

/// How a matched prefix is rewritten before forwarding.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathRewrite {
    /// Drop the matched prefix, keeping the remainder.
    StripPrefix,

    /// Replace the matched prefix with a fixed path.
    ReplacePrefix { with: String },
}

impl PathRewrite {
    /// Rewrite `path_and_query` given the rule's `prefix`.
    ///
    /// The caller guarantees the prefix matched; if it did not, the input is
    /// passed through unchanged apart from "/" anchoring.
    pub fn apply(&self, prefix: &str, path_and_query: &str) -> String {
        let rest = path_and_query
            .strip_prefix(prefix)
            .unwrap_or(path_and_query);

        let rewritten = match self {
            PathRewrite::StripPrefix => rest.to_string(),
            PathRewrite::ReplacePrefix { with } => format!("{with}{rest}"),
        };

        if rewritten.starts_with('/') {
            rewritten
        } else {
            format!("/{rewritten}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_prefix_keeps_remainder() {
        let rewrite = PathRewrite::StripPrefix;
        assert_eq!(
            rewrite.apply("/api/nvidia", "/api/nvidia/chat/completions"),
            "/chat/completions"
        );
    }

    #[test]
    fn strip_prefix_normalizes_empty_path() {
        let rewrite = PathRewrite::StripPrefix;
        assert_eq!(rewrite.apply("/api/nvidia", "/api/nvidia"), "/");
    }

    #[test]
    fn strip_prefix_keeps_query_on_bare_prefix() {
        let rewrite = PathRewrite::StripPrefix;
        assert_eq!(rewrite.apply("/api/nvidia", "/api/nvidia?x=1"), "/?x=1");
    }

    #[test]
    fn replace_prefix_preserves_query() {
        let rewrite = PathRewrite::ReplacePrefix {
            with: "/translate_tts".to_string(),
        };
        assert_eq!(
            rewrite.apply("/api/tts", "/api/tts?q=hello"),
            "/translate_tts?q=hello"
        );
    }

    #[test]
    fn replace_prefix_keeps_trailing_segments() {
        let rewrite = PathRewrite::ReplacePrefix {
            with: "/translate_tts".to_string(),
        };
        assert_eq!(
            rewrite.apply("/api/tts", "/api/tts/extra"),
            "/translate_tts/extra"
        );
    }
}
