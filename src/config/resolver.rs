//! Configuration resolution.
//!
//! `resolve` builds the full descriptor for a given mode from fixed
//! literals plus best-effort environment lookups. It performs no I/O and
//! has no error paths: an unset variable falls back to the stringified
//! "undefined" placeholder rather than failing.

use std::collections::BTreeMap;
use std::path::Path;

use url::Url;

use crate::config::schema::{ConfigDescriptor, DefineMap, PathAlias, ServerBinding};
use crate::env::EnvSnapshot;
use crate::proxy::{PathRewrite, ProxyRule};

const NVIDIA_ORIGIN: &str = "https://integrate.api.nvidia.com/v1";
const TTS_ORIGIN: &str = "https://translate.google.com";

/// User-Agent sent to the TTS upstream so the request looks
/// browser-originated.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Resolve the configuration descriptor for `mode`.
///
/// `env` is the merged environment snapshot (see [`crate::env::load_env`])
/// and `root` the absolute project root the "@" alias points at. The server
/// binding and proxy rules are fixed and identical for every mode; only the
/// define map varies with the environment.
pub fn resolve(mode: &str, env: &EnvSnapshot, root: &Path) -> ConfigDescriptor {
    let mut defines = DefineMap::new();
    defines.define_from("API_KEY", env, "GEMINI_API_KEY");
    defines.define_from("GEMINI_API_KEY", env, "GEMINI_API_KEY");
    defines.define_from("NVIDIA_API_KEY", env, "NVIDIA_API_KEY");

    ConfigDescriptor {
        mode: mode.to_string(),
        server: ServerBinding::default(),
        rules: vec![nvidia_rule(), tts_rule()],
        plugins: vec!["react".to_string()],
        defines,
        alias: PathAlias {
            symbol: "@".to_string(),
            base_path: root.to_path_buf(),
        },
    }
}

/// "/api/nvidia/*" → the inference API, prefix stripped.
fn nvidia_rule() -> ProxyRule {
    ProxyRule {
        name: "nvidia".to_string(),
        match_prefix: "/api/nvidia".to_string(),
        target_origin: origin(NVIDIA_ORIGIN),
        change_origin: true,
        rewrite: PathRewrite::StripPrefix,
        extra_headers: BTreeMap::new(),
    }
}

/// "/api/tts/*" → the translate TTS endpoint, with headers that make the
/// request appear to come from a browser on the translate site itself.
fn tts_rule() -> ProxyRule {
    let mut extra_headers = BTreeMap::new();
    extra_headers.insert(
        "Referer".to_string(),
        "https://translate.google.com/".to_string(),
    );
    extra_headers.insert(
        "Origin".to_string(),
        "https://translate.google.com".to_string(),
    );
    extra_headers.insert("User-Agent".to_string(), BROWSER_USER_AGENT.to_string());

    ProxyRule {
        name: "tts".to_string(),
        match_prefix: "/api/tts".to_string(),
        target_origin: origin(TTS_ORIGIN),
        change_origin: true,
        rewrite: PathRewrite::ReplacePrefix {
            with: "/translate_tts".to_string(),
        },
        extra_headers,
    }
}

fn origin(raw: &str) -> Url {
    Url::parse(raw).expect("hardcoded upstream origin is a valid URL")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn root() -> PathBuf {
        PathBuf::from("/srv/app")
    }

    #[test]
    fn binding_is_fixed_for_every_mode() {
        for mode in ["development", "production", "staging"] {
            let descriptor = resolve(mode, &EnvSnapshot::default(), &root());
            assert_eq!(descriptor.server.port, 3000);
            assert_eq!(descriptor.server.host, "0.0.0.0");
        }
    }

    #[test]
    fn defines_duplicate_gemini_key_and_default_missing() {
        let env: EnvSnapshot = [("GEMINI_API_KEY".to_string(), "abc123".to_string())]
            .into_iter()
            .collect();
        let descriptor = resolve("development", &env, &root());

        assert_eq!(descriptor.defines.get("API_KEY"), Some("abc123"));
        assert_eq!(descriptor.defines.get("GEMINI_API_KEY"), Some("abc123"));
        assert_eq!(descriptor.defines.get("NVIDIA_API_KEY"), Some("undefined"));
    }

    #[test]
    fn tts_rule_carries_fixed_browser_headers() {
        let descriptor = resolve("production", &EnvSnapshot::default(), &root());
        let tts = descriptor
            .rules
            .iter()
            .find(|r| r.name == "tts")
            .expect("tts rule present");

        assert_eq!(
            tts.extra_headers.get("Referer").map(String::as_str),
            Some("https://translate.google.com/")
        );
        assert_eq!(
            tts.extra_headers.get("Origin").map(String::as_str),
            Some("https://translate.google.com")
        );
        assert!(tts.extra_headers.contains_key("User-Agent"));
    }

    #[test]
    fn alias_is_stable_across_modes() {
        let dev = resolve("development", &EnvSnapshot::default(), &root());
        let prod = resolve("production", &EnvSnapshot::default(), &root());

        assert_eq!(dev.alias.symbol, "@");
        assert_eq!(dev.alias.base_path, prod.alias.base_path);
    }

    #[test]
    fn rules_cover_both_api_prefixes() {
        let descriptor = resolve("development", &EnvSnapshot::default(), &root());
        let prefixes: Vec<&str> = descriptor
            .rules
            .iter()
            .map(|r| r.match_prefix.as_str())
            .collect();
        assert_eq!(prefixes, vec!["/api/nvidia", "/api/tts"]);
    }

    #[test]
    fn one_framework_plugin_enabled() {
        let descriptor = resolve("development", &EnvSnapshot::default(), &root());
        assert_eq!(descriptor.plugins, vec!["react".to_string()]);
    }
}
