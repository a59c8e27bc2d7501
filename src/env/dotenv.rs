//! Mode-aware `.env` file loading.
//!
//! Files are parsed with dotenvy's iterator API, which never mutates the
//! process environment; the result is merged into an [`EnvSnapshot`].
//!
//! Precedence, lowest to highest:
//! 1. `.env`
//! 2. `.env.local`
//! 3. `.env.{mode}`
//! 4. `.env.{mode}.local`
//! 5. the real process environment
//!
//! Missing files are skipped; malformed lines are an error. Every variable
//! is eligible, there is no prefix filter.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ConfigError;
use crate::env::EnvSnapshot;

/// Load environment values for `mode` from `.env`-style files in `dir`,
/// layered under the given `process` snapshot.
pub fn load_env(mode: &str, dir: &Path, process: &EnvSnapshot) -> Result<EnvSnapshot, ConfigError> {
    let file_names = [
        ".env".to_string(),
        ".env.local".to_string(),
        format!(".env.{mode}"),
        format!(".env.{mode}.local"),
    ];

    let mut merged = BTreeMap::new();
    for name in &file_names {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        for item in dotenvy::from_path_iter(&path)? {
            let (key, value) = item?;
            merged.insert(key, value);
        }
    }

    // Variables already set on the process win over file-sourced values.
    for (key, value) in process.iter() {
        merged.insert(key.clone(), value.clone());
    }

    Ok(merged.into_iter().collect())
}
