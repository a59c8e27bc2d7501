//! Descriptor validation.
//!
//! # Responsibilities
//! - Semantic validation (type shape is enforced by construction)
//! - Check rule prefixes are unique and "/"-anchored
//! - Check upstream origins use a scheme the forwarder can speak
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ConfigDescriptor → Result<(), Vec<_>>
//! - Runs after resolution, before the descriptor is handed to the server

use std::collections::BTreeSet;

use thiserror::Error;

use crate::config::schema::ConfigDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rule at index {index} has an empty name")]
    EmptyRuleName { index: usize },

    #[error("rule '{name}': match prefix '{prefix}' must start with '/'")]
    UnanchoredPrefix { name: String, prefix: String },

    #[error("duplicate match prefix '{prefix}'")]
    DuplicatePrefix { prefix: String },

    #[error("rule '{name}': unsupported upstream scheme '{scheme}'")]
    UnsupportedScheme { name: String, scheme: String },
}

/// Validate a resolved descriptor, collecting every violation.
pub fn validate_descriptor(descriptor: &ConfigDescriptor) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen_prefixes = BTreeSet::new();

    for (index, rule) in descriptor.rules.iter().enumerate() {
        if rule.name.is_empty() {
            errors.push(ValidationError::EmptyRuleName { index });
        }

        if !rule.match_prefix.starts_with('/') {
            errors.push(ValidationError::UnanchoredPrefix {
                name: rule.name.clone(),
                prefix: rule.match_prefix.clone(),
            });
        }

        if !seen_prefixes.insert(rule.match_prefix.clone()) {
            errors.push(ValidationError::DuplicatePrefix {
                prefix: rule.match_prefix.clone(),
            });
        }

        let scheme = rule.target_origin.scheme();
        if scheme != "http" && scheme != "https" {
            errors.push(ValidationError::UnsupportedScheme {
                name: rule.name.clone(),
                scheme: scheme.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
