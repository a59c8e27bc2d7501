//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! mode + .env files + process env
//!     → env::load_env (merged EnvSnapshot)
//!     → resolver.rs (fixed profile + define lookups)
//!     → validation.rs (semantic checks)
//!     → ConfigDescriptor (validated, immutable)
//!     → handed to the dev server
//! ```
//!
//! # Design Decisions
//! - The descriptor is rebuilt from scratch on every invocation; nothing is
//!   persisted and nothing mutates after construction
//! - Resolution is infallible by contract; errors can only come from `.env`
//!   parsing or validation

use thiserror::Error;

pub mod resolver;
pub mod schema;
pub mod validation;

pub use resolver::resolve;
pub use schema::{ConfigDescriptor, DefineMap, PathAlias, ServerBinding, MISSING_DEFINE};
pub use validation::{validate_descriptor, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("env file error: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
