//! Environment subsystem.
//!
//! # Data Flow
//! ```text
//! process environment ──capture once──▶ EnvSnapshot
//! .env / .env.{mode} files ──dotenv.rs──▶ merged EnvSnapshot
//!     → resolver (define map construction)
//! ```
//!
//! # Design Decisions
//! - Resolution takes a snapshot argument, never reads globals
//! - dotenv parsing goes through dotenvy's iterator API (no env mutation)
//! - Process values override file values, mirroring common dev-tool behavior

pub mod dotenv;
pub mod snapshot;

pub use dotenv::load_env;
pub use snapshot::EnvSnapshot;
