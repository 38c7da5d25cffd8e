//! Spindle Core - Core library for the Spindle crawl-job coordinator
//!
//! This crate provides the error taxonomy, the environment-derived context,
//! the project manifest store, and crontab housekeeping shared by the other
//! Spindle crates.

pub mod context;
pub mod cron;
pub mod error;
pub mod manifest;

pub use context::Context;
pub use error::{Result, SpindleError};
pub use manifest::{Manifest, ManifestEntry};
