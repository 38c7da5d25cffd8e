//! Spindle Scrapyd - Daemon API client for the Spindle coordinator
//!
//! A blocking HTTP client for the crawl-execution daemon: reachability
//! probe, bounded startup wait, task listing, and run submission.

mod client;
pub mod types;

pub use client::{Result, ScrapydClient};
