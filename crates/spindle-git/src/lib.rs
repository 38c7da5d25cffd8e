//! Spindle Git - Working-copy operations for the Spindle coordinator
//!
//! Open, clone, inspect, and fast-forward the git working copies backing
//! each crawl project.

mod repository;
mod sync;

pub use repository::{GitRepo, Result, ORIGIN};
