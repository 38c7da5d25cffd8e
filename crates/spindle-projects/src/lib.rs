//! Spindle Projects - Project model and registration workflow
//!
//! A [`Project`] is the materialized, validated view of one manifest entry
//! plus its on-disk working copy. Construction runs the whole validation
//! pipeline; registration and crawl triggering build on top of it.

mod locate;
mod project;
mod scrapy_cfg;
mod settings;

pub use project::{Project, DEPLOY_TARGET};
