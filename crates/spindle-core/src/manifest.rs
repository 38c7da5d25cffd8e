//! The project manifest
//!
//! A single JSON document maps each project name to its cron schedule,
//! source repository URL, and free-form settings and argument overrides.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

/// The manifest document (`spiders.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Project name -> manifest entry
    #[serde(default)]
    pub spiders: BTreeMap<String, ManifestEntry>,
}

/// One managed crawl project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestEntry {
    /// Cron schedule the crawl is triggered on
    pub cron: Option<String>,

    /// Source repository URL; projects without one must already be on disk
    pub giturl: Option<String>,

    /// Per-project settings overrides, merged with the injected ones
    pub custom_settings: BTreeMap<String, Value>,

    /// Extra fields forwarded verbatim on run submission
    pub custom_args: BTreeMap<String, Value>,
}

impl Manifest {
    /// Load the manifest from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let manifest: Manifest = serde_json::from_str(&content)?;
        debug!(path = %path.display(), projects = manifest.spiders.len(), "manifest loaded");
        Ok(manifest)
    }

    /// Load the manifest, creating an empty document first if none exists
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.is_file() {
            warn!(path = %path.display(), "generating an empty manifest");
            let empty = serde_json::to_string(&Manifest::default())
                .map_err(crate::error::SpindleError::Json)?;
            std::fs::write(path, empty).map_err(|e| ConfigError::ManifestInit {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        Self::load(path)
    }

    /// Look up one project's entry
    pub fn entry(&self, name: &str) -> Option<&ManifestEntry> {
        self.spiders.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_or_init_creates_empty_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("spiders.json");

        let manifest = Manifest::load_or_init(&path).unwrap();
        assert!(manifest.spiders.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"spiders":{}}"#);
    }

    #[test]
    fn test_load_full_entry() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("spiders.json");
        std::fs::write(
            &path,
            r#"{"spiders": {"news": {
                "cron": "0 * * * *",
                "giturl": "https://example.com/news.git",
                "custom_settings": {"DOWNLOAD_DELAY": 2},
                "custom_args": {"priority": "high"}
            }}}"#,
        )
        .unwrap();

        let manifest = Manifest::load(&path).unwrap();
        let entry = manifest.entry("news").unwrap();
        assert_eq!(entry.cron.as_deref(), Some("0 * * * *"));
        assert_eq!(entry.giturl.as_deref(), Some("https://example.com/news.git"));
        assert_eq!(entry.custom_settings["DOWNLOAD_DELAY"], 2);
        assert_eq!(entry.custom_args["priority"], "high");
        assert!(manifest.entry("blog").is_none());
    }

    #[test]
    fn test_sparse_entry_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("spiders.json");
        std::fs::write(&path, r#"{"spiders": {"local": {"cron": "@daily"}}}"#).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        let entry = manifest.entry("local").unwrap();
        assert_eq!(entry.cron.as_deref(), Some("@daily"));
        assert!(entry.giturl.is_none());
        assert!(entry.custom_settings.is_empty());
        assert!(entry.custom_args.is_empty());
    }

    #[test]
    fn test_malformed_manifest_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("spiders.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(Manifest::load(&path).is_err());
    }
}
