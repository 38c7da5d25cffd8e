//! Environment-derived coordinator context
//!
//! The original deployment drove everything through memoized environment
//! lookups; here the context is resolved once, validated field by field, and
//! passed by reference to every collaborator.

use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::error::{ConfigError, Result};

/// Default daemon endpoint when SCRAPYD_API is not set
pub const DEFAULT_SCRAPYD_URL: &str = "http://localhost:6800/";

/// File name of the project manifest inside the spiders directory
pub const MANIFEST_FILE: &str = "spiders.json";

/// Process-wide configuration, resolved once at startup.
///
/// Every path field has been checked to exist as a directory, and the acting
/// user has been checked against the real process user, before a `Context`
/// can be observed.
#[derive(Debug, Clone)]
pub struct Context {
    /// Installation root (coordinator logs live under `<install>/logs`)
    pub install_path: PathBuf,

    /// Directory holding one working copy per project
    pub spiders_path: PathBuf,

    /// Root for per-project export directories
    pub export_path: PathBuf,

    /// Root for per-project crawl logs
    pub logs_path: PathBuf,

    /// Path of the project manifest (`<spiders>/spiders.json`)
    pub manifest_path: PathBuf,

    /// OS user this coordinator acts as
    pub scrapyd_user: String,

    /// Daemon endpoint URL
    pub scrapyd_url: String,
}

impl Context {
    /// Build and validate the context from process environment variables.
    ///
    /// Fails with a [`ConfigError`] naming the exact setting that is missing
    /// or invalid.
    pub fn from_env() -> Result<Self> {
        let install_path = required_dir("SCRAPYD_INSTALL")?;
        let spiders_path = required_dir("SPIDERS_PATH")?;
        let export_path = required_dir("EXPORT_PATH")?;
        let logs_path = required_dir("SCRAPYD_LOGS")?;
        let scrapyd_user = acting_user()?;
        let scrapyd_url =
            env::var("SCRAPYD_API").unwrap_or_else(|_| DEFAULT_SCRAPYD_URL.to_string());
        let manifest_path = spiders_path.join(MANIFEST_FILE);

        info!(path = %spiders_path.display(), "[context] spiders path");
        info!(path = %logs_path.display(), "[context] logs path");
        info!(path = %export_path.display(), "[context] export path");
        info!(path = %manifest_path.display(), "[context] manifest file");
        info!(user = %scrapyd_user, "[context] scrapyd user");
        info!(url = %scrapyd_url, "[context] scrapyd api");

        Ok(Self {
            install_path,
            spiders_path,
            export_path,
            logs_path,
            manifest_path,
            scrapyd_user,
            scrapyd_url,
        })
    }
}

/// Resolve a required environment variable that must name an existing directory
fn required_dir(var: &str) -> std::result::Result<PathBuf, ConfigError> {
    let value = env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingVar(var.to_string()))?;
    let path = PathBuf::from(value);
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            var: var.to_string(),
            path,
        });
    }
    Ok(path)
}

/// Resolve the acting user and verify it matches the real process user
fn acting_user() -> std::result::Result<String, ConfigError> {
    let expected = env::var("SCRAPYD_USER")
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingVar("SCRAPYD_USER".to_string()))?;
    let actual = process_user().ok_or(ConfigError::UnknownUser)?;
    if expected != actual {
        return Err(ConfigError::UserMismatch { expected, actual });
    }
    Ok(expected)
}

/// Real process user, resolved like `getpass.getuser`
fn process_user() -> Option<String> {
    for var in ["USER", "LOGNAME"] {
        if let Ok(user) = env::var(var) {
            if !user.is_empty() {
                return Some(user);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpindleError;
    use serial_test::serial;
    use tempfile::TempDir;

    fn set_full_env(root: &TempDir) {
        for sub in ["install", "spiders", "export", "logs"] {
            std::fs::create_dir_all(root.path().join(sub)).unwrap();
        }
        env::set_var("SCRAPYD_INSTALL", root.path().join("install"));
        env::set_var("SPIDERS_PATH", root.path().join("spiders"));
        env::set_var("EXPORT_PATH", root.path().join("export"));
        env::set_var("SCRAPYD_LOGS", root.path().join("logs"));
        env::set_var("USER", "crawler");
        env::set_var("SCRAPYD_USER", "crawler");
        env::remove_var("SCRAPYD_API");
    }

    #[test]
    #[serial]
    fn test_from_env_resolves_all_fields() {
        let root = TempDir::new().unwrap();
        set_full_env(&root);

        let ctx = Context::from_env().unwrap();
        assert_eq!(ctx.spiders_path, root.path().join("spiders"));
        assert_eq!(ctx.manifest_path, root.path().join("spiders").join(MANIFEST_FILE));
        assert_eq!(ctx.scrapyd_user, "crawler");
        assert_eq!(ctx.scrapyd_url, DEFAULT_SCRAPYD_URL);
    }

    #[test]
    #[serial]
    fn test_missing_var_names_the_variable() {
        let root = TempDir::new().unwrap();
        set_full_env(&root);
        env::remove_var("EXPORT_PATH");

        let err = Context::from_env().unwrap_err();
        match err {
            SpindleError::Config(ConfigError::MissingVar(var)) => assert_eq!(var, "EXPORT_PATH"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[serial]
    fn test_nonexistent_directory_rejected() {
        let root = TempDir::new().unwrap();
        set_full_env(&root);
        env::set_var("SPIDERS_PATH", root.path().join("does-not-exist"));

        let err = Context::from_env().unwrap_err();
        match err {
            SpindleError::Config(ConfigError::NotADirectory { var, .. }) => {
                assert_eq!(var, "SPIDERS_PATH");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[serial]
    fn test_user_mismatch_rejected() {
        let root = TempDir::new().unwrap();
        set_full_env(&root);
        env::set_var("SCRAPYD_USER", "somebody-else");

        let err = Context::from_env().unwrap_err();
        match err {
            SpindleError::Config(ConfigError::UserMismatch { expected, actual }) => {
                assert_eq!(expected, "somebody-else");
                assert_eq!(actual, "crawler");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[serial]
    fn test_endpoint_override() {
        let root = TempDir::new().unwrap();
        set_full_env(&root);
        env::set_var("SCRAPYD_API", "http://crawlhost:6800/");

        let ctx = Context::from_env().unwrap();
        assert_eq!(ctx.scrapyd_url, "http://crawlhost:6800/");
    }
}
