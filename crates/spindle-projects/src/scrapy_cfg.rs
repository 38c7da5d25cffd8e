//! Packaging-descriptor access
//!
//! `scrapy.cfg` is read and patched textually: the external deploy tool
//! parses this file itself, so the bytes written here must stay in the
//! exact shape it expects.

use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use spindle_core::error::{ProjectError, Result};

const PROJECT_KEY: &str = "project = ";

/// Read the declared project identifier (first `project = ` line)
pub fn project_name(cfg: &Path) -> Result<String> {
    if !cfg.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("packaging descriptor {} not found", cfg.display()),
        )
        .into());
    }
    let content = std::fs::read_to_string(cfg)?;
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix(PROJECT_KEY) {
            return Ok(rest.trim().to_string());
        }
    }
    Err(ProjectError::PackagingNameMissing(cfg.to_path_buf()).into())
}

/// Append a deploy-target stanza unless one with this name already exists
pub fn ensure_deploy_target(
    cfg: &Path,
    target: &str,
    url: &str,
    project: &str,
    versioned: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(cfg)?;
    let header = format!("[deploy:{target}]");
    if content.lines().any(|line| line.trim() == header) {
        debug!(target, cfg = %cfg.display(), "deploy target already configured");
        return Ok(());
    }

    let mut stanza = format!("\n{header}\nurl = {url}\nproject = {project}\n");
    if versioned {
        stanza.push_str("version = GIT\n");
    }
    let mut file = std::fs::OpenOptions::new().append(true).open(cfg)?;
    file.write_all(stanza.as_bytes())?;
    info!(target, cfg = %cfg.display(), "deploy target added");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_core::error::SpindleError;
    use tempfile::TempDir;

    const SCRAPY_CFG: &str = "\
[settings]
default = news.settings

[deploy]
project = newsbot
";

    fn write_cfg(content: &str) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scrapy.cfg");
        std::fs::write(&path, content).unwrap();
        (temp, path)
    }

    #[test]
    fn test_project_name() {
        let (_temp, path) = write_cfg(SCRAPY_CFG);
        assert_eq!(project_name(&path).unwrap(), "newsbot");
    }

    #[test]
    fn test_project_name_missing() {
        let (_temp, path) = write_cfg("[settings]\ndefault = news.settings\n");
        assert!(matches!(
            project_name(&path),
            Err(SpindleError::Project(ProjectError::PackagingNameMissing(_)))
        ));
    }

    #[test]
    fn test_ensure_deploy_target_appends_stanza() {
        let (_temp, path) = write_cfg(SCRAPY_CFG);
        ensure_deploy_target(&path, "localScrapyd", "http://localhost:6800/", "newsbot", true)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with(
            "\n[deploy:localScrapyd]\nurl = http://localhost:6800/\nproject = newsbot\nversion = GIT\n"
        ));
    }

    #[test]
    fn test_ensure_deploy_target_is_idempotent() {
        let (_temp, path) = write_cfg(SCRAPY_CFG);
        for _ in 0..2 {
            ensure_deploy_target(&path, "localScrapyd", "http://localhost:6800/", "newsbot", false)
                .unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let stanzas = content
            .lines()
            .filter(|line| line.trim() == "[deploy:localScrapyd]")
            .count();
        assert_eq!(stanzas, 1);
    }

    #[test]
    fn test_unversioned_target_has_no_version_key() {
        let (_temp, path) = write_cfg(SCRAPY_CFG);
        ensure_deploy_target(&path, "localScrapyd", "http://localhost:6800/", "newsbot", false)
            .unwrap();
        assert!(!std::fs::read_to_string(&path).unwrap().contains("version = GIT"));
    }
}
