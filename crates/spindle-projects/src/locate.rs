//! File location inside a working copy

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use spindle_core::error::{ProjectError, Result};

/// Find a file by exact name anywhere under the working copy.
///
/// When several files match, the shallowest path wins, ties broken
/// lexicographically, so repeated runs always pick the same file.
pub fn find_file(root: &Path, filename: &str) -> Result<PathBuf> {
    if !root.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("project folder {} does not exist", root.display()),
        )
        .into());
    }

    let mut matches: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == filename)
        .map(|entry| entry.into_path())
        .collect();
    matches.sort_by_key(|path| (path.components().count(), path.clone()));

    matches.into_iter().next().ok_or_else(|| {
        ProjectError::FileNotFound {
            filename: filename.to_string(),
            root: root.to_path_buf(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_core::error::SpindleError;
    use tempfile::TempDir;

    #[test]
    fn test_finds_nested_file() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("pkg").join("inner");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("settings.py"), "").unwrap();

        let found = find_file(temp.path(), "settings.py").unwrap();
        assert_eq!(found, nested.join("settings.py"));
    }

    #[test]
    fn test_shallowest_match_wins() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("pkg");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("settings.py"), "deep").unwrap();
        std::fs::write(temp.path().join("settings.py"), "shallow").unwrap();

        let found = find_file(temp.path(), "settings.py").unwrap();
        assert_eq!(found, temp.path().join("settings.py"));
    }

    #[test]
    fn test_equal_depth_breaks_ties_lexically() {
        let temp = TempDir::new().unwrap();
        for dir in ["beta", "alpha"] {
            let path = temp.path().join(dir);
            std::fs::create_dir_all(&path).unwrap();
            std::fs::write(path.join("scrapy.cfg"), "").unwrap();
        }

        let found = find_file(temp.path(), "scrapy.cfg").unwrap();
        assert_eq!(found, temp.path().join("alpha").join("scrapy.cfg"));
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = find_file(temp.path(), "scrapy.cfg").unwrap_err();
        assert!(matches!(
            err,
            SpindleError::Project(ProjectError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_folder_is_io() {
        let temp = TempDir::new().unwrap();
        let err = find_file(&temp.path().join("gone"), "scrapy.cfg").unwrap_err();
        assert!(matches!(err, SpindleError::Io(_)));
    }
}
