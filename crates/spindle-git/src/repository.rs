//! Git working-copy access

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::info;

use spindle_core::error::GitError;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// The remote every working copy is reconciled against
pub const ORIGIN: &str = "origin";

/// A project's on-disk working copy
pub struct GitRepo {
    pub(crate) repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open an existing working copy
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::RepositoryNotFound(path.to_path_buf())
            } else {
                GitError::OpenFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            }
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            repo,
        })
    }

    /// Check out a repository into a fresh working copy
    pub fn clone(url: &str, into: &Path) -> Result<Self> {
        info!(url, path = %into.display(), "cloning working copy");
        let repo = Repository::clone(url, into).map_err(|e| GitError::CloneFailed {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path: into.to_path_buf(),
            repo,
        })
    }

    /// Working-copy path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The URL recorded for the `origin` remote
    pub fn origin_url(&self) -> Result<String> {
        let remote = self.repo.find_remote(ORIGIN).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::RemoteNotFound {
                    name: ORIGIN.to_string(),
                    path: self.path.clone(),
                }
            } else {
                GitError::Git2(e)
            }
        })?;
        remote
            .url()
            .map(str::to_string)
            .ok_or_else(|| GitError::MissingRemoteUrl {
                name: ORIGIN.to_string(),
                path: self.path.clone(),
            })
    }
}
