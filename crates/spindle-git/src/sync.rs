//! Fast-forward synchronization against upstream

use tracing::{debug, info};

use spindle_core::error::GitError;

use crate::repository::{GitRepo, Result, ORIGIN};

impl GitRepo {
    /// Bring the working copy up to the latest upstream state.
    ///
    /// Fetches `origin` and fast-forwards the checked-out branch. A
    /// diverged local branch is an error; this coordinator never merges.
    pub fn sync(&self) -> Result<()> {
        let mut remote = self.repo.find_remote(ORIGIN).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::RemoteNotFound {
                    name: ORIGIN.to_string(),
                    path: self.path().to_path_buf(),
                }
            } else {
                GitError::Git2(e)
            }
        })?;
        remote.fetch(&[] as &[&str], None, None)?;

        let fetch_head = self.repo.find_reference("FETCH_HEAD")?;
        let fetched = self.repo.reference_to_annotated_commit(&fetch_head)?;
        let (analysis, _) = self.repo.merge_analysis(&[&fetched])?;

        if analysis.is_up_to_date() {
            debug!(path = %self.path().display(), "working copy already up to date");
            return Ok(());
        }
        if !analysis.is_fast_forward() {
            return Err(GitError::NonFastForward(self.path().to_path_buf()));
        }

        let head = self.repo.head()?;
        let refname = head
            .name()
            .map(str::to_string)
            .ok_or_else(|| GitError::SyncFailed {
                path: self.path().to_path_buf(),
                message: "HEAD is not on a branch".to_string(),
            })?;
        let mut reference = self.repo.find_reference(&refname)?;
        reference.set_target(fetched.id(), "fast-forward")?;
        self.repo.set_head(&refname)?;
        self.repo
            .checkout_head(Some(git2::build::CheckoutBuilder::default().force()))?;

        info!(path = %self.path().display(), target = %fetched.id(), "working copy fast-forwarded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use std::path::Path;
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, name: &str, content: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(name), content).unwrap();

        let sig = Signature::now("Test", "test@example.com").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, name, &tree, &parents)
            .unwrap()
    }

    fn upstream_and_clone() -> (TempDir, Repository, TempDir, GitRepo) {
        let upstream_dir = TempDir::new().unwrap();
        let upstream = Repository::init(upstream_dir.path()).unwrap();
        commit_file(&upstream, "first.txt", "one");

        let clone_dir = TempDir::new().unwrap();
        let checkout = clone_dir.path().join("copy");
        let url = upstream_dir.path().to_str().unwrap().to_string();
        let clone = GitRepo::clone(&url, &checkout).unwrap();
        (upstream_dir, upstream, clone_dir, clone)
    }

    #[test]
    fn test_sync_noop_when_current() {
        let (_ud, _upstream, _cd, clone) = upstream_and_clone();
        clone.sync().unwrap();
    }

    #[test]
    fn test_sync_fast_forwards_to_upstream() {
        let (_ud, upstream, _cd, clone) = upstream_and_clone();
        let new_tip = commit_file(&upstream, "second.txt", "two");

        clone.sync().unwrap();

        let local = Repository::open(clone.path()).unwrap();
        let head = local.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.id(), new_tip);
        assert!(clone.path().join("second.txt").exists());
    }

    #[test]
    fn test_sync_rejects_diverged_copy() {
        let (_ud, upstream, _cd, clone) = upstream_and_clone();
        commit_file(&upstream, "theirs.txt", "upstream");

        let local = Repository::open(clone.path()).unwrap();
        commit_file(&local, "ours.txt", "local");

        assert!(matches!(
            clone.sync(),
            Err(GitError::NonFastForward(_))
        ));
    }
}
