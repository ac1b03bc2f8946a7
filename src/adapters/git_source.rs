use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::Repository;
use tracing::info;
use url::Url;

use crate::domain::AppError;
use crate::ports::SourceTree;

/// Source tree checkout backed by libgit2.
#[derive(Debug, Clone, Default)]
pub struct GitSourceTree;

impl GitSourceTree {
    pub fn new() -> Self {
        Self
    }

    fn clone_fresh(&self, repository: &Url, branch: Option<&str>, dest: &Path) -> Result<(), AppError> {
        info!(%repository, dest = %dest.display(), "cloning source tree");
        let mut builder = RepoBuilder::new();
        if let Some(branch) = branch {
            builder.branch(branch);
        }
        builder.clone(repository.as_str(), dest).map_err(|e| AppError::GitError {
            command: format!("git2::RepoBuilder::clone {}", repository),
            details: e.to_string(),
        })?;
        Ok(())
    }

    fn fast_forward(&self, repo: &Repository, branch: Option<&str>) -> Result<(), AppError> {
        let head = repo.head().map_err(|e| AppError::GitError {
            command: "git2::Repository::head".to_string(),
            details: e.to_string(),
        })?;
        let branch = match branch {
            Some(branch) => branch.to_string(),
            None => head.shorthand().unwrap_or("main").to_string(),
        };

        let mut remote = repo.find_remote("origin").map_err(|e| AppError::GitError {
            command: "git2::Repository::find_remote(origin)".to_string(),
            details: e.to_string(),
        })?;
        remote.fetch(&[branch.as_str()], None, None).map_err(|e| AppError::GitError {
            command: format!("git2::Remote::fetch {}", branch),
            details: e.to_string(),
        })?;

        let fetched = repo
            .find_reference("FETCH_HEAD")
            .and_then(|r| r.peel_to_commit())
            .map_err(|e| AppError::GitError {
                command: "git2::Repository::find_reference(FETCH_HEAD)".to_string(),
                details: e.to_string(),
            })?;

        let refname = format!("refs/heads/{}", branch);
        repo.reference(&refname, fetched.id(), true, "mtdeploy: fast-forward").map_err(|e| {
            AppError::GitError {
                command: "git2::Repository::reference".to_string(),
                details: e.to_string(),
            }
        })?;
        repo.set_head(&refname).map_err(|e| AppError::GitError {
            command: "git2::Repository::set_head".to_string(),
            details: e.to_string(),
        })?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        repo.checkout_head(Some(&mut checkout)).map_err(|e| AppError::GitError {
            command: "git2::Repository::checkout_head".to_string(),
            details: e.to_string(),
        })?;
        Ok(())
    }
}

impl SourceTree for GitSourceTree {
    fn sync(&self, repository: &Url, branch: Option<&str>, dest: &Path) -> Result<(), AppError> {
        match Repository::open(dest) {
            Ok(repo) => {
                info!(dest = %dest.display(), "updating source tree");
                self.fast_forward(&repo, branch)
            }
            Err(_) if dest.exists() && dest.read_dir()?.next().is_some() => {
                Err(AppError::GitError {
                    command: format!("git2::Repository::open {}", dest.display()),
                    details: "destination exists and is not a git repository".to_string(),
                })
            }
            Err(_) => self.clone_fresh(repository, branch, dest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) {
        let root = repo.workdir().unwrap().to_path_buf();
        fs::write(root.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test User", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents).unwrap();
    }

    fn upstream() -> (TempDir, Repository, Url) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "Dockerfile", "FROM scratch\n", "initial");
        let url = Url::from_directory_path(dir.path()).unwrap();
        (dir, repo, url)
    }

    #[test]
    fn clones_into_missing_directory() {
        let (_up, _repo, url) = upstream();
        let target = TempDir::new().unwrap();
        let dest = target.path().join("src");

        GitSourceTree::new().sync(&url, None, &dest).unwrap();
        assert!(dest.join("Dockerfile").is_file());
    }

    #[test]
    fn existing_clone_is_fast_forwarded() {
        let (_up, repo, url) = upstream();
        let target = TempDir::new().unwrap();
        let dest = target.path().join("src");
        let tree = GitSourceTree::new();
        tree.sync(&url, None, &dest).unwrap();

        commit_file(&repo, "Cargo.toml", "[package]\n", "second");
        tree.sync(&url, None, &dest).unwrap();
        assert!(dest.join("Cargo.toml").is_file());
    }

    #[test]
    fn refuses_non_repository_destination() {
        let (_up, _repo, url) = upstream();
        let target = TempDir::new().unwrap();
        fs::write(target.path().join("notes.txt"), "mine").unwrap();

        let err = GitSourceTree::new().sync(&url, None, target.path()).unwrap_err();
        assert!(matches!(err, AppError::GitError { .. }));
    }
}
