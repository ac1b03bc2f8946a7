use std::path::Path;

use crate::domain::{AppError, ArtifactFile, DirectorySnapshot};

/// Held for the whole of a mutating operation; released on drop.
pub struct LockGuard {
    _inner: Box<dyn std::any::Any>,
}

impl LockGuard {
    pub fn new<T: 'static>(inner: T) -> Self {
        Self { _inner: Box::new(inner) }
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LockGuard")
    }
}

/// What a commit did on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub written: Vec<String>,
    /// Create-only files left alone because they already existed.
    pub kept: Vec<String>,
    pub removed: Vec<String>,
}

/// Port for everything that touches an installation directory.
pub trait InstallationStore {
    /// Observe the directory for classification. Never fails.
    fn snapshot(&self, dir: &Path) -> DirectorySnapshot;

    /// Read a file relative to `dir`; `None` when it does not exist.
    fn read(&self, dir: &Path, relative: &str) -> Result<Option<String>, AppError>;

    /// Create the directory (and parents) if missing.
    fn ensure_dir(&self, dir: &Path) -> Result<(), AppError>;

    /// Take the advisory installation lock.
    fn lock(&self, dir: &Path) -> Result<LockGuard, AppError>;

    /// Stage every file, then move them into place in the given order and
    /// delete `obsolete`. A failure before the first rename leaves `dir` as it was.
    fn commit(
        &self,
        dir: &Path,
        files: &[ArtifactFile],
        obsolete: &[&str],
    ) -> Result<CommitReport, AppError>;

    /// Remove the installation directory and everything in it.
    fn remove_all(&self, dir: &Path) -> Result<(), AppError>;
}
