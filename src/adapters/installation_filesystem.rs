//! Filesystem-backed installation directory: detection, staged commits and
//! the advisory lock.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::layout::{self, COMPOSE_FILE, ENV_FILE, PANEL_SERVICE, STAGING_PREFIX};
use crate::domain::{AppError, ArtifactFile, DirectorySnapshot, EnvRecord, WritePolicy};
use crate::ports::{CommitReport, InstallationStore, LockGuard};

#[derive(Debug, Clone, Default)]
pub struct FilesystemInstallationStore;

impl FilesystemInstallationStore {
    pub fn new() -> Self {
        Self
    }
}

impl InstallationStore for FilesystemInstallationStore {
    fn snapshot(&self, dir: &Path) -> DirectorySnapshot {
        let mut snapshot = DirectorySnapshot::default();
        if !dir.exists() {
            return snapshot;
        }
        snapshot.exists = true;

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "directory not readable");
                snapshot.unreadable = true;
                return snapshot;
            }
        };
        for entry in entries {
            match entry {
                Ok(entry) => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if !layout::is_transient(&name) {
                        snapshot.entries.push(name);
                    }
                }
                Err(_) => snapshot.unreadable = true,
            }
        }
        snapshot.entries.sort();

        snapshot.has_proxy_config = layout::proxy_config(dir).is_file();
        snapshot.has_compose = layout::compose(dir).is_file();
        if snapshot.has_compose {
            match read_optional(&layout::compose(dir)) {
                Ok(Some(content)) => match declares_service(&content, PANEL_SERVICE) {
                    Some(declared) => snapshot.compose_declares_panel = declared,
                    None => snapshot.unreadable = true,
                },
                _ => snapshot.unreadable = true,
            }
        }

        if let Ok(Some(content)) = read_optional(&layout::env_file(dir)) {
            snapshot.recorded_mode = EnvRecord::peek_mode(&content);
        }

        snapshot
    }

    fn read(&self, dir: &Path, relative: &str) -> Result<Option<String>, AppError> {
        read_optional(&dir.join(relative)).map_err(AppError::from)
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), AppError> {
        fs::create_dir_all(dir)?;
        Ok(())
    }

    fn lock(&self, dir: &Path) -> Result<LockGuard, AppError> {
        InstallLock::acquire(dir).map(LockGuard::new)
    }

    fn commit(
        &self,
        dir: &Path,
        files: &[ArtifactFile],
        obsolete: &[&str],
    ) -> Result<CommitReport, AppError> {
        fs::create_dir_all(dir)?;
        let staging = tempfile::Builder::new().prefix(STAGING_PREFIX).tempdir_in(dir)?;
        let mut report = CommitReport::default();

        let mut staged: Vec<(PathBuf, PathBuf, &str)> = Vec::new();
        for (index, file) in files.iter().enumerate() {
            let target = dir.join(file.path);
            if file.policy == WritePolicy::CreateOnly && target.exists() {
                report.kept.push(file.path.to_string());
                continue;
            }
            let staged_path = staging.path().join(format!("{:02}", index));
            write_synced(&staged_path, &file.content, file.private)?;
            staged.push((staged_path, target, file.path));
        }

        for (staged_path, target, relative) in staged {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(&staged_path, &target)?;
            debug!(file = relative, "committed");
            report.written.push(relative.to_string());
        }

        for relative in obsolete {
            let path = dir.join(relative);
            if path.is_file() {
                fs::remove_file(&path)?;
                report.removed.push(relative.to_string());
            }
        }

        sync_dir(dir);
        staging.close()?;
        Ok(report)
    }

    fn remove_all(&self, dir: &Path) -> Result<(), AppError> {
        match fs::remove_dir_all(dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// `Some(true)` when the compose document lists `service`, `None` when it
/// does not parse.
fn declares_service(compose: &str, service: &str) -> Option<bool> {
    let document: serde_yaml::Value = serde_yaml::from_str(compose).ok()?;
    Some(document.get("services").and_then(|services| services.get(service)).is_some())
}

fn write_synced(path: &Path, content: &str, private: bool) -> io::Result<()> {
    let mut file = File::create(path)?;
    set_private(&file, private)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}

#[cfg(unix)]
fn set_private(file: &File, private: bool) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = if private { 0o600 } else { 0o644 };
    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_private(_file: &File, _private: bool) -> io::Result<()> {
    Ok(())
}

fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}

/// `create_new` lock file holding the owner PID.
#[derive(Debug)]
pub struct InstallLock {
    path: PathBuf,
}

impl InstallLock {
    pub fn acquire(dir: &Path) -> Result<Self, AppError> {
        let path = layout::lock(dir);
        for _ in 0..2 {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    writeln!(file, "{}", std::process::id())?;
                    file.sync_all()?;
                    debug!(path = %path.display(), "lock acquired");
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    let holder = fs::read_to_string(&path).unwrap_or_default().trim().to_string();
                    if !is_stale(&holder) {
                        return Err(AppError::Locked { pid: holder, path });
                    }
                    warn!(pid = %holder, "taking over stale installation lock");
                    if !take_over(&path, &holder)? {
                        let current = fs::read_to_string(&path).unwrap_or_default().trim().to_string();
                        return Err(AppError::Locked { pid: current, path });
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
        let holder = fs::read_to_string(&path).unwrap_or_default().trim().to_string();
        Err(AppError::Locked { pid: holder, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Move a stale lock aside and drop it, but only if it still holds
/// `observed`. A lock another process created in the meantime is put back and
/// `false` is returned.
fn take_over(path: &Path, observed: &str) -> io::Result<bool> {
    let Some(dir) = path.parent() else {
        return Ok(false);
    };
    let aside = dir.join(format!("{}{}-stale-lock", STAGING_PREFIX, std::process::id()));
    match fs::rename(path, &aside) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e),
    }
    let moved = fs::read_to_string(&aside).unwrap_or_default();
    if moved.trim() == observed {
        fs::remove_file(&aside)?;
        return Ok(true);
    }
    // Fails when yet another run already holds a fresh lock; theirs wins.
    let _ = fs::hard_link(&aside, path);
    fs::remove_file(&aside)?;
    Ok(false)
}

fn is_stale(holder: &str) -> bool {
    let Ok(pid) = holder.parse::<u32>() else {
        return true;
    };
    if pid == std::process::id() {
        return false;
    }
    !process_alive(pid)
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> bool {
    true
}
