//! Classification of an installation directory.

use std::fmt;

use crate::domain::InstallMode;

/// Derived state of a target directory. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// Directory missing or empty.
    Absent,
    /// Directory holds something that is not a complete installation.
    Foreign,
    ValidProxyOnly,
    ValidProxyPanel,
}

impl InstallState {
    pub fn is_valid(self) -> bool {
        matches!(self, InstallState::ValidProxyOnly | InstallState::ValidProxyPanel)
    }

    pub fn mode(self) -> Option<InstallMode> {
        match self {
            InstallState::ValidProxyOnly => Some(InstallMode::ProxyOnly),
            InstallState::ValidProxyPanel => Some(InstallMode::ProxyPanel),
            InstallState::Absent | InstallState::Foreign => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InstallState::Absent => "absent",
            InstallState::Foreign => "foreign",
            InstallState::ValidProxyOnly => "proxy-only",
            InstallState::ValidProxyPanel => "proxy+panel",
        }
    }
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a detector observed on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub exists: bool,
    /// Top-level entries, excluding lock and staging leftovers.
    pub entries: Vec<String>,
    pub has_compose: bool,
    pub has_proxy_config: bool,
    pub compose_declares_panel: bool,
    /// `MTDEPLOY_MODE` from the environment file, when readable.
    pub recorded_mode: Option<InstallMode>,
    /// Some entry could not be read; the directory is not trusted.
    pub unreadable: bool,
}

/// Classify a snapshot. Pure; the filesystem side lives in the store adapter.
pub fn classify(snapshot: &DirectorySnapshot) -> InstallState {
    if !snapshot.exists {
        return InstallState::Absent;
    }
    if snapshot.unreadable {
        return InstallState::Foreign;
    }
    if snapshot.entries.is_empty() {
        return InstallState::Absent;
    }
    if !snapshot.has_compose {
        return InstallState::Foreign;
    }

    match snapshot.recorded_mode {
        Some(InstallMode::ProxyPanel) if snapshot.compose_declares_panel => {
            InstallState::ValidProxyPanel
        }
        Some(InstallMode::ProxyPanel) => InstallState::Foreign,
        Some(InstallMode::ProxyOnly) if snapshot.has_proxy_config => InstallState::ValidProxyOnly,
        Some(InstallMode::ProxyOnly) => InstallState::Foreign,
        // Installs written before the mode was recorded.
        None if snapshot.compose_declares_panel => InstallState::ValidProxyPanel,
        None if snapshot.has_proxy_config => InstallState::ValidProxyOnly,
        None => InstallState::Foreign,
    }
}
