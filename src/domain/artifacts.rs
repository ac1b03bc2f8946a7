//! The rendered, not-yet-written configuration set of one installation.

use crate::domain::layout::{
    COMPOSE_FILE, ENV_FILE, PANEL_CONFIG_FILE, PANEL_SEED_FILE, PROXY_CONFIG_FILE,
    ROUTER_RULE_FILE, SECRET_FILE,
};
use crate::domain::{EnvRecord, Secret};

/// How an artifact treats an existing file at its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Always replace.
    Replace,
    /// Write only when nothing is there yet; the file is owned by another
    /// component afterwards.
    CreateOnly,
}

/// One file in the commit set.
#[derive(Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    /// Path relative to the installation directory.
    pub path: &'static str,
    pub content: String,
    pub policy: WritePolicy,
    /// Readable by the owner only.
    pub private: bool,
}

impl std::fmt::Debug for ArtifactFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let content: &str = if self.private { "[REDACTED]" } else { &self.content };
        f.debug_struct("ArtifactFile")
            .field("path", &self.path)
            .field("content", &content)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Everything a synthesis produced, ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationArtifacts {
    pub compose: String,
    /// Static proxy config; absent in panel mode.
    pub proxy_config: Option<String>,
    pub router_rule: String,
    pub env: EnvRecord,
    pub secret: Option<Secret>,
    /// Shared proxy config the panel takes over.
    pub panel_config: Option<ArtifactFile>,
    /// One-time user import for the panel.
    pub panel_seed: Option<String>,
    /// Stale files to delete once the new set is in place.
    pub obsolete: Vec<&'static str>,
}

impl ConfigurationArtifacts {
    /// Files in commit order. The compose descriptor is always last so a
    /// half-applied commit never references files that are not there yet.
    pub fn files(&self) -> Vec<ArtifactFile> {
        let mut files = Vec::new();
        if let Some(secret) = &self.secret {
            files.push(ArtifactFile {
                path: SECRET_FILE,
                content: format!("{}\n", secret.expose()),
                policy: WritePolicy::Replace,
                private: true,
            });
        }
        if let Some(config) = &self.proxy_config {
            files.push(ArtifactFile {
                path: PROXY_CONFIG_FILE,
                content: config.clone(),
                policy: WritePolicy::Replace,
                private: false,
            });
        }
        if let Some(panel_config) = &self.panel_config {
            files.push(panel_config.clone());
        }
        if let Some(seed) = &self.panel_seed {
            files.push(ArtifactFile {
                path: PANEL_SEED_FILE,
                content: seed.clone(),
                policy: WritePolicy::CreateOnly,
                private: true,
            });
        }
        files.push(ArtifactFile {
            path: ROUTER_RULE_FILE,
            content: self.router_rule.clone(),
            policy: WritePolicy::Replace,
            private: false,
        });
        files.push(ArtifactFile {
            path: ENV_FILE,
            content: self.env.render(),
            policy: WritePolicy::Replace,
            private: true,
        });
        files.push(ArtifactFile {
            path: COMPOSE_FILE,
            content: self.compose.clone(),
            policy: WritePolicy::Replace,
            private: false,
        });
        files
    }

    /// Replace the panel's shared config with `content` regardless of what is
    /// on disk.
    pub fn force_panel_config(&mut self, content: String) {
        self.panel_config = Some(ArtifactFile {
            path: PANEL_CONFIG_FILE,
            content,
            policy: WritePolicy::Replace,
            private: false,
        });
    }
}
