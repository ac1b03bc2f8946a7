//! Drives the container runtime: images, start, readiness, panel setup.

use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::layout::{BUILD_ROOT_MARKERS, PANEL_SERVICE, SOURCE_DIR, TELEMT_SERVICE};
use crate::domain::{AdminCredentials, AppError, EnvRecord, ImageSource, ToolConfig};
use crate::ports::{ContainerRuntime, ReadinessProbe, SourceTree};

/// Admin and user maintenance run inside the panel container. Payloads go
/// over stdin.
const PANEL_TOOL: &str = include_str!("panel_tool.py");

/// Panel readiness after start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Proxy-only topology; nothing to wait for.
    NotApplicable,
    Ready,
    /// Gave up waiting. A warning, never a failure.
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub readiness: Readiness,
    /// Username of an admin created or reset during this deploy.
    pub admin_created: Option<String>,
    /// Number of pending users handed to the panel, when the import ran.
    pub users_imported: Option<usize>,
    pub warnings: Vec<String>,
}

pub struct Deployer<'a> {
    runtime: &'a dyn ContainerRuntime,
    readiness: &'a dyn ReadinessProbe,
    sources: &'a dyn SourceTree,
    config: &'a ToolConfig,
    working_dir: &'a Path,
}

impl<'a> Deployer<'a> {
    pub fn new(
        runtime: &'a dyn ContainerRuntime,
        readiness: &'a dyn ReadinessProbe,
        sources: &'a dyn SourceTree,
        config: &'a ToolConfig,
        working_dir: &'a Path,
    ) -> Self {
        Self { runtime, readiness, sources, config, working_dir }
    }

    pub fn preflight(&self) -> Result<(), AppError> {
        self.runtime.preflight()
    }

    /// Bring the committed topology up. In panel mode `pending_users` are
    /// imported into the panel and `admin` is upserted once it is ready.
    pub fn apply(
        &self,
        dir: &Path,
        env: &EnvRecord,
        admin: Option<&AdminCredentials>,
        pending_users: &[(String, String)],
    ) -> Result<DeployOutcome, AppError> {
        match env.image_source {
            ImageSource::Prebuilt => {
                self.runtime.compose(dir, &["pull"])?;
            }
            ImageSource::Build => {
                self.prepare_source_tree(dir)?;
                self.runtime.compose(dir, &["build"])?;
            }
        }
        self.runtime.compose(dir, &["up", "-d", "--remove-orphans"])?;

        let mut outcome = DeployOutcome {
            readiness: Readiness::NotApplicable,
            admin_created: None,
            users_imported: None,
            warnings: Vec::new(),
        };

        if let Some(panel) = &env.panel {
            outcome.readiness = self.wait_ready(panel.panel_port);
            match (outcome.readiness, admin) {
                (Readiness::Ready, admin) => {
                    if !pending_users.is_empty() {
                        self.import_users(dir, pending_users)?;
                        outcome.users_imported = Some(pending_users.len());
                    }
                    if let Some(credentials) = admin {
                        self.upsert_admin(dir, credentials)?;
                        outcome.admin_created = Some(credentials.username.clone());
                    }
                }
                (Readiness::TimedOut, admin) => {
                    outcome.warnings.push(format!(
                        "Panel did not report healthy on port {}. Check 'docker compose logs {}' in {}.",
                        panel.panel_port,
                        PANEL_SERVICE,
                        dir.display()
                    ));
                    if admin.is_some() {
                        outcome.warnings.push(
                            "The panel admin was not created; run 'mtdeploy reset-password' once the panel is up."
                                .to_string(),
                        );
                    }
                    if !pending_users.is_empty() {
                        outcome.warnings.push(
                            "Existing proxy users were not imported into the panel yet; run 'mtdeploy update' once the panel is up."
                                .to_string(),
                        );
                    }
                }
                (Readiness::NotApplicable, _) => {}
            }
        }
        Ok(outcome)
    }

    /// Restart running services in place.
    pub fn restart(&self, dir: &Path, services: &[&str]) -> Result<(), AppError> {
        let mut args = vec!["restart"];
        args.extend_from_slice(services);
        self.runtime.compose(dir, &args)?;
        Ok(())
    }

    /// Recreate services so changed environment values take effect.
    pub fn recreate(&self, dir: &Path, services: &[&str]) -> Result<(), AppError> {
        let mut args = vec!["up", "-d", "--force-recreate", "--no-deps"];
        args.extend_from_slice(services);
        self.runtime.compose(dir, &args)?;
        Ok(())
    }

    pub fn down(&self, dir: &Path, remove_volumes: bool) -> Result<(), AppError> {
        let mut args = vec!["down", "--remove-orphans"];
        if remove_volumes {
            args.push("-v");
        }
        self.runtime.compose(dir, &args)?;
        Ok(())
    }

    /// Create the panel administrator, or reset its password when it
    /// already exists.
    pub fn upsert_admin(&self, dir: &Path, credentials: &AdminCredentials) -> Result<(), AppError> {
        info!(username = %credentials.username, "upserting panel admin");
        let payload = serde_json::json!({
            "username": credentials.username,
            "password": credentials.password,
        });
        self.panel_tool(dir, "upsert-admin", &payload)?;
        Ok(())
    }

    /// Hand proxy users to the panel, which then owns the shared config.
    /// Users the panel already knows are left alone.
    pub fn import_users(&self, dir: &Path, users: &[(String, String)]) -> Result<(), AppError> {
        info!(users = users.len(), "importing users into the panel");
        let entries: Vec<serde_json::Value> = users
            .iter()
            .map(|(username, secret)| serde_json::json!({ "username": username, "secret": secret }))
            .collect();
        self.panel_tool(dir, "import-users", &serde_json::json!({ "users": entries }))?;
        // telemt reads its users at start.
        self.restart(dir, &[TELEMT_SERVICE])
    }

    fn panel_tool(
        &self,
        dir: &Path,
        action: &str,
        payload: &serde_json::Value,
    ) -> Result<String, AppError> {
        self.runtime.compose_with_input(
            dir,
            &["exec", "-T", PANEL_SERVICE, "python", "-c", PANEL_TOOL, action],
            &payload.to_string(),
        )
    }

    pub fn wait_ready(&self, port: crate::domain::Port) -> Readiness {
        let interval = Duration::from_secs(self.config.readiness.interval_secs);
        for attempt in 1..=self.config.readiness.retries {
            if self.readiness.is_ready(port) {
                info!(attempt, "panel is ready");
                return Readiness::Ready;
            }
            if attempt < self.config.readiness.retries {
                thread::sleep(interval);
            }
        }
        warn!(port = port.get(), "panel readiness timed out");
        Readiness::TimedOut
    }

    /// Make `<dir>/src` a usable build root: the working directory when it
    /// already is one, otherwise a clone of the source repository.
    fn prepare_source_tree(&self, dir: &Path) -> Result<(), AppError> {
        let dest = dir.join(SOURCE_DIR);
        if is_build_root(self.working_dir) && !dest.exists() && self.working_dir != dir {
            if link_source(self.working_dir, &dest).is_ok() {
                info!(source = %self.working_dir.display(), "using working directory as build root");
                return Ok(());
            }
        }
        if is_build_root(&dest) && !dest.join(".git").exists() {
            return Ok(());
        }
        self.sources.sync(
            &self.config.runtime.source_repository,
            self.config.runtime.source_branch.as_deref(),
            &dest,
        )
    }
}

pub fn is_build_root(dir: &Path) -> bool {
    BUILD_ROOT_MARKERS.iter().all(|marker| dir.join(marker).is_file())
}

#[cfg(unix)]
fn link_source(source: &Path, dest: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, dest)
}

#[cfg(not(unix))]
fn link_source(_source: &Path, _dest: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(std::io::ErrorKind::Unsupported, "symlinks unsupported"))
}
