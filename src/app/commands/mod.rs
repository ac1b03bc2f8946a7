//! Lifecycle operations over one installation directory.

pub mod add_panel;
pub mod install;
pub mod link;
pub mod reconfigure;
pub mod reset_password;
pub mod uninstall;
pub mod update;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::app::AppContext;
use crate::app::services::{DeployOutcome, LinkReport, discover_links};
use crate::domain::layout::{ENV_FILE, PANEL_CONFIG_FILE, PANEL_SEED_FILE, PROXY_CONFIG_FILE};
use crate::domain::synthesis::{STATIC_USER, parse_panel_seed, static_users};
use crate::domain::{
    AdminCredentials, AppError, ConfigurationArtifacts, EnvRecord, ImageRefs, InstallMode,
    InstallState, Parameters, Secret, classify,
};
use crate::ports::CommitReport;

/// What a deploying operation did.
#[derive(Debug)]
pub struct DeploymentReport {
    pub directory: PathBuf,
    pub mode: InstallMode,
    pub commit: CommitReport,
    pub deploy: DeployOutcome,
    pub links: LinkReport,
    /// Credentials generated by this run. Shown once, never stored.
    pub generated_admin: Option<AdminCredentials>,
    pub notices: Vec<String>,
}

/// Classify `dir` once for the current operation.
pub fn inspect(ctx: &AppContext, dir: &Path) -> InstallState {
    let state = classify(&ctx.store().snapshot(dir));
    info!(dir = %dir.display(), %state, "detected installation state");
    state
}

/// Re-classify under the lock; another run may have changed the directory
/// since `observed` was taken.
pub(crate) fn ensure_unchanged(
    ctx: &AppContext,
    dir: &Path,
    observed: InstallState,
    operation: &str,
) -> Result<(), AppError> {
    let current = inspect(ctx, dir);
    if current != observed {
        return Err(AppError::InvalidTransition {
            operation: operation.to_string(),
            state: current.to_string(),
        });
    }
    Ok(())
}

/// Mode of a valid installation, or the error for any other state.
pub(crate) fn require_valid(state: InstallState, dir: &Path) -> Result<InstallMode, AppError> {
    match state {
        InstallState::Absent => Err(AppError::NotInstalled(dir.to_path_buf())),
        InstallState::Foreign => Err(AppError::ForeignDirectory(dir.to_path_buf())),
        InstallState::ValidProxyOnly => Ok(InstallMode::ProxyOnly),
        InstallState::ValidProxyPanel => Ok(InstallMode::ProxyPanel),
    }
}

pub(crate) fn load_env(ctx: &AppContext, dir: &Path) -> Result<EnvRecord, AppError> {
    let content = ctx
        .store()
        .read(dir, ENV_FILE)?
        .ok_or_else(|| AppError::MalformedEnvFile(format!("{} not found in {}", ENV_FILE, dir.display())))?;
    EnvRecord::parse(&content)
}

/// Parameters reconstructed from a persisted environment record.
pub(crate) fn params_from_record(dir: &Path, env: &EnvRecord) -> Parameters {
    let mut params = Parameters::with_defaults(dir.to_path_buf(), env.tls_domain.clone());
    params.listen_port = env.listen_port;
    params.internal_port = env.internal_port;
    params.image_source = env.image_source;
    params.panel_enabled = env.mode.has_panel();
    params.images = ImageRefs { telemt: env.telemt_image.clone(), panel: env.panel_image.clone() };
    if let Some(panel) = &env.panel {
        params.panel_port = panel.panel_port;
    }
    params
}

/// The installation's secret: the secret file first, then the static user
/// in `telemt.toml`. `None` when neither holds one.
pub(crate) fn existing_secret(ctx: &AppContext, dir: &Path) -> Result<Option<Secret>, AppError> {
    if let Some(secret) = ctx.secrets().read(dir)? {
        return Ok(Some(secret));
    }
    let Some(config) = ctx.store().read(dir, PROXY_CONFIG_FILE)? else {
        return Ok(None);
    };
    let users = static_users(&config)?;
    let recovered = users
        .iter()
        .find(|(name, _)| name == STATIC_USER)
        .or_else(|| users.first())
        .map(|(_, secret)| Secret::parse(secret).unwrap_or_else(|| Secret::from_raw(secret.trim())));
    if recovered.is_some() {
        info!("recovered proxy secret from {}", PROXY_CONFIG_FILE);
    }
    Ok(recovered)
}

pub(crate) fn require_secret(ctx: &AppContext, dir: &Path) -> Result<Secret, AppError> {
    existing_secret(ctx, dir)?.ok_or_else(|| {
        AppError::config_error(format!("No proxy secret found in {}", dir.display()))
    })
}

/// Record the discovered IPv4 address for the panel's link rendering.
pub(crate) fn record_proxy_host(ctx: &AppContext, artifacts: &mut ConfigurationArtifacts) {
    if let Some(panel) = artifacts.env.panel.as_mut() {
        if panel.proxy_host.is_none() {
            panel.proxy_host = ctx.addresses().ipv4().map(|addr| addr.to_string());
        }
    }
}

pub(crate) fn commit(
    ctx: &AppContext,
    dir: &Path,
    artifacts: &ConfigurationArtifacts,
) -> Result<CommitReport, AppError> {
    let report = ctx.store().commit(dir, &artifacts.files(), &artifacts.obsolete)?;
    info!(
        written = report.written.len(),
        kept = report.kept.len(),
        removed = report.removed.len(),
        "artifacts committed"
    );
    Ok(report)
}

/// Users waiting in the panel seed for import.
pub(crate) fn pending_panel_users(
    ctx: &AppContext,
    dir: &Path,
) -> Result<Vec<(String, String)>, AppError> {
    match ctx.store().read(dir, PANEL_SEED_FILE)? {
        Some(content) => parse_panel_seed(&content),
        None => Ok(Vec::new()),
    }
}

/// Start the committed topology. The panel seed is removed once the panel
/// has taken its users.
pub(crate) fn deploy(
    ctx: &AppContext,
    dir: &Path,
    env: &EnvRecord,
    admin: Option<&AdminCredentials>,
) -> Result<DeployOutcome, AppError> {
    let pending = if env.panel.is_some() { pending_panel_users(ctx, dir)? } else { Vec::new() };
    let outcome = ctx.deployer().apply(dir, env, admin, &pending)?;
    if outcome.users_imported.is_some() {
        ctx.store().commit(dir, &[], &[PANEL_SEED_FILE])?;
        info!(users = pending.len(), "panel seed imported");
    }
    Ok(outcome)
}

/// Client links for the static user. In panel mode its secret is taken from
/// the shared config, which the panel owns and may have changed.
pub(crate) fn links_for(ctx: &AppContext, dir: &Path, secret: &Secret, env: &EnvRecord) -> LinkReport {
    let Some(panel) = &env.panel else {
        return discover_links(ctx.addresses(), secret, &env.tls_domain, env.listen_port);
    };
    match panel_user_secret(ctx, dir) {
        Some(live) => discover_links(ctx.addresses(), &live, &env.tls_domain, env.listen_port),
        None => LinkReport {
            links: Vec::new(),
            warning: Some(format!(
                "The panel has no '{}' user yet; create users in the panel (port {}) to get links.",
                STATIC_USER, panel.panel_port
            )),
        },
    }
}

fn panel_user_secret(ctx: &AppContext, dir: &Path) -> Option<Secret> {
    let config = ctx.store().read(dir, PANEL_CONFIG_FILE).ok()??;
    static_users(&config)
        .ok()?
        .into_iter()
        .find(|(name, _)| name == STATIC_USER)
        .and_then(|(_, secret)| Secret::parse(&secret))
}
