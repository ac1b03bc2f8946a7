//! Upgrade a proxy-only installation to proxy + admin panel.

use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::app::AppContext;
use crate::app::commands::{
    DeploymentReport, commit, deploy, ensure_unchanged, inspect, links_for, load_env,
    params_from_record, record_proxy_host, require_secret,
};
use crate::domain::layout::PROXY_CONFIG_FILE;
use crate::domain::synthesis::{panel_seed, patch_tls_domain, static_users};
use crate::domain::{AdminCredentials, AppError, InstallMode, InstallState, Port, synthesize};

#[derive(Debug, Clone, Default)]
pub struct AddPanelOptions {
    pub panel_port: Option<Port>,
    pub panel_image: Option<String>,
    pub admin: Option<AdminCredentials>,
}

pub fn execute(
    ctx: &AppContext,
    dir: &Path,
    options: AddPanelOptions,
) -> Result<DeploymentReport, AppError> {
    let state = inspect(ctx, dir);
    match state {
        InstallState::ValidProxyOnly => {}
        InstallState::ValidProxyPanel => return Err(AppError::AlreadyPanel(dir.to_path_buf())),
        InstallState::Absent => return Err(AppError::NotInstalled(dir.to_path_buf())),
        InstallState::Foreign => return Err(AppError::ForeignDirectory(dir.to_path_buf())),
    }
    ctx.deployer().preflight()?;
    let templates = ctx.resolve_templates()?;
    let _lock = ctx.store().lock(dir)?;
    ensure_unchanged(ctx, dir, state, "add-panel")?;

    let env = load_env(ctx, dir)?;
    let secret = require_secret(ctx, dir)?;
    let existing = ctx.store().read(dir, PROXY_CONFIG_FILE)?.ok_or_else(|| {
        AppError::config_error(format!("{} not found in {}", PROXY_CONFIG_FILE, dir.display()))
    })?;

    let mut params = params_from_record(dir, &env);
    params.panel_enabled = true;
    if let Some(port) = options.panel_port {
        params.panel_port = port;
    }
    if let Some(image) = options.panel_image {
        params.images.panel = image;
    }
    if !ctx.ports().is_free(params.panel_port) {
        return Err(AppError::PortConflict(params.panel_port.get()));
    }

    let mut artifacts = synthesize(&templates, &params, &secret, Some(&env))?;
    record_proxy_host(ctx, &mut artifacts);
    // The panel starts from the config the proxy is running with today.
    artifacts.force_panel_config(patch_tls_domain(&existing, &params.masquerade_domain)?);
    let users = static_users(&existing)?;
    if !users.is_empty() {
        artifacts.panel_seed = Some(panel_seed(&users, &Utc::now().to_rfc3339())?);
    }
    artifacts.obsolete.push(PROXY_CONFIG_FILE);
    let commit = commit(ctx, dir, &artifacts)?;

    let (admin, generated_admin) = match options.admin {
        Some(admin) => (admin, None),
        None => {
            let admin = AdminCredentials::generate();
            (admin.clone(), Some(admin))
        }
    };
    let deploy = deploy(ctx, dir, &artifacts.env, Some(&admin))?;
    info!(dir = %dir.display(), users = users.len(), "panel added");

    Ok(DeploymentReport {
        directory: dir.to_path_buf(),
        mode: InstallMode::ProxyPanel,
        commit,
        deploy,
        links: links_for(ctx, dir, &secret, &artifacts.env),
        generated_admin,
        notices: Vec::new(),
    })
}
