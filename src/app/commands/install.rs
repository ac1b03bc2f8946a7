//! First installation, or a redirect to update when one already exists.

use std::path::Path;

use tracing::{info, warn};

use crate::app::AppContext;
use chrono::Utc;

use crate::app::commands::{
    DeploymentReport, commit, deploy, ensure_unchanged, existing_secret, inspect, links_for,
    record_proxy_host, update,
};
use crate::domain::parameters::FALLBACK_LISTEN_PORT;
use crate::domain::synthesis::{STATIC_USER, panel_seed};
use crate::domain::{AdminCredentials, AppError, InstallState, Parameters, Port, synthesize};

/// How many alternative ports the operator is asked for before giving up.
const PORT_PROMPT_ATTEMPTS: usize = 3;

#[derive(Debug)]
pub enum InstallOutcome {
    Installed(DeploymentReport),
    /// An installation already existed and was updated in place.
    Updated(DeploymentReport),
    /// The operator declined the redirect to update.
    Cancelled,
}

pub fn execute(ctx: &AppContext, params: &Parameters, force: bool) -> Result<InstallOutcome, AppError> {
    let dir = params.directory.as_path();
    let state = inspect(ctx, dir);

    match state {
        InstallState::ValidProxyOnly | InstallState::ValidProxyPanel => {
            let question = format!(
                "An installation already exists in {}. Update it instead?",
                dir.display()
            );
            if ctx.prompter().is_interactive() && !ctx.prompter().confirm(&question, true)? {
                return Ok(InstallOutcome::Cancelled);
            }
            info!("existing installation found, running update");
            return update::execute(ctx, dir).map(InstallOutcome::Updated);
        }
        InstallState::Foreign if !force => {
            return Err(AppError::ForeignDirectory(dir.to_path_buf()));
        }
        InstallState::Foreign => warn!(dir = %dir.display(), "taking over foreign directory"),
        InstallState::Absent => {}
    }

    ctx.deployer().preflight()?;
    let mut params = params.clone();
    let mut notices = Vec::new();
    if let Some(port) = resolve_listen_port(ctx, params.listen_port)? {
        notices.push(format!(
            "Port {} is in use; listening on {} instead.",
            params.listen_port, port
        ));
        params.listen_port = port;
    }
    if params.panel_enabled && !ctx.ports().is_free(params.panel_port) {
        return Err(AppError::PortConflict(params.panel_port.get()));
    }

    let templates = ctx.resolve_templates()?;
    let secret = match existing_secret(ctx, dir)? {
        Some(secret) => secret,
        None => ctx.secrets().fresh(),
    };
    let mut artifacts = synthesize(&templates, &params, &secret, None)?;
    record_proxy_host(ctx, &mut artifacts);
    if params.panel_enabled {
        let users = [(STATIC_USER.to_string(), secret.expose().to_string())];
        artifacts.panel_seed = Some(panel_seed(&users, &Utc::now().to_rfc3339())?);
    }

    ctx.store().ensure_dir(dir)?;
    let _lock = ctx.store().lock(dir)?;
    ensure_unchanged(ctx, dir, state, "install")?;

    let commit = commit(ctx, dir, &artifacts)?;

    let (admin, generated_admin) = match (&params.panel_admin, params.panel_enabled) {
        (_, false) => (None, None),
        (Some(admin), true) => (Some(admin.clone()), None),
        (None, true) => {
            let admin = AdminCredentials::generate();
            (Some(admin.clone()), Some(admin))
        }
    };
    let deploy = deploy(ctx, dir, &artifacts.env, admin.as_ref())?;
    info!(dir = %dir.display(), mode = params.mode().as_str(), "install finished");

    Ok(InstallOutcome::Installed(DeploymentReport {
        directory: dir.to_path_buf(),
        mode: params.mode(),
        commit,
        deploy,
        links: links_for(ctx, dir, &secret, &artifacts.env),
        generated_admin,
        notices,
    }))
}

/// `Some(port)` when the requested listen port is taken and another one was
/// chosen; `None` when the requested one is free.
fn resolve_listen_port(ctx: &AppContext, requested: Port) -> Result<Option<Port>, AppError> {
    if ctx.ports().is_free(requested) {
        return Ok(None);
    }
    warn!(port = requested.get(), "listen port is in use");

    let prompter = ctx.prompter();
    if prompter.is_interactive() {
        for _ in 0..PORT_PROMPT_ATTEMPTS {
            let answer = prompter.input(
                &format!("Port {} is in use. Port to listen on", requested),
                &FALLBACK_LISTEN_PORT.to_string(),
            )?;
            match answer.parse::<Port>() {
                Ok(port) if ctx.ports().is_free(port) => return Ok(Some(port)),
                Ok(port) => warn!(port = port.get(), "port is in use"),
                Err(e) => warn!(error = %e, "invalid port"),
            }
        }
        return Err(AppError::PortConflict(requested.get()));
    }

    let fallback = Port::new(FALLBACK_LISTEN_PORT.into())?;
    if fallback != requested && ctx.ports().is_free(fallback) {
        return Ok(Some(fallback));
    }
    Err(AppError::PortConflict(requested.get()))
}
