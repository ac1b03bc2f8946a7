//! Refresh a valid installation from its own persisted parameters.

use std::path::Path;

use tracing::info;

use crate::app::AppContext;
use crate::app::commands::{
    DeploymentReport, commit, deploy, ensure_unchanged, existing_secret, inspect, links_for,
    load_env, params_from_record, record_proxy_host, require_valid,
};
use crate::domain::{AppError, synthesize};

pub fn execute(ctx: &AppContext, dir: &Path) -> Result<DeploymentReport, AppError> {
    let state = inspect(ctx, dir);
    let mode = require_valid(state, dir)?;
    ctx.deployer().preflight()?;
    let templates = ctx.resolve_templates()?;
    let _lock = ctx.store().lock(dir)?;
    ensure_unchanged(ctx, dir, state, "update")?;

    let env = load_env(ctx, dir)?;
    if env.mode != mode {
        return Err(AppError::MalformedEnvFile(format!(
            "recorded mode '{}' does not match the {} installation",
            env.mode.as_str(),
            state
        )));
    }
    let params = params_from_record(dir, &env);

    let secret = match existing_secret(ctx, dir)? {
        Some(secret) => secret,
        None => ctx.secrets().fresh(),
    };

    let mut artifacts = synthesize(&templates, &params, &secret, Some(&env))?;
    record_proxy_host(ctx, &mut artifacts);
    let commit = commit(ctx, dir, &artifacts)?;

    let deploy = deploy(ctx, dir, &artifacts.env, None)?;
    info!(dir = %dir.display(), mode = mode.as_str(), "update finished");

    Ok(DeploymentReport {
        directory: dir.to_path_buf(),
        mode,
        commit,
        deploy,
        links: links_for(ctx, dir, &secret, &artifacts.env),
        generated_admin: None,
        notices: Vec::new(),
    })
}
