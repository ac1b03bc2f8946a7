//! Change the masquerade domain of a running installation.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::app::AppContext;
use crate::app::commands::{
    commit, ensure_unchanged, inspect, links_for, load_env, params_from_record, require_secret,
    require_valid,
};
use crate::app::services::LinkReport;
use crate::domain::layout::{PANEL_CONFIG_FILE, PANEL_SERVICE, TELEMT_SERVICE, TRAEFIK_SERVICE};
use crate::domain::synthesis::patch_tls_domain;
use crate::domain::{AppError, InstallMode, MasqueradeDomain, synthesize};
use crate::ports::CommitReport;

#[derive(Debug)]
pub struct ReconfigureOutcome {
    pub directory: PathBuf,
    pub previous_domain: MasqueradeDomain,
    pub domain: MasqueradeDomain,
    pub commit: CommitReport,
    pub restarted: Vec<&'static str>,
    pub links: LinkReport,
}

pub fn execute(
    ctx: &AppContext,
    dir: &Path,
    domain: MasqueradeDomain,
) -> Result<ReconfigureOutcome, AppError> {
    let state = inspect(ctx, dir);
    let mode = require_valid(state, dir)?;
    ctx.deployer().preflight()?;
    let templates = ctx.resolve_templates()?;
    let _lock = ctx.store().lock(dir)?;
    ensure_unchanged(ctx, dir, state, "reconfigure")?;

    let env = load_env(ctx, dir)?;
    let previous_domain = env.tls_domain.clone();
    let secret = require_secret(ctx, dir)?;

    let mut params = params_from_record(dir, &env);
    params.masquerade_domain = domain.clone();

    let mut artifacts = synthesize(&templates, &params, &secret, Some(&env))?;
    // The secret file stays exactly as it is.
    artifacts.secret = None;
    if mode == InstallMode::ProxyPanel {
        if let Some(shared) = ctx.store().read(dir, PANEL_CONFIG_FILE)? {
            artifacts.force_panel_config(patch_tls_domain(&shared, &domain)?);
        }
    }
    let commit = commit(ctx, dir, &artifacts)?;

    let mut restarted = vec![TELEMT_SERVICE, TRAEFIK_SERVICE];
    if mode.has_panel() {
        restarted.push(PANEL_SERVICE);
    }
    ctx.deployer().recreate(dir, &restarted)?;
    info!(from = %previous_domain, to = %domain, "masquerade domain changed");

    Ok(ReconfigureOutcome {
        directory: dir.to_path_buf(),
        previous_domain,
        domain,
        commit,
        restarted,
        links: links_for(ctx, dir, &secret, &artifacts.env),
    })
}
