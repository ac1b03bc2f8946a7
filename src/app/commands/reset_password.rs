//! Rotate the proxy secret, or reset the panel administrator.

use std::path::Path;

use tracing::info;

use crate::app::AppContext;
use crate::app::commands::{
    commit, ensure_unchanged, inspect, links_for, load_env, params_from_record, require_valid,
};
use crate::app::services::LinkReport;
use crate::domain::layout::TELEMT_SERVICE;
use crate::domain::{AdminCredentials, AppError, InstallMode, synthesize};

#[derive(Debug)]
pub enum ResetOutcome {
    /// Proxy-only: a new secret is live; old links stop working.
    SecretRotated { links: LinkReport },
    /// Panel: the administrator was created, or its password replaced.
    AdminReset { credentials: AdminCredentials, generated: bool },
}

pub fn execute(
    ctx: &AppContext,
    dir: &Path,
    admin: Option<AdminCredentials>,
) -> Result<ResetOutcome, AppError> {
    let state = inspect(ctx, dir);
    let mode = require_valid(state, dir)?;
    ctx.deployer().preflight()?;

    match mode {
        InstallMode::ProxyOnly => {
            let templates = ctx.resolve_templates()?;
            let _lock = ctx.store().lock(dir)?;
            ensure_unchanged(ctx, dir, state, "reset-password")?;
            let env = load_env(ctx, dir)?;
            let secret = ctx.secrets().fresh();
            let artifacts =
                synthesize(&templates, &params_from_record(dir, &env), &secret, Some(&env))?;
            commit(ctx, dir, &artifacts)?;
            ctx.deployer().restart(dir, &[TELEMT_SERVICE])?;
            info!("proxy secret rotated");
            Ok(ResetOutcome::SecretRotated { links: links_for(ctx, dir, &secret, &artifacts.env) })
        }
        InstallMode::ProxyPanel => {
            let _lock = ctx.store().lock(dir)?;
            ensure_unchanged(ctx, dir, state, "reset-password")?;
            let (credentials, generated) = match admin {
                Some(credentials) => (credentials, false),
                None => (AdminCredentials::generate(), true),
            };
            ctx.deployer().upsert_admin(dir, &credentials)?;
            info!(username = %credentials.username, "panel admin reset");
            Ok(ResetOutcome::AdminReset { credentials, generated })
        }
    }
}
