//! API Facade for the application.
//!
//! Each function builds an [`AppContext`] against the real adapters and runs
//! one lifecycle command.

use std::path::Path;

use crate::app::commands::{
    add_panel, inspect, install, link, reconfigure, reset_password, uninstall, update,
};
use crate::app::config::load_tool_config;
use crate::app::{Adapters, AppContext};

pub use crate::app::commands::DeploymentReport;
pub use crate::app::commands::add_panel::AddPanelOptions;
pub use crate::app::commands::install::InstallOutcome;
pub use crate::app::commands::reconfigure::ReconfigureOutcome;
pub use crate::app::commands::reset_password::ResetOutcome;
pub use crate::app::commands::uninstall::{UninstallOptions, UninstallOutcome};
pub use crate::app::services::{LinkReport, Readiness};
pub use crate::domain::{
    AdminCredentials, AppError, InstallState, MasqueradeDomain, Parameters, ToolConfig,
};

/// Context for the current process: tool config from the environment,
/// current directory as working directory.
pub fn create_context(interactive: bool) -> Result<AppContext, AppError> {
    let config = load_tool_config()?;
    let adapters = Adapters::production(&config, interactive)?;
    Ok(AppContext::new(config, std::env::current_dir()?, adapters))
}

/// Classify an installation directory without touching it.
pub fn detect(dir: &Path) -> Result<InstallState, AppError> {
    let ctx = create_context(false)?;
    Ok(inspect(&ctx, dir))
}

/// Install into `params.directory`, or update the installation found there.
pub fn install(
    params: &Parameters,
    force: bool,
    interactive: bool,
) -> Result<InstallOutcome, AppError> {
    let ctx = create_context(interactive)?;
    install::execute(&ctx, params, force)
}

/// Re-synthesize and redeploy from the persisted parameters.
pub fn update(dir: &Path, interactive: bool) -> Result<DeploymentReport, AppError> {
    let ctx = create_context(interactive)?;
    update::execute(&ctx, dir)
}

/// Change the masquerade domain (`config --sni`).
pub fn reconfigure(
    dir: &Path,
    domain: MasqueradeDomain,
    interactive: bool,
) -> Result<ReconfigureOutcome, AppError> {
    let ctx = create_context(interactive)?;
    reconfigure::execute(&ctx, dir, domain)
}

pub fn add_panel(
    dir: &Path,
    options: AddPanelOptions,
    interactive: bool,
) -> Result<DeploymentReport, AppError> {
    let ctx = create_context(interactive)?;
    add_panel::execute(&ctx, dir, options)
}

pub fn uninstall(
    dir: &Path,
    options: UninstallOptions,
    interactive: bool,
) -> Result<UninstallOutcome, AppError> {
    let ctx = create_context(interactive)?;
    uninstall::execute(&ctx, dir, options)
}

pub fn reset_password(
    dir: &Path,
    admin: Option<AdminCredentials>,
    interactive: bool,
) -> Result<ResetOutcome, AppError> {
    let ctx = create_context(interactive)?;
    reset_password::execute(&ctx, dir, admin)
}

/// Client links for an existing installation. Read-only.
pub fn link(dir: &Path) -> Result<LinkReport, AppError> {
    let ctx = create_context(false)?;
    link::execute(&ctx, dir)
}
