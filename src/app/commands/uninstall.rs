use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::app::AppContext;
use crate::app::commands::inspect;
use crate::domain::layout::COMPOSE_FILE;
use crate::domain::{AppError, InstallState};

#[derive(Debug, Clone, Copy, Default)]
pub struct UninstallOptions {
    /// Skip the confirmation prompt.
    pub yes: bool,
    /// Remove a directory that does not look like an installation.
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    Removed { directory: PathBuf, stopped: bool },
    Cancelled,
}

pub fn execute(
    ctx: &AppContext,
    dir: &Path,
    options: UninstallOptions,
) -> Result<UninstallOutcome, AppError> {
    match inspect(ctx, dir) {
        InstallState::Absent => return Err(AppError::NotInstalled(dir.to_path_buf())),
        InstallState::Foreign if !options.force => {
            return Err(AppError::ForeignDirectory(dir.to_path_buf()));
        }
        _ => {}
    }

    if !options.yes {
        let question = format!(
            "Stop all containers and delete {} including volumes?",
            dir.display()
        );
        if !ctx.prompter().confirm(&question, false)? {
            return Ok(UninstallOutcome::Cancelled);
        }
    }

    let lock = ctx.store().lock(dir)?;
    let stopped = dir.join(COMPOSE_FILE).is_file();
    if stopped {
        ctx.deployer().preflight()?;
        ctx.deployer().down(dir, true)?;
    } else {
        warn!(dir = %dir.display(), "no compose file, skipping container teardown");
    }
    // The lock file lives inside the directory being removed.
    drop(lock);
    ctx.store().remove_all(dir)?;
    info!(dir = %dir.display(), "installation removed");

    Ok(UninstallOutcome::Removed { directory: dir.to_path_buf(), stopped })
}
