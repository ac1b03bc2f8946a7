use std::path::Path;

use crate::app::AppContext;
use crate::app::commands::{inspect, links_for, load_env, require_secret, require_valid};
use crate::app::services::LinkReport;
use crate::domain::AppError;

/// Recompute the client links. Never writes.
pub fn execute(ctx: &AppContext, dir: &Path) -> Result<LinkReport, AppError> {
    require_valid(inspect(ctx, dir), dir)?;
    let env = load_env(ctx, dir)?;
    let secret = require_secret(ctx, dir)?;
    Ok(links_for(ctx, dir, &secret, &env))
}
