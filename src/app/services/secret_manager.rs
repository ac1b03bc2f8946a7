//! Lifecycle of the one persistent proxy secret.

use std::path::Path;

use tracing::{info, warn};

use crate::domain::layout::SECRET_FILE;
use crate::domain::{AppError, Secret};
use crate::ports::InstallationStore;

pub struct SecretManager<'a> {
    store: &'a dyn InstallationStore,
}

impl<'a> SecretManager<'a> {
    pub fn new(store: &'a dyn InstallationStore) -> Self {
        Self { store }
    }

    /// Read-only peek. Unparseable content counts as absent.
    pub fn read(&self, dir: &Path) -> Result<Option<Secret>, AppError> {
        let Some(content) = self.store.read(dir, SECRET_FILE)? else {
            return Ok(None);
        };
        let secret = Secret::parse(&content);
        if secret.is_none() {
            warn!(path = %dir.join(SECRET_FILE).display(), "secret file is not 32 hex characters");
        }
        Ok(secret)
    }

    /// A new secret. It is not written here: the commit that carries the
    /// config using it persists both together.
    pub fn fresh(&self) -> Secret {
        info!("generating proxy secret");
        Secret::generate()
    }
}
