use std::path::Path;

use crate::domain::AppError;
use crate::domain::tool_config::CacheLocation;

/// One opened template cache directory.
pub trait TemplateCache {
    fn dir(&self) -> &Path;

    /// Cached content of `name`, only when it is still intact.
    fn load(&self, name: &str) -> Option<String>;

    fn store(&mut self, name: &str, content: &str) -> Result<(), AppError>;
}

/// Port for opening the template cache at a configured location.
pub trait TemplateCacheStore {
    fn open(
        &self,
        location: &CacheLocation,
        working_dir: &Path,
    ) -> Result<Box<dyn TemplateCache>, AppError>;
}
