use std::path::Path;

use url::Url;

use crate::domain::AppError;

/// Port for obtaining the source tree used by build mode.
pub trait SourceTree {
    /// Clone `repository` into `dest`, or fast-forward it when `dest` is
    /// already a clone.
    fn sync(&self, repository: &Url, branch: Option<&str>, dest: &Path) -> Result<(), AppError>;
}
