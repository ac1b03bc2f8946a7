use crate::domain::AppError;

/// Port for retrieving a single template from the remote source.
pub trait TemplateFetcher {
    /// Fetch `name`. Network errors, non-2xx statuses and empty bodies are
    /// all `TemplateFetchFailed`.
    fn fetch(&self, name: &str) -> Result<String, AppError>;
}
