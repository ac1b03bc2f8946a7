//! Remote template source over HTTP(S).

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::domain::AppError;
use crate::domain::tool_config::TemplatesConfig;
use crate::ports::TemplateFetcher;

/// Fetches `<base_url>/<name>` with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpTemplateFetcher {
    base_url: Url,
    client: Client,
}

impl HttpTemplateFetcher {
    pub fn new(config: &TemplatesConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("mtdeploy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::config_error(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url: directory_url(&config.base_url), client })
    }

    fn url_for(&self, name: &str) -> Result<Url, AppError> {
        self.base_url.join(name).map_err(|e| AppError::TemplateFetchFailed {
            name: name.to_string(),
            details: format!("invalid URL: {}", e),
        })
    }
}

/// `join` replaces the last path segment unless the base ends with `/`.
fn directory_url(base: &Url) -> Url {
    let mut url = base.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl TemplateFetcher for HttpTemplateFetcher {
    fn fetch(&self, name: &str) -> Result<String, AppError> {
        let url = self.url_for(name)?;
        debug!(%url, "fetching template");

        let failed = |details: String| AppError::TemplateFetchFailed {
            name: name.to_string(),
            details,
        };

        let response = self.client.get(url).send().map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {}", status)));
        }
        let body = response.text().map_err(|e| failed(e.to_string()))?;
        if body.trim().is_empty() {
            return Err(failed("empty response body".to_string()));
        }
        Ok(body)
    }
}
