//! Tool configuration loading: optional TOML file, then `MTDEPLOY_*` overrides.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::domain::{AppError, ToolConfig};

pub const ENV_CONFIG: &str = "MTDEPLOY_CONFIG";
pub const ENV_TEMPLATES_DIR: &str = "MTDEPLOY_TEMPLATES_DIR";
pub const ENV_TEMPLATE_BASE_URL: &str = "MTDEPLOY_TEMPLATE_BASE_URL";
pub const ENV_TEMPLATE_CACHE: &str = "MTDEPLOY_TEMPLATE_CACHE";
pub const ENV_DOCKER: &str = "MTDEPLOY_DOCKER";
pub const ENV_IPV4_ENDPOINTS: &str = "MTDEPLOY_IPV4_ENDPOINTS";
pub const ENV_IPV6_ENDPOINTS: &str = "MTDEPLOY_IPV6_ENDPOINTS";

/// Load from the process environment.
pub fn load_tool_config() -> Result<ToolConfig, AppError> {
    load_with(|key| std::env::var(key).ok())
}

/// Load using `lookup` for every environment variable.
pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<ToolConfig, AppError> {
    let mut config = match lookup(ENV_CONFIG).filter(|v| !v.trim().is_empty()) {
        Some(path) => read_file(Path::new(path.trim()))?,
        None => ToolConfig::default(),
    };

    if let Some(dir) = non_empty(lookup(ENV_TEMPLATES_DIR)) {
        config.templates.local_dir = Some(PathBuf::from(dir));
    }
    if let Some(raw) = non_empty(lookup(ENV_TEMPLATE_BASE_URL)) {
        config.templates.base_url = parse_url(ENV_TEMPLATE_BASE_URL, &raw)?;
    }
    if let Some(cache) = non_empty(lookup(ENV_TEMPLATE_CACHE)) {
        config.templates.cache = Some(cache);
    }
    if let Some(docker) = non_empty(lookup(ENV_DOCKER)) {
        config.runtime.docker = docker;
    }
    if let Some(raw) = non_empty(lookup(ENV_IPV4_ENDPOINTS)) {
        config.discovery.ipv4_endpoints = parse_url_list(ENV_IPV4_ENDPOINTS, &raw)?;
    }
    if let Some(raw) = non_empty(lookup(ENV_IPV6_ENDPOINTS)) {
        config.discovery.ipv6_endpoints = parse_url_list(ENV_IPV6_ENDPOINTS, &raw)?;
    }

    config.validate()?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<ToolConfig, AppError> {
    debug!(path = %path.display(), "loading tool configuration");
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::config_error(format!("Cannot read {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| AppError::config_error(format!("Invalid {}: {}", path.display(), e)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_url(key: &str, raw: &str) -> Result<Url, AppError> {
    Url::parse(raw).map_err(|e| AppError::config_error(format!("{} '{}': {}", key, raw, e)))
}

fn parse_url_list(key: &str, raw: &str) -> Result<Vec<Url>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse_url(key, item))
        .collect()
}
