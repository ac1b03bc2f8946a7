//! Operator-supplied inputs, validated once per operation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::domain::AppError;

pub const DEFAULT_LISTEN_PORT: u16 = 443;
pub const DEFAULT_INTERNAL_PORT: u16 = 1234;
pub const DEFAULT_PANEL_PORT: u16 = 8080;
pub const FALLBACK_LISTEN_PORT: u16 = 8443;
pub const DEFAULT_DOMAIN: &str = "1c.ru";
pub const DEFAULT_TELEMT_IMAGE: &str = "ghcr.io/telemt/telemt:latest";
pub const DEFAULT_PANEL_IMAGE: &str = "ghcr.io/mtpannel/mtpannel-panel:latest";
pub const DEFAULT_ADMIN_USER: &str = "admin";
const GENERATED_PASSWORD_LEN: usize = 20;

/// A TCP port in 1-65535.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port(u16);

impl Port {
    pub fn new(value: i64) -> Result<Self, AppError> {
        if !(1..=65535).contains(&value) {
            return Err(AppError::PortOutOfRange(value));
        }
        Ok(Self(value as u16))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl FromStr for Port {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: i64 = trimmed.parse().map_err(|_| {
            AppError::config_error(format!("Port '{}' is not a number", trimmed))
        })?;
        Port::new(value)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The hostname the proxy impersonates during the TLS handshake.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MasqueradeDomain(String);

/// RFC 1035 limit for one DNS label.
const MAX_LABEL_LEN: usize = 63;

impl MasqueradeDomain {
    pub fn new(raw: &str) -> Result<Self, AppError> {
        let value = raw.trim().trim_end_matches('.').to_ascii_lowercase();
        if value.is_empty() {
            return Err(AppError::DomainEmpty);
        }
        let valid_chars =
            value.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        let valid_labels = value.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= MAX_LABEL_LEN
                && !label.starts_with('-')
                && !label.ends_with('-')
        });
        if !valid_chars || !valid_labels || value.len() > 253 {
            return Err(AppError::InvalidDomain(raw.trim().to_string()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MasqueradeDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where container images come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Build images locally from the source tree.
    Build,
    /// Pull published images.
    Prebuilt,
}

impl ImageSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSource::Build => "build",
            ImageSource::Prebuilt => "prebuilt",
        }
    }
}

impl FromStr for ImageSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "build" | "source" | "local" => Ok(ImageSource::Build),
            "prebuilt" | "image" | "pull" | "registry" => Ok(ImageSource::Prebuilt),
            other => Err(AppError::config_error(format!(
                "Invalid image source '{}': must be 'build' or 'prebuilt'",
                other
            ))),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topology of an installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    ProxyOnly,
    ProxyPanel,
}

impl InstallMode {
    pub fn from_panel_flag(panel_enabled: bool) -> Self {
        if panel_enabled { InstallMode::ProxyPanel } else { InstallMode::ProxyOnly }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstallMode::ProxyOnly => "proxy",
            InstallMode::ProxyPanel => "panel",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "proxy" => Some(InstallMode::ProxyOnly),
            "panel" => Some(InstallMode::ProxyPanel),
            _ => None,
        }
    }

    pub fn has_panel(self) -> bool {
        matches!(self, InstallMode::ProxyPanel)
    }
}

/// Prebuilt image references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRefs {
    pub telemt: String,
    pub panel: String,
}

impl Default for ImageRefs {
    fn default() -> Self {
        Self { telemt: DEFAULT_TELEMT_IMAGE.to_string(), panel: DEFAULT_PANEL_IMAGE.to_string() }
    }
}

/// First panel administrator.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    /// `admin` with a random alphanumeric password.
    pub fn generate() -> Self {
        Self::with_generated_password(DEFAULT_ADMIN_USER)
    }

    pub fn with_generated_password(username: &str) -> Self {
        let password = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_PASSWORD_LEN)
            .map(char::from)
            .collect();
        Self { username: username.to_string(), password }
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Validated inputs for a single operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    pub directory: PathBuf,
    pub listen_port: Port,
    pub masquerade_domain: MasqueradeDomain,
    pub internal_port: Port,
    pub image_source: ImageSource,
    pub panel_enabled: bool,
    pub images: ImageRefs,
    pub panel_port: Port,
    pub panel_admin: Option<AdminCredentials>,
}

impl Parameters {
    /// Parameters with defaults for everything except directory and domain.
    pub fn with_defaults(directory: PathBuf, domain: MasqueradeDomain) -> Self {
        Self {
            directory,
            listen_port: Port(DEFAULT_LISTEN_PORT),
            masquerade_domain: domain,
            internal_port: Port(DEFAULT_INTERNAL_PORT),
            image_source: ImageSource::Prebuilt,
            panel_enabled: false,
            images: ImageRefs::default(),
            panel_port: Port(DEFAULT_PANEL_PORT),
            panel_admin: None,
        }
    }

    pub fn mode(&self) -> InstallMode {
        InstallMode::from_panel_flag(self.panel_enabled)
    }
}

/// Parse a boolean flag in the forms operators put into environment files.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" | "" => Some(false),
        _ => None,
    }
}
