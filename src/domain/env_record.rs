//! The `.env` record future operations read back instead of re-prompting.

use std::collections::BTreeMap;

use crate::domain::layout::PANEL_CONFIG_CONTAINER_PATH;
use crate::domain::{AppError, ImageSource, InstallMode, MasqueradeDomain, Port};

pub const KEY_MODE: &str = "MTDEPLOY_MODE";
pub const KEY_LISTEN_PORT: &str = "LISTEN_PORT";
pub const KEY_INTERNAL_PORT: &str = "INTERNAL_PORT";
pub const KEY_IMAGE_SOURCE: &str = "IMAGE_SOURCE";
pub const KEY_TLS_DOMAIN: &str = "TLS_DOMAIN";
pub const KEY_TELEMT_IMAGE: &str = "TELEMT_IMAGE";
pub const KEY_PANEL_IMAGE: &str = "PANEL_IMAGE";
pub const KEY_PANEL_PORT: &str = "PANEL_PORT";
pub const KEY_SECRET_KEY: &str = "SECRET_KEY";
pub const KEY_PROXY_PORT: &str = "PROXY_PORT";
pub const KEY_PROXY_HOST: &str = "PROXY_HOST";
pub const KEY_TELEMT_CONFIG_PATH: &str = "TELEMT_CONFIG_PATH";
pub const KEY_TELEMT_METRICS_URL: &str = "TELEMT_METRICS_URL";

const TELEMT_METRICS_URL: &str = "http://telemt:9090/metrics";

/// Keys this tool owns; everything else in the file is kept as-is.
const MANAGED_KEYS: &[&str] = &[
    KEY_MODE,
    KEY_LISTEN_PORT,
    KEY_INTERNAL_PORT,
    KEY_IMAGE_SOURCE,
    KEY_TLS_DOMAIN,
    KEY_TELEMT_IMAGE,
    KEY_PANEL_IMAGE,
    KEY_PANEL_PORT,
    KEY_SECRET_KEY,
    KEY_PROXY_PORT,
    KEY_PROXY_HOST,
    KEY_TELEMT_CONFIG_PATH,
    KEY_TELEMT_METRICS_URL,
];

/// Panel-only settings.
#[derive(Clone, PartialEq, Eq)]
pub struct PanelEnv {
    pub panel_port: Port,
    /// JWT signing key for the panel.
    pub secret_key: String,
    pub proxy_host: Option<String>,
}

impl std::fmt::Debug for PanelEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelEnv")
            .field("panel_port", &self.panel_port)
            .field("secret_key", &"[REDACTED]")
            .field("proxy_host", &self.proxy_host)
            .finish()
    }
}

/// Typed view of the environment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvRecord {
    pub mode: InstallMode,
    pub listen_port: Port,
    pub internal_port: Port,
    pub image_source: ImageSource,
    pub tls_domain: MasqueradeDomain,
    pub telemt_image: String,
    pub panel_image: String,
    pub panel: Option<PanelEnv>,
    /// Operator-added keys, preserved in order.
    pub extra: Vec<(String, String)>,
}

impl EnvRecord {
    /// Serialize as `KEY=VALUE` lines, quoting values that would not read
    /// back verbatim.
    pub fn render(&self) -> String {
        let mut lines = vec![
            "# Managed by mtdeploy. Keys below are read back by update and config.".to_string(),
            line(KEY_MODE, self.mode.as_str()),
            line(KEY_LISTEN_PORT, &self.listen_port.to_string()),
            line(KEY_INTERNAL_PORT, &self.internal_port.to_string()),
            line(KEY_IMAGE_SOURCE, &self.image_source.to_string()),
            line(KEY_TLS_DOMAIN, self.tls_domain.as_str()),
            line(KEY_TELEMT_IMAGE, &self.telemt_image),
        ];

        if let Some(panel) = &self.panel {
            lines.push(line(KEY_PANEL_IMAGE, &self.panel_image));
            lines.push(line(KEY_PANEL_PORT, &panel.panel_port.to_string()));
            lines.push(line(KEY_SECRET_KEY, &panel.secret_key));
            lines.push(line(KEY_PROXY_PORT, &self.listen_port.to_string()));
            if let Some(host) = &panel.proxy_host {
                lines.push(line(KEY_PROXY_HOST, host));
            }
            lines.push(line(KEY_TELEMT_CONFIG_PATH, PANEL_CONFIG_CONTAINER_PATH));
            lines.push(line(KEY_TELEMT_METRICS_URL, TELEMT_METRICS_URL));
        }

        if !self.extra.is_empty() {
            lines.push(String::new());
            for (key, value) in &self.extra {
                lines.push(line(key, value));
            }
        }

        lines.push(String::new());
        lines.join("\n")
    }

    /// Parse file content.
    pub fn parse(content: &str) -> Result<Self, AppError> {
        let pairs = parse_pairs(content)?;
        let map: BTreeMap<&str, &str> =
            pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

        let required = |key: &str| -> Result<&str, AppError> {
            map.get(key)
                .copied()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::MalformedEnvFile(format!("missing {}", key)))
        };

        let listen_port = required(KEY_LISTEN_PORT)?.parse::<Port>()?;
        let internal_port = match map.get(KEY_INTERNAL_PORT) {
            Some(value) => value.parse::<Port>()?,
            None => Port::new(crate::domain::parameters::DEFAULT_INTERNAL_PORT.into())?,
        };
        let image_source = required(KEY_IMAGE_SOURCE)?.parse::<ImageSource>()?;
        let tls_domain = MasqueradeDomain::new(required(KEY_TLS_DOMAIN)?)?;

        let panel_port = map.get(KEY_PANEL_PORT).map(|v| v.parse::<Port>()).transpose()?;
        let secret_key = map.get(KEY_SECRET_KEY).map(|v| v.to_string());

        let mode = match map.get(KEY_MODE) {
            Some(value) => InstallMode::parse(value).ok_or_else(|| {
                AppError::MalformedEnvFile(format!("unknown {} '{}'", KEY_MODE, value))
            })?,
            None => InstallMode::from_panel_flag(panel_port.is_some()),
        };

        let panel = match (mode, panel_port, secret_key) {
            (InstallMode::ProxyPanel, Some(panel_port), Some(secret_key)) => Some(PanelEnv {
                panel_port,
                secret_key,
                proxy_host: map.get(KEY_PROXY_HOST).map(|v| v.to_string()),
            }),
            (InstallMode::ProxyPanel, _, _) => {
                return Err(AppError::MalformedEnvFile(format!(
                    "panel mode requires {} and {}",
                    KEY_PANEL_PORT, KEY_SECRET_KEY
                )));
            }
            (InstallMode::ProxyOnly, _, _) => None,
        };

        let extra = pairs
            .iter()
            .filter(|(k, _)| !MANAGED_KEYS.contains(&k.as_str()))
            .cloned()
            .collect();

        Ok(Self {
            mode,
            listen_port,
            internal_port,
            image_source,
            tls_domain,
            telemt_image: map
                .get(KEY_TELEMT_IMAGE)
                .map(|v| v.to_string())
                .unwrap_or_else(|| crate::domain::parameters::DEFAULT_TELEMT_IMAGE.to_string()),
            panel_image: map
                .get(KEY_PANEL_IMAGE)
                .map(|v| v.to_string())
                .unwrap_or_else(|| crate::domain::parameters::DEFAULT_PANEL_IMAGE.to_string()),
            panel,
            extra,
        })
    }

    /// Recorded mode without a full parse; detection uses this.
    pub fn peek_mode(content: &str) -> Option<InstallMode> {
        parse_pairs(content)
            .ok()?
            .into_iter()
            .find(|(k, _)| k == KEY_MODE)
            .and_then(|(_, v)| InstallMode::parse(&v))
    }
}

fn line(key: &str, value: &str) -> String {
    format!("{}={}", key, quote_value(value))
}

/// Bare when every character is safe unquoted, single quotes (no
/// substitution) when the value has no `'`, escaped double quotes otherwise.
fn quote_value(value: &str) -> String {
    let bare = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_-./:@,+=%".contains(c));
    if bare {
        return value.to_string();
    }
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' | '$' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn parse_pairs(content: &str) -> Result<Vec<(String, String)>, AppError> {
    dotenvy::from_read_iter(content.as_bytes())
        .map(|item| item.map_err(|e| AppError::MalformedEnvFile(e.to_string())))
        .collect()
}
