//! Operator parameters from environment variables, falling back to prompts.

use std::path::PathBuf;

use crate::domain::parameters::{
    DEFAULT_ADMIN_USER, DEFAULT_DOMAIN, DEFAULT_LISTEN_PORT, DEFAULT_PANEL_PORT, parse_bool,
};
use crate::domain::{
    AdminCredentials, AppError, ImageSource, MasqueradeDomain, Parameters, Port,
};
use crate::ports::Prompter;

pub const DEFAULT_DIR: &str = "/opt/mtproxy";

pub const ENV_DIR: &str = "MTPROXY_DIR";
pub const ENV_LISTEN_PORT: &str = "LISTEN_PORT";
pub const ENV_TLS_DOMAIN: &str = "TLS_DOMAIN";
pub const ENV_INTERNAL_PORT: &str = "INTERNAL_PORT";
pub const ENV_IMAGE_SOURCE: &str = "IMAGE_SOURCE";
pub const ENV_TELEMT_IMAGE: &str = "TELEMT_IMAGE";
pub const ENV_PANEL_IMAGE: &str = "PANEL_IMAGE";
pub const ENV_INSTALL_PANEL: &str = "INSTALL_PANEL";
pub const ENV_PANEL_PORT: &str = "PANEL_PORT";
pub const ENV_PANEL_ADMIN_USER: &str = "PANEL_ADMIN_USER";
pub const ENV_PANEL_ADMIN_PASSWORD: &str = "PANEL_ADMIN_PASSWORD";
pub const ENV_NON_INTERACTIVE: &str = "MTDEPLOY_NON_INTERACTIVE";

/// Reads operator inputs from `lookup`, asking `prompter` for whatever is unset.
pub struct ParameterCollector<'a, F: Fn(&str) -> Option<String>> {
    lookup: F,
    prompter: &'a dyn Prompter,
}

impl<'a, F: Fn(&str) -> Option<String>> ParameterCollector<'a, F> {
    pub fn new(lookup: F, prompter: &'a dyn Prompter) -> Self {
        Self { lookup, prompter }
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn ask(&self, key: &str, question: &str, default: &str) -> Result<String, AppError> {
        match self.var(key) {
            Some(value) => Ok(value),
            None => self.prompter.input(question, default),
        }
    }

    /// Installation directory: explicit argument, `MTPROXY_DIR`, prompt.
    pub fn directory(&self, explicit: Option<PathBuf>) -> Result<PathBuf, AppError> {
        if let Some(dir) = explicit {
            return Ok(dir);
        }
        self.ask(ENV_DIR, "Installation directory", DEFAULT_DIR).map(PathBuf::from)
    }

    pub fn domain(&self) -> Result<MasqueradeDomain, AppError> {
        MasqueradeDomain::new(&self.ask(
            ENV_TLS_DOMAIN,
            "Masquerade domain (TLS SNI)",
            DEFAULT_DOMAIN,
        )?)
    }

    /// Everything `install` needs.
    pub fn install(&self, explicit_dir: Option<PathBuf>) -> Result<Parameters, AppError> {
        let directory = self.directory(explicit_dir)?;
        let domain = self.domain()?;
        let mut params = Parameters::with_defaults(directory, domain);

        params.listen_port = self
            .ask(ENV_LISTEN_PORT, "Public listen port", &DEFAULT_LISTEN_PORT.to_string())?
            .parse()?;
        if let Some(port) = self.var(ENV_INTERNAL_PORT) {
            params.internal_port = port.parse()?;
        }
        params.image_source = match self.var(ENV_IMAGE_SOURCE) {
            Some(source) => source.parse()?,
            None => {
                let choice = self.prompter.select(
                    "Container images",
                    &["Pull prebuilt images", "Build from source"],
                    0,
                )?;
                if choice == 1 { ImageSource::Build } else { ImageSource::Prebuilt }
            }
        };
        if let Some(image) = self.var(ENV_TELEMT_IMAGE) {
            params.images.telemt = image;
        }
        if let Some(image) = self.var(ENV_PANEL_IMAGE) {
            params.images.panel = image;
        }

        params.panel_enabled = match self.var(ENV_INSTALL_PANEL) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                AppError::config_error(format!("{} must be a boolean, got '{}'", ENV_INSTALL_PANEL, raw))
            })?,
            None => self.prompter.confirm("Install the web admin panel?", false)?,
        };
        if params.panel_enabled {
            params.panel_port = self.panel_port()?;
            params.panel_admin = self.admin()?;
        }
        Ok(params)
    }

    pub fn panel_port(&self) -> Result<Port, AppError> {
        self.ask(ENV_PANEL_PORT, "Panel port (bound to 127.0.0.1)", &DEFAULT_PANEL_PORT.to_string())?
            .parse()
    }

    pub fn panel_image(&self) -> Option<String> {
        self.var(ENV_PANEL_IMAGE)
    }

    /// Admin credentials from the environment, else asked for. `None` means
    /// generate them.
    pub fn admin(&self) -> Result<Option<AdminCredentials>, AppError> {
        let username = self.var(ENV_PANEL_ADMIN_USER);
        match (username, self.var(ENV_PANEL_ADMIN_PASSWORD)) {
            (username, Some(password)) => Ok(Some(AdminCredentials {
                username: username.unwrap_or_else(|| DEFAULT_ADMIN_USER.to_string()),
                password,
            })),
            (username, None) if self.prompter.is_interactive() => {
                let username = match username {
                    Some(username) => username,
                    None => self.prompter.input("Panel admin username", DEFAULT_ADMIN_USER)?,
                };
                if self.prompter.confirm("Generate a random admin password?", true)? {
                    return Ok(Some(AdminCredentials::with_generated_password(&username)));
                }
                let password = self.prompter.password("Panel admin password")?;
                Ok(Some(AdminCredentials { username, password }))
            }
            (Some(username), None) => Ok(Some(AdminCredentials::with_generated_password(&username))),
            (None, None) => Ok(None),
        }
    }
}

/// `MTDEPLOY_NON_INTERACTIVE` wins; otherwise interactive when stdin is a terminal.
pub fn is_interactive(lookup: impl Fn(&str) -> Option<String>, stdin_is_terminal: bool) -> bool {
    match lookup(ENV_NON_INTERACTIVE).as_deref().and_then(parse_bool) {
        Some(true) => false,
        _ => stdin_is_terminal,
    }
}
