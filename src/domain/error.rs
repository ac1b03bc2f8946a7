use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Library-wide error type for mtdeploy operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Tool configuration issue.
    #[error("{0}")]
    Configuration(String),

    /// Container runtime missing or not usable by the current user.
    #[error("Container runtime unavailable: {reason}")]
    Environment { reason: String, hint: String },

    /// Required templates could not be found in any source.
    #[error("Templates unavailable: {}", missing.join(", "))]
    TemplatesUnavailable { missing: Vec<String> },

    /// A single remote template fetch failed.
    #[error("Failed to fetch template '{name}': {details}")]
    TemplateFetchFailed { name: String, details: String },

    /// A template did not parse as the document type it declares.
    #[error("Template '{name}' is not a valid document: {details}")]
    TemplateInvalid { name: String, details: String },

    /// A template references a token outside the placeholder vocabulary.
    #[error("Template '{template}' references unknown placeholder: {details}")]
    PlaceholderMissing { template: String, details: String },

    /// Masquerade domain was empty.
    #[error("Masquerade domain must not be empty")]
    DomainEmpty,

    /// Masquerade domain contains characters a TLS SNI cannot carry.
    #[error("Invalid masquerade domain '{0}'")]
    InvalidDomain(String),

    /// Port outside 1-65535.
    #[error("Port {0} is out of range (1-65535)")]
    PortOutOfRange(i64),

    /// Listen port already bound on this host.
    #[error("Port {0} is already in use")]
    PortConflict(u16),

    /// Synthesized artifacts disagree on the masquerade domain.
    #[error("Synthesized artifacts disagree on masquerade domain: {0}")]
    SynthesisInconsistent(String),

    /// Target directory holds something that is not an mtdeploy installation.
    #[error("Directory {} exists but is not an mtdeploy installation", .0.display())]
    ForeignDirectory(PathBuf),

    /// Operation requires an existing installation.
    #[error("No installation found at {}", .0.display())]
    NotInstalled(PathBuf),

    /// add-panel against an installation that already runs the panel.
    #[error("Installation at {} already runs the admin panel", .0.display())]
    AlreadyPanel(PathBuf),

    /// Operation not allowed from the current install state.
    #[error("Operation '{operation}' is not valid for a {state} installation")]
    InvalidTransition { operation: String, state: String },

    /// Another mutating operation holds the installation lock.
    #[error("Installation is locked by another mtdeploy process (pid {pid})")]
    Locked { pid: String, path: PathBuf },

    /// A container runtime command failed.
    #[error("Container runtime command '{command}' failed: {output}")]
    ExecutorFailure { command: String, output: String },

    /// The persisted `.env` could not be interpreted.
    #[error("Malformed environment file: {0}")]
    MalformedEnvFile(String),

    /// Interactive prompt failed.
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// Source tree clone failed.
    #[error("Git error running '{command}': {details}")]
    GitError { command: String, details: String },
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn executor<C: Into<String>, O: Into<String>>(command: C, output: O) -> Self {
        AppError::ExecutorFailure { command: command.into(), output: output.into() }
    }

    /// Concrete remediation step printed under the error line.
    pub fn hint(&self) -> Option<String> {
        match self {
            AppError::Environment { hint, .. } => Some(hint.clone()),
            AppError::TemplatesUnavailable { .. } | AppError::TemplateFetchFailed { .. } => Some(
                "Check network access to the template source, or run from a checkout that \
                 contains templates/ (or set MTDEPLOY_TEMPLATES_DIR)."
                    .to_string(),
            ),
            AppError::ForeignDirectory(path) => Some(format!(
                "Choose an empty directory, or re-run with --force to take over {}.",
                path.display()
            )),
            AppError::NotInstalled(_) => Some("Run 'mtdeploy install' first.".to_string()),
            AppError::PortConflict(port) => Some(format!(
                "Free port {} or set LISTEN_PORT to another port and re-run.",
                port
            )),
            AppError::Locked { path, .. } => Some(format!(
                "Wait for the other run to finish. If none is running, remove {}.",
                path.display()
            )),
            AppError::ExecutorFailure { .. } => Some(
                "Inspect the output above, fix the cause, then re-run 'mtdeploy update'."
                    .to_string(),
            ),
            AppError::AlreadyPanel(_) => {
                Some("Use 'mtdeploy update' to refresh the panel installation.".to_string())
            }
            _ => None,
        }
    }

    /// Short class name printed in front of fatal errors.
    pub fn class(&self) -> &'static str {
        match self {
            AppError::Environment { .. } => "EnvironmentError",
            AppError::TemplatesUnavailable { .. } => "TemplateUnavailable",
            AppError::TemplateFetchFailed { .. } => "TemplateFetchFailed",
            AppError::PortConflict(_) => "PortConflict",
            AppError::ForeignDirectory(_) => "ForeignDirectory",
            AppError::TemplateInvalid { .. }
            | AppError::PlaceholderMissing { .. }
            | AppError::DomainEmpty
            | AppError::InvalidDomain(_)
            | AppError::PortOutOfRange(_)
            | AppError::SynthesisInconsistent(_) => "SynthesisError",
            AppError::ExecutorFailure { .. } | AppError::GitError { .. } => "ExecutorFailure",
            AppError::NotInstalled(_)
            | AppError::AlreadyPanel(_)
            | AppError::InvalidTransition { .. }
            | AppError::Locked { .. } => "StateError",
            AppError::MalformedEnvFile(_) | AppError::Configuration(_) => "ConfigurationError",
            AppError::Io(_) | AppError::Prompt(_) => "IoError",
        }
    }
}
