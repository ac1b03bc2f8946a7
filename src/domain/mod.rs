pub mod artifacts;
pub mod env_record;
pub mod error;
pub mod install_state;
pub mod layout;
pub mod link;
pub mod parameters;
pub mod secret;
pub mod synthesis;
pub mod template;
pub mod tool_config;

pub use artifacts::{ArtifactFile, ConfigurationArtifacts, WritePolicy};
pub use env_record::{EnvRecord, PanelEnv};
pub use error::AppError;
pub use install_state::{DirectorySnapshot, InstallState, classify};
pub use link::{Link, LinkServer, LinkView, derive_links, long_secret};
pub use parameters::{
    AdminCredentials, ImageRefs, ImageSource, InstallMode, MasqueradeDomain, Parameters, Port,
};
pub use secret::Secret;
pub use synthesis::synthesize;
pub use template::{Placeholders, TemplateOrigin, TemplateSet};
pub use tool_config::{CacheLocation, ToolConfig};
