mod deployer;
mod links;
mod secret_manager;
mod template_resolver;

pub use deployer::{DeployOutcome, Deployer, Readiness, is_build_root};
pub use links::{LinkReport, discover_links};
pub use secret_manager::SecretManager;
pub use template_resolver::{TEMPLATES_DIR, TemplateResolver};
