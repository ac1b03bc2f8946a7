mod address_lookup;
mod container_runtime;
mod host_ports;
mod installation_store;
mod prompter;
mod readiness_probe;
mod source_tree;
mod template_cache;
mod template_fetcher;

pub use address_lookup::PublicAddressLookup;
pub use container_runtime::ContainerRuntime;
pub use host_ports::PortChecker;
pub use installation_store::{CommitReport, InstallationStore, LockGuard};
pub use prompter::Prompter;
pub use readiness_probe::ReadinessProbe;
pub use source_tree::SourceTree;
pub use template_cache::{TemplateCache, TemplateCacheStore};
pub use template_fetcher::TemplateFetcher;
