use std::path::{Path, PathBuf};

use crate::adapters::compose_command::DockerComposeRuntime;
use crate::adapters::dialoguer_prompter::{DialoguerPrompter, NonInteractive};
use crate::adapters::git_source::GitSourceTree;
use crate::adapters::health_http::HttpReadinessProbe;
use crate::adapters::installation_filesystem::FilesystemInstallationStore;
use crate::adapters::port_probe::TcpPortChecker;
use crate::adapters::public_ip_http::HttpAddressLookup;
use crate::adapters::template_cache::DigestCacheStore;
use crate::adapters::template_http::HttpTemplateFetcher;
use crate::app::services::{Deployer, SecretManager, TemplateResolver};
use crate::domain::{AppError, TemplateSet, ToolConfig};
use crate::ports::{
    ContainerRuntime, InstallationStore, PortChecker, Prompter, PublicAddressLookup,
    ReadinessProbe, SourceTree, TemplateCacheStore, TemplateFetcher,
};

/// The adapters an [`AppContext`] runs against.
pub struct Adapters {
    pub store: Box<dyn InstallationStore>,
    pub fetcher: Box<dyn TemplateFetcher>,
    pub caches: Box<dyn TemplateCacheStore>,
    pub runtime: Box<dyn ContainerRuntime>,
    pub addresses: Box<dyn PublicAddressLookup>,
    pub readiness: Box<dyn ReadinessProbe>,
    pub sources: Box<dyn SourceTree>,
    pub ports: Box<dyn PortChecker>,
    pub prompter: Box<dyn Prompter>,
}

impl Adapters {
    /// Real filesystem, network and docker.
    pub fn production(config: &ToolConfig, interactive: bool) -> Result<Self, AppError> {
        let prompter: Box<dyn Prompter> =
            if interactive { Box::new(DialoguerPrompter::new()) } else { Box::new(NonInteractive) };
        Ok(Self {
            store: Box::new(FilesystemInstallationStore::new()),
            fetcher: Box::new(HttpTemplateFetcher::new(&config.templates)?),
            caches: Box::new(DigestCacheStore),
            runtime: Box::new(DockerComposeRuntime::new(config.runtime.docker.clone())),
            addresses: Box::new(HttpAddressLookup::new(&config.discovery)),
            readiness: Box::new(HttpReadinessProbe::local()),
            sources: Box::new(GitSourceTree::new()),
            ports: Box::new(TcpPortChecker),
            prompter,
        })
    }
}

/// Application context holding configuration and adapters for one run.
pub struct AppContext {
    config: ToolConfig,
    working_dir: PathBuf,
    templates: TemplateResolver,
    adapters: Adapters,
}

impl AppContext {
    pub fn new(config: ToolConfig, working_dir: PathBuf, adapters: Adapters) -> Self {
        let templates = TemplateResolver::new(&config.templates, &working_dir);
        Self { config, working_dir, templates, adapters }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn store(&self) -> &dyn InstallationStore {
        self.adapters.store.as_ref()
    }

    /// Resolve the template set; memoized for the rest of the run.
    pub fn resolve_templates(&self) -> Result<TemplateSet, AppError> {
        self.templates.resolve(
            self.adapters.fetcher.as_ref(),
            self.adapters.caches.as_ref(),
            self.prompter(),
        )
    }

    pub fn runtime(&self) -> &dyn ContainerRuntime {
        self.adapters.runtime.as_ref()
    }

    pub fn addresses(&self) -> &dyn PublicAddressLookup {
        self.adapters.addresses.as_ref()
    }

    pub fn ports(&self) -> &dyn PortChecker {
        self.adapters.ports.as_ref()
    }

    pub fn prompter(&self) -> &dyn Prompter {
        self.adapters.prompter.as_ref()
    }

    pub fn secrets(&self) -> SecretManager<'_> {
        SecretManager::new(self.store())
    }

    pub fn deployer(&self) -> Deployer<'_> {
        Deployer::new(
            self.adapters.runtime.as_ref(),
            self.adapters.readiness.as_ref(),
            self.adapters.sources.as_ref(),
            &self.config,
            &self.working_dir,
        )
    }
}
