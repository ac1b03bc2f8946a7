use std::net::Ipv4Addr;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::adapters::dialoguer_prompter::NonInteractive;
use crate::adapters::installation_filesystem::FilesystemInstallationStore;
use crate::adapters::template_cache::DigestCacheStore;
use crate::app::{Adapters, AppContext};
use crate::domain::{MasqueradeDomain, Parameters, ToolConfig};
use crate::ports::Prompter;
use crate::testing::{
    CountingFetcher, FakeAddresses, FakePorts, FakeReadiness, FakeRuntime, FakeSourceTree,
    shipped_templates_dir,
};

/// A sandbox with real filesystem storage and fake everything else.
pub struct TestEnv {
    pub root: TempDir,
    pub runtime: FakeRuntime,
    pub readiness: FakeReadiness,
    pub addresses: FakeAddresses,
    pub sources: FakeSourceTree,
    pub ports: FakePorts,
    pub fetcher: CountingFetcher,
    pub config: ToolConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        let mut config = ToolConfig::default();
        config.templates.local_dir = Some(shipped_templates_dir());
        config.readiness.interval_secs = 0;
        config.readiness.retries = 2;
        Self {
            root: TempDir::new().unwrap(),
            runtime: FakeRuntime::default(),
            readiness: FakeReadiness::ready(),
            addresses: FakeAddresses::v4(Ipv4Addr::new(203, 0, 113, 7)),
            sources: FakeSourceTree::default(),
            ports: FakePorts::default(),
            fetcher: CountingFetcher::serving_shipped(),
            config,
        }
    }

    /// Templates only reachable through the fetcher.
    pub fn without_local_templates(mut self, fetcher: CountingFetcher) -> Self {
        self.config.templates.local_dir = None;
        self.config.templates.cache =
            Some(self.root.path().join("template-cache").to_string_lossy().into_owned());
        self.fetcher = fetcher;
        self
    }

    pub fn install_dir(&self) -> PathBuf {
        self.root.path().join("mtproxy")
    }

    pub fn params(&self, domain: &str) -> Parameters {
        Parameters::with_defaults(self.install_dir(), MasqueradeDomain::new(domain).unwrap())
    }

    pub fn context(&self) -> AppContext {
        self.context_with(Box::new(NonInteractive))
    }

    pub fn context_with(&self, prompter: Box<dyn Prompter>) -> AppContext {
        let adapters = Adapters {
            store: Box::new(FilesystemInstallationStore::new()),
            fetcher: Box::new(self.fetcher.clone()),
            caches: Box::new(DigestCacheStore),
            runtime: Box::new(self.runtime.clone()),
            addresses: Box::new(self.addresses.clone()),
            readiness: Box::new(self.readiness.clone()),
            sources: Box::new(self.sources.clone()),
            ports: Box::new(self.ports.clone()),
            prompter,
        };
        AppContext::new(self.config.clone(), self.root.path().join("work"), adapters)
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.install_dir().join(relative)).unwrap()
    }

    pub fn read_bytes(&self, relative: &str) -> Vec<u8> {
        std::fs::read(self.install_dir().join(relative)).unwrap()
    }
}
