//! Locates the template set: local checkout, then cache, then remote fetch.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::template::REQUIRED_TEMPLATES;
use crate::domain::tool_config::{CacheLocation, TemplatesConfig};
use crate::domain::{AppError, TemplateOrigin, TemplateSet};
use crate::ports::{Prompter, TemplateCache, TemplateCacheStore, TemplateFetcher};

/// Directory name searched next to the executable and in the working directory.
pub const TEMPLATES_DIR: &str = "templates";

pub struct TemplateResolver {
    candidates: Vec<PathBuf>,
    cache: Option<CacheLocation>,
    allow_remote: bool,
    working_dir: PathBuf,
    resolved: RefCell<Option<TemplateSet>>,
    /// Keeps a temporary cache directory alive for the rest of the run.
    open_cache: RefCell<Option<Box<dyn TemplateCache>>>,
}

impl TemplateResolver {
    pub fn new(config: &TemplatesConfig, working_dir: &Path) -> Self {
        let mut candidates = Vec::new();
        if let Some(dir) = &config.local_dir {
            candidates.push(dir.clone());
        }
        if let Some(dir) = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
            candidates.push(dir.join(TEMPLATES_DIR));
        }
        candidates.push(working_dir.join(TEMPLATES_DIR));

        Self {
            candidates,
            cache: config.cache_location(),
            allow_remote: config.allow_remote,
            working_dir: working_dir.to_path_buf(),
            resolved: RefCell::new(None),
            open_cache: RefCell::new(None),
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    pub fn resolve(
        &self,
        fetcher: &dyn TemplateFetcher,
        caches: &dyn TemplateCacheStore,
        prompter: &dyn Prompter,
    ) -> Result<TemplateSet, AppError> {
        if let Some(set) = self.resolved.borrow().as_ref() {
            return Ok(set.clone());
        }

        let set = match self.from_local_checkout()? {
            Some(set) => set,
            None => self.from_cache(fetcher, caches, prompter)?,
        };
        info!(origin = %set.origin(), "templates resolved");
        *self.resolved.borrow_mut() = Some(set.clone());
        Ok(set)
    }

    fn from_local_checkout(&self) -> Result<Option<TemplateSet>, AppError> {
        for dir in &self.candidates {
            let complete = REQUIRED_TEMPLATES.iter().all(|name| dir.join(name).is_file());
            if !complete {
                debug!(dir = %dir.display(), "template checkout incomplete");
                continue;
            }
            let mut files = BTreeMap::new();
            for name in REQUIRED_TEMPLATES {
                files.insert(name.to_string(), fs::read_to_string(dir.join(name))?);
            }
            return Ok(Some(TemplateSet::new(files, TemplateOrigin::LocalCheckout(dir.clone()))));
        }
        Ok(None)
    }

    fn from_cache(
        &self,
        fetcher: &dyn TemplateFetcher,
        caches: &dyn TemplateCacheStore,
        prompter: &dyn Prompter,
    ) -> Result<TemplateSet, AppError> {
        if !self.allow_remote {
            return Err(AppError::TemplatesUnavailable {
                missing: REQUIRED_TEMPLATES.iter().map(|s| s.to_string()).collect(),
            });
        }

        let location = match &self.cache {
            Some(location) => location.clone(),
            None => self.ask_cache_location(prompter)?,
        };
        let mut cache = caches.open(&location, &self.working_dir)?;

        let mut files = BTreeMap::new();
        for name in REQUIRED_TEMPLATES {
            let content = match cache.load(name) {
                Some(content) => {
                    debug!(template = name, "template cache hit");
                    content
                }
                None => {
                    let content = fetcher.fetch(name)?;
                    cache.store(name, &content)?;
                    content
                }
            };
            files.insert(name.to_string(), content);
        }

        let set = TemplateSet::new(files, TemplateOrigin::Cache(cache.dir().to_path_buf()));
        *self.open_cache.borrow_mut() = Some(cache);
        Ok(set)
    }

    fn ask_cache_location(&self, prompter: &dyn Prompter) -> Result<CacheLocation, AppError> {
        if !prompter.is_interactive() {
            return Ok(CacheLocation::Temporary);
        }
        let choice = prompter.select(
            "Templates are not available locally. Where should downloaded templates be kept?",
            &[
                "Temporary directory (removed after this run)",
                "./.mtdeploy-templates (reused next time)",
                "Another directory",
            ],
            0,
        )?;
        Ok(match choice {
            0 => CacheLocation::Temporary,
            1 => CacheLocation::WorkingDir,
            _ => {
                let path = prompter.input("Cache directory", "/var/cache/mtdeploy")?;
                CacheLocation::Path(PathBuf::from(path))
            }
        })
    }
}
