//! On-disk template cache with a SHA-256 digest file.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::{NamedTempFile, TempDir};
use tracing::debug;

use crate::domain::AppError;
use crate::domain::tool_config::{CacheLocation, WORKING_DIR_CACHE};
use crate::ports::{TemplateCache, TemplateCacheStore};

/// Digest file inside the cache directory, `sha256sum` format.
pub const DIGEST_FILE: &str = "SHA256SUMS";

/// Opens [`DigestTemplateCache`] directories on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestCacheStore;

impl TemplateCacheStore for DigestCacheStore {
    fn open(
        &self,
        location: &CacheLocation,
        working_dir: &Path,
    ) -> Result<Box<dyn TemplateCache>, AppError> {
        Ok(Box::new(DigestTemplateCache::open(location, working_dir)?))
    }
}

#[derive(Debug)]
pub struct DigestTemplateCache {
    dir: PathBuf,
    digests: BTreeMap<String, String>,
    /// Keeps a temporary cache alive until the cache is dropped.
    _temp: Option<TempDir>,
}

impl DigestTemplateCache {
    pub fn open(location: &CacheLocation, working_dir: &Path) -> Result<Self, AppError> {
        let (dir, temp) = match location {
            CacheLocation::Temporary => {
                let temp = tempfile::Builder::new().prefix("mtdeploy-templates-").tempdir()?;
                (temp.path().to_path_buf(), Some(temp))
            }
            CacheLocation::WorkingDir => (working_dir.join(WORKING_DIR_CACHE), None),
            CacheLocation::Path(path) => (path.clone(), None),
        };
        fs::create_dir_all(&dir)?;
        let digests = read_digests(&dir.join(DIGEST_FILE));
        Ok(Self { dir, digests, _temp: temp })
    }
}

impl TemplateCache for DigestTemplateCache {
    fn dir(&self) -> &Path {
        &self.dir
    }

    /// Intact means the content still matches its recorded digest.
    fn load(&self, name: &str) -> Option<String> {
        let expected = self.digests.get(name)?;
        let content = fs::read_to_string(self.dir.join(name)).ok()?;
        if &sha256_hex(content.as_bytes()) == expected {
            Some(content)
        } else {
            debug!(template = name, "cached template digest mismatch");
            None
        }
    }

    fn store(&mut self, name: &str, content: &str) -> Result<(), AppError> {
        write_atomic(&self.dir, name, content)?;
        self.digests.insert(name.to_string(), sha256_hex(content.as_bytes()));
        let listing: String = self
            .digests
            .iter()
            .map(|(file, digest)| format!("{}  {}\n", digest, file))
            .collect();
        write_atomic(&self.dir, DIGEST_FILE, &listing)
    }
}

fn read_digests(path: &Path) -> BTreeMap<String, String> {
    let Ok(content) = fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    content
        .lines()
        .filter_map(|line| {
            let (digest, name) = line.split_once("  ")?;
            Some((name.trim().to_string(), digest.trim().to_string()))
        })
        .collect()
}

fn write_atomic(dir: &Path, name: &str, content: &str) -> Result<(), AppError> {
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(dir.join(name)).map_err(|e| AppError::Io(e.error))?;
    Ok(())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
