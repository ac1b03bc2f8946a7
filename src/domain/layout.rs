//! File layout of an installation directory.

use std::path::{Path, PathBuf};

pub const COMPOSE_FILE: &str = "docker-compose.yml";
pub const PROXY_CONFIG_FILE: &str = "telemt.toml";
pub const ROUTER_RULE_FILE: &str = "traefik/dynamic/tcp.yml";
pub const ENV_FILE: &str = ".env";
pub const SECRET_FILE: &str = "secret";
pub const LOCK_FILE: &str = ".mtdeploy.lock";
pub const STAGING_PREFIX: &str = ".mtdeploy-staging-";
pub const PANEL_DATA_DIR: &str = "panel-data";
pub const PANEL_CONFIG_FILE: &str = "panel-data/telemt.toml";
pub const PANEL_SEED_FILE: &str = "panel-data/seed-user.toml";
pub const SOURCE_DIR: &str = "src";

/// Config path inside the panel and telemt containers for the shared file.
pub const PANEL_CONFIG_CONTAINER_PATH: &str = "/data/telemt.toml";

/// Service names in the compose topology.
pub const TELEMT_SERVICE: &str = "telemt";
pub const TRAEFIK_SERVICE: &str = "traefik";
pub const PANEL_SERVICE: &str = "panel";

/// Files whose presence makes a build root usable without cloning.
pub const BUILD_ROOT_MARKERS: &[&str] = &["Dockerfile", "Cargo.toml"];

pub fn compose(dir: &Path) -> PathBuf {
    dir.join(COMPOSE_FILE)
}

pub fn proxy_config(dir: &Path) -> PathBuf {
    dir.join(PROXY_CONFIG_FILE)
}

pub fn router_rule(dir: &Path) -> PathBuf {
    dir.join(ROUTER_RULE_FILE)
}

pub fn env_file(dir: &Path) -> PathBuf {
    dir.join(ENV_FILE)
}

pub fn secret(dir: &Path) -> PathBuf {
    dir.join(SECRET_FILE)
}

pub fn lock(dir: &Path) -> PathBuf {
    dir.join(LOCK_FILE)
}

pub fn panel_config(dir: &Path) -> PathBuf {
    dir.join(PANEL_CONFIG_FILE)
}

/// True for entries the tool itself leaves behind transiently.
pub fn is_transient(name: &str) -> bool {
    name == LOCK_FILE || name.starts_with(STAGING_PREFIX)
}
