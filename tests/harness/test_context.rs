//! Shared testing harness for `mtdeploy` integration tests.

use assert_cmd::Command;
use std::fs;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::FakeDocker;

/// Unreachable address-discovery endpoint; connections are refused at once.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:9/";

/// Isolated environment: a work directory, an installation directory, a
/// fake docker binary and a tool config with fast readiness polling.
pub(crate) struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
    install_dir: PathBuf,
    config_file: PathBuf,
    listen_port: u16,
    panel_port: u16,
    pub(crate) docker: FakeDocker,
}

impl TestContext {
    pub(crate) fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        let install_dir = root.path().join("mtproxy");
        let docker = FakeDocker::install(root.path());

        let config_file = root.path().join("mtdeploy.toml");
        fs::write(&config_file, "[readiness]\ninterval_secs = 0\nretries = 1\n")
            .expect("Failed to write tool config");

        Self {
            root,
            work_dir,
            install_dir,
            config_file,
            listen_port: free_port(),
            panel_port: free_port(),
            docker,
        }
    }

    pub(crate) fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub(crate) fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub(crate) fn listen_port(&self) -> u16 {
        self.listen_port
    }

    /// `mtdeploy` wired to the fake docker, the shipped templates and the
    /// install directory, with every prompt answered by its default.
    pub(crate) fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("mtdeploy").expect("Failed to locate mtdeploy binary");
        cmd.current_dir(&self.work_dir)
            .env("HOME", self.root.path())
            .env("MTDEPLOY_NON_INTERACTIVE", "1")
            .env("MTDEPLOY_CONFIG", &self.config_file)
            .env("MTDEPLOY_DOCKER", &self.docker.script)
            .env("MTDEPLOY_TEMPLATES_DIR", shipped_templates())
            .env("MTDEPLOY_IPV4_ENDPOINTS", DEAD_ENDPOINT)
            .env("MTDEPLOY_IPV6_ENDPOINTS", DEAD_ENDPOINT)
            .env("MTPROXY_DIR", &self.install_dir)
            .env("LISTEN_PORT", self.listen_port.to_string())
            .env("TLS_DOMAIN", "pikabu.ru")
            .env("PANEL_PORT", self.panel_port.to_string())
            .env_remove("RUST_LOG")
            .env_remove("INSTALL_PANEL")
            .env_remove("IMAGE_SOURCE")
            .env_remove("PANEL_ADMIN_USER")
            .env_remove("PANEL_ADMIN_PASSWORD");
        cmd
    }

    /// Run `mtdeploy install` and assert success.
    pub(crate) fn install(&self) {
        self.cli().arg("install").assert().success();
    }

    pub(crate) fn install_with_panel(&self) {
        self.cli()
            .arg("install")
            .env("INSTALL_PANEL", "1")
            .env("PANEL_ADMIN_PASSWORD", "correct-horse")
            .assert()
            .success();
    }

    pub(crate) fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.install_dir.join(relative))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    pub(crate) fn exists(&self, relative: &str) -> bool {
        self.install_dir.join(relative).exists()
    }
}

pub(crate) fn shipped_templates() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .expect("Failed to find a free port")
}
