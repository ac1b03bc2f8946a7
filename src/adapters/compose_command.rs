//! `docker compose` subprocess adapter.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::{debug, info};

use crate::domain::AppError;
use crate::ports::ContainerRuntime;

#[derive(Debug, Clone)]
pub struct DockerComposeRuntime {
    docker: String,
}

impl DockerComposeRuntime {
    pub fn new(docker: impl Into<String>) -> Self {
        Self { docker: docker.into() }
    }

    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<Output, io::Error> {
        let mut command = Command::new(&self.docker);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        command.output()
    }

    fn run_with_input(&self, args: &[&str], cwd: &Path, input: &str) -> Result<Output, io::Error> {
        let mut child = Command::new(&self.docker)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(input.as_bytes()) {
                Ok(()) => {}
                // The command exited without reading; its status tells the rest.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e),
            }
        }
        child.wait_with_output()
    }

    fn finish(command: String, output: Output) -> Result<String, AppError> {
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            let combined = [stdout.as_str(), stderr.as_str()]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(AppError::executor(
                command,
                if combined.is_empty() { "exited with failure".to_string() } else { combined },
            ));
        }
        Ok(stdout)
    }

    fn display(&self, args: &[&str]) -> String {
        format!("{} {}", self.docker, args.join(" "))
    }
}

impl ContainerRuntime for DockerComposeRuntime {
    fn preflight(&self) -> Result<(), AppError> {
        let output = match self.run(&["info"], None) {
            Ok(output) => output,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(AppError::Environment {
                    reason: format!("'{}' was not found on PATH", self.docker),
                    hint: "Install Docker Engine with the compose plugin \
                           (https://docs.docker.com/engine/install/), then re-run."
                        .to_string(),
                });
            }
            Err(e) => {
                return Err(AppError::Environment {
                    reason: format!("could not run '{} info': {}", self.docker, e),
                    hint: "Check that the docker binary is executable.".to_string(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let hint = if stderr.to_ascii_lowercase().contains("permission denied") {
                "Add your user to the docker group ('sudo usermod -aG docker $USER'), \
                 log out and back in, or run mtdeploy with sudo."
            } else {
                "Start the Docker daemon ('sudo systemctl start docker') and re-run."
            };
            return Err(AppError::Environment {
                reason: if stderr.is_empty() { "docker info failed".to_string() } else { stderr },
                hint: hint.to_string(),
            });
        }

        let compose = self.run(&["compose", "version"], None).map_err(AppError::from)?;
        if !compose.status.success() {
            return Err(AppError::Environment {
                reason: "the docker compose plugin is not installed".to_string(),
                hint: "Install the docker-compose-plugin package, then re-run.".to_string(),
            });
        }
        debug!("container runtime available");
        Ok(())
    }

    fn compose(&self, dir: &Path, args: &[&str]) -> Result<String, AppError> {
        let mut full = vec!["compose"];
        full.extend_from_slice(args);
        let command = self.display(&full);
        info!(%command, dir = %dir.display(), "running container runtime");

        let output = self
            .run(&full, Some(dir))
            .map_err(|e| AppError::executor(command.clone(), e.to_string()))?;
        Self::finish(command, output)
    }

    fn compose_with_input(
        &self,
        dir: &Path,
        args: &[&str],
        input: &str,
    ) -> Result<String, AppError> {
        let mut full = vec!["compose"];
        full.extend_from_slice(args);
        // Inline scripts are long; log the action rather than the source.
        let command = self.display(&full);
        info!(args = args.len(), dir = %dir.display(), "running container runtime with stdin");

        let output = self
            .run_with_input(&full, dir, input)
            .map_err(|e| AppError::executor(command.clone(), e.to_string()))?;
        Self::finish(command, output)
    }
}
