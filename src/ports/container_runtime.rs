use std::path::Path;

use crate::domain::AppError;

/// Port for the container runtime (`docker` + `docker compose`).
pub trait ContainerRuntime {
    /// Check that the runtime is installed and usable by this user.
    fn preflight(&self) -> Result<(), AppError>;

    /// Run `compose <args>` with `dir` as the project directory and return
    /// its combined output.
    fn compose(&self, dir: &Path, args: &[&str]) -> Result<String, AppError>;

    /// Like [`ContainerRuntime::compose`] with `input` written to stdin.
    /// Used for payloads that must stay out of the process table.
    fn compose_with_input(
        &self,
        dir: &Path,
        args: &[&str],
        input: &str,
    ) -> Result<String, AppError>;
}
