use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::domain::AppError;
use crate::ports::ContainerRuntime;

/// Panel database as seen through the panel tool.
#[derive(Debug, Default)]
struct PanelState {
    admins: BTreeMap<String, String>,
    users: BTreeMap<String, String>,
}

/// Records compose invocations; optionally fails on one of them. Inline
/// panel tool calls update an in-memory panel database.
#[derive(Clone, Default)]
pub struct FakeRuntime {
    commands: Arc<Mutex<Vec<String>>>,
    inputs: Arc<Mutex<Vec<String>>>,
    panel: Arc<Mutex<PanelState>>,
    fail_on: Option<String>,
    unavailable: bool,
}

impl FakeRuntime {
    pub fn failing_on(command: &str) -> Self {
        Self { fail_on: Some(command.to_string()), ..Self::default() }
    }

    pub fn unavailable() -> Self {
        Self { unavailable: true, ..Self::default() }
    }

    /// Compose arguments of every call so far, space-joined. Inline scripts
    /// show up as `<script>`.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Stdin payloads, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }

    /// Admin usernames with their current passwords.
    pub fn admins(&self) -> BTreeMap<String, String> {
        self.panel.lock().unwrap().admins.clone()
    }

    /// Panel users with their secrets.
    pub fn panel_users(&self) -> BTreeMap<String, String> {
        self.panel.lock().unwrap().users.clone()
    }

    fn record(&self, args: &[&str]) -> Result<String, AppError> {
        let mut shown = Vec::with_capacity(args.len());
        let mut inline = false;
        for arg in args {
            shown.push(if inline { "<script>" } else { *arg });
            inline = *arg == "-c";
        }
        let line = shown.join(" ");
        self.commands.lock().unwrap().push(line.clone());
        match &self.fail_on {
            Some(prefix) if line.starts_with(prefix.as_str()) => {
                Err(AppError::executor(format!("docker compose {}", line), "simulated failure"))
            }
            _ => Ok(line),
        }
    }

    fn run_panel_tool(&self, action: &str, input: &str) -> Result<String, AppError> {
        let payload: serde_json::Value = serde_json::from_str(input)
            .map_err(|e| AppError::executor("panel tool", e.to_string()))?;
        let mut panel = self.panel.lock().unwrap();
        match action {
            "upsert-admin" => {
                let username = payload["username"].as_str().unwrap_or_default().to_string();
                let password = payload["password"].as_str().unwrap_or_default().to_string();
                panel.admins.insert(username.clone(), password);
                Ok(format!("Admin updated: {}", username))
            }
            "import-users" => {
                let mut imported = 0;
                for entry in payload["users"].as_array().cloned().unwrap_or_default() {
                    let username = entry["username"].as_str().unwrap_or_default().to_string();
                    let secret = entry["secret"].as_str().unwrap_or_default().to_string();
                    if !panel.users.contains_key(&username) {
                        panel.users.insert(username, secret);
                        imported += 1;
                    }
                }
                Ok(format!("Users imported: {}", imported))
            }
            other => Err(AppError::executor("panel tool", format!("unknown action {}", other))),
        }
    }
}

impl ContainerRuntime for FakeRuntime {
    fn preflight(&self) -> Result<(), AppError> {
        if self.unavailable {
            return Err(AppError::Environment {
                reason: "docker not found".into(),
                hint: "Install Docker".into(),
            });
        }
        Ok(())
    }

    fn compose(&self, _dir: &Path, args: &[&str]) -> Result<String, AppError> {
        self.record(args)?;
        Ok(String::new())
    }

    fn compose_with_input(
        &self,
        _dir: &Path,
        args: &[&str],
        input: &str,
    ) -> Result<String, AppError> {
        self.record(args)?;
        self.inputs.lock().unwrap().push(input.to_string());
        match args.iter().position(|arg| *arg == "-c") {
            Some(index) => match args.get(index + 2) {
                Some(action) => self.run_panel_tool(action, input),
                None => Ok(String::new()),
            },
            None => Ok(String::new()),
        }
    }
}
