//! Operator prompts on the terminal, and the scripted non-interactive stand-in.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};

use crate::domain::AppError;
use crate::ports::Prompter;

#[derive(Default)]
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl std::fmt::Debug for DialoguerPrompter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialoguerPrompter").finish_non_exhaustive()
    }
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn prompt_error(e: dialoguer::Error) -> AppError {
    AppError::Prompt(e.to_string())
}

impl Prompter for DialoguerPrompter {
    fn is_interactive(&self) -> bool {
        true
    }

    fn confirm(&self, question: &str, default: bool) -> Result<bool, AppError> {
        Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn input(&self, question: &str, default: &str) -> Result<String, AppError> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(question)
            .default(default.to_string())
            .interact_text()
            .map_err(prompt_error)
    }

    fn select(&self, question: &str, items: &[&str], default: usize) -> Result<usize, AppError> {
        Select::with_theme(&self.theme)
            .with_prompt(question)
            .items(items)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn password(&self, question: &str) -> Result<String, AppError> {
        Password::with_theme(&self.theme)
            .with_prompt(question)
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()
            .map_err(prompt_error)
    }
}

/// Answers every question with its default. Used for `MTDEPLOY_NON_INTERACTIVE`
/// runs and when stdin is not a terminal.
#[derive(Debug, Clone, Default)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn is_interactive(&self) -> bool {
        false
    }

    fn confirm(&self, _question: &str, default: bool) -> Result<bool, AppError> {
        Ok(default)
    }

    fn input(&self, _question: &str, default: &str) -> Result<String, AppError> {
        Ok(default.to_string())
    }

    fn select(&self, _question: &str, _items: &[&str], default: usize) -> Result<usize, AppError> {
        Ok(default)
    }

    fn password(&self, question: &str) -> Result<String, AppError> {
        Err(AppError::Prompt(format!("'{}' needs an interactive terminal", question)))
    }
}
