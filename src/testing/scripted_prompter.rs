use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::AppError;
use crate::ports::Prompter;

/// Interactive prompter answering from a script; falls back to defaults
/// when the script runs out.
#[derive(Default)]
pub struct ScriptedPrompter {
    confirms: Mutex<VecDeque<bool>>,
    inputs: Mutex<VecDeque<String>>,
    pub asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirm_with(self, answer: bool) -> Self {
        self.confirms.lock().unwrap().push_back(answer);
        self
    }

    pub fn input_with(self, answer: &str) -> Self {
        self.inputs.lock().unwrap().push_back(answer.to_string());
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn is_interactive(&self) -> bool {
        true
    }

    fn confirm(&self, question: &str, default: bool) -> Result<bool, AppError> {
        self.asked.lock().unwrap().push(question.to_string());
        Ok(self.confirms.lock().unwrap().pop_front().unwrap_or(default))
    }

    fn input(&self, question: &str, default: &str) -> Result<String, AppError> {
        self.asked.lock().unwrap().push(question.to_string());
        Ok(self.inputs.lock().unwrap().pop_front().unwrap_or_else(|| default.to_string()))
    }

    fn select(&self, question: &str, _items: &[&str], default: usize) -> Result<usize, AppError> {
        self.asked.lock().unwrap().push(question.to_string());
        Ok(default)
    }

    fn password(&self, question: &str) -> Result<String, AppError> {
        self.asked.lock().unwrap().push(question.to_string());
        Ok(self.inputs.lock().unwrap().pop_front().unwrap_or_else(|| "password".to_string()))
    }
}
