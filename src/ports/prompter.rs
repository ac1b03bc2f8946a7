use crate::domain::AppError;

/// Port for asking the operator. Non-interactive implementations answer with
/// the given defaults.
pub trait Prompter {
    fn is_interactive(&self) -> bool;

    fn confirm(&self, question: &str, default: bool) -> Result<bool, AppError>;

    fn input(&self, question: &str, default: &str) -> Result<String, AppError>;

    /// Pick one of `items`; returns its index.
    fn select(&self, question: &str, items: &[&str], default: usize) -> Result<usize, AppError>;

    fn password(&self, question: &str) -> Result<String, AppError>;
}
