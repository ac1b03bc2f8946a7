pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
mod context;
pub mod services;

pub use context::{Adapters, AppContext};
