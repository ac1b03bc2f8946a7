pub mod compose_command;
pub mod dialoguer_prompter;
pub mod git_source;
pub mod health_http;
pub mod installation_filesystem;
pub mod port_probe;
pub mod public_ip_http;
pub mod template_cache;
pub mod template_http;
