use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::domain::template::{
    COMPOSE_BUILD, COMPOSE_PANEL_BUILD, COMPOSE_PANEL_PREBUILT, COMPOSE_PREBUILT, PROXY_CONFIG,
    ROUTER_RULE,
};
use crate::domain::{AppError, TemplateOrigin, TemplateSet};
use crate::ports::TemplateFetcher;

pub fn shipped_templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn shipped(name: &str) -> Option<&'static str> {
    match name {
        COMPOSE_BUILD => Some(include_str!("../../templates/docker-compose.build.yml")),
        COMPOSE_PREBUILT => Some(include_str!("../../templates/docker-compose.prebuilt.yml")),
        COMPOSE_PANEL_BUILD => Some(include_str!("../../templates/docker-compose.panel.build.yml")),
        COMPOSE_PANEL_PREBUILT => {
            Some(include_str!("../../templates/docker-compose.panel.prebuilt.yml"))
        }
        PROXY_CONFIG => Some(include_str!("../../templates/telemt.toml")),
        ROUTER_RULE => Some(include_str!("../../templates/traefik-tcp.yml")),
        _ => None,
    }
}

/// The templates shipped in `templates/`, as an in-memory set.
pub fn sample_templates() -> TemplateSet {
    let files: BTreeMap<String, String> = [
        COMPOSE_BUILD,
        COMPOSE_PREBUILT,
        COMPOSE_PANEL_BUILD,
        COMPOSE_PANEL_PREBUILT,
        PROXY_CONFIG,
        ROUTER_RULE,
    ]
    .iter()
    .filter_map(|name| shipped(name).map(|body| (name.to_string(), body.to_string())))
    .collect();
    TemplateSet::new(files, TemplateOrigin::LocalCheckout(shipped_templates_dir()))
}

/// Serves the shipped templates (or fails) and counts requests.
#[derive(Clone)]
pub struct CountingFetcher {
    serve: bool,
    calls: Arc<Mutex<usize>>,
}

impl CountingFetcher {
    pub fn serving_shipped() -> Self {
        Self { serve: true, calls: Arc::default() }
    }

    pub fn failing() -> Self {
        Self { serve: false, calls: Arc::default() }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl TemplateFetcher for CountingFetcher {
    fn fetch(&self, name: &str) -> Result<String, AppError> {
        *self.calls.lock().unwrap() += 1;
        match shipped(name) {
            Some(body) if self.serve => Ok(body.to_string()),
            _ => Err(AppError::TemplateFetchFailed {
                name: name.to_string(),
                details: "connection refused".to_string(),
            }),
        }
    }
}
