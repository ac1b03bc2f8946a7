//! Panel readiness over its `/health` endpoint.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::domain::Port;
use crate::ports::ReadinessProbe;

pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone)]
pub struct HttpReadinessProbe {
    host: String,
    client: Option<Client>,
}

impl HttpReadinessProbe {
    pub fn new(host: impl Into<String>) -> Self {
        let client = Client::builder().timeout(Duration::from_secs(3)).build().ok();
        Self { host: host.into(), client }
    }

    pub fn local() -> Self {
        Self::new("127.0.0.1")
    }

    fn url(&self, port: Port) -> String {
        format!("http://{}:{}{}", self.host, port, HEALTH_PATH)
    }
}

impl ReadinessProbe for HttpReadinessProbe {
    fn is_ready(&self, port: Port) -> bool {
        let Some(client) = &self.client else {
            return false;
        };
        client
            .get(self.url(port))
            .send()
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }
}
