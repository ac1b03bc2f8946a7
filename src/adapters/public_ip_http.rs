//! Public address discovery over plain-text "what is my IP" endpoints.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::domain::tool_config::DiscoveryConfig;
use crate::ports::PublicAddressLookup;

/// Tries each endpoint in order; the first syntactically valid answer wins.
#[derive(Debug, Clone)]
pub struct HttpAddressLookup {
    ipv4_endpoints: Vec<Url>,
    ipv6_endpoints: Vec<Url>,
    client: Option<Client>,
}

impl HttpAddressLookup {
    pub fn new(config: &DiscoveryConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| debug!(error = %e, "address lookup client unavailable"))
            .ok();
        Self {
            ipv4_endpoints: config.ipv4_endpoints.clone(),
            ipv6_endpoints: config.ipv6_endpoints.clone(),
            client,
        }
    }

    fn first_answer(&self, endpoints: &[Url]) -> Option<IpAddr> {
        let client = self.client.as_ref()?;
        endpoints.iter().find_map(|endpoint| {
            let response = client.get(endpoint.clone()).send().ok()?;
            if !response.status().is_success() {
                debug!(%endpoint, status = %response.status(), "address endpoint refused");
                return None;
            }
            let body = response.text().ok()?;
            let parsed = body.trim().parse::<IpAddr>().ok();
            if parsed.is_none() {
                debug!(%endpoint, "address endpoint returned garbage");
            }
            parsed
        })
    }
}

impl PublicAddressLookup for HttpAddressLookup {
    fn ipv4(&self) -> Option<Ipv4Addr> {
        match self.first_answer(&self.ipv4_endpoints)? {
            IpAddr::V4(addr) => Some(addr),
            IpAddr::V6(addr) => addr.to_ipv4_mapped(),
        }
    }

    fn ipv6(&self) -> Option<Ipv6Addr> {
        match self.first_answer(&self.ipv6_endpoints)? {
            IpAddr::V6(addr) if addr.to_ipv4_mapped().is_none() => Some(addr),
            _ => None,
        }
    }
}
