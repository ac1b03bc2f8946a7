//! Link derivation around best-effort address discovery.

use tracing::warn;

use crate::domain::{Link, MasqueradeDomain, Port, Secret, derive_links};
use crate::ports::PublicAddressLookup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub links: Vec<Link>,
    /// Set when no public address could be discovered.
    pub warning: Option<String>,
}

/// Never fails: without an address the links carry a placeholder.
pub fn discover_links(
    lookup: &dyn PublicAddressLookup,
    secret: &Secret,
    domain: &MasqueradeDomain,
    listen_port: Port,
) -> LinkReport {
    let ipv4 = lookup.ipv4();
    let ipv6 = lookup.ipv6();
    let warning = if ipv4.is_none() && ipv6.is_none() {
        warn!("public address discovery failed");
        Some(
            "Could not determine this server's public address; replace YOUR_SERVER_IP in the links below."
                .to_string(),
        )
    } else {
        None
    };
    LinkReport { links: derive_links(secret, domain, listen_port, ipv4, ipv6), warning }
}
