//! Client connection links (Fake-TLS "ee" format).

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use serde::Serialize;

use crate::domain::{MasqueradeDomain, Port, Secret};

/// Placeholder used when no public address could be discovered.
pub const ADDRESS_PLACEHOLDER: &str = "YOUR_SERVER_IP";

/// Lowercase hex of the domain's UTF-8 bytes.
pub fn domain_hex(domain: &str) -> String {
    hex::encode(domain.as_bytes())
}

/// Client-facing secret: `ee` + secret + hex(domain) for standard secrets,
/// the secret unchanged otherwise.
pub fn long_secret(secret: &Secret, domain: &MasqueradeDomain) -> String {
    if secret.is_standard() {
        format!("ee{}{}", secret.expose(), domain_hex(domain.as_str()))
    } else {
        secret.expose().to_string()
    }
}

/// Address a link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkServer {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
    Placeholder,
}

impl fmt::Display for LinkServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkServer::V4(addr) => write!(f, "{}", addr),
            LinkServer::V6(addr) => write!(f, "{}", addr),
            LinkServer::Placeholder => f.write_str(ADDRESS_PLACEHOLDER),
        }
    }
}

impl LinkServer {
    pub fn family(&self) -> &'static str {
        match self {
            LinkServer::V4(_) => "ipv4",
            LinkServer::V6(_) => "ipv6",
            LinkServer::Placeholder => "unknown",
        }
    }
}

/// One derived connection link. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub server: LinkServer,
    pub port: Port,
    pub long_secret: String,
}

impl Link {
    pub fn new(server: LinkServer, port: Port, long_secret: String) -> Self {
        Self { server, port, long_secret }
    }

    fn query(&self) -> String {
        format!("server={}&port={}&secret={}", self.server, self.port, self.long_secret)
    }

    pub fn tg_url(&self) -> String {
        format!("tg://proxy?{}", self.query())
    }

    pub fn https_url(&self) -> String {
        format!("https://t.me/proxy?{}", self.query())
    }

    pub fn to_view(&self) -> LinkView {
        LinkView {
            family: self.server.family().to_string(),
            server: self.server.to_string(),
            port: self.port.get(),
            tg_link: self.tg_url(),
            https_link: self.https_url(),
        }
    }
}

/// Serializable form for `link --json`.
#[derive(Debug, Clone, Serialize)]
pub struct LinkView {
    pub family: String,
    pub server: String,
    pub port: u16,
    pub tg_link: String,
    pub https_link: String,
}

/// Links for the discovered addresses; a single placeholder link when none.
pub fn derive_links(
    secret: &Secret,
    domain: &MasqueradeDomain,
    listen_port: Port,
    ipv4: Option<Ipv4Addr>,
    ipv6: Option<Ipv6Addr>,
) -> Vec<Link> {
    let long = long_secret(secret, domain);
    let mut links = Vec::new();
    if let Some(addr) = ipv4 {
        links.push(Link::new(LinkServer::V4(addr), listen_port, long.clone()));
    }
    if let Some(addr) = ipv6 {
        links.push(Link::new(LinkServer::V6(addr), listen_port, long.clone()));
    }
    if links.is_empty() {
        links.push(Link::new(LinkServer::Placeholder, listen_port, long));
    }
    links
}
