use std::net::{Ipv4Addr, Ipv6Addr};

/// Port for discovering this host's public addresses. Best effort.
pub trait PublicAddressLookup {
    fn ipv4(&self) -> Option<Ipv4Addr>;
    fn ipv6(&self) -> Option<Ipv6Addr>;
}
