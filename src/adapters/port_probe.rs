use std::io;
use std::net::{Ipv4Addr, TcpListener};

use tracing::debug;

use crate::domain::Port;
use crate::ports::PortChecker;

/// Checks a port by binding it on all IPv4 interfaces.
#[derive(Debug, Clone, Default)]
pub struct TcpPortChecker;

impl PortChecker for TcpPortChecker {
    fn is_free(&self, port: Port) -> bool {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port.get())) {
            Ok(_) => true,
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => false,
            // Privileged ports cannot be probed without root; the runtime
            // binds them, not us.
            Err(e) => {
                debug!(port = port.get(), error = %e, "port probe inconclusive");
                true
            }
        }
    }
}
