use crate::domain::Port;

/// Port for checking whether a listen port can be bound on this host.
pub trait PortChecker {
    fn is_free(&self, port: Port) -> bool;
}
