use crate::domain::Port;

/// Port for the panel's health endpoint.
pub trait ReadinessProbe {
    /// True once the panel answers its health check on `port`.
    fn is_ready(&self, port: Port) -> bool;
}
