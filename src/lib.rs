//! mtdeploy: install and maintain a Fake-TLS MTProxy deployment
//! (Traefik TLS router + telemt + optional admin panel).

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use app::api::*;
