use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use url::Url;

use crate::domain::layout::BUILD_ROOT_MARKERS;
use crate::domain::{AppError, Port};
use crate::ports::{PortChecker, PublicAddressLookup, ReadinessProbe, SourceTree};

#[derive(Clone, Default)]
pub struct FakeAddresses {
    pub v4: Option<Ipv4Addr>,
    pub v6: Option<Ipv6Addr>,
}

impl FakeAddresses {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn v4(addr: Ipv4Addr) -> Self {
        Self { v4: Some(addr), v6: None }
    }
}

impl PublicAddressLookup for FakeAddresses {
    fn ipv4(&self) -> Option<Ipv4Addr> {
        self.v4
    }

    fn ipv6(&self) -> Option<Ipv6Addr> {
        self.v6
    }
}

#[derive(Clone)]
pub struct FakeReadiness {
    ready: bool,
    polls: Arc<Mutex<u32>>,
}

impl FakeReadiness {
    pub fn ready() -> Self {
        Self { ready: true, polls: Arc::default() }
    }

    pub fn never() -> Self {
        Self { ready: false, polls: Arc::default() }
    }

    pub fn polls(&self) -> u32 {
        *self.polls.lock().unwrap()
    }
}

impl ReadinessProbe for FakeReadiness {
    fn is_ready(&self, _port: Port) -> bool {
        *self.polls.lock().unwrap() += 1;
        self.ready
    }
}

/// Ports listed in `busy` are taken; everything else is free.
#[derive(Clone, Default)]
pub struct FakePorts {
    pub busy: Vec<u16>,
}

impl PortChecker for FakePorts {
    fn is_free(&self, port: Port) -> bool {
        !self.busy.contains(&port.get())
    }
}

/// Pretends to clone by writing the build root markers.
#[derive(Clone, Default)]
pub struct FakeSourceTree {
    synced: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeSourceTree {
    pub fn synced(&self) -> Vec<PathBuf> {
        self.synced.lock().unwrap().clone()
    }
}

impl SourceTree for FakeSourceTree {
    fn sync(&self, _repository: &Url, _branch: Option<&str>, dest: &Path) -> Result<(), AppError> {
        std::fs::create_dir_all(dest)?;
        for marker in BUILD_ROOT_MARKERS {
            std::fs::write(dest.join(marker), "")?;
        }
        self.synced.lock().unwrap().push(dest.to_path_buf());
        Ok(())
    }
}
