//! Device path resolution.
//!
//! A DVB adapter exposes its endpoints under `/dev/dvb/adapterN/`:
//! `frontendM` for tuning and `demuxK` for filter setup.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::tuner::DvbError;

/// Root of the DVB device tree, up to the adapter index.
pub const PATH_ADAPTER: &str = "/dev/dvb/adapter";

/// Longest device path accepted (a 32 byte buffer with its terminator).
pub const MAX_DEVICE_PATH_LEN: usize = 31;

/// Adapter, frontend and demux indexes of the device to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceLocator {
    pub adapter: u32,
    pub frontend: u32,
    pub demux: u32,
}

/// Resolved endpoint paths. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePaths {
    frontend: PathBuf,
    demux: PathBuf,
}

impl DevicePaths {
    pub fn frontend(&self) -> &Path {
        &self.frontend
    }

    pub fn demux(&self) -> &Path {
        &self.demux
    }
}

impl fmt::Display for DevicePaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "frontend: '{}'", self.frontend.display())?;
        write!(f, "demux: '{}'", self.demux.display())
    }
}

impl DeviceLocator {
    pub fn new(adapter: u32, frontend: u32, demux: u32) -> Self {
        Self {
            adapter,
            frontend,
            demux,
        }
    }

    pub fn resolve(&self) -> Result<DevicePaths, DvbError> {
        Ok(DevicePaths {
            frontend: endpoint(self.adapter, "frontend", self.frontend)?,
            demux: endpoint(self.adapter, "demux", self.demux)?,
        })
    }
}

fn endpoint(adapter: u32, kind: &str, index: u32) -> Result<PathBuf, DvbError> {
    let path = format!("{}{}/{}{}", PATH_ADAPTER, adapter, kind, index);
    if path.len() > MAX_DEVICE_PATH_LEN {
        return Err(DvbError::Path(path));
    }
    Ok(PathBuf::from(path))
}
