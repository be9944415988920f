//! Error types for device setup.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::filter::Pid;

/// Exit status for a failed device, tuning or filter operation.
pub const EXIT_DEVICE_FAILURE: u8 = 2;
/// Exit status for a device path that could not be constructed.
pub const EXIT_PATH_FAILURE: u8 = 3;

/// Failures that abort the whole run.
#[derive(Error, Debug)]
pub enum DvbError {
    /// A device endpoint could not be opened.
    #[error("failed opening '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The frontend rejected the tune command.
    #[error("ioctl(FE_SET_FRONTEND) failed for {frequency} Hz on '{}': {source}", .path.display())]
    Tune {
        path: PathBuf,
        frequency: u32,
        #[source]
        source: io::Error,
    },

    /// The frequency argument is not a 32-bit number.
    #[error("invalid frequency: '{0}'")]
    InvalidFrequency(String),

    /// A PID outside 1..=0x1FFE was requested.
    #[error("pid out of range: {0}")]
    PidOutOfRange(i64),

    /// A PID argument that is not a number at all.
    #[error("pid out of range: '{0}' is not a number")]
    InvalidPid(String),

    /// The demultiplexer rejected the PES filter.
    #[error("ioctl(DMX_SET_PES_FILTER) for pid {pid} (0x{pid:04x}) failed on '{}': {source}", .path.display())]
    Filter {
        path: PathBuf,
        pid: Pid,
        #[source]
        source: io::Error,
    },

    /// A device path exceeded the path buffer.
    #[error("device path too long: '{0}'")]
    Path(String),
}

impl DvbError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            DvbError::Path(_) => EXIT_PATH_FAILURE,
            _ => EXIT_DEVICE_FAILURE,
        }
    }
}
