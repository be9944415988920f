use std::io;
use std::io::ErrorKind;
use std::path::Path;

use crate::filter::Pid;
use crate::tuner::{DvbDevice, DvbError, FrontendStatus};

const UNSUPPORTED_MSG: &str = "DVB device access is not supported on this platform (supported: Linux)";

fn unsupported() -> io::Error {
    io::Error::new(ErrorKind::Unsupported, UNSUPPORTED_MSG)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxDvb;

pub struct Frontend {
    _private: (),
}

pub struct Demux {
    _private: (),
}

impl DvbDevice for LinuxDvb {
    type Frontend = Frontend;
    type Filter = Demux;

    fn tune_frontend(&self, path: &Path, _frequency: u32) -> Result<Frontend, DvbError> {
        Err(DvbError::Open {
            path: path.to_path_buf(),
            source: unsupported(),
        })
    }

    fn add_pes_filter(&self, path: &Path, _pid: Pid) -> Result<Demux, DvbError> {
        Err(DvbError::Open {
            path: path.to_path_buf(),
            source: unsupported(),
        })
    }
}

impl FrontendStatus for Frontend {
    fn read_status(&self) -> io::Result<u32> {
        Err(unsupported())
    }

    fn read_signal_strength(&self) -> io::Result<u16> {
        Err(unsupported())
    }

    fn read_snr(&self) -> io::Result<u16> {
        Err(unsupported())
    }

    fn read_ber(&self) -> io::Result<u32> {
        Err(unsupported())
    }

    fn read_uncorrected_blocks(&self) -> io::Result<u32> {
        Err(unsupported())
    }
}
