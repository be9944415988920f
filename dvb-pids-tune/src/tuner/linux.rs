use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::filter::Pid;
use crate::tuner::{DvbDevice, DvbError, FrontendStatus, VSB_8};

// linux/dvb/frontend.h
const INVERSION_AUTO: u32 = 2;

// linux/dvb/dmx.h
const DMX_IN_FRONTEND: u32 = 0;
const DMX_OUT_TS_TAP: u32 = 2;
const DMX_PES_OTHER: u32 = 20;
const DMX_IMMEDIATE_START: u32 = 4;

#[repr(C)]
#[derive(Clone, Copy)]
struct VsbParameters {
    modulation: u32,
}

/// Delivery-system specific part of `dvb_frontend_parameters`.
/// The OFDM member is the largest (seven words) and fixes the size.
#[repr(C)]
#[derive(Clone, Copy)]
union FrontendUnion {
    vsb: VsbParameters,
    ofdm: [u32; 7],
}

#[repr(C)]
struct DvbFrontendParameters {
    frequency: u32,
    inversion: u32,
    u: FrontendUnion,
}

impl DvbFrontendParameters {
    fn vsb8(frequency: u32) -> Self {
        let mut u = FrontendUnion { ofdm: [0; 7] };
        u.vsb = VsbParameters { modulation: VSB_8 };
        Self {
            frequency,
            inversion: INVERSION_AUTO,
            u,
        }
    }
}

#[repr(C)]
struct DmxPesFilterParams {
    pid: u16,
    input: u32,
    output: u32,
    pes_type: u32,
    flags: u32,
}

impl DmxPesFilterParams {
    fn ts_tap(pid: Pid) -> Self {
        Self {
            pid: pid.value(),
            input: DMX_IN_FRONTEND,
            output: DMX_OUT_TS_TAP,
            pes_type: DMX_PES_OTHER,
            flags: DMX_IMMEDIATE_START,
        }
    }
}

nix::ioctl_write_ptr!(fe_set_frontend, b'o', 76, DvbFrontendParameters);
nix::ioctl_read!(fe_read_status, b'o', 69, u32);
nix::ioctl_read!(fe_read_ber, b'o', 70, u32);
nix::ioctl_read!(fe_read_signal_strength, b'o', 71, u16);
nix::ioctl_read!(fe_read_snr, b'o', 72, u16);
nix::ioctl_read!(fe_read_uncorrected_blocks, b'o', 73, u32);
nix::ioctl_none!(dmx_stop, b'o', 42);
nix::ioctl_write_ptr!(dmx_set_pes_filter, b'o', 44, DmxPesFilterParams);

/// The kernel DVB character devices.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxDvb;

/// A tuned frontend. Closed on drop.
pub struct Frontend {
    file: File,
    path: PathBuf,
}

/// A started PES filter on its own demux handle. Stopped and closed on drop.
pub struct Demux {
    file: File,
    pid: Pid,
}

fn open(path: &Path, write: bool) -> Result<File, DvbError> {
    OpenOptions::new()
        .read(true)
        .write(write)
        .open(path)
        .map_err(|source| DvbError::Open {
            path: path.to_path_buf(),
            source,
        })
}

impl DvbDevice for LinuxDvb {
    type Frontend = Frontend;
    type Filter = Demux;

    fn tune_frontend(&self, path: &Path, frequency: u32) -> Result<Frontend, DvbError> {
        let file = open(path, true)?;
        let params = DvbFrontendParameters::vsb8(frequency);

        unsafe { fe_set_frontend(file.as_raw_fd(), &params) }.map_err(|e| DvbError::Tune {
            path: path.to_path_buf(),
            frequency,
            source: io::Error::from(e),
        })?;

        Ok(Frontend {
            file,
            path: path.to_path_buf(),
        })
    }

    fn add_pes_filter(&self, path: &Path, pid: Pid) -> Result<Demux, DvbError> {
        let file = open(path, false)?;
        let params = DmxPesFilterParams::ts_tap(pid);

        unsafe { dmx_set_pes_filter(file.as_raw_fd(), &params) }.map_err(|e| {
            DvbError::Filter {
                path: path.to_path_buf(),
                pid,
                source: io::Error::from(e),
            }
        })?;

        Ok(Demux { file, pid })
    }
}

macro_rules! read_field {
    ($file:expr, $ioctl:ident, $ty:ty) => {{
        let mut value: $ty = 0;
        unsafe { $ioctl($file.as_raw_fd(), &mut value) }
            .map(|_| value)
            .map_err(io::Error::from)
    }};
}

impl FrontendStatus for Frontend {
    fn read_status(&self) -> io::Result<u32> {
        read_field!(self.file, fe_read_status, u32)
    }

    fn read_signal_strength(&self) -> io::Result<u16> {
        read_field!(self.file, fe_read_signal_strength, u16)
    }

    fn read_snr(&self) -> io::Result<u16> {
        read_field!(self.file, fe_read_snr, u16)
    }

    fn read_ber(&self) -> io::Result<u32> {
        read_field!(self.file, fe_read_ber, u32)
    }

    fn read_uncorrected_blocks(&self) -> io::Result<u32> {
        read_field!(self.file, fe_read_uncorrected_blocks, u32)
    }
}

impl Drop for Frontend {
    fn drop(&mut self) {
        debug!("closing frontend {}", self.path.display());
    }
}

impl Drop for Demux {
    fn drop(&mut self) {
        if let Err(e) = unsafe { dmx_stop(self.file.as_raw_fd()) } {
            warn!("DMX_STOP for pid {} failed: {}", self.pid, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_struct_layout_matches_kernel() {
        assert_eq!(size_of::<DvbFrontendParameters>(), 36);
        assert_eq!(size_of::<DmxPesFilterParams>(), 20);
    }

    #[test]
    fn test_vsb8_parameters() {
        let p = DvbFrontendParameters::vsb8(617028615);
        assert_eq!(p.frequency, 617028615);
        assert_eq!(p.inversion, INVERSION_AUTO);
        assert_eq!(unsafe { p.u.vsb.modulation }, VSB_8);
        let words = unsafe { p.u.ofdm };
        assert_eq!(words[1..], [0; 6]);
    }

    #[test]
    fn test_pes_filter_parameters() {
        let p = DmxPesFilterParams::ts_tap(Pid::new(49).unwrap());
        assert_eq!(p.pid, 49);
        assert_eq!(p.input, DMX_IN_FRONTEND);
        assert_eq!(p.output, DMX_OUT_TS_TAP);
        assert_eq!(p.pes_type, DMX_PES_OTHER);
        assert_eq!(p.flags, DMX_IMMEDIATE_START);
    }

    #[test]
    fn test_missing_device_is_open_error() {
        let path = Path::new("/nonexistent/dvb/adapter0/frontend0");
        match LinuxDvb.tune_frontend(path, 617028615) {
            Err(DvbError::Open { path: p, .. }) => assert_eq!(p, path),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("opened a nonexistent device"),
        }
    }
}
