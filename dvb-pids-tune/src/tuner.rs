use std::io;
use std::io::Write;
use std::path::Path;

use log::debug;

use crate::config::parse_number;
use crate::filter::Pid;

pub use self::error::DvbError;
#[cfg(target_os = "linux")]
pub use self::linux::{Demux, Frontend, LinuxDvb};
#[cfg(not(target_os = "linux"))]
pub use self::unsupported::{Demux, Frontend, LinuxDvb};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod unsupported;

pub mod error;

/// `fe_modulation::VSB_8`, the only modulation this tool requests (ATSC).
pub const VSB_8: u32 = 7;

/// Frontend status bits (`fe_status_t`).
pub mod fe_status {
    pub const FE_HAS_SIGNAL: u32 = 0x01;
    pub const FE_HAS_CARRIER: u32 = 0x02;
    pub const FE_HAS_VITERBI: u32 = 0x04;
    pub const FE_HAS_SYNC: u32 = 0x08;
    pub const FE_HAS_LOCK: u32 = 0x10;
    pub const FE_TIMEDOUT: u32 = 0x20;
    pub const FE_REINIT: u32 = 0x40;
}

/// Read side of a tuned frontend. Each query is independent.
pub trait FrontendStatus {
    fn read_status(&self) -> io::Result<u32>;
    fn read_signal_strength(&self) -> io::Result<u16>;
    fn read_snr(&self) -> io::Result<u16>;
    fn read_ber(&self) -> io::Result<u32>;
    fn read_uncorrected_blocks(&self) -> io::Result<u32>;
}

/// Access to the frontend and demux endpoints of one adapter.
///
/// Returned sessions release their handle on drop.
pub trait DvbDevice {
    type Frontend: FrontendStatus;
    type Filter;

    /// Open `path` read-write and issue the tune command.
    fn tune_frontend(&self, path: &Path, frequency: u32) -> Result<Self::Frontend, DvbError>;

    /// Open a fresh read-only demux handle and start a PES filter for `pid`.
    fn add_pes_filter(&self, path: &Path, pid: Pid) -> Result<Self::Filter, DvbError>;
}

/// Read a frequency argument in Hz, `0x` hex or decimal read like `atoi`.
pub fn parse_frequency(arg: &str) -> Result<u32, DvbError> {
    parse_number(arg)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| DvbError::InvalidFrequency(arg.to_string()))
}

pub fn tuning_line(frequency: u32) -> String {
    format!("tuning: {} Hz", frequency)
}

/// Announce the frequency, then command the frontend to tune.
///
/// Returns as soon as the driver accepted the parameters; lock is acquired
/// asynchronously and only observed by the status reporter.
pub fn tune<D, W>(
    device: &D,
    frontend: &Path,
    frequency: u32,
    out: &mut W,
) -> Result<D::Frontend, DvbError>
where
    D: DvbDevice,
    W: Write,
{
    let _ = writeln!(out, "{}", tuning_line(frequency)).and_then(|_| out.flush());

    let session = device.tune_frontend(frontend, frequency)?;
    debug!("{} accepted {} Hz (VSB_8)", frontend.display(), frequency);
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuning_line() {
        assert_eq!(tuning_line(617028615), "tuning: 617028615 Hz");
    }

    #[test]
    fn test_parse_frequency() {
        assert_eq!(parse_frequency("617028615").unwrap(), 617028615);
        assert_eq!(parse_frequency("0x24c71c07").unwrap(), 617028615);
        assert_eq!(parse_frequency("0").unwrap(), 0);
        for bad in ["abc", "4294967296", "-5", ""] {
            let err = parse_frequency(bad).unwrap_err();
            assert!(matches!(err, DvbError::InvalidFrequency(_)), "{}", bad);
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn test_lock_is_single_bit() {
        use fe_status::*;
        let all = FE_HAS_SIGNAL
            | FE_HAS_CARRIER
            | FE_HAS_VITERBI
            | FE_HAS_SYNC
            | FE_HAS_LOCK
            | FE_TIMEDOUT
            | FE_REINIT;
        assert_eq!(all, 0x7f);
        assert_eq!(FE_HAS_LOCK.count_ones(), 1);
    }
}
