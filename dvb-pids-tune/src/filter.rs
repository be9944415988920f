//! PES filter attachment.
//!
//! Each requested PID gets its own demux handle with a filter that routes
//! matching packets to the dvr device (`DMX_OUT_TS_TAP`).

use std::fmt;
use std::io::Write;
use std::path::Path;

use log::debug;

use crate::config::parse_number;
use crate::tuner::{DvbDevice, DvbError};

/// Upper bound of the PID space. 0x1FFF itself is the null packet PID.
pub const PID_LIMIT: u16 = 0x1FFF;

/// Packet identifier in the range `1..0x1FFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(u16);

impl Pid {
    /// Validate a raw identifier.
    pub fn new(raw: i64) -> Result<Self, DvbError> {
        if raw <= 0 || raw >= i64::from(PID_LIMIT) {
            return Err(DvbError::PidOutOfRange(raw));
        }
        Ok(Pid(raw as u16))
    }

    /// Parse a command line argument, `0x` hex or decimal read like `atoi`.
    pub fn parse(arg: &str) -> Result<Self, DvbError> {
        let raw = parse_number(arg).ok_or_else(|| DvbError::InvalidPid(arg.to_string()))?;
        Self::new(raw)
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Parse and validate every PID before any device is touched.
///
/// The first bad argument fails the whole batch.
pub fn parse_pids<S: AsRef<str>>(args: &[S]) -> Result<Vec<Pid>, DvbError> {
    args.iter().map(|a| Pid::parse(a.as_ref())).collect()
}

/// The line announced before a filter is installed.
pub fn attach_line(pid: Pid) -> String {
    format!("adding: pid {} (0x{:04x})", pid, pid)
}

/// Announce `pid` and install its filter on a fresh demux handle.
pub fn attach<D, W>(
    device: &D,
    demux: &Path,
    pid: Pid,
    out: &mut W,
) -> Result<D::Filter, DvbError>
where
    D: DvbDevice,
    W: Write,
{
    // Announcement is best effort; a closed stdout must not stop the capture.
    let _ = writeln!(out, "{}", attach_line(pid)).and_then(|_| out.flush());

    let filter = device.add_pes_filter(demux, pid)?;
    debug!("PES filter for pid {} active on {}", pid, demux.display());
    Ok(filter)
}

/// Attach every PID in order. Stops at the first failure; filters already
/// installed are released when the returned error drops them.
pub fn attach_all<D, W>(
    device: &D,
    demux: &Path,
    pids: &[Pid],
    out: &mut W,
) -> Result<Vec<D::Filter>, DvbError>
where
    D: DvbDevice,
    W: Write,
{
    let mut filters = Vec::with_capacity(pids.len());
    for &pid in pids {
        filters.push(attach(device, demux, pid, out)?);
    }
    Ok(filters)
}
