//! Setup sequence: resolve paths, tune, attach filters, report status.

use std::io::Write;

use log::{info, warn};

use crate::config::Settings;
use crate::filter::{attach_all, parse_pids};
use crate::status::{Limits, Shutdown, StatusReporter};
use crate::tuner::{parse_frequency, tune, DvbDevice, DvbError};

/// What the operator asked for on the command line.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    pub frequency: &'a str,
    pub pids: &'a [String],
    pub limits: Limits,
}

/// Run the whole sequence against `device`, writing operator lines to `out`.
///
/// The frequency and every PID are validated before the first device is
/// opened. Sessions are released in reverse order when this returns, on
/// success or failure.
/// Returns the number of status lines printed.
pub fn run<D, W>(
    device: &D,
    settings: &Settings,
    request: &Request<'_>,
    shutdown: &Shutdown,
    out: &mut W,
) -> Result<u64, DvbError>
where
    D: DvbDevice,
    W: Write,
{
    let frequency = parse_frequency(request.frequency)?;
    let pids = parse_pids(request.pids)?;
    let paths = settings.device.resolve()?;
    let _ = writeln!(out, "{}", paths).and_then(|_| out.flush());

    let frontend = tune(device, paths.frontend(), frequency, out)?;
    let _filters = attach_all(device, paths.demux(), &pids, out)?;
    info!(
        "{} PID filter(s) active, status every {:?}",
        pids.len(),
        settings.interval
    );

    let printed = match StatusReporter::new(&frontend).run(
        settings.interval,
        request.limits,
        shutdown,
        out,
    ) {
        Ok(n) => n,
        Err(e) => {
            warn!("status output closed: {}", e);
            0
        }
    };
    Ok(printed)
}
