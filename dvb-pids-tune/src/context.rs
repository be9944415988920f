use std::time::Duration;

use clap::error::ErrorKind;
use clap::Parser;

use crate::status::Limits;

/// Short form printed when the frequency or PIDs are missing.
pub const USAGE: &str = "usage: dvb-pids-tune <frequency> <pid> [pid..]";

#[derive(Debug, Parser)]
#[clap(name = "dvb-pids-tune")]
#[clap(about = "dvb-pids-tune tunes an ATSC (8VSB) frontend and routes the selected PIDs to the dvr device.", long_about = None)]
#[clap(version)]
pub struct Cli {
    /// The frequency in Hz.{n}
    /// Decimal or hexadecimal with a `0x` prefix.
    /// The frontend is tuned with 8VSB modulation.
    #[clap(allow_negative_numbers = true)]
    pub frequency: String,

    /// The PIDs to route to the dvr device.{n}
    /// Decimal or hexadecimal with a `0x` prefix. Each must be
    /// in 1..8190; a single bad PID aborts the whole run.{n}
    /// Read the stream with e.g. `cat /dev/dvb/adapter0/dvr0 > dump.ts`.
    #[clap(required = true, num_args = 1.., allow_negative_numbers = true)]
    pub pids: Vec<String>,

    /// Adapter index. Overrides DVB_ADAPTER.
    #[clap(long, value_name = "N")]
    pub adapter: Option<u32>,

    /// Frontend index. Overrides DVB_FRONTEND.
    #[clap(long, value_name = "N")]
    pub frontend: Option<u32>,

    /// Demux index. Overrides DVB_DEMUX.
    #[clap(long, value_name = "N")]
    pub demux: Option<u32>,

    /// Status polling interval in microseconds. Overrides DVB_STATUS_USECS.{n}
    /// Zero is ignored.
    #[clap(long, value_name = "usecs")]
    pub interval: Option<u64>,

    /// Stop after this many status lines.{n}
    /// If 0 or absent, status is reported until the process is stopped.
    #[clap(short = 'n', long)]
    pub count: Option<u64>,

    /// Stop reporting after this many seconds.{n}
    /// If zero, negative or absent, status is reported until the
    /// process is stopped.
    #[clap(short, long, value_name = "seconds", allow_negative_numbers = true)]
    pub time: Option<f64>,

    /// Enable debug logging.
    #[clap(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn limits(&self) -> Limits {
        Limits {
            count: self.count.filter(|&n| n > 0),
            time: self
                .time
                .filter(|t| *t > 0.0)
                .and_then(|t| Duration::try_from_secs_f64(t).ok()),
        }
    }
}

/// How a failed command line parse ends the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseExit {
    /// Help or version output; clap prints it and exits 0.
    Clap,
    /// Frequency or PIDs missing: print [`USAGE`] to stdout, exit 1.
    Usage,
    /// Anything else: print clap's diagnostic, exit 1.
    Invalid,
}

impl ParseExit {
    pub fn classify(err: &clap::Error) -> Self {
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ParseExit::Clap,
            ErrorKind::MissingRequiredArgument => ParseExit::Usage,
            _ => ParseExit::Invalid,
        }
    }

    /// Process exit status, `None` when clap exits by itself.
    pub fn exit_code(self) -> Option<u8> {
        match self {
            ParseExit::Clap => None,
            ParseExit::Usage | ParseExit::Invalid => Some(1),
        }
    }
}
