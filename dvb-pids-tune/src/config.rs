//! Environment overrides, read once at startup.
//!
//! | Variable           | Default |
//! |--------------------|---------|
//! | `DVB_ADAPTER`      | 0       |
//! | `DVB_FRONTEND`     | 0       |
//! | `DVB_DEMUX`        | 0       |
//! | `DVB_STATUS_USECS` | 1000000 |
//!
//! Values are read the way `atoi` reads them: leading whitespace is skipped
//! and the leading run of digits counts. Anything else keeps the default.

use std::time::Duration;

use crate::device::DeviceLocator;

pub const ENV_ADAPTER: &str = "DVB_ADAPTER";
pub const ENV_FRONTEND: &str = "DVB_FRONTEND";
pub const ENV_DEMUX: &str = "DVB_DEMUX";
pub const ENV_STATUS_USECS: &str = "DVB_STATUS_USECS";

pub const DEFAULT_STATUS_USECS: u64 = 1_000_000;

/// Configuration snapshot passed to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub device: DeviceLocator,
    pub interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device: DeviceLocator::default(),
            interval: Duration::from_micros(DEFAULT_STATUS_USECS),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let index = |name: &str| lookup(name).and_then(|v| parse_index(&v)).unwrap_or(0);

        Self {
            device: DeviceLocator::new(index(ENV_ADAPTER), index(ENV_FRONTEND), index(ENV_DEMUX)),
            interval: lookup(ENV_STATUS_USECS)
                .and_then(|v| parse_usecs(&v))
                .map(Duration::from_micros)
                .unwrap_or(Duration::from_micros(DEFAULT_STATUS_USECS)),
        }
    }

    /// Apply command line overrides on top of the environment.
    pub fn override_with(
        mut self,
        adapter: Option<u32>,
        frontend: Option<u32>,
        demux: Option<u32>,
        interval_usecs: Option<u64>,
    ) -> Self {
        if let Some(a) = adapter {
            self.device.adapter = a;
        }
        if let Some(f) = frontend {
            self.device.frontend = f;
        }
        if let Some(d) = demux {
            self.device.demux = d;
        }
        if let Some(us) = interval_usecs.filter(|&us| us > 0) {
            self.interval = Duration::from_micros(us);
        }
        self
    }
}

/// `0x` hex, or else an `atoi`-style leading integer. `None` when there are
/// no digits or the value overflows.
pub(crate) fn parse_number(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.starts_with("0x") {
        return clap_num::maybe_hex::<u64>(s)
            .ok()
            .and_then(|v| i64::try_from(v).ok());
    }
    leading_int(s)
}

/// `atoi`-style leading integer. `None` when there are no digits or it overflows.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_index(s: &str) -> Option<u32> {
    leading_int(s).and_then(|v| u32::try_from(v).ok())
}

fn parse_usecs(s: &str) -> Option<u64> {
    leading_int(s).filter(|&v| v > 0).map(|v| v as u64)
}
