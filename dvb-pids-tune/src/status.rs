//! Frontend status polling.
//!
//! Once tuned, the frontend is sampled at a fixed interval and one line is
//! printed per sample until a [`Shutdown`] is triggered or an optional
//! sample/time limit runs out.

use std::fmt;
use std::io;
use std::io::Write;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::tuner::fe_status::FE_HAS_LOCK;
use crate::tuner::FrontendStatus;

/// One snapshot of the five frontend counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSample {
    pub status: u32,
    pub signal: u16,
    pub snr: u16,
    pub ber: u32,
    pub uncorrected: u32,
}

impl StatusSample {
    pub fn has_lock(&self) -> bool {
        self.status & FE_HAS_LOCK != 0
    }
}

impl fmt::Display for StatusSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status {:02x} | signal {:04x} | snr {:04x} | ber {:08x} | unc {:08x} | {}",
            self.status,
            self.signal,
            self.snr,
            self.ber,
            self.uncorrected,
            if self.has_lock() { "FE_HAS_LOCK" } else { "" }
        )
    }
}

/// Cloneable termination token.
///
/// `wait_timeout` doubles as the interruptible sleep between samples.
#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(|e| e.into_inner()) = true;
        cvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleep up to `timeout`. Returns true if shutdown was requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |triggered| !*triggered)
            .unwrap_or_else(|e| e.into_inner());
        *guard
    }
}

/// Optional bounds on the polling loop. Both `None` means forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub count: Option<u64>,
    pub time: Option<Duration>,
}

/// Samples a frontend, keeping the last good value of each field.
pub struct StatusReporter<'a, F: FrontendStatus> {
    frontend: &'a F,
    last: StatusSample,
}

fn keep_last<T>(slot: &mut T, name: &str, read: io::Result<T>) {
    match read {
        Ok(v) => *slot = v,
        Err(e) => warn!("{} read failed, showing previous value: {}", name, e),
    }
}

impl<'a, F: FrontendStatus> StatusReporter<'a, F> {
    pub fn new(frontend: &'a F) -> Self {
        Self {
            frontend,
            last: StatusSample::default(),
        }
    }

    /// Query all five fields. A failed query leaves that field stale.
    pub fn sample(&mut self) -> StatusSample {
        let fe = self.frontend;
        keep_last(&mut self.last.status, "FE_READ_STATUS", fe.read_status());
        keep_last(&mut self.last.signal, "FE_READ_SIGNAL_STRENGTH", fe.read_signal_strength());
        keep_last(&mut self.last.snr, "FE_READ_SNR", fe.read_snr());
        keep_last(&mut self.last.ber, "FE_READ_BER", fe.read_ber());
        keep_last(
            &mut self.last.uncorrected,
            "FE_READ_UNCORRECTED_BLOCKS",
            fe.read_uncorrected_blocks(),
        );
        self.last
    }

    /// Print one line per `interval` until stopped. Returns the number of
    /// lines written.
    pub fn run<W: Write>(
        &mut self,
        interval: Duration,
        limits: Limits,
        shutdown: &Shutdown,
        out: &mut W,
    ) -> io::Result<u64> {
        let deadline = limits.time.map(|t| Instant::now() + t);
        let mut printed = 0u64;

        debug!("polling frontend status every {:?}", interval);
        while !shutdown.is_triggered() {
            let sample = self.sample();
            writeln!(out, "{}", sample)?;
            out.flush()?;
            printed += 1;

            if limits.count.is_some_and(|n| printed >= n) {
                break;
            }

            let pause = match deadline {
                Some(d) => match d.checked_duration_since(Instant::now()) {
                    Some(left) if !left.is_zero() => left.min(interval),
                    _ => break,
                },
                None => interval,
            };
            if shutdown.wait_timeout(pause) {
                break;
            }
        }
        Ok(printed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::thread;

    struct FakeFrontend {
        status: u32,
        fail_snr_after: Option<u32>,
        reads: Cell<u32>,
    }

    impl FakeFrontend {
        fn locked() -> Self {
            Self {
                status: 0x1f,
                fail_snr_after: None,
                reads: Cell::new(0),
            }
        }
    }

    impl FrontendStatus for FakeFrontend {
        fn read_status(&self) -> io::Result<u32> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.status)
        }
        fn read_signal_strength(&self) -> io::Result<u16> {
            Ok(0xabcd)
        }
        fn read_snr(&self) -> io::Result<u16> {
            match self.fail_snr_after {
                Some(n) if self.reads.get() > n => Err(io::Error::from(io::ErrorKind::Other)),
                _ => Ok(0x0100 + self.reads.get() as u16),
            }
        }
        fn read_ber(&self) -> io::Result<u32> {
            Ok(2)
        }
        fn read_uncorrected_blocks(&self) -> io::Result<u32> {
            Ok(0x10)
        }
    }

    #[test]
    fn test_line_format_locked() {
        let s = StatusSample {
            status: 0x1f,
            signal: 0xabcd,
            snr: 0x0123,
            ber: 2,
            uncorrected: 0x10,
        };
        assert_eq!(
            s.to_string(),
            "status 1f | signal abcd | snr 0123 | ber 00000002 | unc 00000010 | FE_HAS_LOCK"
        );
    }

    #[test]
    fn test_line_format_unlocked() {
        let s = StatusSample {
            status: 0x03,
            ..Default::default()
        };
        assert!(!s.has_lock());
        assert_eq!(
            s.to_string(),
            "status 03 | signal 0000 | snr 0000 | ber 00000000 | unc 00000000 | "
        );
    }

    #[test]
    fn test_failed_read_keeps_previous_value() {
        let fe = FakeFrontend {
            fail_snr_after: Some(1),
            ..FakeFrontend::locked()
        };
        let mut reporter = StatusReporter::new(&fe);
        let first = reporter.sample();
        assert_eq!(first.snr, 0x0101);
        let second = reporter.sample();
        assert_eq!(second.snr, 0x0101);
        assert_eq!(second.signal, 0xabcd);
    }

    #[test]
    fn test_count_limit() {
        let fe = FakeFrontend::locked();
        let mut out = Vec::new();
        let limits = Limits {
            count: Some(3),
            time: None,
        };
        let printed = StatusReporter::new(&fe)
            .run(Duration::from_millis(1), limits, &Shutdown::new(), &mut out)
            .unwrap();
        assert_eq!(printed, 3);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.ends_with("| FE_HAS_LOCK")));
    }

    #[test]
    fn test_pre_triggered_shutdown_prints_nothing() {
        let fe = FakeFrontend::locked();
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let mut out = Vec::new();
        let printed = StatusReporter::new(&fe)
            .run(Duration::from_secs(1), Limits::default(), &shutdown, &mut out)
            .unwrap();
        assert_eq!(printed, 0);
        assert!(out.is_empty());
        assert_eq!(fe.reads.get(), 0);
    }

    #[test]
    fn test_shutdown_interrupts_sleep() {
        let fe = FakeFrontend::locked();
        let shutdown = Shutdown::new();
        let remote = shutdown.clone();
        let trigger = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.trigger();
        });

        let start = Instant::now();
        let mut out = Vec::new();
        let printed = StatusReporter::new(&fe)
            .run(Duration::from_secs(60), Limits::default(), &shutdown, &mut out)
            .unwrap();
        trigger.join().unwrap();

        assert_eq!(printed, 1);
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_time_limit() {
        let fe = FakeFrontend::locked();
        let limits = Limits {
            count: None,
            time: Some(Duration::from_millis(30)),
        };
        let start = Instant::now();
        let printed = StatusReporter::new(&fe)
            .run(Duration::from_secs(60), limits, &Shutdown::new(), &mut io::sink())
            .unwrap();
        assert!(printed >= 1);
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_wait_timeout_without_trigger() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.wait_timeout(Duration::from_millis(5)));
        assert!(!shutdown.is_triggered());
    }
}
