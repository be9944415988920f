//! dvb-pids-tune library - tune a Linux DVB frontend and route PIDs to dvr
//!
//! The frontend is tuned with 8VSB (ATSC), one PES filter per requested PID
//! is started on the demux with `DMX_OUT_TS_TAP`, and the frontend status is
//! polled until shutdown. The transport stream itself is read by the caller
//! from `/dev/dvb/adapterN/dvr0`.

pub mod app;
pub mod config;
pub mod context;
pub mod device;
pub mod filter;
pub mod status;
pub mod tuner;

// Re-export commonly used types
pub use config::Settings;
pub use device::{DeviceLocator, DevicePaths};
pub use filter::Pid;
pub use status::{Limits, Shutdown, StatusSample};
pub use tuner::{DvbDevice, DvbError, FrontendStatus, LinuxDvb};
