//! Raw input sources.
//!
//! The runtime reads fixed-layout reports through the [`RawDeviceSource`]
//! trait, so the whole decode/engine pipeline runs against scripted buffers in
//! tests and against real HID hardware in production.
//!
//! # Feature flags
//! - **`hid`** — enables the hidapi-backed source (default in this build).

use crate::error::DeviceError;
use std::collections::VecDeque;

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;

#[cfg(feature = "hid")]
pub use hid::{list_devices, HidSource};

/// One non-blocking source of raw input reports.
pub trait RawDeviceSource {
    /// Read the next report into `buf`.
    ///
    /// Returns `Ok(0)` when no report is pending; the runtime treats that as
    /// an empty tick, not an error.
    fn read_report(&mut self, buf: &mut [u8]) -> Result<usize, DeviceError>;

    /// Human-readable identity for log lines.
    fn name(&self) -> &str;
}

/// Replays a fixed sequence of reports, then reads as idle. Test double.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    name: String,
    reports: VecDeque<Vec<u8>>,
}

impl ScriptedSource {
    pub fn new(name: impl Into<String>, reports: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self { name: name.into(), reports: reports.into_iter().collect() }
    }

    pub fn push(&mut self, report: Vec<u8>) {
        self.reports.push_back(report);
    }
}

impl RawDeviceSource for ScriptedSource {
    fn read_report(&mut self, buf: &mut [u8]) -> Result<usize, DeviceError> {
        match self.reports.pop_front() {
            Some(report) => {
                let n = report.len().min(buf.len());
                buf[..n].copy_from_slice(&report[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
