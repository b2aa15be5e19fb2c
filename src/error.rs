//! Crate error types.

use crate::report::DeviceFamily;
use thiserror::Error;

/// Failures while decoding a raw report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The report buffer is shorter than the family's fixed layout requires.
    #[error("malformed report: got {len} bytes, need at least {need}")]
    MalformedReport { len: usize, need: usize },

    /// Decoding for this device family is intentionally not implemented.
    /// Callers must treat this as a configuration error, never as empty state.
    #[error("report decoding is not supported for {0:?}")]
    UnsupportedFamily(DeviceFamily),
}

/// Failures at the raw device boundary.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("device not found: {vendor:#06x}:{product:#06x}")]
    NotFound { vendor: u16, product: u16 },

    #[error("device read failed: {0}")]
    Read(String),

    #[error("device open failed: {0}")]
    Open(String),
}

#[cfg(feature = "hid")]
impl From<hidapi::HidError> for DeviceError {
    fn from(e: hidapi::HidError) -> Self {
        DeviceError::Read(e.to_string())
    }
}

/// Engine invariant violations.
///
/// These indicate a programming error, not a recoverable runtime condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Axis thresholding produced a geometrically impossible direction
    /// combination (e.g. up and down at once).
    #[error("invalid flick direction: right_rate={right_rate}, down_rate={down_rate}")]
    InvalidFlickDirection { right_rate: f32, down_rate: f32 },
}

/// An injector refused or failed a synthetic input action.
///
/// Logged per action during queue drain; never aborts the input loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("injection failed: {0}")]
pub struct InjectError(pub String);

/// Settings file problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level failure of the polling loop.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
