//! Crate-level error types.

use std::fmt;

use crate::gpu::{DeviceError, IndexBufferError};

/// Errors produced by the tilegpu crate.
#[derive(Debug)]
pub enum TileGpuError {
    /// Driver-level failure (allocation, context loss).
    Device(DeviceError),
    /// Index buffer lifecycle or precondition failure.
    IndexBuffer(IndexBufferError),
    /// No compatible GPU adapter or device could be opened.
    AdapterRequest(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for TileGpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(e) => write!(f, "GPU device error: {e}"),
            Self::IndexBuffer(e) => write!(f, "index buffer error: {e}"),
            Self::AdapterRequest(msg) => {
                write!(f, "GPU adapter request failed: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for TileGpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Device(e) => Some(e),
            Self::IndexBuffer(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::AdapterRequest(_) | Self::OptionsParse(_) => None,
        }
    }
}

impl From<DeviceError> for TileGpuError {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

impl From<IndexBufferError> for TileGpuError {
    fn from(e: IndexBufferError) -> Self {
        Self::IndexBuffer(e)
    }
}

impl From<std::io::Error> for TileGpuError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
