//! Error types for the simulator
//!
//! The protocol engine itself never fails: malformed or unanswerable requests
//! degrade to [`Reply::NoResponse`](crate::frame::Reply::NoResponse). These
//! errors cover the surfaces around it: snapshot persistence, configuration,
//! the local memory API and the serial transport.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate
pub type SimResult<T> = Result<T, SimError>;

/// Simulator error
#[derive(Debug, Error)]
pub enum SimError {
    /// I/O failure (file system or byte stream)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Snapshot could not be parsed or serialized
    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Device data directory does not exist
    #[error("Data directory not found: {}", path.display())]
    DataDirMissing { path: PathBuf },

    /// Configuration value rejected
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Local memory access outside the fixed array bounds
    #[error("{area} address {address} out of range (size {size})")]
    AddressOutOfRange {
        area: &'static str,
        address: usize,
        size: usize,
    },

    /// Serial port could not be opened or enumerated
    #[cfg(feature = "rtu")]
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
}

impl SimError {
    /// Create an invalid configuration error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an out-of-range error for a memory area
    pub fn out_of_range(area: &'static str, address: usize, size: usize) -> Self {
        Self::AddressOutOfRange {
            area,
            address,
            size,
        }
    }
}
