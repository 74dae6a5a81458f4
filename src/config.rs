//! # Simulator Configuration
//!
//! Serial line settings and runtime options.
//!
//! ## Defaults
//!
//! - 9600 baud, 8 data bits, no parity, 1 stop bit (8N1)
//! - Device snapshots in `./dados`
//! - No save on exit

use std::path::PathBuf;

use crate::error::{SimError, SimResult};

/// Baud rates offered for the serial link
pub const SUPPORTED_BAUD_RATES: [u32; 5] = [9600, 19200, 38400, 57600, 115200];

/// Default baud rate
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default snapshot directory
pub const DEFAULT_DATA_DIR: &str = "dados";

/// Default read buffer size for one transport read
pub const DEFAULT_READ_BUFFER: usize = 256;

/// Serial parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parity {
    /// No parity bit
    #[default]
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
}

/// Serial stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopBits {
    /// One stop bit
    #[default]
    One,
    /// Two stop bits
    Two,
}

/// Serial link settings.
///
/// # Example
///
/// ```rust
/// use rtu_slave_sim::SerialConfig;
///
/// let config = SerialConfig::new("/dev/ttyUSB0").with_baud_rate(19200);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.data_bits, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Port name (`/dev/ttyUSB0`, `COM3`, ...)
    pub port: String,
    /// Line speed
    pub baud_rate: u32,
    /// Data bits (7 or 8)
    pub data_bits: u8,
    /// Parity
    pub parity: Parity,
    /// Stop bits
    pub stop_bits: StopBits,
    /// Bytes requested per transport read
    pub read_buffer: usize,
}

impl SerialConfig {
    /// 8N1 at the default baud rate on `port`
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: StopBits::One,
            read_buffer: DEFAULT_READ_BUFFER,
        }
    }

    /// Set baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set data bits.
    pub fn with_data_bits(mut self, data_bits: u8) -> Self {
        self.data_bits = data_bits;
        self
    }

    /// Set parity.
    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Set stop bits.
    pub fn with_stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Set the per-read buffer size.
    pub fn with_read_buffer(mut self, size: usize) -> Self {
        self.read_buffer = size;
        self
    }

    /// Check the settings before opening a port
    pub fn validate(&self) -> SimResult<()> {
        if self.port.trim().is_empty() {
            return Err(SimError::invalid_config("port", "no serial port selected"));
        }
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(SimError::invalid_config(
                "baud_rate",
                format!(
                    "{} not supported (expected one of {:?})",
                    self.baud_rate, SUPPORTED_BAUD_RATES
                ),
            ));
        }
        if !matches!(self.data_bits, 7 | 8) {
            return Err(SimError::invalid_config(
                "data_bits",
                format!("{} not supported (expected 7 or 8)", self.data_bits),
            ));
        }
        if self.read_buffer == 0 {
            return Err(SimError::invalid_config("read_buffer", "must be non-zero"));
        }
        Ok(())
    }
}

/// Runtime options for the simulator binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Directory holding one snapshot per device
    pub data_dir: PathBuf,
    /// Serial link
    pub serial: SerialConfig,
    /// Write snapshots back when the simulator stops
    pub save_on_exit: bool,
}

impl SimulatorConfig {
    /// Defaults for `port`
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            serial: SerialConfig::new(port),
            save_on_exit: false,
        }
    }

    /// Set the snapshot directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set save-on-exit.
    pub fn with_save_on_exit(mut self, save: bool) -> Self {
        self.save_on_exit = save;
        self
    }

    /// Validate all settings
    pub fn validate(&self) -> SimResult<()> {
        self.serial.validate()
    }
}

// ============================================================================
// Tests
// ============================================================================
