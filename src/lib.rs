//! # RTU Slave Sim - Modbus RTU Slave Simulator
//!
//! Emulates one or more Modbus RTU slave devices on a serial bus, answering
//! read/write requests against per-device memory.
//!
//! ## Features
//!
//! - **Stream Framing**: frames are assembled from arbitrary chunks (partial,
//!   concatenated or noisy) with byte-wise resynchronisation
//! - **CRC Validation**: CRC-16/MODBUS on every request and response
//! - **Silent Failure Model**: invalid requests get no reply, never an
//!   exception frame
//! - **Persistence**: device memory loads from and saves to JSON snapshots
//! - **Serial Runtime**: async serve loop, real ports with the `rtu` feature
//!
//! ## Device Memory
//!
//! | Area | Size | Access |
//! |------|------|--------|
//! | Holding registers | 100 × u16 | read/write |
//! | Discrete inputs | 64 bits | read-only |
//! | Coils | 64 bits | write |
//!
//! ## Supported Function Codes
//!
//! | Code | Function | Slave |
//! |------|----------|-------|
//! | 0x02 | Read Discrete Inputs | ✅ |
//! | 0x03 | Read Holding Registers | ✅ |
//! | 0x05 | Write Single Coil | ✅ |
//! | 0x06 | Write Single Register | ✅ |
//! | 0x10 | Write Multiple Registers | ✅ |
//!
//! ## Quick Start
//!
//! ```rust
//! use rtu_slave_sim::{ModbusSlave, Simulator};
//!
//! let mut simulator = Simulator::new();
//! let mut slave = ModbusSlave::new(0x01);
//! slave.device_mut().set_register(0x10, 0x002A).unwrap();
//! slave.device_mut().set_register(0x11, 0x003F).unwrap();
//! simulator.insert("meter", slave);
//!
//! // Read 2 holding registers from 0x0010
//! let request = [0x01, 0x03, 0x00, 0x10, 0x00, 0x02, 0xC5, 0xCE];
//! let response = simulator.deliver_chunk(&request).unwrap();
//! assert_eq!(&response[..7], &[0x01, 0x03, 0x04, 0x00, 0x2A, 0x00, 0x3F]);
//! ```

// ============================================================================
// Core modules
// ============================================================================

/// Error types and result handling
pub mod error;

/// Protocol constants: function codes, frame and memory sizes
pub mod constants;

/// CRC-16/MODBUS checksum
pub mod checksum;

/// Per-device register and bit memory
pub mod device;

/// Response frame construction
pub mod frame;

/// Incremental frame assembly from a byte stream
pub mod assembler;

/// Function-code dispatch and handlers
pub mod dispatch;

/// Device memory plus receive buffer
pub mod slave;

// ============================================================================
// Runtime modules
// ============================================================================

/// Named devices and address routing
pub mod simulator;

/// JSON persistence of device memory
pub mod snapshot;

/// Serial and runtime configuration
pub mod config;

/// Async serve loop and serial port access
pub mod transport;

/// tracing-subscriber setup
pub mod logging;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// === Async runtime ===
pub use tokio;

// === Error handling ===
pub use error::{SimError, SimResult};

// === Core types ===
pub use assembler::{FrameAssembler, FrameOutcome};
pub use checksum::{crc16, verify_crc};
pub use device::{SlaveDevice, SlaveId};
pub use dispatch::{dispatch, SlaveFunction};
pub use frame::{Reply, ResponseBuilder};
pub use slave::ModbusSlave;

// === Runtime ===
pub use config::{Parity, SerialConfig, SimulatorConfig, StopBits};
pub use simulator::Simulator;
pub use snapshot::DeviceSnapshot;
pub use transport::{serve, ServeStats};

// === Memory sizes ===
pub use constants::{COIL_COUNT, DISCRETE_INPUT_COUNT, REGISTER_COUNT};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn info() -> String {
    format!("RTU Slave Sim v{} - Modbus RTU slave simulator", VERSION)
}
