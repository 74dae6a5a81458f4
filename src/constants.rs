//! Protocol constants for the simulated RTU slaves
//!
//! Frame layout: `[address][function][payload...][crc_lo][crc_hi]`.
//! All address/quantity fields inside the payload are big-endian; the CRC
//! trailer is little-endian.

// ============================================================================
// Frame Size Constants
// ============================================================================

/// Length of every fixed-size request frame (FC02, FC03, FC05, FC06)
/// Format: Address(1) + Function(1) + Addr(2) + Qty/Value(2) + CRC(2) = 8 bytes
pub const FIXED_FRAME_LEN: usize = 8;

/// Minimum number of buffered bytes before the assembler looks for a frame
pub const MIN_FRAME_LEN: usize = FIXED_FRAME_LEN;

/// Offset of the byte-count field in an FC16 request
pub const WRITE_MULTIPLE_BYTE_COUNT_OFFSET: usize = 6;

/// FC16 overhead around the register data
/// Format: Address(1) + Function(1) + Addr(2) + Qty(2) + ByteCount(1) + CRC(2) = 9 bytes
pub const WRITE_MULTIPLE_OVERHEAD: usize = 9;

/// CRC trailer length
pub const CRC_LEN: usize = 2;

/// Maximum RTU frame size (RS485 ADU limit)
pub const MAX_RTU_FRAME_SIZE: usize = 256;

// ============================================================================
// Device Memory Sizes
// ============================================================================

/// Holding registers per device
pub const REGISTER_COUNT: usize = 100;

/// Discrete inputs per device
pub const DISCRETE_INPUT_COUNT: usize = 64;

/// Coils per device
pub const COIL_COUNT: usize = 64;

// ============================================================================
// Modbus Function Codes
// ============================================================================

/// Read Discrete Inputs (FC02)
pub const FC_READ_DISCRETE_INPUTS: u8 = 0x02;

/// Read Holding Registers (FC03)
pub const FC_READ_HOLDING_REGISTERS: u8 = 0x03;

/// Write Single Coil (FC05)
pub const FC_WRITE_SINGLE_COIL: u8 = 0x05;

/// Write Single Register (FC06)
pub const FC_WRITE_SINGLE_REGISTER: u8 = 0x06;

/// Write Multiple Registers (FC16)
pub const FC_WRITE_MULTIPLE_REGISTERS: u8 = 0x10;

// ============================================================================
// Coil Values
// ============================================================================

/// FC05 value that switches a coil on
pub const COIL_ON: u16 = 0xFF00;

/// FC05 value that switches a coil off
pub const COIL_OFF: u16 = 0x0000;
