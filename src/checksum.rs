//! CRC-16/MODBUS checksum
//!
//! Initial value `0xFFFF`, reflected polynomial `0xA001`, no final XOR.
//! The checksum travels little-endian (low byte first) at the end of a frame.

use ::crc::{Crc, CRC_16_MODBUS};

use crate::constants::CRC_LEN;

const CRC_MODBUS: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Compute the checksum over `data`.
#[inline]
pub fn crc16(data: &[u8]) -> u16 {
    CRC_MODBUS.checksum(data)
}

/// Checksum of `data` in wire order `[low, high]`.
#[inline]
pub fn crc_bytes(data: &[u8]) -> [u8; 2] {
    crc16(data).to_le_bytes()
}

/// Check a complete frame against its trailing two CRC bytes.
pub fn verify_crc(frame: &[u8]) -> bool {
    if frame.len() < CRC_LEN {
        return false;
    }
    let (body, trailer) = frame.split_at(frame.len() - CRC_LEN);
    u16::from_le_bytes([trailer[0], trailer[1]]) == crc16(body)
}
