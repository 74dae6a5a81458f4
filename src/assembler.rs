//! # Frame Assembly
//!
//! Turns an arbitrary byte stream (partial frames, concatenated frames,
//! line noise) into complete request frames for one slave address.
//!
//! ## Algorithm
//!
//! While at least [`MIN_FRAME_LEN`] bytes are buffered:
//!
//! 1. If the first byte is not this slave's address, drop it and retry.
//! 2. Derive the expected frame length from the function code: FC16 is
//!    `9 + byte_count` (byte count at offset 6), everything else is 8.
//! 3. If fewer bytes than that are buffered, wait for more.
//! 4. Otherwise split the frame off the front and check its CRC.
//!
//! At most one frame is taken per call; anything behind it stays buffered.

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::checksum::verify_crc;
use crate::constants::{
    FC_WRITE_MULTIPLE_REGISTERS, FIXED_FRAME_LEN, MAX_RTU_FRAME_SIZE, MIN_FRAME_LEN,
    WRITE_MULTIPLE_BYTE_COUNT_OFFSET, WRITE_MULTIPLE_OVERHEAD,
};
use crate::device::SlaveId;

/// Result of one extraction attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A complete frame with a valid CRC, removed from the buffer
    Frame(Bytes),
    /// Not enough bytes yet; nothing destructive happened beyond resync
    Incomplete,
    /// A full-length candidate was removed but its CRC did not match
    ChecksumMismatch,
}

/// Per-slave receive buffer.
///
/// Bytes are only ever consumed from the front, in arrival order.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: BytesMut,
}

impl FrameAssembler {
    /// Create an empty assembler
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(MAX_RTU_FRAME_SIZE),
        }
    }

    /// Append a received chunk
    #[inline]
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Number of bytes waiting in the buffer
    #[inline]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Pending bytes, oldest first
    #[inline]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Drop everything buffered
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Try to take one frame addressed to `address` off the front of the buffer.
    pub fn next_frame(&mut self, address: SlaveId) -> FrameOutcome {
        let mut dropped = 0usize;

        while self.buffer.len() >= MIN_FRAME_LEN {
            if self.buffer[0] != address {
                self.buffer.advance(1);
                dropped += 1;
                continue;
            }

            if dropped > 0 {
                trace!("Resync: dropped {} byte(s) before slave {}", dropped, address);
            }

            let Some(expected) = expected_frame_len(&self.buffer) else {
                return FrameOutcome::Incomplete;
            };

            if self.buffer.len() < expected {
                trace!(
                    "Waiting for frame: have {} of {} bytes",
                    self.buffer.len(),
                    expected
                );
                return FrameOutcome::Incomplete;
            }

            let frame = self.buffer.split_to(expected).freeze();
            if !verify_crc(&frame) {
                debug!(
                    "CRC mismatch on {}-byte frame for slave {}, discarded",
                    expected, address
                );
                return FrameOutcome::ChecksumMismatch;
            }
            return FrameOutcome::Frame(frame);
        }

        if dropped > 0 {
            trace!("Resync: dropped {} byte(s) before slave {}", dropped, address);
        }
        FrameOutcome::Incomplete
    }
}

/// Expected length of the frame at the front of `buffered`, or `None` when
/// the length field has not arrived yet.
fn expected_frame_len(buffered: &[u8]) -> Option<usize> {
    match buffered.get(1) {
        Some(&FC_WRITE_MULTIPLE_REGISTERS) => buffered
            .get(WRITE_MULTIPLE_BYTE_COUNT_OFFSET)
            .map(|&count| WRITE_MULTIPLE_OVERHEAD + count as usize),
        Some(_) => Some(FIXED_FRAME_LEN),
        None => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const READ_10: [u8; 8] = [0x01, 0x03, 0x00, 0x00, 0x00, 0x0A, 0xC5, 0xCD];
    const READ_1: [u8; 8] = [0x01, 0x03, 0x00, 0x00, 0x00, 0x01, 0x84, 0x0A];
    const WRITE_MULTI: [u8; 13] = [
        0x01, 0x10, 0x00, 0x10, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x00, 0x14, 0xD2, 0xAE,
    ];

    #[test]
    fn test_complete_frame_in_one_chunk() {
        let mut asm = FrameAssembler::new();
        asm.push(&READ_10);
        assert_eq!(
            asm.next_frame(0x01),
            FrameOutcome::Frame(Bytes::copy_from_slice(&READ_10))
        );
        assert_eq!(asm.buffered(), 0);
    }

    #[test]
    fn test_short_chunk_accumulates() {
        let mut asm = FrameAssembler::new();
        asm.push(&READ_10[..5]);
        assert_eq!(asm.next_frame(0x01), FrameOutcome::Incomplete);
        assert_eq!(asm.pending(), &READ_10[..5]);

        asm.push(&READ_10[5..]);
        assert!(matches!(asm.next_frame(0x01), FrameOutcome::Frame(_)));
    }

    #[test]
    fn test_resync_drops_leading_garbage() {
        let mut asm = FrameAssembler::new();
        asm.push(&[0xAA, 0x55, 0x00]);
        asm.push(&READ_10);
        assert_eq!(
            asm.next_frame(0x01),
            FrameOutcome::Frame(Bytes::copy_from_slice(&READ_10))
        );
    }

    #[test]
    fn test_resync_stops_below_minimum_length() {
        let mut asm = FrameAssembler::new();
        // 10 garbage bytes: resync drops until 7 remain
        asm.push(&[0x99; 10]);
        assert_eq!(asm.next_frame(0x01), FrameOutcome::Incomplete);
        assert_eq!(asm.buffered(), MIN_FRAME_LEN - 1);
    }

    #[test]
    fn test_one_frame_per_call() {
        let mut asm = FrameAssembler::new();
        let mut both = READ_10.to_vec();
        both.extend_from_slice(&READ_1);
        asm.push(&both);

        assert_eq!(
            asm.next_frame(0x01),
            FrameOutcome::Frame(Bytes::copy_from_slice(&READ_10))
        );
        assert_eq!(asm.buffered(), READ_1.len());
        assert_eq!(
            asm.next_frame(0x01),
            FrameOutcome::Frame(Bytes::copy_from_slice(&READ_1))
        );
    }

    #[test]
    fn test_checksum_mismatch_consumes_frame() {
        let mut asm = FrameAssembler::new();
        let mut bad = READ_10;
        bad[7] ^= 0xFF;
        asm.push(&bad);
        asm.push(&READ_1);

        assert_eq!(asm.next_frame(0x01), FrameOutcome::ChecksumMismatch);
        // the following frame is untouched and comes out on the next call
        assert_eq!(asm.pending(), &READ_1);
        assert!(matches!(asm.next_frame(0x01), FrameOutcome::Frame(_)));
    }

    #[test]
    fn test_variable_length_frame() {
        let mut asm = FrameAssembler::new();
        asm.push(&WRITE_MULTI[..8]);
        assert_eq!(asm.next_frame(0x01), FrameOutcome::Incomplete);
        asm.push(&WRITE_MULTI[8..]);
        assert_eq!(
            asm.next_frame(0x01),
            FrameOutcome::Frame(Bytes::copy_from_slice(&WRITE_MULTI))
        );
    }

    #[test]
    fn test_unknown_function_uses_fixed_length() {
        assert_eq!(expected_frame_len(&[0x01, 0x2B, 0, 0, 0, 0, 0, 0]), Some(8));
        assert_eq!(expected_frame_len(&[0x01, 0x10, 0, 0, 0, 0, 4]), Some(13));
        assert_eq!(expected_frame_len(&[0x01, 0x10, 0, 0]), None);
        assert_eq!(expected_frame_len(&[0x01]), None);
    }

    #[test]
    fn test_frame_for_other_address_is_dropped_bytewise() {
        let mut asm = FrameAssembler::new();
        // a valid frame for slave 2 followed by one for slave 1
        asm.push(&[0x02, 0x03, 0x00, 0x00, 0x00, 0x02, 0xC4, 0x38]);
        asm.push(&READ_1);
        assert_eq!(
            asm.next_frame(0x01),
            FrameOutcome::Frame(Bytes::copy_from_slice(&READ_1))
        );
    }

    #[test]
    fn test_address_byte_noise_takes_candidate_with_it() {
        let mut asm = FrameAssembler::new();
        asm.push(&[0x7E, 0x01]);
        asm.push(&READ_1);

        // 7E is skipped, then 01 01 03 .. 84 is tried as a frame and fails
        assert_eq!(asm.next_frame(0x01), FrameOutcome::ChecksumMismatch);
        assert_eq!(asm.pending(), &[0x0A]);
        assert_eq!(asm.next_frame(0x01), FrameOutcome::Incomplete);
    }

    #[test]
    fn test_clear() {
        let mut asm = FrameAssembler::new();
        asm.push(&READ_10[..3]);
        asm.clear();
        assert_eq!(asm.buffered(), 0);
    }
}
