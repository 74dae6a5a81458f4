//! Response frame construction
//!
//! Every reply is `[address][function][payload...][crc_lo][crc_hi]`, with the
//! CRC taken over all preceding bytes.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::checksum::crc16;
use crate::constants::{CRC_LEN, MAX_RTU_FRAME_SIZE};
use crate::device::SlaveId;

/// Outcome of handing bytes to a slave.
///
/// There is no error variant: anything the slave cannot or will not answer
/// is left unanswered, and the master times out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Bytes to write back to the bus
    Response(Bytes),
    /// Nothing to send for this call
    NoResponse,
}

impl Reply {
    /// True if there are bytes to send
    #[inline]
    pub fn is_response(&self) -> bool {
        matches!(self, Reply::Response(_))
    }

    /// Convert into the transport-facing optional form
    #[inline]
    pub fn into_option(self) -> Option<Bytes> {
        match self {
            Reply::Response(bytes) => Some(bytes),
            Reply::NoResponse => None,
        }
    }
}

impl From<Option<Bytes>> for Reply {
    fn from(value: Option<Bytes>) -> Self {
        value.map_or(Reply::NoResponse, Reply::Response)
    }
}

/// Response builder - fluent API
///
/// # Example
///
/// ```rust
/// use rtu_slave_sim::ResponseBuilder;
///
/// let frame = ResponseBuilder::new(0x01, 0x03)
///     .byte(4)
///     .u16(0x002A)
///     .u16(0x003F)
///     .finish();
/// assert_eq!(&frame[..], &[0x01, 0x03, 0x04, 0x00, 0x2A, 0x00, 0x3F, 0x9B, 0xEB]);
/// ```
pub struct ResponseBuilder {
    buf: BytesMut,
}

impl ResponseBuilder {
    /// Start a frame with address and function code
    #[inline]
    pub fn new(address: SlaveId, function: u8) -> Self {
        let mut buf = BytesMut::with_capacity(MAX_RTU_FRAME_SIZE);
        buf.put_u8(address);
        buf.put_u8(function);
        Self { buf }
    }

    /// Add a byte
    #[inline]
    pub fn byte(mut self, b: u8) -> Self {
        self.buf.put_u8(b);
        self
    }

    /// Add a big-endian u16
    #[inline]
    pub fn u16(mut self, value: u16) -> Self {
        self.buf.put_u16(value);
        self
    }

    /// Add raw payload bytes
    #[inline]
    pub fn data(mut self, data: &[u8]) -> Self {
        self.buf.put_slice(data);
        self
    }

    /// Append the CRC trailer and freeze the frame
    pub fn finish(mut self) -> Bytes {
        let crc = crc16(&self.buf);
        self.buf.put_u16_le(crc);
        debug!(
            "Response built: addr={:02X} FC={:02X}, total_len={}",
            self.buf[0],
            self.buf[1],
            self.buf.len()
        );
        self.buf.freeze()
    }

    /// Frame echoing the first six bytes of `request` with a fresh CRC.
    ///
    /// Used by FC05/FC06, whose reply repeats address, function, target
    /// address and value.
    pub fn echo(request: &[u8]) -> Bytes {
        let body_len = request.len().min(6);
        let mut buf = BytesMut::with_capacity(body_len + CRC_LEN);
        buf.put_slice(&request[..body_len]);
        let crc = crc16(&buf);
        buf.put_u16_le(crc);
        buf.freeze()
    }
}
