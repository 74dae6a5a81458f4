//! One simulated slave: device memory plus its receive buffer.

use tracing::{debug, trace};

use crate::assembler::{FrameAssembler, FrameOutcome};
use crate::device::{SlaveDevice, SlaveId};
use crate::dispatch::dispatch;
use crate::frame::Reply;

/// A slave device wired to its own frame assembler.
///
/// Calls must be serialised per slave (`&mut self` enforces this within one
/// owner). Each [`process`](Self::process) call produces at most one reply.
///
/// # Example
///
/// ```rust
/// use rtu_slave_sim::{ModbusSlave, Reply};
///
/// let mut slave = ModbusSlave::new(1);
/// // first half of a request: nothing to send yet
/// assert_eq!(slave.process(&[0x01, 0x03, 0x00]), Reply::NoResponse);
/// // second half completes it
/// assert!(slave.process(&[0x00, 0x00, 0x01, 0x84, 0x0A]).is_response());
/// ```
#[derive(Debug)]
pub struct ModbusSlave {
    device: SlaveDevice,
    assembler: FrameAssembler,
}

impl ModbusSlave {
    /// Create a slave with zeroed memory
    pub fn new(address: SlaveId) -> Self {
        Self::with_device(SlaveDevice::new(address))
    }

    /// Wrap existing device memory
    pub fn with_device(device: SlaveDevice) -> Self {
        Self {
            device,
            assembler: FrameAssembler::new(),
        }
    }

    /// Bus address
    #[inline]
    pub fn address(&self) -> SlaveId {
        self.device.address()
    }

    /// Device memory
    #[inline]
    pub fn device(&self) -> &SlaveDevice {
        &self.device
    }

    /// Mutable device memory, for host-side changes between requests
    #[inline]
    pub fn device_mut(&mut self) -> &mut SlaveDevice {
        &mut self.device
    }

    /// Swap in new device memory, returning the old one.
    ///
    /// Pending receive bytes are kept; only the memory changes.
    pub fn replace_device(&mut self, device: SlaveDevice) -> SlaveDevice {
        std::mem::replace(&mut self.device, device)
    }

    /// Receive buffer
    #[inline]
    pub fn assembler(&self) -> &FrameAssembler {
        &self.assembler
    }

    /// Feed a received chunk and answer at most one complete request.
    pub fn process(&mut self, chunk: &[u8]) -> Reply {
        self.assembler.push(chunk);
        trace!(
            "Slave {}: +{} bytes, {} buffered",
            self.address(),
            chunk.len(),
            self.assembler.buffered()
        );

        match self.assembler.next_frame(self.device.address()) {
            FrameOutcome::Frame(frame) => {
                debug!("Slave {}: request {:02X?}", self.address(), &frame[..]);
                dispatch(&mut self.device, &frame)
            }
            FrameOutcome::Incomplete | FrameOutcome::ChecksumMismatch => Reply::NoResponse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRITE_REG: [u8; 8] = [0x01, 0x06, 0x00, 0x10, 0x00, 0x2A, 0x09, 0xD0];

    #[test]
    fn test_process_whole_frame() {
        let mut slave = ModbusSlave::new(1);
        let reply = slave.process(&WRITE_REG);
        assert_eq!(&reply.into_option().unwrap()[..], &WRITE_REG);
        assert_eq!(slave.device().registers()[0x10], 0x2A);
    }

    #[test]
    fn test_process_fragments() {
        let mut slave = ModbusSlave::new(1);
        assert_eq!(slave.process(&WRITE_REG[..3]), Reply::NoResponse);
        assert!(slave.process(&WRITE_REG[3..]).is_response());
    }

    #[test]
    fn test_bad_crc_is_silent() {
        let mut slave = ModbusSlave::new(1);
        let mut frame = WRITE_REG;
        frame[6] = 0;
        assert_eq!(slave.process(&frame), Reply::NoResponse);
        assert_eq!(slave.device().registers()[0x10], 0);
        assert_eq!(slave.assembler().buffered(), 0);
    }

    #[test]
    fn test_second_frame_waits_for_next_call() {
        let mut slave = ModbusSlave::new(1);
        let mut both = WRITE_REG.to_vec();
        both.extend_from_slice(&WRITE_REG);

        assert!(slave.process(&both).is_response());
        assert_eq!(slave.assembler().buffered(), 8);
        assert!(slave.process(&[]).is_response());
    }

    #[test]
    fn test_replace_device() {
        let mut slave = ModbusSlave::new(1);
        slave.process(&WRITE_REG);

        let old = slave.replace_device(SlaveDevice::new(1));
        assert_eq!(old.registers()[0x10], 0x2A);
        assert_eq!(slave.device().registers()[0x10], 0);
    }
}
