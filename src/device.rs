//! # Device Memory
//!
//! Addressable state of one simulated slave: holding registers, discrete
//! inputs and coils, all fixed-size and zero-based.
//!
//! ## Ownership
//!
//! A [`SlaveDevice`] exclusively owns its arrays. Request handling mutates
//! them through `&mut self`, so two requests for the same device can never
//! overlap. Callers that share a simulator between tasks (for example a
//! serve loop and a snapshot writer) must put it behind a mutex or serialise
//! the two paths themselves; the crate's own serve loop does the latter.

use crate::constants::{COIL_COUNT, DISCRETE_INPUT_COUNT, REGISTER_COUNT};
use crate::error::{SimError, SimResult};

/// Slave (unit) address on the bus. `0` is broadcast and never used here.
pub type SlaveId = u8;

/// Memory of one simulated slave device.
///
/// # Example
///
/// ```rust
/// use rtu_slave_sim::SlaveDevice;
///
/// let mut device = SlaveDevice::new(1);
/// device.set_register(0x10, 0x002A).unwrap();
/// assert_eq!(device.registers()[0x10], 0x002A);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlaveDevice {
    address: SlaveId,
    registers: [u16; REGISTER_COUNT],
    discrete_inputs: [bool; DISCRETE_INPUT_COUNT],
    coils: [bool; COIL_COUNT],
}

impl SlaveDevice {
    /// Create a device with all registers zero and all bits off
    pub fn new(address: SlaveId) -> Self {
        Self {
            address,
            registers: [0; REGISTER_COUNT],
            discrete_inputs: [false; DISCRETE_INPUT_COUNT],
            coils: [false; COIL_COUNT],
        }
    }

    /// Bus address this device answers to
    #[inline]
    pub fn address(&self) -> SlaveId {
        self.address
    }

    /// Holding registers
    #[inline]
    pub fn registers(&self) -> &[u16; REGISTER_COUNT] {
        &self.registers
    }

    /// Discrete inputs
    #[inline]
    pub fn discrete_inputs(&self) -> &[bool; DISCRETE_INPUT_COUNT] {
        &self.discrete_inputs
    }

    /// Coils
    #[inline]
    pub fn coils(&self) -> &[bool; COIL_COUNT] {
        &self.coils
    }

    #[inline]
    pub(crate) fn registers_mut(&mut self) -> &mut [u16; REGISTER_COUNT] {
        &mut self.registers
    }

    #[inline]
    pub(crate) fn coils_mut(&mut self) -> &mut [bool; COIL_COUNT] {
        &mut self.coils
    }

    /// Set one holding register
    pub fn set_register(&mut self, address: usize, value: u16) -> SimResult<()> {
        let slot = self
            .registers
            .get_mut(address)
            .ok_or_else(|| SimError::out_of_range("register", address, REGISTER_COUNT))?;
        *slot = value;
        Ok(())
    }

    /// Set one discrete input.
    ///
    /// Inputs are read-only on the bus; this is how the host side drives them.
    pub fn set_discrete_input(&mut self, address: usize, value: bool) -> SimResult<()> {
        let slot = self.discrete_inputs.get_mut(address).ok_or_else(|| {
            SimError::out_of_range("discrete input", address, DISCRETE_INPUT_COUNT)
        })?;
        *slot = value;
        Ok(())
    }

    /// Set one coil
    pub fn set_coil(&mut self, address: usize, value: bool) -> SimResult<()> {
        let slot = self
            .coils
            .get_mut(address)
            .ok_or_else(|| SimError::out_of_range("coil", address, COIL_COUNT))?;
        *slot = value;
        Ok(())
    }

    /// Overwrite registers from the front with `values`.
    ///
    /// Values past the register count are ignored, registers past
    /// `values.len()` keep their current contents.
    pub fn load_registers(&mut self, values: &[u16]) {
        copy_prefix(&mut self.registers, values);
    }

    /// Overwrite discrete inputs from the front, same rules as [`Self::load_registers`]
    pub fn load_discrete_inputs(&mut self, values: &[bool]) {
        copy_prefix(&mut self.discrete_inputs, values);
    }

    /// Overwrite coils from the front, same rules as [`Self::load_registers`]
    pub fn load_coils(&mut self, values: &[bool]) {
        copy_prefix(&mut self.coils, values);
    }
}

fn copy_prefix<T: Copy>(dst: &mut [T], src: &[T]) {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_device_is_zeroed() {
        let device = SlaveDevice::new(7);
        assert_eq!(device.address(), 7);
        assert!(device.registers().iter().all(|&r| r == 0));
        assert!(device.discrete_inputs().iter().all(|&b| !b));
        assert!(device.coils().iter().all(|&b| !b));
        assert_eq!(device.registers().len(), REGISTER_COUNT);
        assert_eq!(device.discrete_inputs().len(), DISCRETE_INPUT_COUNT);
        assert_eq!(device.coils().len(), COIL_COUNT);
    }

    #[test]
    fn test_single_cell_setters() {
        let mut device = SlaveDevice::new(1);
        device.set_register(99, 0xBEEF).unwrap();
        device.set_discrete_input(63, true).unwrap();
        device.set_coil(0, true).unwrap();

        assert_eq!(device.registers()[99], 0xBEEF);
        assert!(device.discrete_inputs()[63]);
        assert!(device.coils()[0]);
    }

    #[test]
    fn test_setters_reject_out_of_range() {
        let mut device = SlaveDevice::new(1);
        assert!(matches!(
            device.set_register(REGISTER_COUNT, 1),
            Err(SimError::AddressOutOfRange { address: 100, .. })
        ));
        assert!(device.set_discrete_input(DISCRETE_INPUT_COUNT, true).is_err());
        assert!(device.set_coil(COIL_COUNT, true).is_err());
    }

    #[test]
    fn test_load_truncates_long_input() {
        let mut device = SlaveDevice::new(1);
        let values: Vec<u16> = (0..150).collect();
        device.load_registers(&values);
        assert_eq!(device.registers()[99], 99);

        device.load_coils(&[true; 80]);
        assert!(device.coils().iter().all(|&b| b));
    }

    #[test]
    fn test_load_short_input_keeps_tail() {
        let mut device = SlaveDevice::new(1);
        device.set_register(50, 5).unwrap();
        device.load_registers(&[1, 2, 3]);
        assert_eq!(&device.registers()[..3], &[1, 2, 3]);
        assert_eq!(device.registers()[50], 5);

        device.load_discrete_inputs(&[true]);
        assert!(device.discrete_inputs()[0]);
        assert!(!device.discrete_inputs()[1]);
    }
}
