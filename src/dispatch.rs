//! Function-code dispatch and request handlers
//!
//! | Code | Function | Reply |
//! |------|----------|-------|
//! | 0x02 | Read Discrete Inputs | byte count + packed bits (LSB = first input) |
//! | 0x03 | Read Holding Registers | byte count + big-endian registers |
//! | 0x05 | Write Single Coil | echo of the request |
//! | 0x06 | Write Single Register | echo of the request |
//! | 0x10 | Write Multiple Registers | start address + quantity |
//!
//! Out-of-range addresses, malformed coil values, byte-count mismatches and
//! unknown function codes are not answered. No exception frames are sent.

use tracing::debug;

use crate::constants::{
    COIL_OFF, COIL_ON, FC_READ_DISCRETE_INPUTS, FC_READ_HOLDING_REGISTERS,
    FC_WRITE_MULTIPLE_REGISTERS, FC_WRITE_SINGLE_COIL, FC_WRITE_SINGLE_REGISTER, FIXED_FRAME_LEN,
    WRITE_MULTIPLE_BYTE_COUNT_OFFSET,
};
use crate::device::SlaveDevice;
use crate::frame::{Reply, ResponseBuilder};

/// Function codes this slave answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlaveFunction {
    /// FC02
    ReadDiscreteInputs,
    /// FC03
    ReadHoldingRegisters,
    /// FC05
    WriteSingleCoil,
    /// FC06
    WriteSingleRegister,
    /// FC16
    WriteMultipleRegisters,
}

impl SlaveFunction {
    /// Map a wire function code, `None` for anything unsupported
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            FC_READ_DISCRETE_INPUTS => Some(Self::ReadDiscreteInputs),
            FC_READ_HOLDING_REGISTERS => Some(Self::ReadHoldingRegisters),
            FC_WRITE_SINGLE_COIL => Some(Self::WriteSingleCoil),
            FC_WRITE_SINGLE_REGISTER => Some(Self::WriteSingleRegister),
            FC_WRITE_MULTIPLE_REGISTERS => Some(Self::WriteMultipleRegisters),
            _ => None,
        }
    }

    /// Wire function code
    pub fn to_u8(self) -> u8 {
        match self {
            Self::ReadDiscreteInputs => FC_READ_DISCRETE_INPUTS,
            Self::ReadHoldingRegisters => FC_READ_HOLDING_REGISTERS,
            Self::WriteSingleCoil => FC_WRITE_SINGLE_COIL,
            Self::WriteSingleRegister => FC_WRITE_SINGLE_REGISTER,
            Self::WriteMultipleRegisters => FC_WRITE_MULTIPLE_REGISTERS,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::ReadDiscreteInputs => "Read Discrete Inputs",
            Self::ReadHoldingRegisters => "Read Holding Registers",
            Self::WriteSingleCoil => "Write Single Coil",
            Self::WriteSingleRegister => "Write Single Register",
            Self::WriteMultipleRegisters => "Write Multiple Registers",
        }
    }
}

/// Handle one CRC-checked request frame against `device`.
///
/// `frame` is the whole ADU including address and CRC. Frames shorter than
/// the fixed 8 bytes cannot come out of the assembler and are ignored.
pub fn dispatch(device: &mut SlaveDevice, frame: &[u8]) -> Reply {
    if frame.len() < FIXED_FRAME_LEN {
        return Reply::NoResponse;
    }

    let Some(function) = SlaveFunction::from_u8(frame[1]) else {
        debug!("Unsupported function code {:02X}, not answered", frame[1]);
        return Reply::NoResponse;
    };

    // bytes 2..6 are address + quantity (reads, FC16) or address + value (FC05/06)
    let address = be_u16(frame, 2) as usize;
    let value = be_u16(frame, 4);
    let quantity = value as usize;

    let reply = match function {
        SlaveFunction::ReadHoldingRegisters => read_holding_registers(device, address, quantity),
        SlaveFunction::WriteSingleRegister => write_single_register(device, frame, address, value),
        SlaveFunction::WriteMultipleRegisters => {
            write_multiple_registers(device, frame, address, quantity)
        }
        SlaveFunction::ReadDiscreteInputs => read_discrete_inputs(device, address, quantity),
        SlaveFunction::WriteSingleCoil => write_single_coil(device, frame, address, value),
    };

    if !reply.is_response() {
        debug!(
            "{} request rejected: addr={}, value/qty={}",
            function.name(),
            address,
            value
        );
    }
    reply
}

#[inline]
fn be_u16(frame: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([frame[offset], frame[offset + 1]])
}

/// FC03: `[addr][03][2N][reg0 hi][reg0 lo]...`
fn read_holding_registers(device: &SlaveDevice, start: usize, quantity: usize) -> Reply {
    let Some(values) = device.registers().get(start..start + quantity) else {
        return Reply::NoResponse;
    };

    let mut builder = ResponseBuilder::new(device.address(), FC_READ_HOLDING_REGISTERS)
        .byte((quantity * 2) as u8);
    for &value in values {
        builder = builder.u16(value);
    }
    Reply::Response(builder.finish())
}

/// FC06: echo
fn write_single_register(
    device: &mut SlaveDevice,
    frame: &[u8],
    address: usize,
    value: u16,
) -> Reply {
    let Some(slot) = device.registers_mut().get_mut(address) else {
        return Reply::NoResponse;
    };
    *slot = value;
    Reply::Response(ResponseBuilder::echo(frame))
}

/// FC16: `[addr][10][start hi][start lo][qty hi][qty lo]`
fn write_multiple_registers(
    device: &mut SlaveDevice,
    frame: &[u8],
    start: usize,
    quantity: usize,
) -> Reply {
    let byte_count = frame[WRITE_MULTIPLE_BYTE_COUNT_OFFSET] as usize;
    if byte_count != quantity * 2 {
        return Reply::NoResponse;
    }

    let data_start = WRITE_MULTIPLE_BYTE_COUNT_OFFSET + 1;
    let (Some(slots), Some(data)) = (
        device.registers_mut().get_mut(start..start + quantity),
        frame.get(data_start..data_start + byte_count),
    ) else {
        return Reply::NoResponse;
    };

    for (slot, pair) in slots.iter_mut().zip(data.chunks_exact(2)) {
        *slot = u16::from_be_bytes([pair[0], pair[1]]);
    }

    let address = device.address();
    Reply::Response(
        ResponseBuilder::new(address, FC_WRITE_MULTIPLE_REGISTERS)
            .u16(start as u16)
            .u16(quantity as u16)
            .finish(),
    )
}

/// FC02: `[addr][02][ceil(N/8)][bits...]`, bit 0 of the first byte is the first input
fn read_discrete_inputs(device: &SlaveDevice, start: usize, quantity: usize) -> Reply {
    let Some(inputs) = device.discrete_inputs().get(start..start + quantity) else {
        return Reply::NoResponse;
    };

    let mut packed = vec![0u8; quantity.div_ceil(8)];
    for (i, &on) in inputs.iter().enumerate() {
        if on {
            packed[i / 8] |= 1 << (i % 8);
        }
    }

    Reply::Response(
        ResponseBuilder::new(device.address(), FC_READ_DISCRETE_INPUTS)
            .byte(packed.len() as u8)
            .data(&packed)
            .finish(),
    )
}

/// FC05: echo; the value must be exactly 0xFF00 or 0x0000
fn write_single_coil(device: &mut SlaveDevice, frame: &[u8], address: usize, value: u16) -> Reply {
    let on = match value {
        COIL_ON => true,
        COIL_OFF => false,
        _ => return Reply::NoResponse,
    };
    let Some(slot) = device.coils_mut().get_mut(address) else {
        return Reply::NoResponse;
    };
    *slot = on;
    Reply::Response(ResponseBuilder::echo(frame))
}

// ============================================================================
// Tests
// ============================================================================
