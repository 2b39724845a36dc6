//! In-memory model of the device
//!
//! Allows running the test suite without hardware, either to check the suite
//! itself, or to demonstrate what a specific firmware bug looks like.


use embedded_hal::blocking::i2c;

use crate::{
    registers::{
        PARTIAL_REGISTER,
        PARTIAL_REGISTER_MASK,
        REGISTER_COUNT,
        is_valid,
    },
    transport::SLAVE_ADDRESS,
};


/// A simulated device that acts as an I2C slave
///
/// Implements the blocking `embedded-hal` I2C traits, so it can be used
/// wherever the real bus would be. Without a [`Fault`], it behaves like
/// conforming firmware.
#[derive(Debug)]
pub struct SimulatedDevice {
    registers:    [u8; REGISTER_COUNT],
    pointer:      Pointer,
    status_bits:  u8,
    fault:        Fault,
    transactions: usize,
}

impl SimulatedDevice {
    /// Create a conforming device
    pub fn new() -> Self {
        Self {
            registers:    [0; REGISTER_COUNT],
            pointer:      Pointer::Valid(0),
            status_bits:  0,
            fault:        Fault::None,
            transactions: 0,
        }
    }

    /// Inject a fault
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }

    /// Set the read-only upper half of register 0
    ///
    /// Only the upper four bits of `bits` are used.
    pub fn with_status_bits(mut self, bits: u8) -> Self {
        self.status_bits = bits & !PARTIAL_REGISTER_MASK;
        self.registers[0] = self.status_bits
            | (self.registers[0] & PARTIAL_REGISTER_MASK);
        self
    }

    /// The current value of a defined register
    ///
    /// # Panics
    ///
    /// Panics, if `register` is not a valid register.
    pub fn register(&self, register: u8) -> u8 {
        self.registers[usize::from(register)]
    }

    /// The current values of all defined registers
    pub fn registers(&self) -> [u8; REGISTER_COUNT] {
        self.registers
    }

    /// The number of bus transactions the device has seen
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    fn begin(&mut self, address: u8) -> Result<(), BusError> {
        if address != SLAVE_ADDRESS {
            return Err(BusError::AddressNack);
        }

        let n = self.transactions;
        self.transactions += 1;

        if let Fault::Nack { after } = self.fault {
            if n >= after {
                return Err(BusError::DataNack);
            }
        }

        Ok(())
    }

    fn store(&mut self, register: u8, value: u8) {
        let value = if register == PARTIAL_REGISTER {
            self.status_bits | (value & PARTIAL_REGISTER_MASK)
        }
        else {
            value
        };

        self.registers[usize::from(register)] = value;

        if let Fault::Crosstalk { written, corrupted } = self.fault {
            if written == register {
                let corrupted = &mut self.registers[usize::from(corrupted)];
                *corrupted = !*corrupted;
            }
        }
    }
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl i2c::Write for SimulatedDevice {
    type Error = BusError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError> {
        self.begin(address)?;

        let register = match bytes.first() {
            Some(&register) => register,
            None            => return Ok(()),
        };

        self.pointer = if is_valid(register) {
            Pointer::Valid(register)
        }
        else {
            Pointer::Invalid
        };

        // Only the first data byte is used. The device has no auto-increment.
        if let Some(&value) = bytes.get(1) {
            match self.pointer {
                Pointer::Valid(register) => {
                    self.store(register, value);
                }
                Pointer::Invalid => {
                    if let Fault::AliasInvalidWrites = self.fault {
                        self.store(register % REGISTER_COUNT as u8, value);
                    }
                }
            }
        }

        Ok(())
    }
}

impl i2c::Read for SimulatedDevice {
    type Error = BusError;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), BusError> {
        self.begin(address)?;

        let value = match self.pointer {
            Pointer::Valid(register) => {
                self.registers[usize::from(register)]
            }
            Pointer::Invalid => {
                match self.fault {
                    Fault::FloatingRead => 0xFF,
                    _                   => 0x00,
                }
            }
        };

        for b in buffer {
            *b = value;
        }

        Ok(())
    }
}


/// A firmware bug that the simulated device can exhibit
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fault {
    /// Behave like conforming firmware
    None,

    /// Writing `written` inverts the register `corrupted`
    Crosstalk {
        written:   u8,
        corrupted: u8,
    },

    /// Stop acknowledging after this many transactions
    Nack {
        after: usize,
    },

    /// Writes to invalid registers end up in a defined register
    AliasInvalidWrites,

    /// Reads after a write to an invalid register return `0xFF`
    FloatingRead,
}


/// An error on the simulated bus
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BusError {
    /// No device with the given address is on the bus
    AddressNack,

    /// The device didn't acknowledge
    DataNack,
}


#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Pointer {
    Valid(u8),
    Invalid,
}


#[cfg(test)]
mod tests {
    use crate::transport::{
        Bus,
        Transport as _,
    };

    use super::{
        BusError,
        Fault,
        SimulatedDevice,
    };


    #[test]
    fn registers_1_to_4_should_echo_writes() {
        let mut device = SimulatedDevice::new();
        let mut bus    = Bus::new(&mut device);

        for register in 1 ..= 4 {
            bus.write_register(register, 0xC0 | register).unwrap();
            assert_eq!(bus.read_register(register).unwrap(), 0xC0 | register);
        }
    }

    #[test]
    fn register_0_should_keep_its_status_bits() {
        let mut device = SimulatedDevice::new().with_status_bits(0xA0);
        let mut bus    = Bus::new(&mut device);

        bus.write_register(0, 0x5F).unwrap();
        assert_eq!(bus.read_register(0).unwrap(), 0xAF);
    }

    #[test]
    fn invalid_writes_should_leave_the_registers_alone() {
        let mut device = SimulatedDevice::new();

        {
            let mut bus = Bus::new(&mut device);
            bus.write_register(2, 0x22).unwrap();
            bus.write_register(0xFE, 0x99).unwrap();
            assert_eq!(bus.raw_read().unwrap(), 0);
        }

        assert_eq!(device.registers(), [0, 0, 0x22, 0, 0]);
    }

    #[test]
    fn wrong_address_should_not_be_acknowledged() {
        let mut device = SimulatedDevice::new();
        let mut bus    = Bus::with_address(&mut device, 0x3A);

        assert_eq!(bus.write_register(1, 1), Err(BusError::AddressNack));
    }

    #[test]
    fn crosstalk_should_invert_the_corrupted_register() {
        let mut device = SimulatedDevice::new()
            .with_fault(Fault::Crosstalk { written: 3, corrupted: 2 });

        Bus::new(&mut device).write_register(3, 0x01).unwrap();

        assert_eq!(device.register(3), 0x01);
        assert_eq!(device.register(2), 0xFF);
    }

    #[test]
    fn nack_should_start_after_the_configured_transactions() {
        let mut device = SimulatedDevice::new()
            .with_fault(Fault::Nack { after: 2 });
        let mut bus = Bus::new(&mut device);

        bus.write_register(1, 1).unwrap();
        assert_eq!(bus.read_register(1), Err(BusError::DataNack));
    }

    #[test]
    fn aliasing_should_store_invalid_writes() {
        let mut device = SimulatedDevice::new()
            .with_fault(Fault::AliasInvalidWrites);

        Bus::new(&mut device).write_register(6, 0x66).unwrap();

        assert_eq!(device.register(1), 0x66);
    }

    #[test]
    fn floating_read_should_return_ones_after_invalid_write() {
        let mut device = SimulatedDevice::new()
            .with_fault(Fault::FloatingRead);
        let mut bus = Bus::new(&mut device);

        bus.write_register(5, 0).unwrap();
        assert_eq!(bus.raw_read().unwrap(), 0xFF);
    }
}
