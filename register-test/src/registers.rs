//! The device's register file


use crate::{
    error::{
        Failure,
        Mismatch,
    },
    transport::Transport,
};


/// The number of defined registers
pub const REGISTER_COUNT: usize = 5;

/// The only register that is not fully writable
pub const PARTIAL_REGISTER: u8 = 0;

/// The bits of register 0 that can be written
///
/// The upper half of register 0 is not under control of the master and is
/// ignored when comparing.
pub const PARTIAL_REGISTER_MASK: u8 = 0x0F;

/// The first invalid register address
///
/// All addresses from here up to `0xFF` are invalid.
pub const FIRST_INVALID_REGISTER: u8 = REGISTER_COUNT as u8;


/// Indicates whether `register` is one of the defined registers
pub fn is_valid(register: u8) -> bool {
    usize::from(register) < REGISTER_COUNT
}

/// Indicates whether the value read from `register` matches what was written
///
/// Compares only the low nibble of register 0, all bits of any other
/// register.
pub fn matches(register: u8, written: u8, read: u8) -> bool {
    if register == PARTIAL_REGISTER {
        (written ^ read) & PARTIAL_REGISTER_MASK == 0
    }
    else {
        written == read
    }
}


/// The values registers 0-4 are expected to hold
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Shadow([u8; REGISTER_COUNT]);

impl Shadow {
    /// Create a new instance of `Shadow` that expects all registers to be zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new instance of `Shadow` from the expected values
    pub fn from_values(values: [u8; REGISTER_COUNT]) -> Self {
        Self(values)
    }

    /// Record that `value` has been written to `register`
    ///
    /// # Panics
    ///
    /// Panics, if `register` is not a valid register.
    pub fn set(&mut self, register: u8, value: u8) {
        self.0[usize::from(register)] = value;
    }

    /// Returns the value expected in `register`
    ///
    /// # Panics
    ///
    /// Panics, if `register` is not a valid register.
    pub fn get(&self, register: u8) -> u8 {
        self.0[usize::from(register)]
    }

    /// Iterates over all registers and their expected values
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.0.iter()
            .enumerate()
            .map(|(register, &value)| (register as u8, value))
    }
}


/// Check that registers 0-4 hold the expected values
///
/// Reads the registers in order and stops at the first bus error or
/// unexpected value, without reading the remaining registers.
pub fn check_all_registers<T>(transport: &mut T, expected: &Shadow)
    -> Result<(), Failure<T::Error>>
    where T: Transport
{
    for (register, written) in expected.iter() {
        let read = transport.read_register(register)
            .map_err(|err| Failure::Bus(err))?;

        if !matches(register, written, read) {
            return Err(
                Failure::Corrupted(
                    Mismatch {
                        register,
                        written,
                        read,
                    }
                )
            );
        }
    }

    Ok(())
}
