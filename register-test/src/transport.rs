//! Register-level access to the device over I2C


use embedded_hal::blocking::i2c;


/// Address of the Robot Arm Click on the bus, in 7-bit form
///
/// The device documentation gives the address as `0x3A`, which already
/// includes the R/W bit. `embedded-hal` expects the address without it.
pub const SLAVE_ADDRESS: u8 = 0x3A >> 1;

/// The frequency the bus is operated at, in Hz
pub const BUS_FREQUENCY: u32 = 400_000;


/// Register-level access to the device
///
/// Implemented by [`Bus`] for real (or simulated) I2C buses. The test
/// procedures only ever talk to the device through this trait.
pub trait Transport {
    /// The error returned, if a bus transaction fails
    type Error;

    /// Write `value` into `register`
    ///
    /// This is a single write transaction of two bytes.
    fn write_register(&mut self, register: u8, value: u8)
        -> Result<(), Self::Error>;

    /// Read the value of `register`
    ///
    /// Selects the register with a one-byte write, then reads one byte. If
    /// either transaction fails, no value is returned.
    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error>;

    /// Read one byte, without selecting a register first
    fn raw_read(&mut self) -> Result<u8, Self::Error>;
}

impl<T> Transport for &'_ mut T
    where T: Transport
{
    type Error = T::Error;

    fn write_register(&mut self, register: u8, value: u8)
        -> Result<(), Self::Error>
    {
        (**self).write_register(register, value)
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
        (**self).read_register(register)
    }

    fn raw_read(&mut self) -> Result<u8, Self::Error> {
        (**self).raw_read()
    }
}


/// Accesses the device through a blocking `embedded-hal` I2C bus
pub struct Bus<'r, I2C> {
    i2c:     &'r mut I2C,
    address: u8,
}

impl<'r, I2C, E> Bus<'r, I2C>
    where
        I2C: i2c::Write<Error = E> + i2c::Read<Error = E>,
{
    /// Create a new instance of `Bus` that talks to [`SLAVE_ADDRESS`]
    pub fn new(i2c: &'r mut I2C) -> Self {
        Self::with_address(i2c, SLAVE_ADDRESS)
    }

    /// Create a new instance of `Bus` that talks to a different slave
    ///
    /// `address` is the 7-bit slave address.
    pub fn with_address(i2c: &'r mut I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
        }
    }

    /// The 7-bit address of the slave this instance talks to
    pub fn address(&self) -> u8 {
        self.address
    }
}

impl<I2C, E> Transport for Bus<'_, I2C>
    where
        I2C: i2c::Write<Error = E> + i2c::Read<Error = E>,
{
    type Error = E;

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), E> {
        log::trace!("I2C: write {:02X} to register {}", value, register);
        self.i2c.write(self.address, &[register, value])
    }

    fn read_register(&mut self, register: u8) -> Result<u8, E> {
        log::trace!("I2C: select register {}", register);
        self.i2c.write(self.address, &[register])?;
        self.raw_read()
    }

    fn raw_read(&mut self) -> Result<u8, E> {
        let mut buf = [0; 1];
        self.i2c.read(self.address, &mut buf)?;

        log::trace!("I2C: read {:02X}", buf[0]);
        Ok(buf[0])
    }
}
