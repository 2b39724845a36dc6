//! The test procedures
//!
//! Each procedure runs for the given number of iterations and returns on the
//! first bus error or unexpected value. Procedures don't depend on each
//! other and can be run in any order.


use crate::{
    error::{
        Failure,
        Mismatch,
    },
    registers::{
        FIRST_INVALID_REGISTER,
        PARTIAL_REGISTER,
        PARTIAL_REGISTER_MASK,
        REGISTER_COUNT,
        Shadow,
        check_all_registers,
    },
    transport::Transport,
    values::Values,
};


/// Write registers 1-4 and read each value right back
pub fn write_read_reg_1_4<T, V>(
    transport:  &mut T,
    values:     &mut V,
    iterations: usize,
)
    -> Result<(), Failure<T::Error>>
    where
        T: Transport,
        V: Values,
{
    for i in 0 .. iterations {
        let register = values.register(i, 1 ..= 4);
        let written  = values.value(i);

        transport.write_register(register, written)
            .map_err(|err| Failure::Bus(err))?;
        let read = transport.read_register(register)
            .map_err(|err| Failure::Bus(err))?;

        if read != written {
            return Err(Failure::Mismatch(Mismatch { register, written, read }));
        }
    }

    Ok(())
}

/// Write register 0 and read the value right back
///
/// Only the writable low nibble is compared. A reported mismatch carries the
/// masked values.
pub fn write_read_reg_0<T, V>(
    transport:  &mut T,
    values:     &mut V,
    iterations: usize,
)
    -> Result<(), Failure<T::Error>>
    where
        T: Transport,
        V: Values,
{
    let register = PARTIAL_REGISTER;

    for i in 0 .. iterations {
        let value = values.value(i);

        transport.write_register(register, value)
            .map_err(|err| Failure::Bus(err))?;
        let read = transport.read_register(register)
            .map_err(|err| Failure::Bus(err))?;

        let written = value & PARTIAL_REGISTER_MASK;
        let read    = read & PARTIAL_REGISTER_MASK;

        if read != written {
            return Err(Failure::Mismatch(Mismatch { register, written, read }));
        }
    }

    Ok(())
}

/// Write random valid registers and check the whole register file each time
///
/// Catches writes that leak into other registers.
pub fn write_reg_read_all<T, V>(
    transport:  &mut T,
    values:     &mut V,
    iterations: usize,
)
    -> Result<(), Failure<T::Error>>
    where
        T: Transport,
        V: Values,
{
    let mut shadow = Shadow::new();
    for register in 0 .. REGISTER_COUNT as u8 {
        transport.write_register(register, 0)
            .map_err(|err| Failure::Bus(err))?;
    }

    for i in 0 .. iterations {
        let register = values.register(i, 0 ..= REGISTER_COUNT as u8 - 1);
        let value    = values.value(i);

        transport.write_register(register, value)
            .map_err(|err| Failure::Bus(err))?;
        shadow.set(register, value);

        check_all_registers(transport, &shadow)?;
    }

    Ok(())
}

/// Write invalid registers and check that the register file is unaffected
pub fn write_invalid_reg_read_all<T, V>(
    transport:  &mut T,
    values:     &mut V,
    iterations: usize,
)
    -> Result<(), Failure<T::Error>>
    where
        T: Transport,
        V: Values,
{
    let mut shadow = Shadow::new();
    for register in 0 .. REGISTER_COUNT as u8 {
        let value = values.value(usize::from(register));

        transport.write_register(register, value)
            .map_err(|err| Failure::Bus(err))?;
        shadow.set(register, value);
    }

    for i in 0 .. iterations {
        let register = values.register(i, FIRST_INVALID_REGISTER ..= 0xFF);
        let value    = values.value(i);

        transport.write_register(register, value)
            .map_err(|err| Failure::Bus(err))?;

        check_all_registers(transport, &shadow)?;
    }

    Ok(())
}

/// Write invalid registers and check that the device then reads as zero
pub fn write_invalid_reg_read_zero<T, V>(
    transport:  &mut T,
    values:     &mut V,
    iterations: usize,
)
    -> Result<(), Failure<T::Error>>
    where
        T: Transport,
        V: Values,
{
    for i in 0 .. iterations {
        let register = values.register(i, FIRST_INVALID_REGISTER ..= 0xFF);
        let value    = values.value(i);

        transport.write_register(register, value)
            .map_err(|err| Failure::Bus(err))?;
        let read = transport.raw_read()
            .map_err(|err| Failure::Bus(err))?;

        if read != 0 {
            return Err(Failure::NonZero(read));
        }
    }

    Ok(())
}
