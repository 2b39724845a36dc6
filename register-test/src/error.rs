use core::fmt;

#[cfg(feature = "serde")]
use serde::{
    Deserialize,
    Serialize,
};


/// Why a test procedure failed
///
/// Bus errors and unexpected values both fail a test. The distinction is only
/// kept for diagnostics.
#[derive(Debug, Eq, PartialEq)]
pub enum Failure<E> {
    /// A bus transaction was not acknowledged, or the driver reported an error
    Bus(E),

    /// A register did not read back the value that was just written to it
    Mismatch(Mismatch),

    /// The register file no longer holds the expected values
    Corrupted(Mismatch),

    /// A raw read after a write to an invalid register didn't return zero
    NonZero(u8),
}

impl<E> Failure<E> {
    /// The mismatch that should be reported to the operator, if any
    ///
    /// Only the round-trip tests report their mismatches. All other failures
    /// just fail the test.
    pub fn reported_mismatch(&self) -> Option<Mismatch> {
        match self {
            Self::Mismatch(mismatch) => Some(*mismatch),
            _                        => None,
        }
    }
}


/// A register that didn't hold the expected value
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Mismatch {
    /// The register that was read
    pub register: u8,

    /// The value that was written to it
    pub written: u8,

    /// The value that was read back
    pub read: u8,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Wrote {:02X} to register {}, but read {:02X}",
            self.written,
            self.register,
            self.read,
        )
    }
}
