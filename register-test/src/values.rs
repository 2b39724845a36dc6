//! Sources for the registers and values used by the test procedures


use core::ops::RangeInclusive;

use rand::{
    Rng as _,
    RngCore,
    SeedableRng as _,
    rngs::SmallRng,
};

#[cfg(feature = "serde")]
use serde::{
    Deserialize,
    Serialize,
};


/// Provides registers and values to the test procedures
pub trait Values {
    /// Pick a register from `range` for the given iteration
    fn register(&mut self, iteration: usize, range: RangeInclusive<u8>) -> u8;

    /// Pick a value to be written in the given iteration
    fn value(&mut self, iteration: usize) -> u8;
}

impl<T> Values for &'_ mut T
    where T: Values
{
    fn register(&mut self, iteration: usize, range: RangeInclusive<u8>) -> u8 {
        (**self).register(iteration, range)
    }

    fn value(&mut self, iteration: usize) -> u8 {
        (**self).value(iteration)
    }
}


/// Deterministic values derived from the iteration
///
/// Registers cycle through the range, values count up and wrap around. Any
/// failure can be reproduced exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

impl Values for Sequential {
    fn register(&mut self, iteration: usize, range: RangeInclusive<u8>) -> u8 {
        let start = *range.start();
        let span  = usize::from(*range.end() - start) + 1;

        start + (iteration % span) as u8
    }

    fn value(&mut self, iteration: usize) -> u8 {
        iteration as u8
    }
}


/// Pseudo-random values
pub struct Random<R> {
    rng: R,
}

impl Random<SmallRng> {
    /// Create a new instance of `Random` from a seed
    ///
    /// The same seed always produces the same sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R> Random<R> where R: RngCore {
    /// Create a new instance of `Random` from any random number generator
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R> Values for Random<R> where R: RngCore {
    fn register(&mut self, _: usize, range: RangeInclusive<u8>) -> u8 {
        self.rng.gen_range(range)
    }

    fn value(&mut self, _: usize) -> u8 {
        self.rng.gen()
    }
}


/// Selects how values are generated
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValueMode {
    Random,
    Sequential,
}


/// A value source that is selected at runtime
pub enum Generator {
    Random(Random<SmallRng>),
    Sequential(Sequential),
}

impl Generator {
    /// Create the generator for `mode`
    ///
    /// `seed` is ignored for sequential values.
    pub fn new(mode: ValueMode, seed: u64) -> Self {
        match mode {
            ValueMode::Random     => Self::Random(Random::seeded(seed)),
            ValueMode::Sequential => Self::Sequential(Sequential),
        }
    }
}

impl Values for Generator {
    fn register(&mut self, iteration: usize, range: RangeInclusive<u8>) -> u8 {
        match self {
            Self::Random(values)     => values.register(iteration, range),
            Self::Sequential(values) => values.register(iteration, range),
        }
    }

    fn value(&mut self, iteration: usize) -> u8 {
        match self {
            Self::Random(values)     => values.value(iteration),
            Self::Sequential(values) => values.value(iteration),
        }
    }
}
