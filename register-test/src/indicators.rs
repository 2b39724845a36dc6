//! The four status LEDs


use embedded_hal::digital::v2::OutputPin;

use crate::runner::Outcome;


/// The pattern that lights all indicators
pub const ALL_ON: u8 = 0x0F;


/// Four indicators that show a 4-bit pattern
pub trait Indicators {
    type Error;

    /// Show `pattern`
    ///
    /// Indicator `k` (counting from zero) is lit, if bit `k` of `pattern` is
    /// set. Bits above bit 3 are ignored.
    fn show(&mut self, pattern: u8) -> Result<(), Self::Error>;
}

impl<T> Indicators for &'_ mut T
    where T: Indicators
{
    type Error = T::Error;

    fn show(&mut self, pattern: u8) -> Result<(), Self::Error> {
        (**self).show(pattern)
    }
}


/// Four LEDs, connected to output pins
///
/// An LED is lit while its pin is high.
pub struct Leds<A, B, C, D> {
    pub led1: A,
    pub led2: B,
    pub led3: C,
    pub led4: D,
}

impl<A, B, C, D> Leds<A, B, C, D> {
    pub fn new(led1: A, led2: B, led3: C, led4: D) -> Self {
        Self {
            led1,
            led2,
            led3,
            led4,
        }
    }
}

impl<A, B, C, D, E> Indicators for Leds<A, B, C, D>
    where
        A: OutputPin<Error = E>,
        B: OutputPin<Error = E>,
        C: OutputPin<Error = E>,
        D: OutputPin<Error = E>,
{
    type Error = E;

    fn show(&mut self, pattern: u8) -> Result<(), E> {
        set(&mut self.led1, pattern & 0x1 != 0)?;
        set(&mut self.led2, pattern & 0x2 != 0)?;
        set(&mut self.led3, pattern & 0x4 != 0)?;
        set(&mut self.led4, pattern & 0x8 != 0)?;

        Ok(())
    }
}

fn set<P: OutputPin>(pin: &mut P, lit: bool) -> Result<(), P::Error> {
    match lit {
        true  => pin.set_high(),
        false => pin.set_low(),
    }
}


/// Show the outcome of a test run
///
/// Shows the failed test's number after a failure. Lights all indicators
/// after a pass, as the starting point for [`Blink`].
pub fn show_outcome<I>(indicators: &mut I, outcome: Outcome)
    -> Result<(), I::Error>
    where I: Indicators
{
    let pattern = outcome.indicator_pattern().unwrap_or(ALL_ON);
    indicators.show(pattern)
}


/// Toggles all indicators together
///
/// Used to signal a passed run, by calling [`Blink::toggle`] periodically.
pub struct Blink {
    lit: bool,
}

impl Blink {
    /// The toggle period, in milliseconds
    pub const PERIOD_MS: u32 = 100;

    /// Create a new instance of `Blink`
    ///
    /// Assumes that all indicators are currently lit.
    pub const fn new() -> Self {
        Self {
            lit: true,
        }
    }

    /// Start over, after all indicators have been lit again
    pub fn reset(&mut self) {
        self.lit = true;
    }

    /// Toggle all indicators
    pub fn toggle<I>(&mut self, indicators: &mut I) -> Result<(), I::Error>
        where I: Indicators
    {
        self.lit = !self.lit;

        let pattern = if self.lit { ALL_ON } else { 0 };
        indicators.show(pattern)
    }
}


#[cfg(test)]
mod tests {
    use crate::runner::Outcome;

    use super::{
        Blink,
        Indicators,
        show_outcome,
    };


    #[derive(Default)]
    struct Pattern(u8);

    impl Indicators for Pattern {
        type Error = ();

        fn show(&mut self, pattern: u8) -> Result<(), ()> {
            self.0 = pattern & 0x0F;
            Ok(())
        }
    }


    #[test]
    fn leds_should_mirror_the_bits_of_the_pattern() {
        use embedded_hal_mock::pin::{
            Mock as PinMock,
            State,
            Transaction,
        };

        use super::Leds;

        let mut leds = Leds::new(
            PinMock::new(&[Transaction::set(State::High)]),
            PinMock::new(&[Transaction::set(State::High)]),
            PinMock::new(&[Transaction::set(State::Low)]),
            PinMock::new(&[Transaction::set(State::Low)]),
        );

        leds.show(0b0011).unwrap();

        leds.led1.done();
        leds.led2.done();
        leds.led3.done();
        leds.led4.done();
    }

    #[test]
    fn failure_should_show_the_test_number() {
        let mut pattern = Pattern::default();

        show_outcome(&mut pattern, Outcome::FailedAt(5)).unwrap();
        assert_eq!(pattern.0, 0b0101);
    }

    #[test]
    fn pass_should_light_all_indicators() {
        let mut pattern = Pattern::default();

        show_outcome(&mut pattern, Outcome::Passed).unwrap();
        assert_eq!(pattern.0, 0b1111);
    }

    #[test]
    fn blink_should_toggle_all_indicators() {
        let mut pattern = Pattern(0b1111);
        let mut blink   = Blink::new();

        blink.toggle(&mut pattern).unwrap();
        assert_eq!(pattern.0, 0b0000);

        blink.toggle(&mut pattern).unwrap();
        assert_eq!(pattern.0, 0b1111);
    }

    #[test]
    fn reset_blink_should_start_with_a_dark_phase() {
        let mut pattern = Pattern(0b1111);
        let mut blink   = Blink::new();

        // Blinking stopped while the indicators were dark.
        blink.toggle(&mut pattern).unwrap();

        // The next pass lights all indicators again.
        show_outcome(&mut pattern, Outcome::Passed).unwrap();
        blink.reset();

        blink.toggle(&mut pattern).unwrap();
        assert_eq!(pattern.0, 0b0000);
    }
}
