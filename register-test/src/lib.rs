//! Register access tests for the Robot Arm Click
//!
//! The Robot Arm Click is driven by a PIC12LF1552 that acts as an I2C slave
//! with a tiny register file. This library contains everything needed to
//! check that firmware from an I2C master: the register-level transport, the
//! five test procedures, the runner that sequences them, and the reporting
//! that goes with it (console text and four status LEDs).
//!
//! The library is `no_std`, so it can run on the harness firmware. All
//! hardware access goes through `embedded-hal` traits, which also allows the
//! suite to run against [`device::SimulatedDevice`] on the host.


#![cfg_attr(not(test), no_std)]


pub mod console;
pub mod device;
pub mod error;
pub mod indicators;
pub mod procedures;
pub mod registers;
pub mod runner;
pub mod suite;
pub mod transport;
pub mod values;


pub use self::{
    console::Console,
    device::{
        Fault,
        SimulatedDevice,
    },
    error::{
        Failure,
        Mismatch,
    },
    indicators::{
        Blink,
        Indicators,
        Leds,
    },
    registers::Shadow,
    runner::{
        Observer,
        Outcome,
        RunState,
        Runner,
        Verdict,
    },
    suite::{
        Case,
        FULL_SUITE,
        Iterations,
        Procedure,
        SMOKE_SUITE,
        SuiteKind,
    },
    transport::{
        Bus,
        Transport,
    },
    values::{
        Generator,
        ValueMode,
        Values,
    },
};
