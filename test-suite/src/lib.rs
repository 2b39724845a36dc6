//! Host-side support code for the Robot Arm Click test stand
//!
//! The tests themselves run on the harness firmware, which is connected to
//! the device. This library instructs the firmware to run a suite and
//! collects the results it reports over the serial link.


pub mod config;
pub mod conn;
pub mod error;
pub mod target;
pub mod test_stand;


pub use self::{
    error::{
        Error,
        LowLevelError,
        Result,
    },
    target::{
        SuiteReport,
        Target,
        TestRecord,
    },
    test_stand::TestStand,
};
