use std::io;

use super::{
    target::TargetRunSuiteError,
    test_stand::TestStandInitError,
};


/// Result type specific to this test suite
pub type Result<T = ()> = std::result::Result<T, Error>;


/// Error type specific to this test suite
#[derive(Debug)]
pub enum Error {
    TargetRunSuite(TargetRunSuiteError),
    TestStandInit(TestStandInitError),
}

impl From<TargetRunSuiteError> for Error {
    fn from(err: TargetRunSuiteError) -> Self {
        Self::TargetRunSuite(err)
    }
}

impl From<TestStandInitError> for Error {
    fn from(err: TestStandInitError) -> Self {
        Self::TestStandInit(err)
    }
}


/// Various low-level errors that can occur in the test suite support code
#[derive(Debug)]
pub enum LowLevelError {
    /// The configuration file could not be parsed
    Config(toml::de::Error),

    /// An I/O error occured
    Io(io::Error),

    /// An error originated from Postcard
    ///
    /// The `postcard` crate is used for (de-)serialization.
    Postcard(postcard::Error),

    /// An error originated from the serial port
    Serial(serialport::Error),
}

impl LowLevelError {
    /// Indicates whether this error is a timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Io(err) if err.kind() == io::ErrorKind::TimedOut => {
                true
            }
            _ => {
                false
            }
        }
    }
}

impl From<toml::de::Error> for LowLevelError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err)
    }
}

impl From<io::Error> for LowLevelError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<postcard::Error> for LowLevelError {
    fn from(err: postcard::Error) -> Self {
        Self::Postcard(err)
    }
}

impl From<serialport::Error> for LowLevelError {
    fn from(err: serialport::Error) -> Self {
        Self::Serial(err)
    }
}
