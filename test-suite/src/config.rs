//! Test suite configuration


use std::{
    fs,
    path::Path,
};

use serde::Deserialize;

use register_test::ValueMode;

use crate::error::LowLevelError;


/// The default location of the configuration file
pub const CONFIG_FILE: &str = "test-stand.toml";


/// The configuration options for the test suite
#[derive(Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to the serial device connected to the harness firmware
    pub target: Option<String>,

    /// How registers and values are chosen (`"random"` or `"sequential"`)
    pub values: Option<ValueMode>,

    /// The seed for random values
    ///
    /// A new seed is chosen for every run, if this isn't specified.
    pub seed: Option<u32>,
}

impl Config {
    /// Read configuration from the `test-stand.toml` file
    pub fn read() -> Result<Self, ConfigReadError> {
        Self::read_from(CONFIG_FILE)
    }

    /// Read configuration from a specific file
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, ConfigReadError> {
        Self::read_inner(path.as_ref())
            .map_err(|err| ConfigReadError(err))
    }

    /// Parse configuration from a string
    pub fn parse(config: &str) -> Result<Self, ConfigReadError> {
        toml::from_str(config)
            .map_err(|err| ConfigReadError(err.into()))
    }

    fn read_inner(path: &Path) -> Result<Self, LowLevelError> {
        // Read configuration file
        let config = fs::read_to_string(path)?;

        // Parse configuration file
        let config = toml::from_str(&config)?;

        Ok(config)
    }
}


/// Error reading the configuration file
#[derive(Debug)]
pub struct ConfigReadError(pub LowLevelError);
