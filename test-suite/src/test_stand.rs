use std::sync::{
    LockResult,
    Mutex,
    MutexGuard,
};

use lazy_static::lazy_static;

use register_test::ValueMode;

use crate::{
    config::{
        Config,
        ConfigReadError,
    },
    conn::{
        Conn,
        ConnInitError,
    },
    target::Target,
};


/// An instance of the test stand
///
/// Used to access all resources that a test case requires.
pub struct TestStand {
    _guard: LockResult<MutexGuard<'static, ()>>,

    /// Connection to the harness firmware
    pub target: Target,

    /// How registers and values are chosen
    pub values: ValueMode,

    /// The seed for random values
    pub seed: u32,
}

impl TestStand {
    /// Initializes the test stand
    ///
    /// Reads the `test-stand.toml` configuration file and initializes test
    /// stand resources, as configured in there.
    pub fn new() -> Result<Self, TestStandInitError> {
        let config = Config::read()
            .map_err(|err| TestStandInitError::ConfigRead(err))?;

        Self::with_config(config)
    }

    /// Initializes the test stand from an already loaded configuration
    pub fn with_config(config: Config) -> Result<Self, TestStandInitError> {
        let _ = env_logger::builder()
            .is_test(true)
            .try_init();

        // Tests run in parallel by default, but there's only one test stand.
        // The guard is held until this struct is dropped, so concurrent
        // instantiations block here. A poisoned lock just means that another
        // test has panicked. The mutex is still acquired in that case.
        lazy_static! { static ref MUTEX: Mutex<()> = Mutex::new(()); }
        let guard = MUTEX.lock();

        let path = config.target
            .ok_or(NotConfiguredError("target"))?;
        let conn = Conn::open(&path)
            .map_err(|err| TestStandInitError::ConnInit(err))?;

        let values = config.values.unwrap_or(ValueMode::Random);
        let seed   = config.seed.unwrap_or_else(rand::random);

        log::info!("Using target at {} (seed {})", path, seed);

        Ok(
            Self {
                _guard: guard,
                target: Target::new(conn),
                values,
                seed,
            }
        )
    }
}


/// Error initializing the test stand
#[derive(Debug)]
pub enum TestStandInitError {
    /// Error reading configuration
    ConfigRead(ConfigReadError),

    /// Error initializing a serial connection
    ConnInit(ConnInitError),

    /// A required resource is missing from the configuration
    NotConfigured(NotConfiguredError),
}

impl From<NotConfiguredError> for TestStandInitError {
    fn from(err: NotConfiguredError) -> Self {
        Self::NotConfigured(err)
    }
}


/// The resource you tried to access was not specified in the configuration file
///
/// If something isn't specified in the configuration file, it is not going to be
/// available.
#[derive(Clone, Copy, Debug)]
pub struct NotConfiguredError(pub &'static str);


#[cfg(test)]
mod tests {
    use crate::{
        config::Config,
        error::Error,
    };

    use super::{
        NotConfiguredError,
        TestStand,
        TestStandInitError,
    };


    #[test]
    fn missing_target_should_be_reported_as_not_configured() {
        let config = Config::parse(r#"values = "sequential""#).unwrap();

        let err = match TestStand::with_config(config) {
            Err(err) => err,
            Ok(_)    => panic!("Expected missing target to be an error"),
        };
        assert!(matches!(
            err,
            TestStandInitError::NotConfigured(NotConfiguredError("target")),
        ));

        // Tests only ever see this through the suite's `Error`.
        assert!(matches!(
            Error::from(err),
            Error::TestStandInit(TestStandInitError::NotConfigured(_)),
        ));
    }
}
