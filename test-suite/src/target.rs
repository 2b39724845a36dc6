use std::{
    fmt,
    time::{
        Duration,
        Instant,
    },
};

use protocol::{
    HostToTarget,
    Mismatch,
    Outcome,
    SuiteKind,
    TargetToHost,
    ValueMode,
};

use crate::conn::{
    Conn,
    ConnReceiveError,
    ConnSendError,
    Port,
};


/// The connection to the harness firmware
pub struct Target<P = Box<dyn serialport::SerialPort>>(pub(crate) Conn<P>);

impl<P> Target<P> where P: Port {
    /// Create a new instance of `Target`
    pub fn new(conn: Conn<P>) -> Self {
        Self(conn)
    }

    /// Instruct the target to run a test suite, and wait for the results
    ///
    /// Returns an error, if the suite hasn't finished within `timeout`.
    pub fn run_suite(&mut self,
        suite:   SuiteKind,
        values:  ValueMode,
        seed:    u32,
        timeout: Duration,
    )
        -> Result<SuiteReport, TargetRunSuiteError>
    {
        log::info!(
            "Running {:?} suite ({:?} values, seed {})",
            suite, values, seed,
        );

        self.0.send(&HostToTarget::RunSuite { suite, values, seed })
            .map_err(|err| TargetRunSuiteError::Send(err))?;

        let mut tests   = Vec::new();
        let mut running = None;
        let     start   = Instant::now();

        loop {
            let remaining = timeout.checked_sub(start.elapsed())
                .ok_or(TargetRunSuiteError::Timeout)?;

            let mut buf = Vec::new();
            let message = self.0.receive::<TargetToHost>(remaining, &mut buf);
            let message = match message {
                Ok(message) => {
                    message
                }
                Err(err) if err.is_timeout() => {
                    return Err(TargetRunSuiteError::Timeout);
                }
                Err(err) => {
                    return Err(TargetRunSuiteError::Receive(err));
                }
            };

            match (message, running.take()) {
                (TargetToHost::TestStarted { number, name }, None) => {
                    log::debug!("test {}: {}: started", number, name);
                    running = Some((number, name.to_owned()));
                }
                (
                    TargetToHost::TestFinished { number, passed, mismatch },
                    Some((started, name)),
                )
                    if number == started =>
                {
                    tests.push(
                        TestRecord {
                            number,
                            name,
                            passed,
                            mismatch,
                        }
                    );
                }
                (TargetToHost::SuiteFinished(outcome), None) => {
                    return Ok(
                        SuiteReport {
                            tests,
                            outcome,
                        }
                    );
                }
                (message, _) => {
                    return Err(
                        TargetRunSuiteError::UnexpectedMessage(
                            format!("{:?}", message)
                        )
                    );
                }
            }
        }
    }
}


/// The result of a test suite run on the target
#[derive(Debug, Eq, PartialEq)]
pub struct SuiteReport {
    /// The tests that have run, in order
    pub tests: Vec<TestRecord>,

    /// The outcome, as reported by the target
    pub outcome: Outcome,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.outcome.passed()
    }

    /// The number of the failed test, if any
    pub fn failed_test(&self) -> Option<usize> {
        self.outcome.failed_test()
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for test in &self.tests {
            if let Some(mismatch) = test.mismatch {
                writeln!(f, "{}", mismatch)?;
            }

            let result = if test.passed { "PASS" } else { "FAIL" };
            writeln!(f, "test {}: {}: {}", test.number, test.name, result)?;
        }

        if self.passed() {
            writeln!(f, "All tests passed.")?;
        }

        Ok(())
    }
}


/// A test that has run on the target
#[derive(Debug, Eq, PartialEq)]
pub struct TestRecord {
    pub number:   usize,
    pub name:     String,
    pub passed:   bool,
    pub mismatch: Option<Mismatch>,
}


#[derive(Debug)]
pub enum TargetRunSuiteError {
    Send(ConnSendError),
    Receive(ConnReceiveError),
    Timeout,
    UnexpectedMessage(String),
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use protocol::{
        HostToTarget,
        Mismatch,
        Outcome,
        SuiteKind,
        TargetToHost,
        ValueMode,
    };

    use crate::conn::{
        Conn,
        tests::Loopback,
    };

    use super::{
        Target,
        TargetRunSuiteError,
    };


    const TIMEOUT: Duration = Duration::from_secs(1);


    #[test]
    fn run_suite_should_send_the_request() {
        let mut port = Loopback::default();
        port.queue(&TargetToHost::SuiteFinished(Outcome::Passed));

        let mut target = Target::new(Conn::new(port));
        target.run_suite(SuiteKind::Smoke, ValueMode::Sequential, 3, TIMEOUT)
            .unwrap();

        let mut sent = target.0.into_port().outgoing;
        let request: HostToTarget = postcard::from_bytes_cobs(&mut sent)
            .unwrap();
        assert_eq!(
            request,
            HostToTarget::RunSuite {
                suite:  SuiteKind::Smoke,
                values: ValueMode::Sequential,
                seed:   3,
            },
        );
    }

    #[test]
    fn run_suite_should_collect_the_results() {
        let mismatch = Mismatch { register: 0, written: 0x07, read: 0x06 };

        let mut port = Loopback::default();
        port.queue(&TargetToHost::TestStarted {
            number: 1,
            name:   "write/read registers 1-4",
        });
        port.queue(&TargetToHost::TestFinished {
            number:   1,
            passed:   true,
            mismatch: None,
        });
        port.queue(&TargetToHost::TestStarted {
            number: 2,
            name:   "write/read register 0",
        });
        port.queue(&TargetToHost::TestFinished {
            number:   2,
            passed:   false,
            mismatch: Some(mismatch),
        });
        port.queue(&TargetToHost::SuiteFinished(Outcome::FailedAt(2)));

        let report = Target::new(Conn::new(port))
            .run_suite(SuiteKind::Full, ValueMode::Random, 0, TIMEOUT)
            .unwrap();

        assert!(!report.passed());
        assert_eq!(report.failed_test(), Some(2));
        assert_eq!(report.tests.len(), 2);
        assert_eq!(
            report.to_string(),
            "test 1: write/read registers 1-4: PASS\n\
            Wrote 07 to register 0, but read 06\n\
            test 2: write/read register 0: FAIL\n",
        );
    }

    #[test]
    fn run_suite_should_reject_unmatched_results() {
        let mut port = Loopback::default();
        port.queue(&TargetToHost::TestFinished {
            number:   1,
            passed:   true,
            mismatch: None,
        });

        let result = Target::new(Conn::new(port))
            .run_suite(SuiteKind::Full, ValueMode::Random, 0, TIMEOUT);

        assert!(matches!(result, Err(TargetRunSuiteError::UnexpectedMessage(_))));
    }

    #[test]
    fn run_suite_should_time_out_if_the_target_is_silent() {
        let port = Loopback::default();

        let result = Target::new(Conn::new(port))
            .run_suite(SuiteKind::Full, ValueMode::Random, 0, TIMEOUT);

        assert!(matches!(result, Err(TargetRunSuiteError::Timeout)));
    }
}
