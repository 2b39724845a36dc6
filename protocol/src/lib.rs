//! Messages exchanged between the host test suite and the harness firmware
//!
//! Messages are serialized with postcard and framed with COBS, so a `0` byte
//! always terminates a message.


#![no_std]


pub use register_test::{
    Mismatch,
    Outcome,
    SuiteKind,
    ValueMode,
    Verdict,
};


use serde::{
    Deserialize,
    Serialize,
};


/// A message from the test suite on the host to the target
#[derive(Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum HostToTarget {
    /// Instruct the target to run a test suite against the device
    RunSuite {
        /// Which suite to run
        suite: SuiteKind,

        /// How registers and values are chosen
        values: ValueMode,

        /// The seed for random values
        seed: u32,
    },
}


/// A message from the target to the test suite on the host
#[derive(Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum TargetToHost<'r> {
    /// Notify the host that a test is about to run
    TestStarted {
        number: usize,
        name:   &'r str,
    },

    /// Notify the host that a test has finished
    TestFinished {
        number: usize,
        passed: bool,

        /// The mismatch that caused the failure, if it is reported
        mismatch: Option<Mismatch>,
    },

    /// Notify the host that the suite has finished
    SuiteFinished(Outcome),
}

impl TargetToHost<'_> {
    /// Create a `TestFinished` message from the verdict on a test
    pub fn test_finished(number: usize, verdict: Verdict) -> Self {
        let (passed, mismatch) = match verdict {
            Verdict::Pass           => (true, None),
            Verdict::Fail(mismatch) => (false, mismatch),
        };

        Self::TestFinished {
            number,
            passed,
            mismatch,
        }
    }
}

impl<'r> TryFrom<TargetToHost<'r>> for Outcome {
    type Error = TargetToHost<'r>;

    fn try_from(value: TargetToHost<'r>) -> Result<Self, Self::Error> {
        match value {
            TargetToHost::SuiteFinished(outcome) => {
                Ok(outcome)
            }
            _ => {
                Err(value)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    extern crate std;

    use super::{
        HostToTarget,
        Mismatch,
        Outcome,
        SuiteKind,
        TargetToHost,
        ValueMode,
        Verdict,
    };


    #[test]
    fn messages_should_be_cobs_framed() {
        let request = HostToTarget::RunSuite {
            suite:  SuiteKind::Full,
            values: ValueMode::Sequential,
            seed:   0,
        };

        let mut frame = postcard::to_stdvec_cobs(&request).unwrap();
        assert_eq!(frame.last(), Some(&0));
        assert_eq!(frame.iter().filter(|&&b| b == 0).count(), 1);

        let decoded: HostToTarget = postcard::from_bytes_cobs(&mut frame)
            .unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_finished_should_carry_the_reported_mismatch() {
        let mismatch = Mismatch { register: 1, written: 0x10, read: 0x11 };

        assert_eq!(
            TargetToHost::test_finished(1, Verdict::Fail(Some(mismatch))),
            TargetToHost::TestFinished {
                number:   1,
                passed:   false,
                mismatch: Some(mismatch),
            },
        );
        assert_eq!(
            TargetToHost::test_finished(2, Verdict::Pass),
            TargetToHost::TestFinished {
                number:   2,
                passed:   true,
                mismatch: None,
            },
        );
    }

    #[test]
    fn only_suite_finished_should_convert_to_outcome() {
        let finished = TargetToHost::SuiteFinished(Outcome::FailedAt(4));
        assert_eq!(Outcome::try_from(finished), Ok(Outcome::FailedAt(4)));

        let started = TargetToHost::TestStarted { number: 1, name: "test" };
        assert!(Outcome::try_from(started).is_err());
    }
}
