//! Sequences the test cases of a suite


use core::fmt::Debug;

#[cfg(feature = "serde")]
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    error::Mismatch,
    suite::{
        Case,
        Iterations,
    },
    transport::Transport,
    values::Values,
};


/// The state of a test run
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunState {
    /// The test at this (0-based) index is next
    Pending(usize),

    /// All tests have passed
    Passed,

    /// The test with this (1-based) number has failed
    FailedAt(usize),
}

impl RunState {
    /// The outcome of the run, if it has finished
    pub fn outcome(&self) -> Option<Outcome> {
        match *self {
            Self::Pending(_)    => None,
            Self::Passed        => Some(Outcome::Passed),
            Self::FailedAt(num) => Some(Outcome::FailedAt(num)),
        }
    }
}


/// The result of a finished test run
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Outcome {
    Passed,

    /// The test with this (1-based) number has failed
    FailedAt(usize),
}

impl Outcome {
    pub fn passed(&self) -> bool {
        *self == Self::Passed
    }

    /// The number of the failed test, if any
    pub fn failed_test(&self) -> Option<usize> {
        match *self {
            Self::Passed        => None,
            Self::FailedAt(num) => Some(num),
        }
    }

    /// The exit status of a process that ran the suite
    ///
    /// Zero, if all tests passed, the number of the failed test otherwise.
    /// Saturates at `i32::MAX`.
    pub fn exit_code(&self) -> i32 {
        self.failed_test()
            .map(|num| i32::try_from(num).unwrap_or(i32::MAX))
            .unwrap_or(0)
    }

    /// The pattern shown on the indicators after a failure
    ///
    /// The low 4 bits of the failed test's number.
    pub fn indicator_pattern(&self) -> Option<u8> {
        self.failed_test().map(|num| (num & 0x0F) as u8)
    }
}


/// The verdict on a single test
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    Pass,

    /// The test failed, with the mismatch to report, if any
    Fail(Option<Mismatch>),
}


/// Gets notified about the progress of a test run
///
/// All methods do nothing by default.
pub trait Observer {
    /// Test number `num` (1-based) is about to run
    fn started(&mut self, _num: usize, _case: &Case) {}

    /// Test number `num` (1-based) has finished
    fn finished(&mut self, _num: usize, _case: &Case, _verdict: Verdict) {}

    /// The run has finished
    fn completed(&mut self, _outcome: Outcome) {}
}

impl Observer for () {}

impl<A, B> Observer for (A, B)
    where
        A: Observer,
        B: Observer,
{
    fn started(&mut self, num: usize, case: &Case) {
        self.0.started(num, case);
        self.1.started(num, case);
    }

    fn finished(&mut self, num: usize, case: &Case, verdict: Verdict) {
        self.0.finished(num, case, verdict);
        self.1.finished(num, case, verdict);
    }

    fn completed(&mut self, outcome: Outcome) {
        self.0.completed(outcome);
        self.1.completed(outcome);
    }
}

impl<T> Observer for &'_ mut T
    where T: Observer
{
    fn started(&mut self, num: usize, case: &Case) {
        (**self).started(num, case)
    }

    fn finished(&mut self, num: usize, case: &Case, verdict: Verdict) {
        (**self).finished(num, case, verdict)
    }

    fn completed(&mut self, outcome: Outcome) {
        (**self).completed(outcome)
    }
}


/// Runs the tests of a suite in order, until the first failure
pub struct Runner<'s, T, V> {
    cases:      &'s [Case],
    transport:  T,
    values:     V,
    iterations: Iterations,
    state:      RunState,
}

impl<'s, T, V> Runner<'s, T, V>
    where
        T:        Transport,
        T::Error: Debug,
        V:        Values,
{
    /// Create a new instance of `Runner`
    ///
    /// Uses the default iteration counts.
    pub fn new(cases: &'s [Case], transport: T, values: V) -> Self {
        Self {
            cases,
            transport,
            values,
            iterations: Iterations::default(),
            state:      RunState::Pending(0),
        }
    }

    /// Override the iteration counts
    pub fn with_iterations(mut self, iterations: Iterations) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run the next test
    ///
    /// Does nothing, if the run has already finished. Notifies `observer` of
    /// the completion once, when the run finishes.
    pub fn step(&mut self, observer: &mut impl Observer) -> RunState {
        let index = match self.state {
            RunState::Pending(index) => index,
            _                        => return self.state,
        };

        let cases = self.cases;
        let case = match cases.get(index) {
            Some(case) => case,
            None => {
                // Only reachable for an empty suite.
                return self.complete(RunState::Passed, observer);
            }
        };
        let num = index + 1;

        observer.started(num, case);
        let result = case.procedure.run(
            &mut self.transport,
            &mut self.values,
            &self.iterations,
        );

        match result {
            Ok(()) => {
                log::debug!("test {}: {}: passed", num, case.name);
                observer.finished(num, case, Verdict::Pass);

                if index + 1 < cases.len() {
                    self.state = RunState::Pending(index + 1);
                    self.state
                }
                else {
                    self.complete(RunState::Passed, observer)
                }
            }
            Err(failure) => {
                log::debug!("test {}: {}: {:?}", num, case.name, failure);
                observer.finished(
                    num,
                    case,
                    Verdict::Fail(failure.reported_mismatch()),
                );

                self.complete(RunState::FailedAt(num), observer)
            }
        }
    }

    /// Run all remaining tests
    pub fn run(&mut self, observer: &mut impl Observer) -> Outcome {
        loop {
            if let Some(outcome) = self.step(observer).outcome() {
                return outcome;
            }
        }
    }

    /// Release the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn complete(&mut self, state: RunState, observer: &mut impl Observer)
        -> RunState
    {
        self.state = state;
        if let Some(outcome) = state.outcome() {
            observer.completed(outcome);
        }
        state
    }
}


#[cfg(test)]
mod tests {
    use crate::{
        device::{
            Fault,
            SimulatedDevice,
        },
        suite::{
            Case,
            FULL_SUITE,
            Iterations,
            WRITE_INVALID_REG_READ_ZERO,
            WRITE_READ_REG_1_4,
        },
        transport::Bus,
        values::Sequential,
    };

    use super::{
        Observer,
        Outcome,
        RunState,
        Runner,
        Verdict,
    };


    #[derive(Default)]
    struct Record {
        started:   Vec<usize>,
        finished:  Vec<(usize, Verdict)>,
        completed: Vec<Outcome>,
    }

    impl Observer for Record {
        fn started(&mut self, num: usize, _: &Case) {
            self.started.push(num);
        }

        fn finished(&mut self, num: usize, _: &Case, verdict: Verdict) {
            self.finished.push((num, verdict));
        }

        fn completed(&mut self, outcome: Outcome) {
            self.completed.push(outcome);
        }
    }


    #[test]
    fn empty_suite_should_pass() {
        let mut device = SimulatedDevice::new();
        let mut record = Record::default();

        let mut runner = Runner::new(&[], Bus::new(&mut device), Sequential);
        assert_eq!(runner.state(), RunState::Pending(0));

        assert_eq!(runner.run(&mut record), Outcome::Passed);
        assert!(record.started.is_empty());
        assert_eq!(record.completed, vec![Outcome::Passed]);
    }

    #[test]
    fn step_should_advance_through_the_suite() {
        let mut device = SimulatedDevice::new();
        let mut runner = Runner::new(
            FULL_SUITE,
            Bus::new(&mut device),
            Sequential,
        )
            .with_iterations(Iterations::uniform(3));

        for next in 1 .. 5 {
            assert_eq!(runner.step(&mut ()), RunState::Pending(next));
        }
        assert_eq!(runner.step(&mut ()), RunState::Passed);
    }

    #[test]
    fn terminal_state_should_be_stable() {
        let mut device = SimulatedDevice::new();
        let mut record = Record::default();

        let mut runner = Runner::new(
            FULL_SUITE,
            Bus::new(&mut device),
            Sequential,
        )
            .with_iterations(Iterations::uniform(3));

        assert_eq!(runner.run(&mut record), Outcome::Passed);
        assert_eq!(runner.step(&mut record), RunState::Passed);
        assert_eq!(runner.run(&mut record), Outcome::Passed);

        assert_eq!(record.started, vec![1, 2, 3, 4, 5]);
        assert_eq!(record.completed, vec![Outcome::Passed]);
    }

    #[test]
    fn tuple_observers_should_both_be_notified() {
        let mut device = SimulatedDevice::new();
        let mut observers = (Record::default(), Record::default());

        Runner::new(&FULL_SUITE[.. 2], Bus::new(&mut device), Sequential)
            .with_iterations(Iterations::uniform(1))
            .run(&mut observers);

        assert_eq!(observers.0.finished, observers.1.finished);
        assert_eq!(
            observers.0.finished,
            vec![(1, Verdict::Pass), (2, Verdict::Pass)],
        );
    }

    #[test]
    fn outcome_should_map_to_exit_code_and_pattern() {
        assert_eq!(Outcome::Passed.exit_code(), 0);
        assert_eq!(Outcome::Passed.indicator_pattern(), None);

        assert_eq!(Outcome::FailedAt(3).exit_code(), 3);
        assert_eq!(Outcome::FailedAt(3).indicator_pattern(), Some(0b0011));
        assert_eq!(Outcome::FailedAt(17).indicator_pattern(), Some(0b0001));
    }

    #[test]
    fn long_suites_should_number_every_test() {
        let cases = vec![WRITE_READ_REG_1_4; 300];

        let mut device = SimulatedDevice::new();
        let mut record = Record::default();

        let outcome = Runner::new(&cases, Bus::new(&mut device), Sequential)
            .with_iterations(Iterations::uniform(1))
            .run(&mut record);

        assert_eq!(outcome, Outcome::Passed);
        assert_eq!(record.started, (1 ..= 300).collect::<Vec<_>>());
    }

    #[test]
    fn failure_beyond_test_255_should_report_the_full_number() {
        let mut cases = vec![WRITE_READ_REG_1_4; 299];
        cases.push(WRITE_INVALID_REG_READ_ZERO);

        let mut device = SimulatedDevice::new()
            .with_fault(Fault::FloatingRead);

        let outcome = Runner::new(&cases, Bus::new(&mut device), Sequential)
            .with_iterations(Iterations::uniform(1))
            .run(&mut ());

        assert_eq!(outcome, Outcome::FailedAt(300));
        assert_eq!(outcome.exit_code(), 300);
        assert_eq!(outcome.indicator_pattern(), Some(0b1100));
    }
}
