//! Test suite definitions


#[cfg(feature = "serde")]
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    error::Failure,
    procedures,
    transport::Transport,
    values::Values,
};


/// One of the test procedures
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Procedure {
    WriteReadReg1To4,
    WriteReadReg0,
    WriteRegReadAll,
    WriteInvalidRegReadAll,
    WriteInvalidRegReadZero,
}

impl Procedure {
    /// Run the procedure for the configured number of iterations
    pub fn run<T, V>(&self,
        transport:  &mut T,
        values:     &mut V,
        iterations: &Iterations,
    )
        -> Result<(), Failure<T::Error>>
        where
            T: Transport,
            V: Values,
    {
        let n = iterations.of(*self);

        match self {
            Self::WriteReadReg1To4 =>
                procedures::write_read_reg_1_4(transport, values, n),
            Self::WriteReadReg0 =>
                procedures::write_read_reg_0(transport, values, n),
            Self::WriteRegReadAll =>
                procedures::write_reg_read_all(transport, values, n),
            Self::WriteInvalidRegReadAll =>
                procedures::write_invalid_reg_read_all(transport, values, n),
            Self::WriteInvalidRegReadZero =>
                procedures::write_invalid_reg_read_zero(transport, values, n),
        }
    }
}


/// A named test case
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Case {
    pub name:      &'static str,
    pub procedure: Procedure,
}

pub const WRITE_READ_REG_1_4: Case = Case {
    name:      "write/read registers 1-4",
    procedure: Procedure::WriteReadReg1To4,
};
pub const WRITE_READ_REG_0: Case = Case {
    name:      "write/read register 0",
    procedure: Procedure::WriteReadReg0,
};
pub const WRITE_REG_READ_ALL: Case = Case {
    name:      "write reg/read all",
    procedure: Procedure::WriteRegReadAll,
};
pub const WRITE_INVALID_REG_READ_ALL: Case = Case {
    name:      "write invalid reg/read all",
    procedure: Procedure::WriteInvalidRegReadAll,
};
pub const WRITE_INVALID_REG_READ_ZERO: Case = Case {
    name:      "write invalid reg/read zero",
    procedure: Procedure::WriteInvalidRegReadZero,
};

/// All tests, in the order they are run
pub const FULL_SUITE: &[Case] = &[
    WRITE_READ_REG_1_4,
    WRITE_READ_REG_0,
    WRITE_REG_READ_ALL,
    WRITE_INVALID_REG_READ_ALL,
    WRITE_INVALID_REG_READ_ZERO,
];

/// Only the basic round-trip test
pub const SMOKE_SUITE: &[Case] = &[
    WRITE_READ_REG_1_4,
];


/// Selects one of the predefined suites
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SuiteKind {
    Full,
    Smoke,
}

impl SuiteKind {
    pub fn cases(&self) -> &'static [Case] {
        match self {
            Self::Full  => FULL_SUITE,
            Self::Smoke => SMOKE_SUITE,
        }
    }
}


/// The number of iterations each procedure runs for
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Iterations {
    pub write_read_reg_1_4:          usize,
    pub write_read_reg_0:            usize,
    pub write_reg_read_all:          usize,
    pub write_invalid_reg_read_all:  usize,
    pub write_invalid_reg_read_zero: usize,
}

impl Iterations {
    /// Run every procedure for the same number of iterations
    pub fn uniform(n: usize) -> Self {
        Self {
            write_read_reg_1_4:          n,
            write_read_reg_0:            n,
            write_reg_read_all:          n,
            write_invalid_reg_read_all:  n,
            write_invalid_reg_read_zero: n,
        }
    }

    pub fn of(&self, procedure: Procedure) -> usize {
        match procedure {
            Procedure::WriteReadReg1To4 =>
                self.write_read_reg_1_4,
            Procedure::WriteReadReg0 =>
                self.write_read_reg_0,
            Procedure::WriteRegReadAll =>
                self.write_reg_read_all,
            Procedure::WriteInvalidRegReadAll =>
                self.write_invalid_reg_read_all,
            Procedure::WriteInvalidRegReadZero =>
                self.write_invalid_reg_read_zero,
        }
    }
}

impl Default for Iterations {
    fn default() -> Self {
        Self {
            write_read_reg_1_4:          100,
            write_read_reg_0:            10,
            write_reg_read_all:          500,
            write_invalid_reg_read_all:  500,
            write_invalid_reg_read_zero: 500,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::{
        FULL_SUITE,
        Iterations,
        Procedure,
        SMOKE_SUITE,
        SuiteKind,
    };


    #[test]
    fn full_suite_should_run_the_procedures_in_order() {
        let procedures: Vec<_> = FULL_SUITE.iter()
            .map(|case| case.procedure)
            .collect();

        assert_eq!(
            procedures,
            vec![
                Procedure::WriteReadReg1To4,
                Procedure::WriteReadReg0,
                Procedure::WriteRegReadAll,
                Procedure::WriteInvalidRegReadAll,
                Procedure::WriteInvalidRegReadZero,
            ],
        );
    }

    #[test]
    fn smoke_suite_should_be_the_first_test_of_the_full_suite() {
        assert_eq!(SMOKE_SUITE, &FULL_SUITE[.. 1]);
        assert_eq!(SuiteKind::Smoke.cases().len(), 1);
        assert_eq!(SuiteKind::Full.cases().len(), 5);
    }

    #[test]
    fn default_iterations_should_match_the_device_test_plan() {
        let iterations = Iterations::default();

        assert_eq!(iterations.of(Procedure::WriteReadReg1To4),        100);
        assert_eq!(iterations.of(Procedure::WriteReadReg0),           10);
        assert_eq!(iterations.of(Procedure::WriteRegReadAll),         500);
        assert_eq!(iterations.of(Procedure::WriteInvalidRegReadAll),  500);
        assert_eq!(iterations.of(Procedure::WriteInvalidRegReadZero), 500);
    }
}
