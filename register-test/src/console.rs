//! Text output for test runs


use core::fmt;

use crate::{
    runner::{
        Observer,
        Outcome,
        Verdict,
    },
    suite::Case,
};


/// Reports test results as lines of text
///
/// Writes to anything that implements `core::fmt::Write`, like RTT on the
/// firmware or standard output on the host. Errors while writing are
/// ignored, as there would be nowhere to report them.
pub struct Console<W> {
    out: W,
}

impl<W> Console<W> where W: fmt::Write {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn inner(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W> Observer for Console<W> where W: fmt::Write {
    fn finished(&mut self, num: usize, case: &Case, verdict: Verdict) {
        let result = match verdict {
            Verdict::Pass => {
                "PASS"
            }
            Verdict::Fail(mismatch) => {
                if let Some(mismatch) = mismatch {
                    let _ = writeln!(self.out, "{}", mismatch);
                }
                "FAIL"
            }
        };

        let _ = writeln!(self.out, "test {}: {}: {}", num, case.name, result);
    }

    fn completed(&mut self, outcome: Outcome) {
        if outcome.passed() {
            let _ = writeln!(self.out, "All tests passed.");
        }
    }
}
