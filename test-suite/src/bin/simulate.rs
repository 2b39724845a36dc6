//! Runs the register tests against the simulated device
//!
//! Useful for trying out the suite without hardware, and for seeing how a
//! specific firmware bug shows up in the results. Exits with the number of
//! the failed test, or zero, if all tests passed.


use std::{
    fmt,
    io::{
        self,
        Write as _,
    },
    process,
};

use clap::Parser;

use register_test::{
    Bus,
    Console,
    Fault,
    Generator,
    Iterations,
    Outcome,
    Runner,
    SimulatedDevice,
    SuiteKind,
    ValueMode,
};


#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Suite {
    Full,
    Smoke,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Values {
    Random,
    Sequential,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FaultKind {
    /// Behave like conforming firmware
    None,

    /// Writing register 3 corrupts register 2
    Crosstalk,

    /// Stop acknowledging after 100 transactions
    Nack,

    /// Writes to invalid registers end up in registers 0-4
    Alias,

    /// Reads after an invalid write return 0xFF
    Floating,
}

#[derive(Parser, Debug)]
#[command(
    name = "simulate",
    about = "Run the register tests against a simulated device."
)]
struct Args {
    /// Which suite to run.
    #[arg(long, value_enum, default_value_t = Suite::Full)]
    suite: Suite,

    /// How registers and values are chosen.
    #[arg(long, value_enum, default_value_t = Values::Random)]
    values: Values,

    /// Seed for random values (chosen by the system, if not specified).
    #[arg(long)]
    seed: Option<u64>,

    /// Firmware bug the simulated device should exhibit.
    #[arg(long, value_enum, default_value_t = FaultKind::None)]
    fault: FaultKind,

    /// Run every test for this many iterations, instead of the defaults.
    #[arg(long)]
    iterations: Option<usize>,
}


fn main() {
    env_logger::init();

    let args = Args::parse();

    let suite = match args.suite {
        Suite::Full  => SuiteKind::Full,
        Suite::Smoke => SuiteKind::Smoke,
    };
    let mode = match args.values {
        Values::Random     => ValueMode::Random,
        Values::Sequential => ValueMode::Sequential,
    };
    let fault = match args.fault {
        FaultKind::None      => Fault::None,
        FaultKind::Crosstalk => Fault::Crosstalk { written: 3, corrupted: 2 },
        FaultKind::Nack      => Fault::Nack { after: 100 },
        FaultKind::Alias     => Fault::AliasInvalidWrites,
        FaultKind::Floating  => Fault::FloatingRead,
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    let iterations = args.iterations
        .map(Iterations::uniform)
        .unwrap_or_default();

    log::info!("Seed: {}", seed);

    let mut device  = SimulatedDevice::new().with_fault(fault);
    let mut console = Console::new(Stdout(io::stdout()));

    let outcome = Runner::new(
        suite.cases(),
        Bus::new(&mut device),
        Generator::new(mode, seed),
    )
        .with_iterations(iterations)
        .run(&mut console);

    match outcome {
        Outcome::Passed => {
            println!("Indicators: blinking");
        }
        Outcome::FailedAt(_) => {
            let pattern = outcome.indicator_pattern().unwrap_or_default();
            println!("Indicators: {:04b}", pattern);
        }
    }

    process::exit(outcome.exit_code());
}


/// Makes standard output usable as a console
struct Stdout(io::Stdout);

impl fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_all(s.as_bytes())
            .map_err(|_| fmt::Error)
    }
}
