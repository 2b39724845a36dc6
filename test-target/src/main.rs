//! Harness firmware for the Robot Arm Click register tests
//!
//! Runs on an LPC845-BRK board that is connected to the Robot Arm Click via
//! I2C. Needs to be downloaded to the board before the test suite can be run.
//! See README.md for the wiring.
//!
//! Runs the full suite once at power-up, then waits for requests from the
//! host test suite. The outcome of the most recent run is shown on four LEDs:
//! all LEDs blink, if all tests passed, otherwise the number of the failed
//! test is shown in binary.


#![no_main]
#![no_std]


extern crate panic_rtt_target;


mod host;


use core::{
    fmt,
    marker::PhantomData,
};

use lpc8xx_hal::{
    Peripherals,
    cortex_m::{
        interrupt,
        peripheral::SYST,
    },
    gpio::{
        GpioPin,
        Level,
        direction::Output,
    },
    i2c,
    init_state::Enabled,
    pac::{
        I2C0,
        USART0,
    },
    pins::{
        PIO0_16,
        PIO0_17,
        PIO0_18,
        PIO0_19,
    },
    syscon::{
        IOSC,
        frg,
    },
    usart,
};
use rtic::Mutex;
use rtt_target::{
    rprint,
    rprintln,
};
use void::ResultVoidExt as _;

#[cfg(feature = "sleep")]
use lpc8xx_hal::cortex_m::asm;

use protocol::HostToTarget;
use register_test::{
    Blink,
    Bus,
    Console,
    Generator,
    Observer,
    Outcome,
    Runner,
    SuiteKind,
    ValueMode,
    indicators,
};

use self::host::{
    HostLink,
    RxIdle,
    RxInt,
    Tx,
};


/// The seed for the run at power-up
///
/// There's no source of entropy on the board, so every power-up run uses the
/// same values. Runs requested by the host use a seed chosen by the host.
const BOOT_SEED: u32 = 0x1552;


type HostRx = usart::Rx<USART0, usart::state::Enabled<u8>>;
type HostTx = usart::Tx<USART0, usart::state::Enabled<u8>>;

type I2c = i2c::Master<I2C0, Enabled<PhantomData<IOSC>>, Enabled>;

type Leds = register_test::Leds<
    GpioPin<PIO0_16, Output>,
    GpioPin<PIO0_17, Output>,
    GpioPin<PIO0_18, Output>,
    GpioPin<PIO0_19, Output>,
>;


#[rtic::app(device = lpc8xx_hal::pac)]
const APP: () = {
    struct Resources {
        host_rx_int:  RxInt<'static, HostRx>,
        host_rx_idle: RxIdle<'static>,
        host_tx:      Tx<HostTx>,

        leds:    Leds,
        systick: SYST,
        i2c:     I2c,

        #[init(Blink::new())]
        blink: Blink,
    }

    #[init]
    fn init(context: init::Context) -> init::LateResources {
        // Normally, access to a `static mut` would be unsafe, but we know that
        // this method is only called once, which means we have exclusive access
        // here. RTIC knows this too, and by putting these statics right here,
        // at the beginning of the method, we're opting into some RTIC magic
        // that gives us safe access to them.
        static mut HOST: HostLink = HostLink::new();

        rtt_target::rtt_init_print!();
        rprintln!("Starting harness.");

        // Get access to the device's peripherals. This can't panic, since this
        // is the only place in this program where we call this method.
        let p = Peripherals::take().unwrap_or_else(|| unreachable!());

        let systick = context.core.SYST;

        let mut syscon = p.SYSCON.split();
        let     swm    = p.SWM.split();
        let     gpio   = p.GPIO.enable(&mut syscon.handle);

        let mut swm_handle = swm.handle.enable(&mut syscon.handle);

        // Configure the LEDs. They stay dark until the first run has finished.
        let leds = register_test::Leds::new(
            p.pins.pio0_16.into_output_pin(gpio.tokens.pio0_16, Level::Low),
            p.pins.pio0_17.into_output_pin(gpio.tokens.pio0_17, Level::Low),
            p.pins.pio0_18.into_output_pin(gpio.tokens.pio0_18, Level::Low),
            p.pins.pio0_19.into_output_pin(gpio.tokens.pio0_19, Level::Low),
        );

        // Configure the clock for USART0, using the Fractional Rate Generator
        // (FRG) and the USART's own baud rate divider value (BRG). See user
        // manual, section 17.7.1.
        //
        // This assumes a system clock of 12 MHz (which is the default and, as
        // of this writing, has not been changed in this program). The resulting
        // rate is roughly 115200 baud.
        let clock_config = {
            syscon.frg0.select_clock(frg::Clock::FRO);
            syscon.frg0.set_mult(22);
            syscon.frg0.set_div(0xFF);
            usart::Clock::new(&syscon.frg0, 5, 16)
        };

        // Assign pins to USART0 for RX/TX functions. On the LPC845-BRK, those
        // are the pins connected to the programmer, and bridged to the host via
        // USB.
        //
        // Careful, the LCP845-BRK documentation uses the opposite designations
        // (i.e. from the perspective of the on-board programmer, not the
        // microcontroller).
        let (u0_rxd, _) = swm.movable_functions.u0_rxd.assign(
            p.pins.pio0_24.into_swm_pin(),
            &mut swm_handle,
        );
        let (u0_txd, _) = swm.movable_functions.u0_txd.assign(
            p.pins.pio0_25.into_swm_pin(),
            &mut swm_handle,
        );

        // Use USART0 to communicate with the test suite
        let mut host = p.USART0.enable(
            &clock_config,
            &mut syscon.handle,
            u0_rxd,
            u0_txd,
            usart::Settings::default(),
        );
        host.enable_rxrdy();

        let (host_rx_int, host_rx_idle) = HOST.init(host.rx);
        let host_tx = Tx::new(host.tx);

        // The device is the only slave on the bus.
        let (i2c0_sda, _) = swm
            .fixed_functions
            .i2c0_sda
            .assign(p.pins.pio0_11.into_swm_pin(), &mut swm_handle);
        let (i2c0_scl, _) = swm
            .fixed_functions
            .i2c0_scl
            .assign(p.pins.pio0_10.into_swm_pin(), &mut swm_handle);

        let i2c = p.I2C0
            .enable(
                &syscon.iosc,
                i2c0_scl,
                i2c0_sda,
                &mut syscon.handle,
            )
            .enable_master_mode(
                &i2c::Clock::new_400khz(),
            );

        init::LateResources {
            host_rx_int,
            host_rx_idle,
            host_tx,

            leds,
            systick,
            i2c: i2c.master,
        }
    }

    #[idle(resources = [host_rx_idle, host_tx, leds, blink, systick, i2c])]
    fn idle(cx: idle::Context) -> ! {
        let host_rx  = cx.resources.host_rx_idle;
        let host_tx  = cx.resources.host_tx;
        let systick  = cx.resources.systick;
        let i2c      = cx.resources.i2c;
        let mut leds  = cx.resources.leds;
        let mut blink = cx.resources.blink;

        // Run once, so the harness is useful without a host.
        let outcome = run_suite(
            i2c,
            SuiteKind::Full,
            ValueMode::Random,
            BOOT_SEED,
            &mut Console::new(Rtt),
        );
        show_outcome(&mut leds, &mut blink, systick, outcome);

        loop {
            if let Some(request) = host_rx.receive() {
                let request = request
                    .expect("Error decoding host request");

                match request {
                    HostToTarget::RunSuite { suite, values, seed } => {
                        stop_blinking(systick);

                        let outcome = run_suite(
                            i2c,
                            suite,
                            values,
                            seed,
                            &mut (Console::new(Rtt), &mut *host_tx),
                        );
                        show_outcome(&mut leds, &mut blink, systick, outcome);
                    }
                }
            }

            // We need this critical section to protect against a race
            // condition with the USART interrupt. Otherwise, a request could
            // arrive after we checked, and we'd go to sleep without processing
            // it.
            interrupt::free(|_| {
                if !host_rx.can_process() {
                    // On LPC84x MCUs, debug mode is not supported when
                    // sleeping. This interferes with RTT communication. Only
                    // sleep, if the user enables this through a compile-time
                    // flag.
                    #[cfg(feature = "sleep")]
                    asm::wfi();
                }
            });
        }
    }

    #[task(binds = USART0, resources = [host_rx_int])]
    fn usart0(cx: usart0::Context) {
        cx.resources.host_rx_int.receive()
            .expect("Error receiving from USART0");
    }

    #[task(binds = SysTick, resources = [leds, blink])]
    fn syst(cx: syst::Context) {
        cx.resources.blink.toggle(cx.resources.leds)
            .void_unwrap();
    }
};


fn run_suite(
    i2c:      &mut I2c,
    suite:    SuiteKind,
    values:   ValueMode,
    seed:     u32,
    observer: &mut impl Observer,
)
    -> Outcome
{
    rprintln!("Running {:?} suite ({:?} values, seed {})", suite, values, seed);

    Runner::new(
        suite.cases(),
        Bus::new(i2c),
        Generator::new(values, seed.into()),
    )
        .run(observer)
}

fn show_outcome(
    leds:    &mut impl Mutex<T = Leds>,
    blink:   &mut impl Mutex<T = Blink>,
    systick: &mut SYST,
    outcome: Outcome,
) {
    leds.lock(|leds| indicators::show_outcome(leds, outcome))
        .void_unwrap();

    if outcome.passed() {
        // All LEDs are lit now, whatever phase the last blinking ended in.
        blink.lock(|blink| blink.reset());
        start_blinking(systick);
    }
}

fn start_blinking(systick: &mut SYST) {
    // By default (and we haven't changed that setting) the SysTick timer runs
    // at half the system frequency. The system frequency runs at 12 MHz by
    // default (again, we haven't changed it), meaning the SysTick timer runs
    // at 6 MHz.
    //
    // At 6 MHz, 1 ms are 6000 timer ticks.
    let reload = Blink::PERIOD_MS * 6000;
    systick.set_reload(reload);

    systick.clear_current();
    systick.enable_interrupt();
    systick.enable_counter();
}

fn stop_blinking(systick: &mut SYST) {
    systick.disable_interrupt();
    systick.disable_counter();
}


/// Makes RTT usable as a console
struct Rtt;

impl fmt::Write for Rtt {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        rprint!("{}", s);
        Ok(())
    }
}
