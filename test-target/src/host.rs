//! The serial link to the host test suite


use embedded_hal::{
    blocking::serial as blocking,
    serial,
};
use heapless::{
    Vec,
    consts::U256,
    spsc,
};
use lpc8xx_hal::nb;
use serde::{
    Serialize,
    de::DeserializeOwned,
};

use register_test::{
    Observer,
    Outcome,
    Verdict,
    suite::Case,
};
use protocol::TargetToHost;


/// Interrupt-enabled receiver for host requests
///
/// Can be allocated in a `static`. Once initialized, it is split into two
/// parts:
///
/// - [`RxInt`], which handles the timing-critical parts of receiving, and is
///   intended to be moved into the interrupt handler.
/// - [`RxIdle`], which decodes the received requests in the idle loop.
pub struct HostLink {
    queue: spsc::Queue<u8, QueueCap>,
}

impl HostLink {
    pub const fn new() -> Self {
        Self {
            queue: spsc::Queue(heapless::i::Queue::new()),
        }
    }

    pub fn init<R>(&mut self, rx: R) -> (RxInt<R>, RxIdle) {
        let (prod, cons) = self.queue.split();

        let rx_int = RxInt {
            rx,
            queue: prod,
        };
        let rx_idle = RxIdle {
            queue: cons,
            buf:   Vec::new(),
        };

        (rx_int, rx_idle)
    }
}


/// Receives bytes from the host in an interrupt handler
pub struct RxInt<'r, R> {
    rx:    R,
    queue: spsc::Producer<'r, u8, QueueCap>,
}

impl<R> RxInt<'_, R> where R: serial::Read<u8> {
    /// Receive all available bytes
    ///
    /// Should be called directly from the interrupt handler. The bytes are
    /// queued, to be processed by [`RxIdle`] without any time pressure.
    pub fn receive(&mut self) -> Result<(), ReceiveError<R::Error>> {
        loop {
            match self.rx.read() {
                Ok(b) => {
                    self.queue.enqueue(b)
                        .map_err(|_| ReceiveError::QueueFull)?;
                }
                Err(nb::Error::WouldBlock) => {
                    return Ok(());
                }
                Err(nb::Error::Other(err)) => {
                    return Err(ReceiveError::Usart(err));
                }
            }
        }
    }
}


/// Decodes host requests in the idle loop
pub struct RxIdle<'r> {
    queue: spsc::Consumer<'r, u8, QueueCap>,
    buf:   Vec<u8, QueueCap>,
}

impl RxIdle<'_> {
    /// Indicates whether received bytes are waiting to be processed
    pub fn can_process(&self) -> bool {
        self.queue.ready()
    }

    /// Process received bytes, return request if one is complete
    ///
    /// Returns `None`, if no full request has been received yet.
    pub fn receive<T>(&mut self) -> Option<Result<T, ProcessError>>
        where T: DeserializeOwned
    {
        while let Some(b) = self.queue.dequeue() {
            if self.buf.push(b).is_err() {
                self.buf.clear();
                return Some(Err(ProcessError::BufferFull));
            }

            // Requests are COBS-encoded, so `0` means a full frame has been
            // received.
            if b == 0 {
                let request = postcard::from_bytes_cobs(&mut self.buf)
                    .map_err(|err| ProcessError::Postcard(err));
                self.buf.clear();
                return Some(request);
            }
        }

        None
    }
}


/// Sends messages to the host
pub struct Tx<W> {
    tx:  W,
    buf: [u8; 64],
}

impl<W> Tx<W> where W: blocking::Write<u8> {
    pub fn new(tx: W) -> Self {
        Self {
            tx,
            buf: [0; 64],
        }
    }

    /// Send a message
    ///
    /// Blocks until the message has been sent.
    pub fn send_message<T>(&mut self, message: &T)
        -> Result<(), SendError<W::Error>>
        where T: Serialize
    {
        let message = postcard::to_slice_cobs(message, &mut self.buf)
            .map_err(|err| SendError::Postcard(err))?;
        self.tx.bwrite_all(message)
            .map_err(|err| SendError::Usart(err))?;

        Ok(())
    }
}

/// Reports the progress of a test run to the host
impl<W> Observer for Tx<W>
    where
        W:        blocking::Write<u8>,
        W::Error: core::fmt::Debug,
{
    fn started(&mut self, num: usize, case: &Case) {
        self.send_message(&TargetToHost::TestStarted {
            number: num,
            name:   case.name,
        })
            .expect("Error sending test start to host");
    }

    fn finished(&mut self, num: usize, _: &Case, verdict: Verdict) {
        self.send_message(&TargetToHost::test_finished(num, verdict))
            .expect("Error sending test result to host");
    }

    fn completed(&mut self, outcome: Outcome) {
        self.send_message(&TargetToHost::SuiteFinished(outcome))
            .expect("Error sending suite result to host");
    }
}


// 256 bytes is far more than the largest request, and leaves room for
// garbage that arrives before the first full frame.
type QueueCap = U256;


/// Error receiving data from the host
#[derive(Debug)]
pub enum ReceiveError<E> {
    /// The internal queue is full
    QueueFull,

    /// An error was returned by the USART receiver
    Usart(E),
}

/// Error decoding a host request
#[derive(Debug)]
pub enum ProcessError {
    /// The internal buffer is full
    BufferFull,

    /// Error decoding the request
    Postcard(postcard::Error),
}

/// Error sending a message to the host
#[derive(Debug)]
pub enum SendError<E> {
    Postcard(postcard::Error),
    Usart(E),
}
