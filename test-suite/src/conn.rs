use std::{
    io,
    slice,
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};
use serialport::{
    ClearBuffer,
    SerialPort,
};

use crate::error::LowLevelError;


/// The baud rate of the host link
pub const BAUD_RATE: u32 = 115_200;


/// A byte stream that a connection can run over
///
/// Implemented for serial ports. Other implementations allow testing the
/// connection without hardware.
pub trait Port: io::Read + io::Write {
    /// Set the timeout for subsequent reads
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), LowLevelError>;
}

impl Port for Box<dyn SerialPort> {
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), LowLevelError> {
        SerialPort::set_timeout(self.as_mut(), timeout)?;
        Ok(())
    }
}


/// A connection to the harness firmware
pub struct Conn<P = Box<dyn SerialPort>> {
    port: P,
}

impl Conn {
    /// Open the connection
    ///
    /// `path` is the path to the serial device file that connects to the
    /// firmware. Anything the firmware sent before the connection was opened
    /// is discarded.
    pub fn open(path: &str) -> Result<Self, ConnInitError> {
        let port = serialport::new(path, BAUD_RATE)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|err| ConnInitError(err))?;

        port.clear(ClearBuffer::All)
            .map_err(|err| ConnInitError(err))?;

        Ok(Self::new(port))
    }
}

impl<P> Conn<P> where P: Port {
    /// Create a connection over an already opened port
    pub fn new(port: P) -> Self {
        Self {
            port,
        }
    }

    /// Send a message
    ///
    /// `message` can be any type that can be serialized using `serde`.
    pub fn send<T>(&mut self, message: &T) -> Result<(), ConnSendError>
        where T: Serialize
    {
        self.send_inner(message)
            .map_err(|err| ConnSendError(err))
    }

    fn send_inner<T>(&mut self, message: &T) -> Result<(), LowLevelError>
        where T: Serialize
    {
        let mut buf = [0; 256];

        let serialized = postcard::to_slice_cobs(message, &mut buf)?;
        self.port.write_all(serialized)?;
        self.port.flush()?;

        Ok(())
    }

    /// Receive a message
    ///
    /// Accepts the following arguments:
    /// - `timeout`, which specifies the timeout. An error is returned, if
    ///   nothing is received after this duration.
    /// - `buf` is the buffer used to receive data into. Its lifetime is tied to
    ///   the return value, as the received type might still borrow data from
    ///   this buffer.
    pub fn receive<'de, T>(&mut self, timeout: Duration, buf: &'de mut Vec<u8>)
        -> Result<T, ConnReceiveError>
        where T: Deserialize<'de>
    {
        self.receive_inner(timeout, buf)
            .map_err(|err| ConnReceiveError(err))
    }

    fn receive_inner<'de, T>(&mut self,
        timeout: Duration,
        buf:     &'de mut Vec<u8>,
    )
        -> Result<T, LowLevelError>
        where T: Deserialize<'de>
    {
        self.port.set_timeout(timeout)?;
        buf.clear();

        loop {
            let mut b = 0;
            self.port.read_exact(slice::from_mut(&mut b))?;

            buf.push(b);

            // Messages are COBS-encoded, so `0` is the end of the message.
            if b == 0 {
                break;
            }
        }

        let message = postcard::from_bytes_cobs(buf)?;
        Ok(message)
    }

    /// Release the port
    pub fn into_port(self) -> P {
        self.port
    }
}


/// Error initializing connection
#[derive(Debug)]
pub struct ConnInitError(pub serialport::Error);


/// Error sending data through a connection
#[derive(Debug)]
pub struct ConnSendError(pub LowLevelError);


/// Error receiving from a connection
#[derive(Debug)]
pub struct ConnReceiveError(pub LowLevelError);

impl ConnReceiveError {
    pub fn is_timeout(&self) -> bool {
        self.0.is_timeout()
    }
}
