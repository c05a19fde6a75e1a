//! Serial transport seam
//!
//! The session talks to anything that can read, write and report how many
//! bytes are waiting. Real ports come from the `serialport` crate.

use std::io::{self, Read, Write};

use serialport::SerialPort;

/// Byte stream to a modem
pub trait ModemPort: Read + Write {
    /// Number of bytes waiting in the receive buffer
    fn bytes_to_read(&mut self) -> io::Result<u32>;
}

impl ModemPort for Box<dyn SerialPort> {
    fn bytes_to_read(&mut self) -> io::Result<u32> {
        SerialPort::bytes_to_read(self.as_ref()).map_err(io::Error::from)
    }
}
