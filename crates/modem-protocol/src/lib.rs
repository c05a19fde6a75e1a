//! Modem Protocol Library
//!
//! This crate provides the small slice of the Hayes AT command set needed to
//! answer a call on a USB voice modem:
//!
//! - **Commands**: a closed set of AT commands (echo off, answer, hang up,
//!   DTMF tone), each encoded to carriage-return terminated bytes
//! - **Lines**: lenient decoding of modem output and detection of the
//!   unsolicited `RING` notification
//!
//! # Example
//!
//! ```rust
//! use modem_protocol::{is_ring, AtCommand, DtmfTone, EncodeCommand};
//!
//! assert!(is_ring("\r\nRING\r\n"));
//!
//! let tone = DtmfTone::new("5").unwrap();
//! assert_eq!(AtCommand::Tone(tone).encode(), b"AT+VTS=5\r");
//! ```

pub mod command;
pub mod error;
pub mod line;

pub use command::{AtCommand, DtmfTone};
pub use error::ProtocolError;
pub use line::{decode_line, is_ring, LineSplitter};

/// Trait for commands that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this command to its wire format
    fn encode(&self) -> Vec<u8>;
}
