//! AT command set
//!
//! Every command the controller sends is one of the variants below. Commands
//! are ASCII, prefixed with `AT` and terminated by a carriage return.
//!
//! # Commands
//! - `ATE0` - Disable command echo
//! - `ATA` - Answer an incoming call
//! - `ATH` - Hang up
//! - `AT+VTS=<tone>` - Send a DTMF tone on the active call

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;
use crate::EncodeCommand;

/// Command terminator
const TERMINATOR: u8 = b'\r';

/// A DTMF tone value accepted by `AT+VTS`
///
/// The value is passed to the modem verbatim. Construction only rejects
/// values that would break command framing (empty, or containing CR/LF).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DtmfTone(String);

impl DtmfTone {
    /// Create a tone, rejecting values that would corrupt the command frame
    pub fn new(value: impl Into<String>) -> Result<Self, ProtocolError> {
        let value = value.into();
        if value.is_empty() || value.contains(['\r', '\n']) {
            return Err(ProtocolError::InvalidTone(value));
        }
        Ok(Self(value))
    }

    /// The raw tone value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DtmfTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DtmfTone {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// AT commands sent to the modem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtCommand {
    /// Disable echo: ATE0
    EchoOff,
    /// Answer incoming call: ATA
    Answer,
    /// Hang up: ATH
    Hangup,
    /// Send DTMF tone: AT+VTS=1
    Tone(DtmfTone),
}

impl AtCommand {
    /// Human-readable command name for logging
    pub fn name(&self) -> &'static str {
        match self {
            AtCommand::EchoOff => "echo off",
            AtCommand::Answer => "answer",
            AtCommand::Hangup => "hangup",
            AtCommand::Tone(_) => "DTMF tone",
        }
    }

    fn body(&self) -> String {
        match self {
            AtCommand::EchoOff => "ATE0".to_string(),
            AtCommand::Answer => "ATA".to_string(),
            AtCommand::Hangup => "ATH".to_string(),
            AtCommand::Tone(tone) => format!("AT+VTS={}", tone),
        }
    }
}

impl EncodeCommand for AtCommand {
    fn encode(&self) -> Vec<u8> {
        let mut bytes = self.body().into_bytes();
        bytes.push(TERMINATOR);
        bytes
    }
}
