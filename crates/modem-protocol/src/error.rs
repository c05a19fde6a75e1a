//! Error types for AT command construction

use thiserror::Error;

/// Errors that can occur while building modem commands
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// DTMF tone value that would produce a malformed command
    #[error("invalid DTMF tone: {0:?}")]
    InvalidTone(String),
}
