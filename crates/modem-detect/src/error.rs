//! Error types for port detection

use thiserror::Error;

/// Errors that can occur during port detection and selection
#[derive(Debug, Error)]
pub enum DetectError {
    /// Operator input that does not name a listed port
    ///
    /// Reported and recovered inside the selection loop.
    #[error("invalid selection: {0:?}")]
    InvalidSelection(String),

    /// I/O error reading operator input or writing the menu
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
