//! Error types for the modem session

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a serial device could not be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableKind {
    /// Device path does not exist
    NotFound,
    /// Access denied by the operating system
    PermissionDenied,
    /// Device is in use by another process
    Busy,
    /// Any other failure
    Other,
}

impl UnavailableKind {
    /// Classify a `serialport` open failure
    pub fn classify(kind: serialport::ErrorKind, description: &str) -> Self {
        let desc = description.to_ascii_lowercase();
        if desc.contains("permission") || desc.contains("access is denied") {
            return UnavailableKind::PermissionDenied;
        }
        if desc.contains("busy") || desc.contains("in use") {
            return UnavailableKind::Busy;
        }

        match kind {
            serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => {
                UnavailableKind::PermissionDenied
            }
            serialport::ErrorKind::Io(io::ErrorKind::NotFound) | serialport::ErrorKind::NoDevice => {
                UnavailableKind::NotFound
            }
            _ => UnavailableKind::Other,
        }
    }
}

/// Errors that can occur while driving the modem
#[derive(Debug, Error)]
pub enum SessionError {
    /// Failed to open serial port
    #[error("failed to open port {port}: {reason}")]
    DeviceUnavailable {
        port: String,
        kind: UnavailableKind,
        reason: String,
    },

    /// Read or write failed on an open port
    #[error("I/O error on {port}: {source}")]
    DeviceIo {
        port: String,
        #[source]
        source: io::Error,
    },

    /// Playback requested without a resolved player
    #[error("no audio player found on PATH (tried: {})", tried.join(", "))]
    NoAudioPlayer { tried: Vec<String> },

    /// Player executable could not be started
    #[error("failed to run audio player {}: {source}", program.display())]
    PlayerFailed {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SessionError {
    /// Build a [`SessionError::DeviceUnavailable`] from a `serialport` open failure
    pub fn unavailable(port: &str, err: serialport::Error) -> Self {
        SessionError::DeviceUnavailable {
            port: port.to_string(),
            kind: UnavailableKind::classify(err.kind(), &err.description),
            reason: err.description,
        }
    }

    /// Whether this is an open failure caused by missing permissions
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            SessionError::DeviceUnavailable {
                kind: UnavailableKind::PermissionDenied,
                ..
            }
        )
    }
}
