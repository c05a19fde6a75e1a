//! Modem Session Library
//!
//! Drives a USB voice modem through a single call:
//!
//! ```text
//! open ──► ATE0 ──► listen for RING ──► ATA ──► play clip ──► AT+VTS ──► ATH ──► close
//! ```
//!
//! The session owns the serial port for its whole lifetime. Audio playback is
//! delegated to an external player executable found on `PATH`.
//!
//! # Example
//!
//! ```rust,no_run
//! use modem_protocol::DtmfTone;
//! use modem_session::{CallPlan, ModemSession, SessionConfig};
//!
//! let mut session = ModemSession::open(SessionConfig::new("/dev/ttyUSB0"))?;
//! if session.wait_for_ring(None)? {
//!     let plan = CallPlan {
//!         audio_file: Some("message.wav".into()),
//!         tone: DtmfTone::new("1")?,
//!     };
//!     session.handle_call(&plan)?;
//! }
//! session.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod audio;
pub mod error;
pub mod session;
pub mod transport;

pub use audio::{AudioPlayer, AudioSelection, PLAYER_CANDIDATES};
pub use error::{SessionError, UnavailableKind};
pub use session::{CallPlan, ModemSession, SessionConfig, SessionState, SessionTimings};
pub use transport::ModemPort;
