//! Integration tests for the modem session
//!
//! These tests drive a session over a scripted in-memory port and verify:
//! - The initialization handshake
//! - Ring detection among unrelated modem output
//! - Bounded waits
//! - Command bytes for the call sequence
//! - Error propagation from the transport and the audio player

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use modem_protocol::DtmfTone;
use modem_session::{
    AudioPlayer, AudioSelection, CallPlan, ModemPort, ModemSession, SessionConfig, SessionError,
    SessionState, SessionTimings,
};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// In-memory modem port
    ///
    /// Each scripted chunk becomes readable on one poll. An empty chunk is a
    /// gap: the poll that reaches it reports nothing pending. Everything
    /// written is captured in a shared buffer that outlives the session.
    pub struct MockPort {
        pub incoming: VecDeque<Vec<u8>>,
        pub written: Arc<Mutex<Vec<u8>>>,
        /// Writes that succeed before every further write fails
        pub write_budget: Option<usize>,
        pub fail_reads: bool,
    }

    impl MockPort {
        pub fn new(chunks: &[&[u8]]) -> (Self, Arc<Mutex<Vec<u8>>>) {
            let written = Arc::new(Mutex::new(Vec::new()));
            let port = Self {
                incoming: chunks.iter().map(|c| c.to_vec()).collect(),
                written: Arc::clone(&written),
                write_budget: None,
                fail_reads: false,
            };
            (port, written)
        }
    }

    impl Read for MockPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.fail_reads {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
            }
            let Some(chunk) = self.incoming.front_mut() else {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "timed out"));
            };
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            chunk.drain(..n);
            if chunk.is_empty() {
                self.incoming.pop_front();
            }
            Ok(n)
        }
    }

    impl Write for MockPort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            match &mut self.write_budget {
                Some(0) => return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")),
                Some(left) => *left -= 1,
                None => {}
            }
            self.written.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl ModemPort for MockPort {
        fn bytes_to_read(&mut self) -> io::Result<u32> {
            if self.incoming.front().is_some_and(|c| c.is_empty()) {
                self.incoming.pop_front();
                return Ok(0);
            }
            Ok(self.incoming.front().map_or(0, |c| c.len() as u32))
        }
    }

    /// Config with no delays and playback disabled
    pub fn config() -> SessionConfig {
        let mut config = SessionConfig::new("/dev/mock0");
        config.timings = SessionTimings::immediate();
        config.audio = AudioSelection::Disabled;
        config
    }

    pub fn written_text(written: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(written.lock().unwrap().clone()).unwrap()
    }

    pub fn tone(value: &str) -> DtmfTone {
        DtmfTone::new(value).unwrap()
    }
}

use helpers::*;

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn test_init_sends_echo_off() {
    let (port, written) = MockPort::new(&[]);
    let session = ModemSession::with_port(port, config()).unwrap();

    assert_eq!(written_text(&written), "ATE0\r");
    assert_eq!(session.state(), SessionState::Listening);
    assert_eq!(session.port_name(), "/dev/mock0");
    assert_eq!(session.baud_rate(), 9600);
    assert!(session.audio_player().is_none());
}

#[test]
fn test_init_write_failure_is_fatal() {
    let (mut port, _written) = MockPort::new(&[]);
    port.write_budget = Some(0);

    let result = ModemSession::with_port(port, config());
    assert!(matches!(result, Err(SessionError::DeviceIo { .. })));
}

#[test]
fn test_player_resolved_at_construction() {
    let (port, _written) = MockPort::new(&[]);
    let mut config = config();
    config.audio = AudioSelection::Program(PathBuf::from("/opt/player"));

    let session = ModemSession::with_port(port, config).unwrap();
    assert_eq!(
        session.audio_player(),
        Some(&AudioPlayer::from_program("/opt/player"))
    );
}

// ============================================================================
// Ring Detection
// ============================================================================

#[test]
fn test_ring_after_noise() {
    let (port, _written) = MockPort::new(&[b"\r\nOK\r\n", b"\r\nNO CARRIER\r\n", b"\r\nRING\r\n"]);
    let mut session = ModemSession::with_port(port, config()).unwrap();

    assert!(session.wait_for_ring(None).unwrap());
    assert_eq!(session.state(), SessionState::RingDetected);
}

#[test]
fn test_ring_split_across_reads() {
    let (port, _written) = MockPort::new(&[b"\r\nRI", b"NG\r\n"]);
    let mut session = ModemSession::with_port(port, config()).unwrap();

    assert!(session.wait_for_ring(Some(Duration::from_secs(5))).unwrap());
}

#[test]
fn test_ring_split_by_quiet_poll() {
    // The port reports nothing pending between the two halves
    let (port, _written) = MockPort::new(&[b"\r\nRI", b"", b"NG\r\n"]);
    let mut session = ModemSession::with_port(port, config()).unwrap();

    assert!(session.wait_for_ring(Some(Duration::from_millis(500))).unwrap());
    assert_eq!(session.state(), SessionState::RingDetected);
}

#[test]
fn test_partial_line_kept_across_quiet_polls() {
    let (port, _written) = MockPort::new(&[b"R", b"", b"I", b"", b"", b"NG"]);
    let mut config = config();
    config.read_timeout = Duration::from_millis(20);
    config.timings.poll_interval = Duration::from_millis(1);
    let mut session = ModemSession::with_port(port, config).unwrap();

    assert!(session.wait_for_ring(Some(Duration::from_secs(2))).unwrap());
}

#[test]
fn test_ring_without_terminator() {
    let (port, _written) = MockPort::new(&[b"ring"]);
    let mut config = config();
    config.read_timeout = Duration::from_millis(20);
    config.timings.poll_interval = Duration::from_millis(2);
    let mut session = ModemSession::with_port(port, config).unwrap();

    assert!(session.wait_for_ring(Some(Duration::from_secs(2))).unwrap());
    assert_eq!(session.state(), SessionState::RingDetected);
}

#[test]
fn test_ring_with_line_noise() {
    let (port, _written) = MockPort::new(&[b"\xff\xfe\r\n\x80RING\r\n"]);
    let mut session = ModemSession::with_port(port, config()).unwrap();

    assert!(session.wait_for_ring(Some(Duration::from_secs(5))).unwrap());
}

#[test]
fn test_wait_times_out_without_ring() {
    let (port, _written) = MockPort::new(&[b"\r\nOK\r\n"]);
    let mut config = config();
    config.timings.poll_interval = Duration::from_millis(5);
    let mut session = ModemSession::with_port(port, config).unwrap();

    assert!(!session.wait_for_ring(Some(Duration::from_millis(50))).unwrap());
    assert_eq!(session.state(), SessionState::Listening);
}

#[test]
fn test_read_failure_while_listening() {
    let (mut port, _written) = MockPort::new(&[b"RING\r\n"]);
    port.fail_reads = true;
    let mut session = ModemSession::with_port(port, config()).unwrap();

    let err = session.wait_for_ring(None).unwrap_err();
    match err {
        SessionError::DeviceIo { port, .. } => assert_eq!(port, "/dev/mock0"),
        other => panic!("unexpected error: {}", other),
    }
}

// ============================================================================
// Call Sequence
// ============================================================================

#[test]
fn test_call_commands_in_order() {
    let (port, written) = MockPort::new(&[b"RING\r\n"]);
    let mut session = ModemSession::with_port(port, config()).unwrap();

    assert!(session.wait_for_ring(None).unwrap());
    session.answer().unwrap();
    assert_eq!(session.state(), SessionState::InCall);
    session.send_dtmf(&tone("1")).unwrap();
    session.hangup().unwrap();
    assert_eq!(session.state(), SessionState::Idle);
    session.close();

    assert_eq!(written_text(&written), "ATE0\rATA\rAT+VTS=1\rATH\r");
}

#[test]
fn test_handle_call_without_audio() {
    let (port, written) = MockPort::new(&[]);
    let mut session = ModemSession::with_port(port, config()).unwrap();

    let plan = CallPlan {
        audio_file: None,
        tone: tone("#"),
    };
    session.handle_call(&plan).unwrap();

    assert_eq!(written_text(&written), "ATE0\rATA\rAT+VTS=#\rATH\r");
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn test_play_without_player() {
    let (port, _written) = MockPort::new(&[]);
    let session = ModemSession::with_port(port, config()).unwrap();

    let err = session
        .play_recording(&PathBuf::from("message.wav"))
        .unwrap_err();
    match err {
        SessionError::NoAudioPlayer { tried } => {
            assert_eq!(tried, vec!["afplay", "aplay", "play"]);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_handle_call_playback_failure_still_hangs_up() {
    let (port, written) = MockPort::new(&[]);
    let mut session = ModemSession::with_port(port, config()).unwrap();

    let plan = CallPlan {
        audio_file: Some(PathBuf::from("message.wav")),
        tone: tone("1"),
    };
    let err = session.handle_call(&plan).unwrap_err();

    assert!(matches!(err, SessionError::NoAudioPlayer { .. }));
    assert_eq!(written_text(&written), "ATE0\rATA\rATH\r");
    assert_eq!(session.state(), SessionState::Idle);
}

#[cfg(unix)]
#[test]
fn test_handle_call_with_player() {
    let (port, written) = MockPort::new(&[]);
    let mut config = config();
    config.audio = AudioSelection::Program(PathBuf::from("true"));
    let mut session = ModemSession::with_port(port, config).unwrap();

    let plan = CallPlan {
        audio_file: Some(PathBuf::from("message.wav")),
        tone: tone("5"),
    };
    session.handle_call(&plan).unwrap();

    assert_eq!(written_text(&written), "ATE0\rATA\rAT+VTS=5\rATH\r");
}

#[test]
fn test_write_failure_during_call() {
    let (mut port, written) = MockPort::new(&[]);
    port.write_budget = Some(1);
    let mut session = ModemSession::with_port(port, config()).unwrap();

    let err = session.answer().unwrap_err();
    assert!(matches!(err, SessionError::DeviceIo { .. }));
    assert!(err.to_string().starts_with("I/O error on /dev/mock0"));
    assert_eq!(written_text(&written), "ATE0\r");
}
