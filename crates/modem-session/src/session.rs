//! Modem session state machine
//!
//! A session owns one open port. After the echo-off handshake it listens for
//! a ring, then the caller drives the call: answer, play, send DTMF, hang up.
//! Closing consumes the session, so a closed port cannot be used again.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::{Duration, Instant};

use modem_protocol::{is_ring, AtCommand, DtmfTone, EncodeCommand, LineSplitter};
use serialport::SerialPort;
use tracing::{debug, info, trace, warn};

use crate::audio::{AudioPlayer, AudioSelection, PLAYER_CANDIDATES};
use crate::error::SessionError;
use crate::transport::ModemPort;

/// Default modem baud rate
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Fixed delays between protocol steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimings {
    /// Wait after opening the port for the modem to initialize
    pub init_delay: Duration,
    /// Wait after the echo-off command
    pub echo_settle: Duration,
    /// Sleep between polls while listening
    pub poll_interval: Duration,
    /// Wait after answering
    pub answer_settle: Duration,
    /// Pause between the answer settling and playback
    pub post_answer: Duration,
    /// Wait after a DTMF tone
    pub dtmf_settle: Duration,
    /// Wait after hanging up
    pub hangup_settle: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            init_delay: Duration::from_secs(2),
            echo_settle: Duration::from_millis(500),
            poll_interval: Duration::from_millis(100),
            answer_settle: Duration::from_millis(500),
            post_answer: Duration::from_secs(1),
            dtmf_settle: Duration::from_millis(300),
            hangup_settle: Duration::from_millis(500),
        }
    }
}

impl SessionTimings {
    /// No delays at all, for scripted transports
    pub fn immediate() -> Self {
        Self {
            init_delay: Duration::ZERO,
            echo_settle: Duration::ZERO,
            poll_interval: Duration::ZERO,
            answer_settle: Duration::ZERO,
            post_answer: Duration::ZERO,
            dtmf_settle: Duration::ZERO,
            hangup_settle: Duration::ZERO,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Serial device path
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout for the serial port; also how long the port must stay
    /// quiet before an unterminated line is taken as complete
    pub read_timeout: Duration,
    /// Audio player selection, resolved once when the session opens
    pub audio: AudioSelection,
    /// Block until the audio player exits
    pub wait_for_player: bool,
    /// Protocol step delays
    pub timings: SessionTimings,
}

impl SessionConfig {
    /// Configuration for `port` with default settings
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_secs(1),
            audio: AudioSelection::Auto,
            wait_for_player: true,
            timings: SessionTimings::default(),
        }
    }
}

/// Where the session is in the call sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a ring
    Listening,
    /// Ring seen, call not yet answered
    RingDetected,
    /// Call answered
    InCall,
    /// Call hung up, ready to close or listen again
    Idle,
}

/// What to do once a call is answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPlan {
    /// Clip to play, or `None` to skip playback
    pub audio_file: Option<PathBuf>,
    /// DTMF tone sent after playback
    pub tone: DtmfTone,
}

/// An open modem connection
pub struct ModemSession<P: ModemPort = Box<dyn SerialPort>> {
    port: P,
    port_name: String,
    baud_rate: u32,
    timings: SessionTimings,
    player: Option<AudioPlayer>,
    wait_for_player: bool,
    lines: LineSplitter,
    /// Quiet period after which an unterminated line is taken as complete
    line_timeout: Duration,
    last_rx: Option<Instant>,
    state: SessionState,
}

impl ModemSession<Box<dyn SerialPort>> {
    /// Open the configured serial device and initialize the modem
    pub fn open(config: SessionConfig) -> Result<Self, SessionError> {
        debug!("Opening {} at {} baud", config.port, config.baud_rate);

        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(config.read_timeout)
            .open()
            .map_err(|e| SessionError::unavailable(&config.port, e))?;

        Self::with_port(port, config)
    }
}

impl<P: ModemPort> ModemSession<P> {
    /// Initialize the modem over an already-open transport
    pub fn with_port(port: P, config: SessionConfig) -> Result<Self, SessionError> {
        let player = config.audio.resolve();
        match &player {
            Some(p) => info!("Using audio player: {}", p.program().display()),
            None => info!("No audio player in use"),
        }

        let mut session = Self {
            port,
            port_name: config.port,
            baud_rate: config.baud_rate,
            timings: config.timings,
            player,
            wait_for_player: config.wait_for_player,
            lines: LineSplitter::new(),
            line_timeout: config.read_timeout,
            last_rx: None,
            state: SessionState::Listening,
        };

        sleep(session.timings.init_delay);
        session.send(&AtCommand::EchoOff)?;
        sleep(session.timings.echo_settle);

        Ok(session)
    }

    /// Device path this session was opened on
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Baud rate this session was opened at
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Current call state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Player resolved when the session opened
    pub fn audio_player(&self) -> Option<&AudioPlayer> {
        self.player.as_ref()
    }

    /// Block until the modem reports an incoming call
    ///
    /// Returns `Ok(true)` on a ring. With a `timeout`, returns `Ok(false)` once
    /// it elapses without one; with `None`, waits indefinitely.
    pub fn wait_for_ring(&mut self, timeout: Option<Duration>) -> Result<bool, SessionError> {
        info!("Listening for incoming calls on {}...", self.port_name);
        self.state = SessionState::Listening;
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let available = self.port.bytes_to_read().map_err(|e| self.io_error(e))?;

            if available > 0 {
                self.fill(available as usize)?;
            } else if self.line_timed_out() {
                if let Some(line) = self.lines.take_partial() {
                    if self.check_line(&line) {
                        return Ok(true);
                    }
                }
            }

            while let Some(line) = self.lines.next_line() {
                if self.check_line(&line) {
                    return Ok(true);
                }
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                debug!("No ring on {} before timeout", self.port_name);
                return Ok(false);
            }

            if available == 0 {
                sleep(self.timings.poll_interval);
            }
        }
    }

    /// Answer the incoming call
    pub fn answer(&mut self) -> Result<(), SessionError> {
        self.send(&AtCommand::Answer)?;
        sleep(self.timings.answer_settle);
        self.state = SessionState::InCall;
        info!("Call answered");
        Ok(())
    }

    /// Play `file` through the resolved audio player
    pub fn play_recording(&self, file: &Path) -> Result<(), SessionError> {
        let player = self.player.as_ref().ok_or_else(|| SessionError::NoAudioPlayer {
            tried: PLAYER_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        })?;
        player.play(file, self.wait_for_player)
    }

    /// Send a DTMF tone on the active call
    pub fn send_dtmf(&mut self, tone: &DtmfTone) -> Result<(), SessionError> {
        self.send(&AtCommand::Tone(tone.clone()))?;
        sleep(self.timings.dtmf_settle);
        info!("Sent DTMF: {}", tone);
        Ok(())
    }

    /// Terminate the call
    pub fn hangup(&mut self) -> Result<(), SessionError> {
        self.send(&AtCommand::Hangup)?;
        sleep(self.timings.hangup_settle);
        self.state = SessionState::Idle;
        info!("Call ended");
        Ok(())
    }

    /// Run the answer → play → DTMF → hangup sequence
    ///
    /// If playback fails the call is still hung up and the playback error is
    /// returned.
    pub fn handle_call(&mut self, plan: &CallPlan) -> Result<(), SessionError> {
        self.answer()?;
        sleep(self.timings.post_answer);

        if let Some(file) = &plan.audio_file {
            if let Err(e) = self.play_recording(file) {
                warn!("Playback failed, hanging up: {}", e);
                if let Err(hangup_err) = self.hangup() {
                    warn!("Hangup after failed playback also failed: {}", hangup_err);
                }
                return Err(e);
            }
        }

        self.send_dtmf(&plan.tone)?;
        self.hangup()
    }

    /// Close the serial connection
    pub fn close(self) {
        info!("Closing {}", self.port_name);
    }

    /// Write a command to the modem
    fn send(&mut self, command: &AtCommand) -> Result<(), SessionError> {
        let bytes = command.encode();
        trace!(
            "Sending {}: {:?}",
            command.name(),
            String::from_utf8_lossy(&bytes)
        );

        self.port
            .write_all(&bytes)
            .and_then(|_| self.port.flush())
            .map_err(|e| self.io_error(e))
    }

    /// Read up to `available` bytes into the line buffer
    fn fill(&mut self, available: usize) -> Result<(), SessionError> {
        let mut buf = vec![0u8; available];
        match self.port.read(&mut buf) {
            Ok(n) => {
                trace!("Read {} bytes from {}", n, self.port_name);
                if n > 0 {
                    self.last_rx = Some(Instant::now());
                }
                self.lines.push_bytes(&buf[..n]);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Whether the port has been quiet long enough to end a partial line
    fn line_timed_out(&self) -> bool {
        self.last_rx.map_or(true, |at| at.elapsed() >= self.line_timeout)
    }

    /// Classify a received line, updating state on a ring
    fn check_line(&mut self, line: &str) -> bool {
        debug!("Got line: {:?}", line);
        if is_ring(line) {
            info!("Incoming call on {}", self.port_name);
            self.state = SessionState::RingDetected;
            true
        } else {
            false
        }
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::DeviceIo {
            port: self.port_name.clone(),
            source,
        }
    }
}
