//! External audio player
//!
//! Playback is never done in-process. The first known player found on `PATH`
//! is invoked with the audio file as its only argument.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use crate::error::SessionError;

/// Player executables in priority order (macOS, ALSA, SoX)
pub const PLAYER_CANDIDATES: &[&str] = &["afplay", "aplay", "play"];

/// How the session picks its audio player
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AudioSelection {
    /// Search `PATH` for the first known player
    #[default]
    Auto,
    /// Use this executable
    Program(PathBuf),
    /// Playback is disabled
    Disabled,
}

impl AudioSelection {
    /// Resolve the selection to a player, if any
    pub fn resolve(&self) -> Option<AudioPlayer> {
        match self {
            AudioSelection::Auto => AudioPlayer::detect(),
            AudioSelection::Program(program) => Some(AudioPlayer::from_program(program)),
            AudioSelection::Disabled => None,
        }
    }
}

/// A resolved audio player executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPlayer {
    program: PathBuf,
}

impl AudioPlayer {
    /// Wrap an explicit player executable
    pub fn from_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find the first known player on `PATH`
    pub fn detect() -> Option<Self> {
        Self::detect_with(|name| which::which(name).ok())
    }

    /// Find the first known player using a custom lookup
    pub fn detect_with<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        for name in PLAYER_CANDIDATES {
            if let Some(path) = lookup(name) {
                debug!("Found audio player {} at {}", name, path.display());
                return Some(Self::from_program(path));
            }
            debug!("Audio player {} not found", name);
        }
        None
    }

    /// Player executable
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Play `file`
    ///
    /// With `wait`, blocks until the player exits. A non-zero exit status is
    /// logged and otherwise ignored.
    pub fn play(&self, file: &Path, wait: bool) -> Result<(), SessionError> {
        info!("Playing {} with {}", file.display(), self.program.display());

        let mut command = Command::new(&self.program);
        command.arg(file);

        let spawn_err = |source| SessionError::PlayerFailed {
            program: self.program.clone(),
            source,
        };

        if wait {
            let status = command.status().map_err(spawn_err)?;
            if !status.success() {
                warn!(
                    "Audio player {} exited with {}",
                    self.program.display(),
                    status
                );
            }
        } else {
            let child = command.spawn().map_err(spawn_err)?;
            debug!("Audio player running as pid {}", child.id());
        }

        Ok(())
    }
}
