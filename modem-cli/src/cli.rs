//! Command-line options

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use modem_protocol::DtmfTone;
use modem_session::{AudioSelection, CallPlan, SessionConfig};

use crate::settings::Settings;

/// USB modem controller: answer a call, play a clip, send a DTMF tone, hang up
#[derive(Debug, Parser)]
#[command(name = "modemctl", version, about)]
pub struct Cli {
    /// Serial port to use (detected when omitted)
    #[arg(long)]
    pub port: Option<String>,

    /// Baud rate [default: 9600]
    #[arg(long)]
    pub baud: Option<u32>,

    /// Audio file to play on answer [default: message.wav]
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// DTMF tone to send after playback [default: 1]
    #[arg(long)]
    pub dtmf: Option<DtmfTone>,

    /// Disable audio playback even if a player exists
    #[arg(long)]
    pub no_audio: bool,

    /// Enable audio playback even if the settings file disables it
    #[arg(long, conflicts_with = "no_audio")]
    pub with_audio: bool,

    /// Audio player executable (searched on PATH when omitted)
    #[arg(long)]
    pub player: Option<PathBuf>,

    /// Stop waiting for a call after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// List candidate serial ports and exit
    #[arg(long)]
    pub list: bool,

    /// Settings file to read instead of the default location
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Write the effective options to the settings file and exit
    #[arg(long)]
    pub save_settings: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Effective options after merging flags over settings
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub port: Option<String>,
    pub baud_rate: u32,
    pub audio_file: PathBuf,
    pub tone: DtmfTone,
    pub no_audio: bool,
    pub player: Option<PathBuf>,
    pub ring_timeout: Option<Duration>,
}

impl RunOptions {
    /// Merge command-line flags over stored settings
    pub fn merge(cli: &Cli, settings: &Settings) -> anyhow::Result<Self> {
        let tone = match &cli.dtmf {
            Some(tone) => tone.clone(),
            None => DtmfTone::new(settings.dtmf_tone.clone())?,
        };

        Ok(Self {
            port: cli.port.clone().or_else(|| settings.port.clone()),
            baud_rate: cli.baud.unwrap_or(settings.baud_rate),
            audio_file: cli
                .audio
                .clone()
                .unwrap_or_else(|| settings.audio_file.clone()),
            tone,
            no_audio: !cli.with_audio && (cli.no_audio || settings.no_audio),
            player: cli.player.clone().or_else(|| settings.player.clone()),
            ring_timeout: cli
                .timeout
                .or(settings.ring_timeout_secs)
                .map(Duration::from_secs),
        })
    }

    /// Session configuration for `port`
    pub fn session_config(&self, port: &str) -> SessionConfig {
        let mut config = SessionConfig::new(port);
        config.baud_rate = self.baud_rate;
        config.audio = if self.no_audio {
            AudioSelection::Disabled
        } else if let Some(player) = &self.player {
            AudioSelection::Program(player.clone())
        } else {
            AudioSelection::Auto
        };
        config
    }

    /// What to do once a call is answered
    pub fn call_plan(&self) -> CallPlan {
        CallPlan {
            audio_file: (!self.no_audio).then(|| self.audio_file.clone()),
            tone: self.tone.clone(),
        }
    }

    /// Settings equivalent to these options
    pub fn to_settings(&self) -> Settings {
        Settings {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            audio_file: self.audio_file.clone(),
            dtmf_tone: self.tone.to_string(),
            player: self.player.clone(),
            ring_timeout_secs: self.ring_timeout.map(|d| d.as_secs()),
            no_audio: self.no_audio,
        }
    }
}
