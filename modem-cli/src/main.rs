//! Modem Controller
//!
//! Waits for an incoming call on a USB voice modem, answers it, plays a
//! recorded message, sends a DTMF tone and hangs up.

mod cli;
mod port;
mod settings;

use std::io::{self, IsTerminal};

use anyhow::Context;
use clap::Parser;
use cli::{Cli, RunOptions};
use modem_detect::{select_port, stdin_line_reader, Platform, PortResolver};
use modem_session::ModemSession;
use settings::Settings;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Include all our crates in the default filter
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "modemctl={0},modem_protocol={0},modem_detect={0},modem_session={0}",
                    default_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let settings = match &cli.settings {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };
    let options = RunOptions::merge(&cli, &settings)?;

    if cli.save_settings {
        let path = match &cli.settings {
            Some(path) => {
                options.to_settings().save_to(path)?;
                path.clone()
            }
            None => options.to_settings().save()?,
        };
        println!("Saved settings to {}", path.display());
        return Ok(());
    }

    let platform = Platform::current();
    let resolver = PortResolver::new(platform);

    if cli.list {
        for port in resolver.list_ports() {
            println!("{}", port);
        }
        return Ok(());
    }

    let interactive = io::stdin().is_terminal();
    let port_name = port::resolve_port(
        options.port.as_deref(),
        &resolver,
        interactive,
        |candidates| select_port(candidates, stdin_line_reader(), &mut io::stdout()),
    )?;

    info!(
        "Starting modem controller (port={}, baud={})",
        port_name, options.baud_rate
    );

    let mut session = match ModemSession::open(options.session_config(&port_name)) {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            if let Some(hint) = port::remediation_hint(&e, platform) {
                error!("{}", hint);
            }
            return Err(e.into());
        }
    };

    let result = run(&mut session, &options);
    session.close();
    result
}

/// Wait for one call and handle it
fn run(session: &mut ModemSession, options: &RunOptions) -> anyhow::Result<()> {
    if !session.wait_for_ring(options.ring_timeout)? {
        warn!(
            "No incoming call within {}s",
            options.ring_timeout.map_or(0, |d| d.as_secs())
        );
        return Ok(());
    }

    session
        .handle_call(&options.call_plan())
        .with_context(|| format!("call handling failed on {}", session.port_name()))
}
