//! Port resolution at the command-line boundary

use anyhow::bail;
use modem_detect::{DetectError, Platform, PortMatcher, PortResolver};
use modem_session::SessionError;
use tracing::{debug, info};

/// Pick the serial port to open
///
/// Tries, in order: the explicit port, the platform default, and an
/// interactive choice among enumerated ports when `interactive` is set.
pub fn resolve_port<M, S>(
    explicit: Option<&str>,
    resolver: &PortResolver<M>,
    interactive: bool,
    select: S,
) -> anyhow::Result<String>
where
    M: PortMatcher,
    S: FnOnce(&[String]) -> Result<Option<String>, DetectError>,
{
    if let Some(port) = explicit {
        debug!("Using configured port {}", port);
        return Ok(port.to_string());
    }

    if let Some(port) = resolver.default_port() {
        info!("Detected default port {}", port);
        return Ok(port);
    }

    if !interactive {
        bail!(
            "no serial port detected on {}; pass --port",
            resolver.platform().name()
        );
    }

    let candidates = resolver.list_ports();
    if candidates.is_empty() {
        bail!("no serial ports found; connect the modem or pass --port");
    }

    match select(&candidates)? {
        Some(port) => Ok(port),
        None => bail!("no serial port selected"),
    }
}

/// Platform-specific advice for an open failure caused by permissions
pub fn remediation_hint(err: &SessionError, platform: Platform) -> Option<String> {
    let SessionError::DeviceUnavailable { port, .. } = err else {
        return None;
    };
    if !err.is_permission_denied() {
        return None;
    }

    match platform {
        Platform::LinuxLike => Some(format!(
            "Permission denied opening {}. Try: add a udev rule, add your user to the 'dialout' group, or run with sudo.",
            port
        )),
        Platform::MacLike => Some(format!(
            "Permission denied opening {}. Check device permissions or try running with sudo.",
            port
        )),
        Platform::WindowsLike | Platform::Unknown => None,
    }
}
