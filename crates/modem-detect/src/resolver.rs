//! Default port resolution and device enumeration
//!
//! Each platform has an ordered table of glob patterns. The default port is
//! the first match of the first pattern that matches anything; the listing
//! concatenates the matches of every pattern.

use glob::glob;
use tracing::{debug, info, warn};

use crate::platform::Platform;

/// Patterns tried for the default port on macOS, in priority order
const MAC_DEFAULT_PATTERNS: &[&str] = &[
    "/dev/cu.usbserial*",
    "/dev/tty.usbserial*",
    "/dev/cu.usbmodem*",
    "/dev/tty.usbmodem*",
    "/dev/cu.*usb*",
];

/// Patterns tried for the default port on Linux, in priority order
const LINUX_DEFAULT_PATTERNS: &[&str] = &["/dev/ttyUSB*", "/dev/ttyACM*"];

/// Patterns listed on macOS
const MAC_LIST_PATTERNS: &[&str] = &["/dev/cu.*", "/dev/tty.*"];

/// Patterns listed on Linux
const LINUX_LIST_PATTERNS: &[&str] = &["/dev/ttyUSB*", "/dev/ttyACM*", "/dev/serial/by-id/*"];

/// Linux default when nothing is attached yet
const LINUX_FALLBACK: &str = "/dev/ttyUSB0";

/// Windows default; COM ports are not enumerated
const WINDOWS_FALLBACK: &str = "COM1";

/// Source of filesystem matches for a glob pattern
pub trait PortMatcher {
    /// Return the paths matching `pattern`, in the order they should be tried
    fn matches(&self, pattern: &str) -> Vec<String>;
}

impl<F> PortMatcher for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn matches(&self, pattern: &str) -> Vec<String> {
        self(pattern)
    }
}

/// Filesystem matcher backed by the `glob` crate
///
/// Results are sorted. Invalid patterns and unreadable entries are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobMatcher;

impl PortMatcher for GlobMatcher {
    fn matches(&self, pattern: &str) -> Vec<String> {
        let paths = match glob(pattern) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Invalid port pattern {}: {}", pattern, e);
                return Vec::new();
            }
        };

        let mut result: Vec<String> = paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path.to_string_lossy().into_owned()),
                Err(e) => {
                    debug!("Skipping unreadable entry for {}: {}", pattern, e);
                    None
                }
            })
            .collect();
        result.sort();
        result
    }
}

/// Resolves serial device paths for a platform
pub struct PortResolver<M = GlobMatcher> {
    platform: Platform,
    matcher: M,
}

impl PortResolver<GlobMatcher> {
    /// Create a resolver that searches the real filesystem
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            matcher: GlobMatcher,
        }
    }
}

impl<M: PortMatcher> PortResolver<M> {
    /// Create a resolver with a custom matcher
    pub fn with_matcher(platform: Platform, matcher: M) -> Self {
        Self { platform, matcher }
    }

    /// Platform this resolver searches for
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Pick a default device path
    ///
    /// Returns the first match of the first pattern with any matches, else
    /// the platform fallback (absent on macOS and unknown platforms).
    pub fn default_port(&self) -> Option<String> {
        let (patterns, fallback) = default_table(self.platform);

        for pattern in patterns {
            if let Some(port) = self.matcher.matches(pattern).into_iter().next() {
                debug!("Default port {} matched {}", port, pattern);
                return Some(port);
            }
        }

        match fallback {
            Some(port) => debug!("No device matched, falling back to {}", port),
            None => debug!("No device matched on {}", self.platform.name()),
        }
        fallback.map(str::to_string)
    }

    /// Enumerate every plausible device path
    pub fn list_ports(&self) -> Vec<String> {
        info!("Enumerating serial ports...");
        let result: Vec<String> = list_table(self.platform)
            .iter()
            .flat_map(|pattern| self.matcher.matches(pattern))
            .collect();

        if result.is_empty() {
            info!("No serial ports found");
        } else {
            info!("Found {} serial port(s)", result.len());
            for port in &result {
                debug!("  {}", port);
            }
        }

        result
    }
}

fn default_table(platform: Platform) -> (&'static [&'static str], Option<&'static str>) {
    match platform {
        Platform::MacLike => (MAC_DEFAULT_PATTERNS, None),
        Platform::LinuxLike => (LINUX_DEFAULT_PATTERNS, Some(LINUX_FALLBACK)),
        Platform::WindowsLike => (&[], Some(WINDOWS_FALLBACK)),
        Platform::Unknown => (&[], None),
    }
}

fn list_table(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::MacLike => MAC_LIST_PATTERNS,
        Platform::LinuxLike => LINUX_LIST_PATTERNS,
        Platform::WindowsLike | Platform::Unknown => &[],
    }
}
