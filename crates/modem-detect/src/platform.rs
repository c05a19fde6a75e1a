//! Host platform identification

/// Host platform family, as far as serial device naming is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// macOS: `/dev/cu.*` and `/dev/tty.*` device nodes
    MacLike,
    /// Linux: `/dev/ttyUSB*` and `/dev/ttyACM*` device nodes
    LinuxLike,
    /// Windows: `COMn` names, no enumeration
    WindowsLike,
    /// Anything else
    Unknown,
}

impl Platform {
    /// The platform this binary was compiled for
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map an OS name to a platform family
    ///
    /// Accepts both `std::env::consts::OS` values (`macos`, `linux`,
    /// `windows`) and `uname`-style names (`Darwin`, `Linux`, `Windows`).
    pub fn from_os_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "darwin" | "macos" => Platform::MacLike,
            "linux" => Platform::LinuxLike,
            "windows" => Platform::WindowsLike,
            _ => Platform::Unknown,
        }
    }

    /// Returns a human-readable name for the platform
    pub fn name(&self) -> &'static str {
        match self {
            Platform::MacLike => "macOS",
            Platform::LinuxLike => "Linux",
            Platform::WindowsLike => "Windows",
            Platform::Unknown => "unknown",
        }
    }
}
