//! Modem Serial Port Detection Library
//!
//! This crate finds the serial device a USB modem is attached to:
//!
//! - [`Platform`] identifies the host family and selects its device-path table
//! - [`PortResolver`] picks a default device or lists every candidate
//! - [`select_port`] lets an operator choose from the candidates
//!
//! # Example
//!
//! ```rust,no_run
//! use modem_detect::{Platform, PortResolver};
//!
//! let resolver = PortResolver::new(Platform::current());
//! if let Some(port) = resolver.default_port() {
//!     println!("Using {}", port);
//! }
//!
//! for port in resolver.list_ports() {
//!     println!("Found port: {}", port);
//! }
//! ```

pub mod error;
pub mod platform;
pub mod resolver;
pub mod selector;

pub use error::DetectError;
pub use platform::Platform;
pub use resolver::{GlobMatcher, PortMatcher, PortResolver};
pub use selector::{select_port, stdin_line_reader};
