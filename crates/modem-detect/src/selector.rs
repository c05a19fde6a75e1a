//! Interactive port selection
//!
//! Presents the candidate list as a numbered menu and reads the operator's
//! choice. Input is injected so the loop can run against scripted input.

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use crate::error::DetectError;

/// Ask the operator to pick one of `candidates`
///
/// Returns `Ok(None)` when the candidate list is empty (without reading any
/// input) or when the operator enters an empty line. Invalid or out-of-range
/// entries are reported on `out` and the prompt is repeated.
pub fn select_port<R, W>(
    candidates: &[String],
    mut read_line: R,
    out: &mut W,
) -> Result<Option<String>, DetectError>
where
    R: FnMut() -> io::Result<String>,
    W: Write,
{
    if candidates.is_empty() {
        debug!("No candidate ports to select from");
        return Ok(None);
    }

    writeln!(out, "Available serial ports:")?;
    for (i, port) in candidates.iter().enumerate() {
        writeln!(out, "  {}) {}", i + 1, port)?;
    }

    loop {
        write!(
            out,
            "Select port [1-{}] (empty to cancel): ",
            candidates.len()
        )?;
        out.flush()?;

        let input = read_line()?;
        let input = input.trim();

        if input.is_empty() {
            debug!("Port selection cancelled");
            return Ok(None);
        }

        match parse_choice(input, candidates.len()) {
            Some(index) => {
                let port = candidates[index].clone();
                debug!("Selected port {}", port);
                return Ok(Some(port));
            }
            None => {
                let err = DetectError::InvalidSelection(input.to_string());
                warn!("{}", err);
                writeln!(out, "{}", err)?;
            }
        }
    }
}

/// Parse a 1-based menu choice into a 0-based index
fn parse_choice(input: &str, len: usize) -> Option<usize> {
    let n: usize = input.parse().ok()?;
    if (1..=len).contains(&n) {
        Some(n - 1)
    } else {
        None
    }
}

/// Line reader over stdin for [`select_port`]
///
/// End of input yields an empty string, which cancels the selection.
pub fn stdin_line_reader() -> impl FnMut() -> io::Result<String> {
    || {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}
