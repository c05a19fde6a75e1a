//! Modem output lines
//!
//! Modems report result codes and unsolicited notifications as text lines
//! framed by CR and/or LF (`\r\nRING\r\n`). Output may contain bytes that are
//! not valid UTF-8 (line noise, binary voice data); those are dropped.

/// Maximum buffered bytes without a line terminator
const MAX_LINE_LEN: usize = 256;

/// Token the modem sends on an incoming call
const RING_TOKEN: &str = "RING";

/// Return true if the line signals an incoming call
///
/// Matches `RING` anywhere in the line, ignoring ASCII case only: modem
/// result codes are ASCII, so non-ASCII letters that uppercase to `I` or `N`
/// (such as the dotless `ı`) do not count. Empty and whitespace-only lines
/// never match.
pub fn is_ring(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return false;
    }
    line.to_ascii_uppercase().contains(RING_TOKEN)
}

/// Decode raw modem output into a trimmed line
///
/// Invalid UTF-8 sequences are dropped rather than treated as an error.
pub fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Streaming splitter for modem output
///
/// Bytes are pushed as they arrive from the port; complete lines are
/// extracted once a CR or LF terminator is seen. Empty lines between
/// terminators (the `\r\n` pairs) are skipped.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buffer: Vec<u8>,
}

impl LineSplitter {
    /// Create an empty splitter
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
        }
    }

    /// Push raw bytes into the buffer
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        // Prevent unbounded growth on a port that never sends a terminator
        if self.buffer.len() > MAX_LINE_LEN * 4 {
            let start = self.buffer.len() - MAX_LINE_LEN;
            tracing::warn!("Discarding {} bytes without a line terminator", start);
            self.buffer.drain(..start);
        }
    }

    /// Try to extract the next complete, non-empty line
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let term_pos = self.buffer.iter().position(|&b| b == b'\r' || b == b'\n')?;
            let raw: Vec<u8> = self.buffer.drain(..=term_pos).collect();
            let line = decode_line(&raw[..raw.len() - 1]);
            if !line.is_empty() {
                return Some(line);
            }
        }
    }

    /// Take whatever unterminated data is buffered as a line
    ///
    /// Used once the port has gone quiet, so a notification sent without a
    /// trailing terminator is still seen.
    pub fn take_partial(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.buffer);
        let line = decode_line(&raw);
        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }

    /// Whether any bytes are buffered
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
