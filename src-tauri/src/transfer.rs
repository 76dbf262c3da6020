// src-tauri/src/transfer.rs
//
// File transfer: whole-file reads for preview and send, handing bytes to the
// serial session, and saving viewer text back to disk.
// No streaming, no chunking; the wire sees exactly the file's bytes in order.

use std::fs;
use std::path::Path;

use crate::errors::{ReadError, SendError, WriteError};
use crate::io::serial::{PortOpener, SerialSession};

/// Read a file as UTF-8 text for the viewer pane
pub fn load_for_preview(path: &Path) -> Result<String, ReadError> {
    let bytes = load_for_send(path)?;
    String::from_utf8(bytes).map_err(|e| ReadError::Decode(e.utf8_error().to_string()))
}

/// Read a file's raw bytes for transmission
pub fn load_for_send(path: &Path) -> Result<Vec<u8>, ReadError> {
    fs::read(path).map_err(|e| ReadError::from_io(path, e))
}

/// Write `bytes` to the session in a single call. Returns the byte count.
pub fn send_file<O: PortOpener>(session: &mut SerialSession<O>, bytes: &[u8]) -> Result<usize, SendError> {
    if !session.is_open() {
        return Err(SendError::NotReady("serial port not open".to_string()));
    }
    if bytes.is_empty() {
        return Err(SendError::NotReady("file is empty".to_string()));
    }

    session.write(bytes)?;
    Ok(bytes.len())
}

/// Write text to a user-chosen destination, replacing any existing file
pub fn save_text(path: &Path, text: &str) -> Result<(), WriteError> {
    fs::write(path, text)?;
    Ok(())
}

/// Decode received bytes for display
pub fn decode_received(bytes: &[u8]) -> Result<String, ReadError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| ReadError::Decode(e.to_string()))
}

/// Printable rendering of raw bytes for the log, e.g. `b"ok\r\n\xff"`
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push_str("b\"");
    for &b in bytes {
        out.extend(std::ascii::escape_default(b).map(char::from));
    }
    out.push('"');
    out
}

// ============================================================================
// Tests
// ============================================================================
