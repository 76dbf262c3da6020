// src-tauri/src/errors.rs
//
// Error taxonomy for serial and file operations.
// Display strings are the human-readable causes shown in the activity log.

use std::io;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// Serial
// ============================================================================

/// Failure to acquire a serial handle
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OpenError {
    /// Device path does not exist or is held by another process
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
    /// Settings could not be parsed or were rejected by the driver
    #[error("{0}")]
    InvalidSettings(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// Opening while a port is held is a caller error; nothing is closed implicitly
    #[error("serial port {port} is already open, close it first")]
    AlreadyOpen { port: String },
    #[error("{0}")]
    Device(String),
}

impl From<serialport::Error> for OpenError {
    fn from(e: serialport::Error) -> Self {
        match e.kind() {
            serialport::ErrorKind::NoDevice => OpenError::DeviceUnavailable(e.description),
            serialport::ErrorKind::InvalidInput => OpenError::InvalidSettings(e.description),
            serialport::ErrorKind::Io(io::ErrorKind::NotFound) => {
                OpenError::DeviceUnavailable(e.description)
            }
            serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => {
                OpenError::PermissionDenied(e.description)
            }
            serialport::ErrorKind::Io(io::ErrorKind::InvalidInput) => {
                OpenError::InvalidSettings(e.description)
            }
            _ => OpenError::Device(e.description),
        }
    }
}

/// OS-level failure while releasing a handle. The session is closed regardless.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CloseError {
    #[error("{0}")]
    Device(String),
}

/// Failure of a write or read against the serial handle
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IoError {
    #[error("serial port not open")]
    NotReady,
    #[error("serial port timeout")]
    Timeout,
    #[error("{0}")]
    Device(String),
}

impl From<io::Error> for IoError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => IoError::Timeout,
            _ => IoError::Device(e.to_string()),
        }
    }
}

// ============================================================================
// Files
// ============================================================================

/// Failure reading a file or decoding received bytes
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReadError {
    #[error("file '{0}' not found")]
    NotFound(String),
    #[error("permission denied to read file '{0}'")]
    PermissionDenied(String),
    #[error("data is not valid UTF-8 text: {0}")]
    Decode(String),
    #[error("{0}")]
    Io(String),
}

impl ReadError {
    pub(crate) fn from_io(path: &Path, e: io::Error) -> Self {
        let shown = path.display().to_string();
        match e.kind() {
            io::ErrorKind::NotFound => ReadError::NotFound(shown),
            io::ErrorKind::PermissionDenied => ReadError::PermissionDenied(shown),
            io::ErrorKind::InvalidData => ReadError::Decode(e.to_string()),
            _ => ReadError::Io(e.to_string()),
        }
    }
}

/// Failure writing a file
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WriteError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("directory does not exist")]
    NotFound,
    #[error("{0}")]
    Io(String),
}

impl From<io::Error> for WriteError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::PermissionDenied => WriteError::PermissionDenied,
            io::ErrorKind::NotFound => WriteError::NotFound,
            _ => WriteError::Io(e.to_string()),
        }
    }
}

/// Failure of a file send, labelled for the send action
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SendError {
    /// No open session or nothing to send
    #[error("not ready: {0}")]
    NotReady(String),
    #[error(transparent)]
    Transfer(IoError),
}

impl From<IoError> for SendError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::NotReady => SendError::NotReady("serial port not open".to_string()),
            other => SendError::Transfer(other),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
