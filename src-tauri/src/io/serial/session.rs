// src-tauri/src/io/serial/session.rs
//
// Serial session: owns at most one open handle and performs blocking
// open/close/write/read calls against it on the caller's thread.
//
// State machine: Closed --open--> Open --close--> Closed.
// Opening while Open is refused; the caller must close first.
// Dropping the session releases the handle.

use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;

use super::config::PortConfig;
use super::utils::{
    to_serialport_data_bits, to_serialport_flow_control, to_serialport_parity,
    to_serialport_stop_bits, FlowControl,
};
use crate::errors::{CloseError, IoError, OpenError};

/// Driver timeout applied to reads and writes when nothing else is configured
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

// ============================================================================
// Traits
// ============================================================================

/// An open serial handle
pub trait SerialLink: Read + Write + Send {
    /// Number of received bytes queued by the driver
    fn queued_bytes(&self) -> io::Result<u32>;
}

impl SerialLink for Box<dyn SerialPort> {
    fn queued_bytes(&self) -> io::Result<u32> {
        SerialPort::bytes_to_read(&**self).map_err(io::Error::from)
    }
}

/// Acquires serial handles for a configuration
pub trait PortOpener: Send {
    type Link: SerialLink;

    fn open(&self, config: &PortConfig) -> Result<Self::Link, OpenError>;
}

/// Opens real OS serial devices through the serialport crate
#[derive(Clone, Debug)]
pub struct SystemPorts {
    pub timeout: Duration,
}

impl PortOpener for SystemPorts {
    type Link = Box<dyn SerialPort>;

    fn open(&self, config: &PortConfig) -> Result<Self::Link, OpenError> {
        let mut port = serialport::new(&config.port, config.baud_rate)
            .data_bits(to_serialport_data_bits(config.data_bits))
            .stop_bits(to_serialport_stop_bits(config.stop_bits))
            .parity(to_serialport_parity(config.parity))
            .flow_control(to_serialport_flow_control(config.flow_control))
            .timeout(self.timeout)
            .open()?;

        if config.flow_control == FlowControl::DtrDsr {
            port.write_data_terminal_ready(true)?;
        }

        Ok(port)
    }
}

// ============================================================================
// Session
// ============================================================================

/// Result of a close that did not fail
#[derive(Clone, Debug, PartialEq)]
pub enum CloseOutcome {
    Closed { port: String },
    /// Nothing was open
    NotOpen,
}

struct OpenPort<L> {
    link: L,
    config: PortConfig,
}

pub struct SerialSession<O: PortOpener = SystemPorts> {
    opener: O,
    open: Option<OpenPort<O::Link>>,
}

impl<O: PortOpener> SerialSession<O> {
    pub fn new(opener: O) -> Self {
        Self { opener, open: None }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Settings the current handle was opened with
    pub fn config(&self) -> Option<&PortConfig> {
        self.open.as_ref().map(|o| &o.config)
    }

    pub fn port_name(&self) -> Option<&str> {
        self.config().map(|c| c.port.as_str())
    }

    /// Acquire a handle for `config`. On failure the session stays Closed.
    pub fn open(&mut self, config: PortConfig) -> Result<(), OpenError> {
        if let Some(open) = &self.open {
            return Err(OpenError::AlreadyOpen {
                port: open.config.port.clone(),
            });
        }

        let link = self.opener.open(&config)?;
        tlog!(
            "[serial] Opened {} ({})",
            config.port,
            config.summary()
        );
        self.open = Some(OpenPort { link, config });
        Ok(())
    }

    /// Release the handle. Pending output is flushed first; a flush failure
    /// is returned but the session is closed either way.
    pub fn close(&mut self) -> Result<CloseOutcome, CloseError> {
        let Some(mut open) = self.open.take() else {
            return Ok(CloseOutcome::NotOpen);
        };

        let flushed = open.link.flush();
        let port = open.config.port.clone();
        drop(open);

        match flushed {
            Ok(()) => Ok(CloseOutcome::Closed { port }),
            Err(e) => Err(CloseError::Device(e.to_string())),
        }
    }

    /// Write every byte and flush, blocking until done or the driver fails.
    /// On failure an unknown number of bytes may already be on the wire.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), IoError> {
        let open = self.open.as_mut().ok_or(IoError::NotReady)?;
        open.link.write_all(bytes)?;
        open.link.flush()?;
        Ok(())
    }

    /// Whatever the driver has queued right now. Never waits for data.
    pub fn read_available(&mut self) -> Result<Vec<u8>, IoError> {
        let open = self.open.as_mut().ok_or(IoError::NotReady)?;

        let queued = open.link.queued_bytes()? as usize;
        if queued == 0 {
            return Ok(Vec::new());
        }

        let mut buffer = vec![0u8; queued];
        let n = open.link.read(&mut buffer)?;
        buffer.truncate(n);
        Ok(buffer)
    }
}

// ============================================================================
// Test Doubles
// ============================================================================

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::{Arc, Mutex, MutexGuard};

    /// Shared view of everything that happened on the fake line
    #[derive(Default)]
    pub struct LineState {
        /// One entry per `write` call
        pub writes: Vec<Vec<u8>>,
        /// Bytes the "remote device" has sent
        pub incoming: Vec<u8>,
        pub write_error: Option<io::ErrorKind>,
        pub read_error: Option<io::ErrorKind>,
        pub flush_error: Option<io::ErrorKind>,
        pub opened_with: Vec<PortConfig>,
        pub live_handles: usize,
    }

    #[derive(Clone, Default)]
    pub struct MockLine(Arc<Mutex<LineState>>);

    impl MockLine {
        pub fn state(&self) -> MutexGuard<'_, LineState> {
            self.0.lock().unwrap()
        }
    }

    #[derive(Default)]
    pub struct MockOpener {
        pub line: MockLine,
        pub open_error: Option<OpenError>,
    }

    impl MockOpener {
        pub fn failing(error: OpenError) -> Self {
            Self {
                line: MockLine::default(),
                open_error: Some(error),
            }
        }
    }

    impl PortOpener for MockOpener {
        type Link = MockLink;

        fn open(&self, config: &PortConfig) -> Result<MockLink, OpenError> {
            if let Some(e) = &self.open_error {
                return Err(e.clone());
            }
            let mut state = self.line.state();
            state.opened_with.push(config.clone());
            state.live_handles += 1;
            Ok(MockLink {
                line: self.line.clone(),
            })
        }
    }

    pub struct MockLink {
        line: MockLine,
    }

    impl Drop for MockLink {
        fn drop(&mut self) {
            self.line.state().live_handles -= 1;
        }
    }

    impl Read for MockLink {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut state = self.line.state();
            if let Some(kind) = state.read_error {
                return Err(io::Error::new(kind, "mock read failure"));
            }
            let n = buf.len().min(state.incoming.len());
            buf[..n].copy_from_slice(&state.incoming[..n]);
            state.incoming.drain(..n);
            Ok(n)
        }
    }

    impl Write for MockLink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut state = self.line.state();
            if let Some(kind) = state.write_error {
                return Err(io::Error::new(kind, "mock write failure"));
            }
            state.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            match self.line.state().flush_error {
                Some(kind) => Err(io::Error::new(kind, "mock flush failure")),
                None => Ok(()),
            }
        }
    }

    impl SerialLink for MockLink {
        fn queued_bytes(&self) -> io::Result<u32> {
            Ok(self.line.state().incoming.len() as u32)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
