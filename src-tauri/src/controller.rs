// src-tauri/src/controller.rs
//
// Window-independent state behind the buttons: the serial session, the
// selected file, the viewer pane text and the activity log.
//
// Each public action maps to one button. Actions never fail: every error is
// rendered here into a log line and the state is left as it was.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::errors::{IoError, OpenError, ReadError, SendError};
use crate::io::serial::session::CloseOutcome;
use crate::io::serial::{PortConfig, PortForm, PortOpener, SerialSession, SystemPorts};
use crate::transfer::{self, decode_received, escape_bytes, load_for_preview, load_for_send};

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

/// One line of the activity log
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogLine {
    /// Local wall-clock time, HH:MM:SS
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

/// What the window should render after an action
#[derive(Clone, Debug, Default, Serialize)]
pub struct Outcome {
    /// Lines to append to the log pane
    pub lines: Vec<LogLine>,
    /// Replacement viewer text, None when the pane is unchanged
    pub viewer: Option<String>,
}

#[cfg(test)]
impl Outcome {
    pub fn messages(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.message.as_str()).collect()
    }
}

/// Optional features of the window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// File preview in the viewer pane, received data shown there, Save button
    pub preview_and_save: bool,
}

#[cfg(test)]
impl Default for Capabilities {
    fn default() -> Self {
        Self { preview_and_save: true }
    }
}

// ============================================================================
// Controller
// ============================================================================

pub struct Controller<O: PortOpener = SystemPorts> {
    session: SerialSession<O>,
    capabilities: Capabilities,
    selected_file: Option<PathBuf>,
    viewer: String,
    log: Vec<LogLine>,
}

impl<O: PortOpener> Controller<O> {
    pub fn new(opener: O, capabilities: Capabilities) -> Self {
        Self {
            session: SerialSession::new(opener),
            capabilities,
            selected_file: None,
            viewer: String::new(),
            log: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    #[cfg(test)]
    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    #[cfg(test)]
    pub fn viewer(&self) -> &str {
        &self.viewer
    }

    /// Everything logged since startup
    pub fn log(&self) -> &[LogLine] {
        &self.log
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    pub fn open_port(&mut self, form: &PortForm) -> Outcome {
        let mut out = Outcome::default();

        let config = match PortConfig::from_form(form) {
            Ok(config) => config,
            Err(e) => {
                self.error(&mut out, format!("Invalid serial port settings: {}", e));
                return out;
            }
        };

        let port = config.port.clone();
        let summary = config.summary();
        match self.session.open(config) {
            Ok(()) => self.info(
                &mut out,
                format!("Serial port {} opened with settings: {}", port, summary),
            ),
            Err(OpenError::InvalidSettings(e)) => {
                self.error(&mut out, format!("Invalid serial port settings: {}", e))
            }
            Err(e) => self.error(&mut out, format!("Error opening serial port {}: {}", port, e)),
        }
        out
    }

    pub fn close_port(&mut self) -> Outcome {
        let mut out = Outcome::default();
        match self.session.close() {
            Ok(CloseOutcome::Closed { port }) => {
                tlog!("[serial] Closed {}", port);
                self.info(&mut out, "Serial port closed.".to_string())
            }
            Ok(CloseOutcome::NotOpen) => self.info(&mut out, "Serial port is not open.".to_string()),
            Err(e) => self.error(&mut out, format!("Error closing serial port: {}", e)),
        }
        out
    }

    /// Remember the chosen file and, with preview enabled, show its text.
    /// A preview failure is logged but the file stays selected.
    pub fn select_file(&mut self, path: PathBuf) -> Outcome {
        let mut out = Outcome::default();
        self.info(&mut out, format!("File selected: {}", path.display()));

        if self.capabilities.preview_and_save {
            match load_for_preview(&path) {
                Ok(text) => {
                    self.viewer = text;
                    out.viewer = Some(self.viewer.clone());
                }
                Err(e) => self.error(
                    &mut out,
                    format!("Error previewing file '{}': {}", path.display(), e),
                ),
            }
        }

        self.selected_file = Some(path);
        out
    }

    pub fn send_file(&mut self) -> Outcome {
        let mut out = Outcome::default();

        let path = match self.selected_file.clone() {
            Some(path) if self.session.is_open() => path,
            _ => {
                self.error(&mut out, "Serial port not open or no file selected.".to_string());
                return out;
            }
        };
        let shown = path.display().to_string();

        let bytes = match load_for_send(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.error(&mut out, render_read_error(&shown, &e));
                return out;
            }
        };

        match transfer::send_file(&mut self.session, &bytes) {
            Ok(n) => self.info(&mut out, format!("File '{}' sent successfully ({} bytes).", shown, n)),
            Err(SendError::NotReady(reason)) => {
                self.error(&mut out, format!("Error: File '{}' not sent, {}.", shown, reason))
            }
            Err(SendError::Transfer(IoError::Timeout)) => self.error(
                &mut out,
                "Error: Serial port timeout during transmission.".to_string(),
            ),
            Err(SendError::Transfer(e)) => self.error(
                &mut out,
                format!("Error: Serial port error during transmission: {}", e),
            ),
        }
        out
    }

    /// Poll for queued bytes without waiting
    pub fn receive_data(&mut self) -> Outcome {
        let mut out = Outcome::default();

        if !self.session.is_open() {
            self.error(&mut out, "Serial port not open.".to_string());
            return out;
        }

        let bytes = match self.session.read_available() {
            Ok(bytes) => bytes,
            Err(IoError::Timeout) => {
                self.error(&mut out, "Error: Serial port timeout during reception.".to_string());
                return out;
            }
            Err(e) => {
                self.error(&mut out, format!("Error receiving data: {}", e));
                return out;
            }
        };

        if bytes.is_empty() {
            self.info(&mut out, "No data available to receive.".to_string());
            return out;
        }

        if !self.capabilities.preview_and_save {
            self.info(&mut out, format!("Received data: {}", escape_bytes(&bytes)));
            return out;
        }

        match decode_received(&bytes) {
            Ok(text) => {
                self.info(&mut out, format!("Received data: {} bytes", bytes.len()));
                self.viewer.push_str(&text);
                out.viewer = Some(self.viewer.clone());
            }
            Err(e) => {
                self.info(&mut out, format!("Received data: {}", escape_bytes(&bytes)));
                self.error(&mut out, format!("Error displaying received data: {}", e));
            }
        }
        out
    }

    /// Save the viewer pane contents to `path`
    pub fn save_viewer(&mut self, path: &Path) -> Outcome {
        let mut out = Outcome::default();

        if !self.capabilities.preview_and_save {
            self.error(&mut out, "Saving is not available in this mode.".to_string());
            return out;
        }
        if self.viewer.is_empty() {
            self.error(&mut out, "Nothing to save.".to_string());
            return out;
        }

        match transfer::save_text(path, &self.viewer) {
            Ok(()) => self.info(&mut out, format!("Data saved to '{}'.", path.display())),
            Err(e) => self.error(
                &mut out,
                format!("Error saving file '{}': {}", path.display(), e),
            ),
        }
        out
    }

    /// Note that an earlier action panicked part way through
    pub fn record_interrupted(&mut self) -> Outcome {
        let mut out = Outcome::default();
        self.error(&mut out, "Internal error: the previous action was interrupted.".to_string());
        out
    }

    /// Release the port when the window goes away
    pub fn shutdown(&mut self) {
        if let Some(port) = self.session.port_name().map(str::to_string) {
            tlog!("[controller] Shutdown: releasing {}", port);
            self.close_port();
        }
    }

    // ------------------------------------------------------------------------
    // Log
    // ------------------------------------------------------------------------

    fn info(&mut self, out: &mut Outcome, message: String) {
        self.push(out, LogLevel::Info, message);
    }

    fn error(&mut self, out: &mut Outcome, message: String) {
        self.push(out, LogLevel::Error, message);
    }

    fn push(&mut self, out: &mut Outcome, level: LogLevel, message: String) {
        tlog!("[activity] {}", message);
        let line = LogLine {
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            level,
            message,
        };
        self.log.push(line.clone());
        out.lines.push(line);
    }
}

fn render_read_error(shown: &str, e: &ReadError) -> String {
    match e {
        ReadError::NotFound(_) => format!("Error: File '{}' not found.", shown),
        ReadError::PermissionDenied(_) => {
            format!("Error: Permission denied to read file '{}'.", shown)
        }
        other => format!("Error reading file '{}': {}", shown, other),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::serial::session::mock::{MockLine, MockOpener};
    use std::fs;

    fn form(port: &str) -> PortForm {
        PortForm {
            port: port.to_string(),
            baud_rate: "9600".to_string(),
            data_bits: "8".to_string(),
            stop_bits: "1".to_string(),
            parity: "None".to_string(),
            flow_control: "None".to_string(),
        }
    }

    fn controller(preview_and_save: bool) -> (Controller<MockOpener>, MockLine) {
        let opener = MockOpener::default();
        let line = opener.line.clone();
        (Controller::new(opener, Capabilities { preview_and_save }), line)
    }

    #[test]
    fn test_open_missing_device_logs_and_stays_closed() {
        let opener = MockOpener::failing(OpenError::DeviceUnavailable(
            "No such file or directory".to_string(),
        ));
        let mut controller = Controller::new(opener, Capabilities::default());

        let out = controller.open_port(&form("COM1"));
        assert_eq!(
            out.messages(),
            vec!["Error opening serial port COM1: device unavailable: No such file or directory"]
        );
        assert_eq!(out.lines[0].level, LogLevel::Error);
        assert!(!controller.is_open());
    }

    #[test]
    fn test_open_and_close() {
        let (mut controller, line) = controller(true);

        let out = controller.open_port(&form("COM1"));
        assert_eq!(
            out.messages(),
            vec!["Serial port COM1 opened with settings: 9600 baud, 8N1, flow control: None"]
        );
        assert!(controller.is_open());

        assert_eq!(controller.close_port().messages(), vec!["Serial port closed."]);
        assert_eq!(controller.close_port().messages(), vec!["Serial port is not open."]);
        assert_eq!(line.state().live_handles, 0);
        assert_eq!(controller.log().len(), 3);
    }

    #[test]
    fn test_close_error_logged() {
        let (mut controller, line) = controller(true);
        controller.open_port(&form("COM1"));
        line.state().flush_error = Some(std::io::ErrorKind::BrokenPipe);

        let out = controller.close_port();
        assert_eq!(out.messages(), vec!["Error closing serial port: mock flush failure"]);
        assert_eq!(out.lines[0].level, LogLevel::Error);
        assert!(!controller.is_open());
        assert_eq!(line.state().live_handles, 0);
    }

    #[test]
    fn test_open_invalid_settings() {
        let (mut controller, line) = controller(true);
        let mut bad = form("COM1");
        bad.baud_rate = "115200".to_string();

        let out = controller.open_port(&bad);
        assert_eq!(
            out.messages(),
            vec!["Invalid serial port settings: unsupported baud rate 115200"]
        );
        assert!(line.state().opened_with.is_empty());
    }

    #[test]
    fn test_open_twice_reports_caller_error() {
        let (mut controller, _line) = controller(true);
        controller.open_port(&form("COM1"));

        let out = controller.open_port(&form("COM2"));
        assert_eq!(
            out.messages(),
            vec!["Error opening serial port COM2: serial port COM1 is already open, close it first"]
        );
        assert!(controller.is_open());
    }

    #[test]
    fn test_send_requires_open_port_and_file() {
        let (mut controller, line) = controller(true);
        let out = controller.send_file();
        assert_eq!(out.messages(), vec!["Serial port not open or no file selected."]);

        controller.open_port(&form("COM1"));
        let out = controller.send_file();
        assert_eq!(out.messages(), vec!["Serial port not open or no file selected."]);
        assert!(line.state().writes.is_empty());
    }

    #[test]
    fn test_send_selected_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.nc");
        fs::write(&path, b"G01 X10\n").unwrap();

        let (mut controller, line) = controller(true);
        controller.open_port(&form("COM1"));

        let out = controller.select_file(path.clone());
        assert_eq!(out.messages(), vec![format!("File selected: {}", path.display())]);
        assert_eq!(out.viewer.as_deref(), Some("G01 X10\n"));

        let out = controller.send_file();
        assert_eq!(
            out.messages(),
            vec![format!("File '{}' sent successfully (8 bytes).", path.display())]
        );
        assert_eq!(line.state().writes, vec![b"G01 X10\n".to_vec()]);
    }

    #[test]
    fn test_send_file_deleted_after_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.nc");
        fs::write(&path, b"G00\n").unwrap();

        let (mut controller, line) = controller(true);
        controller.open_port(&form("COM1"));
        controller.select_file(path.clone());
        fs::remove_file(&path).unwrap();

        let out = controller.send_file();
        assert_eq!(
            out.messages(),
            vec![format!("Error: File '{}' not found.", path.display())]
        );
        assert!(line.state().writes.is_empty());
        assert!(controller.is_open());
    }

    #[test]
    fn test_send_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.nc");
        fs::write(&path, b"G00\n").unwrap();

        let (mut controller, line) = controller(false);
        controller.open_port(&form("COM1"));
        controller.select_file(path);
        line.state().write_error = Some(std::io::ErrorKind::TimedOut);

        let out = controller.send_file();
        assert_eq!(out.messages(), vec!["Error: Serial port timeout during transmission."]);
    }

    #[test]
    fn test_select_binary_file_keeps_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.nc");
        fs::write(&path, [0xffu8, 0xfe]).unwrap();

        let (mut controller, _line) = controller(true);
        let out = controller.select_file(path.clone());
        assert_eq!(out.lines.len(), 2);
        assert_eq!(out.lines[1].level, LogLevel::Error);
        assert!(out.viewer.is_none());
        assert_eq!(controller.selected_file(), Some(path.as_path()));
    }

    #[test]
    fn test_select_without_preview_capability() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.txt");
        fs::write(&path, "G00\n").unwrap();

        let (mut controller, _line) = controller(false);
        let out = controller.select_file(path);
        assert_eq!(out.lines.len(), 1);
        assert!(out.viewer.is_none());
        assert_eq!(controller.viewer(), "");
    }

    #[test]
    fn test_receive_when_closed() {
        let (mut controller, _line) = controller(true);
        assert_eq!(controller.receive_data().messages(), vec!["Serial port not open."]);
    }

    #[test]
    fn test_receive_nothing_queued_leaves_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.nc");
        fs::write(&path, "G00\n").unwrap();

        let (mut controller, _line) = controller(true);
        controller.select_file(path);
        controller.open_port(&form("COM1"));

        let out = controller.receive_data();
        assert_eq!(out.messages(), vec!["No data available to receive."]);
        assert!(out.viewer.is_none());
        assert_eq!(controller.viewer(), "G00\n");
    }

    #[test]
    fn test_receive_appends_to_viewer() {
        let (mut controller, line) = controller(true);
        controller.open_port(&form("COM1"));

        line.state().incoming.extend_from_slice(b"ok\n");
        let out = controller.receive_data();
        assert_eq!(out.messages(), vec!["Received data: 3 bytes"]);
        assert_eq!(out.viewer.as_deref(), Some("ok\n"));

        line.state().incoming.extend_from_slice(b"ok\n");
        controller.receive_data();
        assert_eq!(controller.viewer(), "ok\nok\n");
    }

    #[test]
    fn test_receive_timeout() {
        let (mut controller, line) = controller(true);
        controller.open_port(&form("COM1"));
        line.state().incoming.extend_from_slice(b"ok\n");
        line.state().read_error = Some(std::io::ErrorKind::TimedOut);

        let out = controller.receive_data();
        assert_eq!(out.messages(), vec!["Error: Serial port timeout during reception."]);
        assert_eq!(out.lines[0].level, LogLevel::Error);
        assert!(out.viewer.is_none());
        assert_eq!(controller.viewer(), "");
        assert!(controller.is_open());
    }

    #[test]
    fn test_receive_device_error() {
        let (mut controller, line) = controller(true);
        controller.open_port(&form("COM1"));
        line.state().incoming.extend_from_slice(b"ok\n");
        controller.receive_data();

        line.state().incoming.extend_from_slice(b"ok\n");
        line.state().read_error = Some(std::io::ErrorKind::BrokenPipe);
        let out = controller.receive_data();
        assert_eq!(out.messages(), vec!["Error receiving data: mock read failure"]);
        assert!(out.viewer.is_none());
        assert_eq!(controller.viewer(), "ok\n");
    }

    #[test]
    fn test_receive_without_viewer_logs_bytes() {
        let (mut controller, line) = controller(false);
        controller.open_port(&form("COM1"));
        line.state().incoming.extend_from_slice(b"ok\r\n");

        let out = controller.receive_data();
        assert_eq!(out.messages(), vec!["Received data: b\"ok\\r\\n\""]);
        assert!(out.viewer.is_none());
    }

    #[test]
    fn test_receive_undecodable_bytes() {
        let (mut controller, line) = controller(true);
        controller.open_port(&form("COM1"));
        line.state().incoming.extend_from_slice(&[0x80, 0x41]);

        let out = controller.receive_data();
        assert_eq!(out.lines.len(), 2);
        assert_eq!(out.lines[0].message, "Received data: b\"\\x80A\"");
        assert_eq!(out.lines[1].level, LogLevel::Error);
        assert!(out.viewer.is_none());
        assert_eq!(controller.viewer(), "");
    }

    #[test]
    fn test_save_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("received.txt");

        let (mut controller, line) = controller(true);
        assert_eq!(controller.save_viewer(&target).messages(), vec!["Nothing to save."]);

        controller.open_port(&form("COM1"));
        line.state().incoming.extend_from_slice(b"X10 Y20\n");
        controller.receive_data();

        let out = controller.save_viewer(&target);
        assert_eq!(out.messages(), vec![format!("Data saved to '{}'.", target.display())]);
        assert_eq!(fs::read_to_string(&target).unwrap(), "X10 Y20\n");
    }

    #[test]
    fn test_save_viewer_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("received.txt");

        let (mut controller, line) = controller(true);
        controller.open_port(&form("COM1"));
        line.state().incoming.extend_from_slice(b"X10\n");
        controller.receive_data();

        let out = controller.save_viewer(&target);
        assert_eq!(
            out.messages(),
            vec![format!("Error saving file '{}': directory does not exist", target.display())]
        );
        assert_eq!(out.lines[0].level, LogLevel::Error);
        assert!(!target.exists());
        assert_eq!(controller.viewer(), "X10\n");
    }

    #[test]
    fn test_save_disabled_without_capability() {
        let dir = tempfile::tempdir().unwrap();
        let (mut controller, _line) = controller(false);
        let out = controller.save_viewer(&dir.path().join("out.txt"));
        assert_eq!(out.messages(), vec!["Saving is not available in this mode."]);
    }

    #[test]
    fn test_shutdown_releases_port() {
        let (mut controller, line) = controller(true);
        controller.open_port(&form("COM1"));
        controller.shutdown();
        assert!(!controller.is_open());
        assert_eq!(line.state().live_handles, 0);

        // Idempotent when nothing is open
        controller.shutdown();
        assert_eq!(controller.log().last().unwrap().message, "Serial port closed.");
    }
}
