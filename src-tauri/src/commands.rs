// src-tauri/src/commands.rs
//
// Tauri commands behind the window's buttons. Each command is synchronous
// (runs on the main thread) and performs exactly one controller action.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tauri::State;

use crate::controller::{Controller, LogLine, Outcome};
use crate::io::serial::{self, PortForm};
use crate::settings::{AppSettings, FormOptions};

/// Managed state shared by every command
pub struct AppState {
    controller: Mutex<Controller>,
    settings: AppSettings,
}

impl AppState {
    pub fn new(controller: Controller, settings: AppSettings) -> Self {
        Self {
            controller: Mutex::new(controller),
            settings,
        }
    }

    /// Lock the controller. A lock poisoned by an earlier panic is cleared
    /// and the recovery is returned as an error outcome for the window.
    fn controller(&self) -> (MutexGuard<'_, Controller>, Outcome) {
        match self.controller.lock() {
            Ok(guard) => (guard, Outcome::default()),
            Err(poisoned) => {
                tlog!("[commands] Controller lock poisoned by an earlier panic, recovering");
                self.controller.clear_poison();
                let mut guard = poisoned.into_inner();
                let recovered = guard.record_interrupted();
                (guard, recovered)
            }
        }
    }

    /// Run one action, prefixing any lock recovery line to its outcome
    fn run(&self, action: impl FnOnce(&mut Controller) -> Outcome) -> Outcome {
        let (mut controller, mut out) = self.controller();
        let result = action(&mut controller);
        out.lines.extend(result.lines);
        out.viewer = result.viewer;
        out
    }

    /// Release the serial port; called when the window or app goes away
    pub fn shutdown(&self) {
        self.controller().0.shutdown();
    }
}

#[tauri::command]
pub fn get_form_options(state: State<'_, AppState>) -> FormOptions {
    let detected = serial::detect_port_names().unwrap_or_else(|e| {
        tlog!("[commands] {}", e);
        Vec::new()
    });
    FormOptions::build(&state.settings, &detected)
}

#[tauri::command]
pub fn open_serial_port(state: State<'_, AppState>, form: PortForm) -> Outcome {
    state.run(|c| c.open_port(&form))
}

#[tauri::command]
pub fn close_serial_port(state: State<'_, AppState>) -> Outcome {
    state.run(|c| c.close_port())
}

#[tauri::command]
pub fn select_file(state: State<'_, AppState>, path: String) -> Outcome {
    state.run(|c| c.select_file(PathBuf::from(path)))
}

#[tauri::command]
pub fn send_file(state: State<'_, AppState>) -> Outcome {
    state.run(|c| c.send_file())
}

#[tauri::command]
pub fn receive_data(state: State<'_, AppState>) -> Outcome {
    state.run(|c| c.receive_data())
}

#[tauri::command]
pub fn save_viewer(state: State<'_, AppState>, path: String) -> Outcome {
    state.run(|c| c.save_viewer(&PathBuf::from(path)))
}

#[tauri::command]
pub fn get_activity_log(state: State<'_, AppState>) -> Vec<LogLine> {
    state.controller().0.log().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Capabilities, LogLevel};
    use crate::io::serial::SystemPorts;
    use std::panic::{self, AssertUnwindSafe};
    use std::time::Duration;

    fn state() -> AppState {
        let ports = SystemPorts {
            timeout: Duration::from_millis(10),
        };
        let controller = Controller::new(ports, Capabilities { preview_and_save: true });
        AppState::new(controller, AppSettings::default())
    }

    #[test]
    fn test_run_passes_outcome_through() {
        let state = state();
        let out = state.run(|c| c.receive_data());
        assert_eq!(out.messages(), vec!["Serial port not open."]);
    }

    #[test]
    fn test_poisoned_lock_is_logged_and_cleared() {
        let state = state();
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = state.controller.lock().unwrap();
            panic!("action panicked");
        }));
        assert!(state.controller.is_poisoned());

        let out = state.run(|c| c.receive_data());
        assert_eq!(
            out.messages(),
            vec![
                "Internal error: the previous action was interrupted.",
                "Serial port not open."
            ]
        );
        assert_eq!(out.lines[0].level, LogLevel::Error);
        assert!(!state.controller.is_poisoned());

        let out = state.run(|c| c.close_port());
        assert_eq!(out.messages(), vec!["Serial port is not open."]);
        assert_eq!(state.controller().0.log().len(), 3);
    }
}
