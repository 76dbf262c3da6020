#[macro_use]
mod logging;

mod commands;
mod controller;
mod errors;
mod io;
mod settings;
mod transfer;

use std::path::Path;
use std::time::Duration;
use tauri::{Manager, RunEvent, WindowEvent};

use commands::AppState;
use controller::{Capabilities, Controller};
use io::serial::SystemPorts;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let builder = tauri::Builder::default().plugin(tauri_plugin_dialog::init());

    let builder = builder.setup(|app| {
        let app_settings = settings::load_settings(app.handle());

        if app_settings.file_logging {
            match logging::init_file_logging(Path::new(&app_settings.reports_dir)) {
                Ok(path) => tlog!("[logging] File logging started: {}", path.display()),
                Err(e) => tlog!("[setup] Failed to start file logging: {}", e),
            }
        }

        let ports = SystemPorts {
            timeout: Duration::from_millis(app_settings.timeout_ms),
        };
        let capabilities = Capabilities {
            preview_and_save: app_settings.preview_and_save,
        };
        tlog!(
            "[setup] Serial timeout {} ms, preview and save {}",
            app_settings.timeout_ms,
            if capabilities.preview_and_save { "enabled" } else { "disabled" }
        );

        app.manage(AppState::new(Controller::new(ports, capabilities), app_settings));
        Ok(())
    });

    let builder = builder.invoke_handler(tauri::generate_handler![
        commands::get_form_options,
        commands::open_serial_port,
        commands::close_serial_port,
        commands::select_file,
        commands::send_file,
        commands::receive_data,
        commands::save_viewer,
        commands::get_activity_log,
    ]);

    // Every open port must be released whichever way the window goes away
    let builder = builder.on_window_event(|window, event| {
        if let WindowEvent::Destroyed = event {
            tlog!("[WindowEvent] '{}' destroyed, releasing serial port", window.label());
            if let Some(state) = window.try_state::<AppState>() {
                state.shutdown();
            }
        }
    });

    builder
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app, event| {
            if let RunEvent::Exit = event {
                if let Some(state) = app.try_state::<AppState>() {
                    state.shutdown();
                }
                logging::stop_file_logging();
            }
        });
}
