use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tauri::{AppHandle, Manager};

use crate::io::serial::{
    DataBits, FlowControl, Parity, PortForm, StopBits, SUPPORTED_BAUD_RATES,
};
use crate::io::serial::{port_choices, session::DEFAULT_TIMEOUT_MS};

/// User configuration, read from `settings.json` in the app config dir.
/// The app never writes this file; missing fields take their defaults.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppSettings {
    #[serde(default = "default_port_names")]
    pub port_names: Vec<String>,
    #[serde(default = "default_baud_rate")]
    pub default_baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub default_data_bits: DataBits,
    #[serde(default)]
    pub default_stop_bits: StopBits,
    #[serde(default)]
    pub default_parity: Parity,
    #[serde(default)]
    pub default_flow_control: FlowControl,
    /// Driver read/write timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// File preview pane, received-data viewer and Save button
    #[serde(default = "default_true")]
    pub preview_and_save: bool,
    #[serde(default)]
    pub file_logging: bool,
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,
}

fn default_port_names() -> Vec<String> {
    vec!["COM1".to_string(), "COM2".to_string(), "COM3".to_string()]
}
fn default_baud_rate() -> u32 {
    SUPPORTED_BAUD_RATES[0]
}
fn default_data_bits() -> DataBits {
    DataBits::Seven // first entry in the dropdown
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_true() -> bool {
    true
}
fn default_reports_dir() -> String {
    dirs::document_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("CNCSerial")
        .join("Reports")
        .to_string_lossy()
        .to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            port_names: default_port_names(),
            default_baud_rate: default_baud_rate(),
            default_data_bits: default_data_bits(),
            default_stop_bits: StopBits::default(),
            default_parity: Parity::default(),
            default_flow_control: FlowControl::default(),
            timeout_ms: default_timeout_ms(),
            preview_and_save: default_true(),
            file_logging: false,
            reports_dir: default_reports_dir(),
        }
    }
}

fn get_settings_path(app: &AppHandle) -> Result<PathBuf, String> {
    let app_dir = app
        .path()
        .app_config_dir()
        .map_err(|e| format!("Failed to get app config dir: {}", e))?;

    Ok(app_dir.join("settings.json"))
}

/// Parse a settings file. A missing file yields defaults.
pub fn read_settings(path: &Path) -> Result<AppSettings, String> {
    if !path.exists() {
        return Ok(AppSettings::default());
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read settings: {}", e))?;

    let settings: AppSettings =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse settings: {}", e))?;

    if !SUPPORTED_BAUD_RATES.contains(&settings.default_baud_rate) {
        return Err(format!(
            "Unsupported default_baud_rate {} (expected one of {:?})",
            settings.default_baud_rate, SUPPORTED_BAUD_RATES
        ));
    }

    Ok(settings)
}

/// Load settings for this run, falling back to defaults on any problem
pub fn load_settings(app: &AppHandle) -> AppSettings {
    let path = match get_settings_path(app) {
        Ok(path) => path,
        Err(e) => {
            tlog!("[settings] {}, using defaults", e);
            return AppSettings::default();
        }
    };

    match read_settings(&path) {
        Ok(settings) => {
            tlog!("[settings] Loaded from {:?}", path);
            settings
        }
        Err(e) => {
            tlog!("[settings] {}, using defaults", e);
            AppSettings::default()
        }
    }
}

// ============================================================================
// Form Options
// ============================================================================

/// Dropdown contents and initial selections for the window
#[derive(Debug, Serialize, Clone)]
pub struct FormOptions {
    pub ports: Vec<String>,
    pub baud_rates: Vec<String>,
    pub data_bits: Vec<String>,
    pub stop_bits: Vec<String>,
    pub parity: Vec<String>,
    pub flow_control: Vec<String>,
    pub defaults: PortForm,
    pub preview_and_save: bool,
}

impl FormOptions {
    pub fn build(settings: &AppSettings, detected: &[String]) -> Self {
        let ports = port_choices(&settings.port_names, detected);
        let defaults = PortForm {
            port: ports.first().cloned().unwrap_or_default(),
            baud_rate: settings.default_baud_rate.to_string(),
            data_bits: settings.default_data_bits.to_string(),
            stop_bits: settings.default_stop_bits.to_string(),
            parity: settings.default_parity.to_string(),
            flow_control: settings.default_flow_control.to_string(),
        };

        Self {
            ports,
            baud_rates: SUPPORTED_BAUD_RATES.iter().map(|b| b.to_string()).collect(),
            data_bits: DataBits::ALL.iter().map(|d| d.to_string()).collect(),
            stop_bits: StopBits::ALL.iter().map(|s| s.to_string()).collect(),
            parity: Parity::ALL.iter().map(|p| p.to_string()).collect(),
            flow_control: FlowControl::ALL.iter().map(|f| f.to_string()).collect(),
            defaults,
            preview_and_save: settings.preview_and_save,
        }
    }
}
