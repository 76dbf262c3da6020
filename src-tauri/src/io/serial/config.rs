// src-tauri/src/io/serial/config.rs
//
// Port configuration snapshot taken when the user presses Open.

use serde::{Deserialize, Serialize};

use super::utils::{DataBits, FlowControl, Parity, StopBits};
use crate::errors::OpenError;

/// Baud rates offered by the form, in dropdown order
pub const SUPPORTED_BAUD_RATES: [u32; 3] = [9600, 4800, 19200];

/// Raw dropdown selections as sent by the window
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PortForm {
    pub port: String,
    pub baud_rate: String,
    pub data_bits: String,
    pub stop_bits: String,
    pub parity: String,
    pub flow_control: String,
}

/// Serial port settings used to open a session.
/// Immutable once the session is open; later form edits don't reach it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

impl PortConfig {
    #[cfg(test)]
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            data_bits: DataBits::default(),
            stop_bits: StopBits::default(),
            parity: Parity::default(),
            flow_control: FlowControl::default(),
        }
    }

    /// Parse the form selections. Any bad field is an invalid-settings error.
    pub fn from_form(form: &PortForm) -> Result<Self, OpenError> {
        let port = form.port.trim();
        if port.is_empty() {
            return Err(OpenError::InvalidSettings("no serial port selected".to_string()));
        }

        let baud_rate: u32 = form.baud_rate.trim().parse().map_err(|_| {
            OpenError::InvalidSettings(format!("invalid baud rate '{}'", form.baud_rate.trim()))
        })?;
        if !SUPPORTED_BAUD_RATES.contains(&baud_rate) {
            return Err(OpenError::InvalidSettings(format!(
                "unsupported baud rate {}",
                baud_rate
            )));
        }

        Ok(Self {
            port: port.to_string(),
            baud_rate,
            data_bits: form.data_bits.parse::<DataBits>().map_err(OpenError::InvalidSettings)?,
            stop_bits: form.stop_bits.parse::<StopBits>().map_err(OpenError::InvalidSettings)?,
            parity: form.parity.parse::<Parity>().map_err(OpenError::InvalidSettings)?,
            flow_control: form.flow_control.parse::<FlowControl>().map_err(OpenError::InvalidSettings)?,
        })
    }

    /// e.g. "9600 baud, 8N1, flow control: XON/XOFF"
    pub fn summary(&self) -> String {
        format!(
            "{} baud, {}{}{}, flow control: {}",
            self.baud_rate,
            self.data_bits.bits(),
            self.parity.letter(),
            self.stop_bits.bits(),
            self.flow_control
        )
    }
}
