// src-tauri/src/io/serial/utils.rs
//
// Serial line setting types and their conversions to the serialport crate.
// Each type parses from, and displays as, the label shown in its dropdown.

use serde::{Deserialize, Serialize};
use serialport::{
    DataBits as SpDataBits, FlowControl as SpFlowControl, Parity as SpParity,
    StopBits as SpStopBits,
};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Types
// ============================================================================

/// Serialised as the dropdown label, e.g. `"7"`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataBits {
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
}

impl Default for DataBits {
    fn default() -> Self {
        DataBits::Eight
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl Default for StopBits {
    fn default() -> Self {
        StopBits::One
    }
}

/// Parity setting for serial port configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Default for Parity {
    fn default() -> Self {
        Parity::None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowControl {
    None,
    XonXoff,
    RtsCts,
    /// No driver support; opened without flow control and DTR is asserted
    DtrDsr,
}

impl Default for FlowControl {
    fn default() -> Self {
        FlowControl::None
    }
}

// ============================================================================
// Labels
// ============================================================================

impl DataBits {
    pub const ALL: [DataBits; 2] = [DataBits::Seven, DataBits::Eight];

    pub fn bits(self) -> u8 {
        match self {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

impl StopBits {
    pub const ALL: [StopBits; 2] = [StopBits::One, StopBits::Two];

    pub fn bits(self) -> u8 {
        match self {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}

impl Parity {
    pub const ALL: [Parity; 3] = [Parity::None, Parity::Even, Parity::Odd];

    /// Single-letter code used in "8N1" style summaries
    pub fn letter(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
        }
    }
}

impl FlowControl {
    pub const ALL: [FlowControl; 4] = [
        FlowControl::None,
        FlowControl::XonXoff,
        FlowControl::RtsCts,
        FlowControl::DtrDsr,
    ];
}

impl fmt::Display for DataBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Parity::None => "None",
            Parity::Even => "Even",
            Parity::Odd => "Odd",
        })
    }
}

impl fmt::Display for FlowControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlowControl::None => "None",
            FlowControl::XonXoff => "XON/XOFF",
            FlowControl::RtsCts => "RTS/CTS",
            FlowControl::DtrDsr => "DTR/DSR",
        })
    }
}

impl FromStr for DataBits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7" => Ok(DataBits::Seven),
            "8" => Ok(DataBits::Eight),
            other => Err(format!("data bits must be 7 or 8, got '{}'", other)),
        }
    }
}

impl FromStr for StopBits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(StopBits::One),
            "2" => Ok(StopBits::Two),
            other => Err(format!("stop bits must be 1 or 2, got '{}'", other)),
        }
    }
}

impl FromStr for Parity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Parity::None),
            "even" => Ok(Parity::Even),
            "odd" => Ok(Parity::Odd),
            _ => Err(format!("unknown parity '{}'", s.trim())),
        }
    }
}

impl FromStr for FlowControl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(FlowControl::None),
            "xon/xoff" | "xonxoff" => Ok(FlowControl::XonXoff),
            "rts/cts" | "rtscts" => Ok(FlowControl::RtsCts),
            "dtr/dsr" | "dtrdsr" => Ok(FlowControl::DtrDsr),
            _ => Err(format!("unknown flow control '{}'", s.trim())),
        }
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert our Parity enum to serialport crate's Parity type
pub fn to_serialport_parity(p: Parity) -> SpParity {
    match p {
        Parity::None => SpParity::None,
        Parity::Odd => SpParity::Odd,
        Parity::Even => SpParity::Even,
    }
}

pub fn to_serialport_data_bits(bits: DataBits) -> SpDataBits {
    match bits {
        DataBits::Seven => SpDataBits::Seven,
        DataBits::Eight => SpDataBits::Eight,
    }
}

pub fn to_serialport_stop_bits(bits: StopBits) -> SpStopBits {
    match bits {
        StopBits::One => SpStopBits::One,
        StopBits::Two => SpStopBits::Two,
    }
}

/// DTR/DSR maps to no driver flow control; the caller asserts DTR after open
pub fn to_serialport_flow_control(flow: FlowControl) -> SpFlowControl {
    match flow {
        FlowControl::None | FlowControl::DtrDsr => SpFlowControl::None,
        FlowControl::XonXoff => SpFlowControl::Software,
        FlowControl::RtsCts => SpFlowControl::Hardware,
    }
}

// ============================================================================
// Tests
// ============================================================================
