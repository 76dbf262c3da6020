// src-tauri/src/io/serial/mod.rs
//
// Serial port driver for CNC Serial.
//
// Features:
// - Port configuration parsed from the form dropdowns
// - Blocking open/close/write/poll against a single handle
// - Port enumeration for the port dropdown

pub mod config;
pub mod ports;
pub mod session;
pub(crate) mod utils;

pub use config::{PortConfig, PortForm, SUPPORTED_BAUD_RATES};
pub use ports::{detect_port_names, port_choices};
pub use session::{PortOpener, SerialSession, SystemPorts};
pub use utils::{DataBits, FlowControl, Parity, StopBits};
