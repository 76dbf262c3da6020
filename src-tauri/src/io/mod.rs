// src-tauri/src/io/mod.rs
//
// Device IO for CNC Serial. Only serial ports are supported.

pub mod serial;
