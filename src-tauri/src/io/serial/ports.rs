// src-tauri/src/io/serial/ports.rs
//
// Port names for the port dropdown.

/// Whether an enumerated device belongs in the dropdown.
/// On macOS the /dev/tty.* twins block on open waiting for carrier detect,
/// so only /dev/cu.* is offered.
fn is_listed(name: &str) -> bool {
    !(cfg!(target_os = "macos") && name.starts_with("/dev/tty."))
}

/// Names of the serial devices the OS reports right now
pub fn detect_port_names() -> Result<Vec<String>, String> {
    let ports =
        serialport::available_ports().map_err(|e| format!("Failed to enumerate ports: {}", e))?;

    Ok(ports
        .into_iter()
        .map(|p| p.port_name)
        .filter(|name| is_listed(name))
        .collect())
}

/// Dropdown entries: configured names first, then detected ports not already listed
pub fn port_choices(configured: &[String], detected: &[String]) -> Vec<String> {
    let mut choices: Vec<String> = Vec::with_capacity(configured.len() + detected.len());
    let names = configured
        .iter()
        .chain(detected)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());
    for name in names {
        if !choices.iter().any(|c| c == name) {
            choices.push(name.to_string());
        }
    }
    choices
}
