//! ports 命令
//!
//! 列出系统中的串口

use anyhow::{Context, Result};
use opencat_sdk::{PortInfo, list_ports};

pub fn execute() -> Result<()> {
    let ports = list_ports().context("Failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
        return Ok(());
    }
    for port in &ports {
        println!("{}", format_port(port));
    }
    Ok(())
}

/// `(port, description, hardware_id)`
pub fn format_port(port: &PortInfo) -> String {
    format!("({}, {}, {})", port.port, port.description, port.hardware_id)
}
