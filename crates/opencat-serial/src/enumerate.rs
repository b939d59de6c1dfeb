//! 串口枚举

use crate::SerialError;
use serialport::{SerialPortInfo, SerialPortType};

/// 串口信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// 端口路径，如 `/dev/ttyUSB0`、`COM3`
    pub port: String,
    /// 人类可读描述
    pub description: String,
    /// 硬件 ID（USB 设备为 `USB VID:PID=xxxx:xxxx SNR=...`）
    pub hardware_id: String,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (description, hardware_id) = match info.port_type {
            SerialPortType::UsbPort(usb) => {
                let description = usb
                    .product
                    .or(usb.manufacturer)
                    .unwrap_or_else(|| "USB serial".to_string());
                let hardware_id = format!(
                    "USB VID:PID={:04x}:{:04x} SNR={}",
                    usb.vid,
                    usb.pid,
                    usb.serial_number.as_deref().unwrap_or("n/a")
                );
                (description, hardware_id)
            },
            SerialPortType::PciPort => ("PCI serial".to_string(), "PCI".to_string()),
            SerialPortType::BluetoothPort => {
                ("Bluetooth serial".to_string(), "Bluetooth".to_string())
            },
            SerialPortType::Unknown => ("n/a".to_string(), "n/a".to_string()),
        };

        Self {
            port: info.port_name,
            description,
            hardware_id,
        }
    }
}

/// 列出系统中可用的串口（按路径排序）
///
/// 没有任何串口时返回空列表，而不是错误。
pub fn list_ports() -> Result<Vec<PortInfo>, SerialError> {
    ports_from_scan(serialport::available_ports())
}

fn ports_from_scan(
    scan: serialport::Result<Vec<SerialPortInfo>>,
) -> Result<Vec<PortInfo>, SerialError> {
    let mut ports: Vec<PortInfo> = match scan {
        Ok(ports) => ports.into_iter().map(PortInfo::from).collect(),
        Err(e) if e.kind == serialport::ErrorKind::NoDevice => {
            tracing::debug!("No serial devices found: {}", e.description);
            Vec::new()
        },
        Err(e) => return Err(e.into()),
    };
    ports.sort_by(|a, b| a.port.cmp(&b.port));
    Ok(ports)
}
