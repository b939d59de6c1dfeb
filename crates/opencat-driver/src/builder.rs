//! Builder 模式实现
//!
//! 提供链式构造 `Robot` 实例的便捷方式。

use crate::error::DriverError;
use crate::robot::Robot;
use opencat_serial::{DEFAULT_BAUD_RATE, PortInfo, SerialPortAdapter, Timeout, list_ports};

/// Robot Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use opencat_driver::RobotBuilder;
/// use opencat_serial::Timeout;
///
/// // 自动选择第一个 USB 串口，115200 波特率，1 秒超时
/// let robot = RobotBuilder::new().build().unwrap();
///
/// // 指定串口和超时
/// let robot = RobotBuilder::new()
///     .port("/dev/ttyUSB0")
///     .timeout(Timeout::simple(250))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct RobotBuilder {
    /// 串口路径；未设置时自动探测
    port: Option<String>,
    baud_rate: Option<u32>,
    timeout: Option<Timeout>,
    verbose: bool,
    /// 打开后丢弃输入缓冲区中的启动信息
    flush_on_open: bool,
}

impl RobotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置串口路径（可选，默认自动探测）
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// 设置波特率（可选，默认 115200）
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }

    /// 设置超时（可选，默认 1 秒简单超时）
    pub fn timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn flush_on_open(mut self, flush: bool) -> Self {
        self.flush_on_open = flush;
        self
    }

    /// 打开串口并构建 `Robot`
    ///
    /// # Errors
    /// - `DriverError::NoPortFound`: 未指定串口且没有探测到 USB 串口
    /// - `DriverError::Transport`: 串口打开失败
    /// - `DriverError::Protocol`: 命令目录不一致
    pub fn build(self) -> Result<Robot<SerialPortAdapter>, DriverError> {
        let port = match self.port {
            Some(port) => port,
            None => {
                let ports = list_ports()?;
                let picked = pick_port(&ports).ok_or(DriverError::NoPortFound)?;
                tracing::info!(
                    "Auto-detected serial port {} ({})",
                    picked.port,
                    picked.description
                );
                picked.port.clone()
            },
        };

        let baud_rate = self.baud_rate.unwrap_or(DEFAULT_BAUD_RATE);
        let timeout = self.timeout.unwrap_or_default();
        let mut adapter = SerialPortAdapter::open(&port, baud_rate, timeout)?;
        if self.flush_on_open {
            adapter.flush_input()?;
        }

        Ok(Robot::new(adapter)?.with_verbose(self.verbose))
    }
}

/// 自动探测：优先 USB 串口，其次任意串口
fn pick_port(ports: &[PortInfo]) -> Option<&PortInfo> {
    ports
        .iter()
        .find(|p| p.hardware_id.starts_with("USB"))
        .or_else(|| ports.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(name: &str, hardware_id: &str) -> PortInfo {
        PortInfo {
            port: name.to_string(),
            description: "n/a".to_string(),
            hardware_id: hardware_id.to_string(),
        }
    }

    #[test]
    fn test_pick_prefers_usb() {
        let ports = vec![
            port("/dev/ttyS0", "n/a"),
            port("/dev/ttyUSB0", "USB VID:PID=1a86:7523 SNR=n/a"),
        ];
        assert_eq!(pick_port(&ports).unwrap().port, "/dev/ttyUSB0");
    }

    #[test]
    fn test_pick_falls_back_to_first() {
        let ports = vec![port("/dev/ttyS0", "n/a"), port("/dev/ttyS1", "PCI")];
        assert_eq!(pick_port(&ports).unwrap().port, "/dev/ttyS0");
        assert!(pick_port(&[]).is_none());
    }

    #[test]
    fn test_build_missing_port_fails() {
        let err = RobotBuilder::new()
            .port("/dev/opencat-does-not-exist")
            .build()
            .unwrap_err();
        assert!(err.is_transport(), "unexpected error: {:?}", err);
    }
}
