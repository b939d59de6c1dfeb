//! 基于 `serialport` crate 的串口适配器

use crate::timeout::{Timeout, WaitPlan};
use crate::{SerialAdapter, SerialError};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

/// OpenCat 固件默认波特率
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// `WaitPlan::Forever` 时每次阻塞读取的时长；超时后继续等待
const BLOCKING_SLICE: Duration = Duration::from_secs(1);

/// 真实串口适配器（8N1，无流控）
///
/// # Example
///
/// ```no_run
/// use opencat_serial::{SerialAdapter, SerialPortAdapter, Timeout};
///
/// let mut port = SerialPortAdapter::open("/dev/ttyUSB0", 115_200, Timeout::simple(1000))?;
/// port.write_line("ksit\n")?;
/// let response = port.read_line(256)?;
/// # Ok::<(), opencat_serial::SerialError>(())
/// ```
pub struct SerialPortAdapter {
    port: Option<Box<dyn SerialPort>>,
    name: String,
    baud_rate: u32,
    timeout: Timeout,
}

impl SerialPortAdapter {
    /// 打开串口
    ///
    /// # Errors
    /// - `SerialError::Device`: 设备不存在、无权限或被占用
    pub fn open(path: &str, baud_rate: u32, timeout: Timeout) -> Result<Self, SerialError> {
        let initial_timeout = timeout.read_budget(1).unwrap_or(BLOCKING_SLICE);
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .timeout(initial_timeout)
            .open()?;

        tracing::info!("Opened serial port {} at {} baud", path, baud_rate);

        Ok(Self {
            port: Some(port),
            name: path.to_string(),
            baud_rate,
            timeout,
        })
    }

    /// 包装一个已经打开的 `serialport` 端口（例如自定义参数打开的端口或伪终端）
    pub fn from_port(
        mut port: Box<dyn SerialPort>,
        timeout: Timeout,
    ) -> Result<Self, SerialError> {
        port.set_timeout(timeout.read_budget(1).unwrap_or(BLOCKING_SLICE))?;
        let name = port.name().unwrap_or_else(|| "<unnamed>".to_string());
        let baud_rate = port.baud_rate()?;
        Ok(Self {
            port: Some(port),
            name,
            baud_rate,
            timeout,
        })
    }

    /// 端口路径
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// 当前超时配置
    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    /// 丢弃输入缓冲区中尚未读取的数据（例如机器人上电时打印的启动信息）
    pub fn flush_input(&mut self) -> Result<(), SerialError> {
        self.port_mut()?.clear(ClearBuffer::Input)?;
        Ok(())
    }

    /// 关闭串口；之后的读写返回 `SerialError::NotOpen`
    pub fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::info!("Closed serial port {}", self.name);
        }
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>, SerialError> {
        self.port.as_mut().ok_or(SerialError::NotOpen)
    }
}

impl SerialAdapter for SerialPortAdapter {
    fn write(&mut self, data: &[u8]) -> Result<usize, SerialError> {
        let budget = self.timeout.write_budget(data.len());
        let port = self.port_mut()?;
        port.set_timeout(budget.unwrap_or(BLOCKING_SLICE))?;

        let start = Instant::now();
        let mut written = 0;
        while written < data.len() {
            match port.write(&data[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::TimedOut => {
                    let expired = budget.is_some_and(|b| start.elapsed() >= b);
                    if !expired {
                        continue;
                    }
                    if written == 0 {
                        return Err(SerialError::Timeout);
                    }
                    break;
                },
                Err(e) => return Err(e.into()),
            }
        }
        port.flush()?;

        tracing::trace!("Wrote {}/{} bytes", written, data.len());
        Ok(written)
    }

    fn read(&mut self, max_len: usize) -> Result<Vec<u8>, SerialError> {
        if max_len == 0 {
            return Ok(Vec::new());
        }

        let timeout = self.timeout;
        let port = self.port_mut()?;
        let start = Instant::now();
        let mut buf = vec![0u8; max_len];
        let mut filled = 0;

        while filled < max_len {
            let wait = match timeout.next_read_wait(max_len, start.elapsed(), filled > 0) {
                WaitPlan::Wait(wait) => wait,
                WaitPlan::Forever => BLOCKING_SLICE,
                WaitPlan::Expired => break,
            };
            port.set_timeout(wait)?;

            match port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::TimedOut => {
                    // 字节间隔超时或总预算耗尽时结束；无限等待时继续
                    if filled > 0 && timeout.inter_byte().is_some() {
                        break;
                    }
                    continue;
                },
                Err(e) => return Err(e.into()),
            }
        }

        if filled == 0 {
            return Err(SerialError::Timeout);
        }
        buf.truncate(filled);
        Ok(buf)
    }

    fn set_timeout(&mut self, timeout: Timeout) -> Result<(), SerialError> {
        self.timeout = timeout;
        if let Some(port) = self.port.as_mut() {
            port.set_timeout(timeout.read_budget(1).unwrap_or(BLOCKING_SLICE))?;
        }
        tracing::debug!("Serial timeout set to {:?}", timeout);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }
}

impl Drop for SerialPortAdapter {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SerialPortAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortAdapter")
            .field("name", &self.name)
            .field("baud_rate", &self.baud_rate)
            .field("timeout", &self.timeout)
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_device_fails() {
        let err = SerialPortAdapter::open(
            "/dev/opencat-does-not-exist",
            DEFAULT_BAUD_RATE,
            Timeout::default(),
        )
        .unwrap_err();
        assert!(
            matches!(err, SerialError::Device(_) | SerialError::Io(_)),
            "unexpected error: {:?}",
            err
        );
    }

    /// 伪终端对：返回 (适配器, 对端)
    #[cfg(unix)]
    fn pty_pair(timeout: Timeout) -> (SerialPortAdapter, serialport::TTYPort) {
        let (mut peer, device) = serialport::TTYPort::pair().unwrap();
        peer.set_timeout(Duration::from_millis(500)).unwrap();
        let adapter = SerialPortAdapter::from_port(Box::new(device), timeout).unwrap();
        (adapter, peer)
    }

    #[cfg(unix)]
    #[test]
    fn test_silent_peer_times_out_after_budget() {
        let (mut port, _peer) = pty_pair(Timeout::simple(200));

        let start = Instant::now();
        let err = port.read(8).unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, SerialError::Timeout), "unexpected error: {:?}", err);
        assert!(elapsed >= Duration::from_millis(180), "returned too early: {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(2), "returned too late: {:?}", elapsed);
    }

    #[cfg(unix)]
    #[test]
    fn test_read_returns_partial_data_on_timeout() {
        let (mut port, mut peer) = pty_pair(Timeout::simple(200));
        peer.write_all(b"Testing.").unwrap();
        peer.flush().unwrap();

        let data = port.read(9).unwrap();
        assert_eq!(data, b"Testing.");
    }

    #[cfg(unix)]
    #[test]
    fn test_inter_byte_gap_ends_read_early() {
        let (mut port, mut peer) = pty_pair(Timeout::new(50, 3000, 0, 1000, 0));
        peer.write_all(b"ab").unwrap();
        peer.flush().unwrap();

        let start = Instant::now();
        let data = port.read(16).unwrap();
        let elapsed = start.elapsed();

        assert_eq!(data, b"ab");
        assert!(elapsed < Duration::from_secs(1), "inter-byte gap ignored: {:?}", elapsed);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_delivers_every_byte() {
        let (mut port, mut peer) = pty_pair(Timeout::simple(500));

        assert_eq!(port.write(b"ksit\n").unwrap(), 5);

        let mut received = [0u8; 5];
        peer.read_exact(&mut received).unwrap();
        assert_eq!(&received, b"ksit\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_read_line_over_pty() {
        let (mut port, mut peer) = pty_pair(Timeout::simple(500));
        peer.write_all(b"kwkF\r\n").unwrap();
        peer.flush().unwrap();

        assert_eq!(port.read_line(64).unwrap(), "kwkF");
    }

    #[cfg(unix)]
    #[test]
    fn test_closed_adapter_is_not_open() {
        let (mut port, _peer) = pty_pair(Timeout::default());
        assert!(port.is_open());
        port.close();
        assert!(!port.is_open());
        assert!(matches!(port.read(1), Err(SerialError::NotOpen)));
    }
}
