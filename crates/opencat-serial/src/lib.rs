//! # OpenCat Serial Adapter Layer
//!
//! 串口硬件抽象层，提供统一的串口接口抽象。
//!
//! - [`SerialAdapter`]: 上层（驱动层）唯一依赖的接口，只暴露读、写、超时配置和打开状态
//! - [`SerialPortAdapter`]: 基于 `serialport` crate 的真实串口实现
//! - [`Timeout`]: 常量 + 乘数 + 字节间隔 的超时模型
//! - [`list_ports`]: 枚举系统中可用的串口
//! - `mock`（feature = "mock"）: 无硬件依赖的模拟串口

use thiserror::Error;

mod enumerate;
mod port;
mod timeout;

#[cfg(feature = "mock")]
pub mod mock;

pub use enumerate::{PortInfo, list_ports};
pub use port::{DEFAULT_BAUD_RATE, SerialPortAdapter};
pub use timeout::{Timeout, WaitPlan};

#[cfg(feature = "mock")]
pub use mock::MockSerialAdapter;

/// 单行响应的默认最大长度（字节）
pub const DEFAULT_MAX_LINE_LEN: usize = 65536;

/// 串口适配层统一错误类型
#[derive(Error, Debug)]
pub enum SerialError {
    #[error("IO Error: {0}")]
    Io(#[source] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] SerialDeviceError),
    #[error("Serial timeout")]
    Timeout,
    #[error("Serial port not open")]
    NotOpen,
    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },
}

impl From<std::io::Error> for SerialError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => SerialError::Timeout,
            _ => SerialError::Io(err),
        }
    }
}

impl From<serialport::Error> for SerialError {
    fn from(err: serialport::Error) -> Self {
        match err.kind {
            serialport::ErrorKind::Io(std::io::ErrorKind::TimedOut) => SerialError::Timeout,
            _ => SerialError::Device(err.into()),
        }
    }
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialDeviceErrorKind {
    Unknown,
    NotFound,
    NoDevice,
    AccessDenied,
    Busy,
    InvalidInput,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct SerialDeviceError {
    pub kind: SerialDeviceErrorKind,
    pub message: String,
}

impl SerialDeviceError {
    pub fn new(kind: SerialDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 设备不存在或无权限：重试没有意义
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            SerialDeviceErrorKind::NoDevice
                | SerialDeviceErrorKind::AccessDenied
                | SerialDeviceErrorKind::NotFound
        )
    }
}

impl From<serialport::Error> for SerialDeviceError {
    fn from(err: serialport::Error) -> Self {
        use std::io::ErrorKind as Io;

        let kind = match err.kind {
            serialport::ErrorKind::NoDevice => SerialDeviceErrorKind::NoDevice,
            serialport::ErrorKind::InvalidInput => SerialDeviceErrorKind::InvalidInput,
            serialport::ErrorKind::Unknown => SerialDeviceErrorKind::Unknown,
            serialport::ErrorKind::Io(Io::NotFound) => SerialDeviceErrorKind::NotFound,
            serialport::ErrorKind::Io(Io::PermissionDenied) => SerialDeviceErrorKind::AccessDenied,
            serialport::ErrorKind::Io(Io::ResourceBusy) => SerialDeviceErrorKind::Busy,
            serialport::ErrorKind::Io(_) => SerialDeviceErrorKind::Backend,
        };
        Self::new(kind, err.description)
    }
}

impl From<String> for SerialDeviceError {
    fn from(message: String) -> Self {
        Self::new(SerialDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for SerialDeviceError {
    fn from(message: &str) -> Self {
        Self::new(SerialDeviceErrorKind::Unknown, message)
    }
}

/// 串口适配器
///
/// 驱动层只通过这个 trait 访问串口，因此拿不到底层端口的其它能力（波特率、流控、任意配置等）。
///
/// # 读语义
///
/// `read(max_len)` 在超时预算内尽量读满 `max_len` 字节：
/// - 读到至少 1 字节后超时：返回已读到的部分
/// - 一个字节都没读到就超时：返回 [`SerialError::Timeout`]
pub trait SerialAdapter {
    /// 写入字节，返回实际写入的字节数
    fn write(&mut self, data: &[u8]) -> Result<usize, SerialError>;

    /// 读取最多 `max_len` 字节
    fn read(&mut self, max_len: usize) -> Result<Vec<u8>, SerialError>;

    /// 设置超时
    fn set_timeout(&mut self, timeout: Timeout) -> Result<(), SerialError>;

    fn is_open(&self) -> bool;

    /// 写入完整的一行；写入不完整视为错误
    fn write_line(&mut self, line: &str) -> Result<(), SerialError> {
        if !self.is_open() {
            return Err(SerialError::NotOpen);
        }
        let expected = line.len();
        let written = self.write(line.as_bytes())?;
        if written != expected {
            return Err(SerialError::ShortWrite { expected, written });
        }
        Ok(())
    }

    /// 读取一行（逐字节读取直到 `\n`），返回内容不含 `\n` 和末尾的 `\r`
    ///
    /// 已读到部分内容后超时，返回该部分；一个字节都没有则返回 [`SerialError::Timeout`]。
    fn read_line(&mut self, max_len: usize) -> Result<String, SerialError> {
        if !self.is_open() {
            return Err(SerialError::NotOpen);
        }

        let mut line = Vec::new();
        while line.len() < max_len {
            let chunk = match self.read(1) {
                Ok(chunk) => chunk,
                Err(SerialError::Timeout) if !line.is_empty() => break,
                Err(e) => return Err(e),
            };
            match chunk.first() {
                Some(b'\n') => break,
                Some(&byte) => line.push(byte),
                None if line.is_empty() => return Err(SerialError::Timeout),
                None => break,
            }
        }

        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }
}

impl<A: SerialAdapter + ?Sized> SerialAdapter for Box<A> {
    fn write(&mut self, data: &[u8]) -> Result<usize, SerialError> {
        (**self).write(data)
    }

    fn read(&mut self, max_len: usize) -> Result<Vec<u8>, SerialError> {
        (**self).read(max_len)
    }

    fn set_timeout(&mut self, timeout: Timeout) -> Result<(), SerialError> {
        (**self).set_timeout(timeout)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}
