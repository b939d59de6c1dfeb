//! 驱动层错误类型定义

use opencat_protocol::{Command, ProtocolError};
use opencat_serial::SerialError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 串口读写失败（未打开、IO 错误、超时）
    #[error("Transport error: {0}")]
    Transport(#[from] SerialError),

    /// 协议错误（包括启动时的命令目录校验失败）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 批量执行中途失败
    ///
    /// `index` 从 0 开始；显示时使用从 1 开始的序号。
    #[error("Task {} of {total} ({command}) failed: {source}", .index + 1)]
    Batch {
        index: usize,
        total: usize,
        command: Command,
        #[source]
        source: Box<DriverError>,
    },

    /// 未指定串口且自动探测没有找到设备
    #[error("No serial port found")]
    NoPortFound,
}

impl DriverError {
    /// 根因是否为串口错误（穿透 `Batch` 包装）
    pub fn is_transport(&self) -> bool {
        match self {
            DriverError::Transport(_) => true,
            DriverError::Batch { source, .. } => source.is_transport(),
            _ => false,
        }
    }

    /// 根因为串口超时
    pub fn is_timeout(&self) -> bool {
        match self {
            DriverError::Transport(SerialError::Timeout) => true,
            DriverError::Batch { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// 批量执行失败时，失败任务的下标（从 0 开始）
    pub fn failed_task_index(&self) -> Option<usize> {
        match self {
            DriverError::Batch { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// 批量执行失败时，失败任务的序号（从 1 开始）
    pub fn failed_task_position(&self) -> Option<usize> {
        self.failed_task_index().map(|index| index + 1)
    }

    /// 去掉 `Batch` 包装后的根错误
    pub fn root(&self) -> &DriverError {
        match self {
            DriverError::Batch { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DriverError;
    use opencat_protocol::{Command, ProtocolError};
    use opencat_serial::SerialError;

    /// 测试 DriverError 的 Display 实现
    #[test]
    fn test_driver_error_display() {
        let driver_error = DriverError::Transport(SerialError::Timeout);
        assert_eq!(format!("{}", driver_error), "Transport error: Serial timeout");

        let driver_error =
            DriverError::Protocol(ProtocolError::CatalogueInvariant("dup".to_string()));
        let msg = format!("{}", driver_error);
        assert!(msg.contains("Protocol error") && msg.contains("dup"), "{}", msg);

        let driver_error = DriverError::Batch {
            index: 1,
            total: 3,
            command: Command::Walk,
            source: Box::new(DriverError::Transport(SerialError::NotOpen)),
        };
        assert_eq!(
            format!("{}", driver_error),
            "Task 2 of 3 (walk) failed: Transport error: Serial port not open"
        );

        assert_eq!(format!("{}", DriverError::NoPortFound), "No serial port found");
    }

    /// 测试 From<SerialError> 转换
    #[test]
    fn test_from_serial_error() {
        let driver_error: DriverError = SerialError::Timeout.into();
        assert!(matches!(driver_error, DriverError::Transport(SerialError::Timeout)));
        assert!(driver_error.is_transport());
        assert!(driver_error.is_timeout());
    }

    #[test]
    fn test_batch_helpers_see_through_wrapper() {
        let driver_error = DriverError::Batch {
            index: 0,
            total: 1,
            command: Command::Sit,
            source: Box::new(SerialError::Timeout.into()),
        };
        assert!(driver_error.is_transport());
        assert!(driver_error.is_timeout());
        assert_eq!(driver_error.failed_task_index(), Some(0));
        assert_eq!(driver_error.failed_task_position(), Some(1));
        assert!(matches!(driver_error.root(), DriverError::Transport(_)));

        let protocol: DriverError = ProtocolError::UnknownToken("x".to_string()).into();
        assert!(!protocol.is_transport());
        assert_eq!(protocol.failed_task_index(), None);
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let driver_error = DriverError::Batch {
            index: 2,
            total: 3,
            command: Command::Sit,
            source: Box::new(SerialError::NotOpen.into()),
        };
        let source = driver_error.source().expect("batch error has a source");
        assert_eq!(source.to_string(), "Transport error: Serial port not open");
    }
}
