//! # OpenCat Protocol
//!
//! OpenCat 四足机器人串口协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `command`: 命令目录（令牌、描述、分类）
//! - `task`: 任务（命令 + 参数 + 执行后延时）
//! - `wire`: 行协议的解析
//!
//! ## 线协议
//!
//! 每条命令占一行 ASCII 文本：命令令牌，后跟以空格分隔的十进制参数，以 `\n` 结尾。
//!
//! ```rust
//! use opencat_protocol::{Command, Task};
//!
//! assert_eq!(Task::new(Command::Walk).encode(), "kwkF\n");
//! assert_eq!(
//!     Task::with_args(Command::SetJoints, vec![10, -5, 200], 0.5).encode(),
//!     "L 10 -5 200\n"
//! );
//! ```

pub mod command;
pub mod task;
pub mod wire;

// 重新导出常用类型
pub use command::{Command, CommandCategory, CommandSpec, verify as verify_catalogue};
pub use task::{Task, TaskArgs, TaskRecord};
pub use wire::{LINE_TERMINATOR, TaskLine};

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Unknown command token: {0:?}")]
    UnknownToken(String),

    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("Invalid argument #{position}: {value:?} is not a 16-bit integer")]
    InvalidArgument { position: usize, value: String },

    #[error("Malformed line: {0}")]
    MalformedLine(String),

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: u8 },

    /// 命令目录与枚举不一致（启动时检查，正常情况下不可能出现）
    #[error("Command catalogue invariant violated: {0}")]
    CatalogueInvariant(String),
}

/// 获取命令的线协议令牌
pub fn token_for(command: Command) -> &'static str {
    command.token()
}

/// 获取命令的可读描述
pub fn description_for(command: Command) -> &'static str {
    command.description()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_functions() {
        assert_eq!(token_for(Command::Walk), "kwkF");
        assert_eq!(description_for(Command::Walk), "walk");
        assert_eq!(token_for(Command::SetJoints), "L");
        assert_eq!(description_for(Command::MoveJointsSimultaneous), "index and set joints");
    }

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::UnknownToken("kxyz".to_string());
        assert_eq!(format!("{}", err), "Unknown command token: \"kxyz\"");

        let err = ProtocolError::InvalidArgument {
            position: 2,
            value: "70000".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("#2") && msg.contains("70000"), "{}", msg);

        let err = ProtocolError::CatalogueInvariant("duplicate token".to_string());
        assert!(format!("{}", err).contains("duplicate token"));
    }
}
