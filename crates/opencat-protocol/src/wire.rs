//! 行协议解析
//!
//! 编码见 [`Task::encode`](crate::Task::encode)。这里提供反方向：把一行文本还原为命令和参数，
//! 供模拟机器人和诊断工具使用。

use crate::ProtocolError;
use crate::command::Command;
use crate::task::{Task, TaskArgs};
use std::str::FromStr;

/// 行终止符
pub const LINE_TERMINATOR: char = '\n';

/// 解析后的一行命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLine {
    pub command: Command,
    pub arguments: TaskArgs,
}

impl TaskLine {
    /// 解析一行线协议文本
    ///
    /// 末尾的 `\n` / `\r\n` 可有可无；令牌区分大小写；参数必须是 `i16` 范围内的十进制整数。
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let body = line.trim_end_matches(['\n', '\r']);
        if body.contains(LINE_TERMINATOR) {
            return Err(ProtocolError::MalformedLine(format!(
                "embedded line terminator in {:?}",
                line
            )));
        }

        let mut words = body.split_ascii_whitespace();
        let token = words
            .next()
            .ok_or_else(|| ProtocolError::MalformedLine("empty line".to_string()))?;
        let command = Command::from_token(token)
            .ok_or_else(|| ProtocolError::UnknownToken(token.to_string()))?;

        let arguments = words
            .enumerate()
            .map(|(i, word)| {
                word.parse::<i16>().map_err(|_| ProtocolError::InvalidArgument {
                    position: i + 1,
                    value: word.to_string(),
                })
            })
            .collect::<Result<TaskArgs, _>>()?;

        Ok(Self { command, arguments })
    }

    /// 转换为任务
    pub fn into_task(self, delay: f32) -> Task {
        Task::with_args(self.command, self.arguments, delay)
    }
}

impl FromStr for TaskLine {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskLine::parse(s)
    }
}

impl From<&Task> for TaskLine {
    fn from(task: &Task) -> Self {
        Self {
            command: task.command(),
            arguments: task.arguments().to_vec(),
        }
    }
}
