//! 任务定义
//!
//! 一个任务 = 一条命令 + 可选参数 + 执行后延时。构造后不可变。

use crate::ProtocolError;
use crate::command::Command;
use crate::wire::LINE_TERMINATOR;
use std::fmt;
use std::time::Duration;

/// 命令参数（含义由固件定义，例如 `MoveJointsSimultaneous` 的 索引/角度 对）
pub type TaskArgs = Vec<i16>;

/// 单条命令任务
///
/// # 延时语义
///
/// `delay` 是写入命令之后、读取响应之前阻塞等待的秒数，用于给机器人留出物理动作时间。
/// 负数、NaN、无穷大一律按 0 处理。
///
/// # Example
///
/// ```rust
/// use opencat_protocol::{Command, Task};
///
/// let sit = Task::new(Command::Sit);
/// assert!(sit.arguments().is_empty());
/// assert_eq!(sit.delay_secs(), 0.0);
///
/// let walk = Task::with_delay(Command::Walk, 2.0);
/// assert_eq!(walk.delay().as_secs_f32(), 2.0);
///
/// let joints = Task::with_args(Command::MoveJointsSimultaneous, vec![0, 45, 8, -30], 1.0);
/// assert_eq!(joints.encode(), "I 0 45 8 -30\n");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "TaskRecord", into = "TaskRecord")
)]
pub struct Task {
    command: Command,
    arguments: TaskArgs,
    delay: f32,
}

impl Task {
    /// 仅命令：无参数，延时 0
    pub fn new(command: Command) -> Self {
        Self::with_args(command, TaskArgs::new(), 0.0)
    }

    /// 命令 + 延时（秒）：无参数
    pub fn with_delay(command: Command, delay: f32) -> Self {
        Self::with_args(command, TaskArgs::new(), delay)
    }

    /// 完整形式：命令 + 参数 + 延时（秒）
    pub fn with_args(command: Command, arguments: impl Into<TaskArgs>, delay: f32) -> Self {
        Self {
            command,
            arguments: arguments.into(),
            delay: sanitize_delay(delay),
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn arguments(&self) -> &[i16] {
        &self.arguments
    }

    /// 执行后延时（秒）
    pub fn delay_secs(&self) -> f32 {
        self.delay
    }

    /// 执行后延时
    ///
    /// 超出 `Duration` 表示范围的值饱和为 `Duration::MAX`。
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f32(self.delay).unwrap_or(Duration::MAX)
    }

    /// 编码为一行线协议文本（含行终止符）
    pub fn encode(&self) -> String {
        let capacity = self.command.token().len() + self.arguments.len() * 7 + 1;
        let mut line = String::with_capacity(capacity);
        self.encode_into(&mut line);
        line
    }

    /// 编码并追加到已有缓冲区
    pub fn encode_into(&self, out: &mut String) {
        self.write_words(out);
        out.push(LINE_TERMINATOR);
    }

    fn write_words(&self, out: &mut String) {
        out.push_str(self.command.token());
        for arg in &self.arguments {
            out.push(' ');
            out.push_str(&arg.to_string());
        }
    }
}

impl From<Command> for Task {
    fn from(command: Command) -> Self {
        Task::new(command)
    }
}

impl fmt::Display for Task {
    /// 日志友好的形式：`kwkF (walk), delay 1.50s`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = String::new();
        self.write_words(&mut words);
        write!(f, "{} ({})", words, self.command)?;
        if self.delay > 0.0 {
            write!(f, ", delay {:.2}s", self.delay)?;
        }
        Ok(())
    }
}

fn sanitize_delay(delay: f32) -> f32 {
    if delay.is_finite() && delay > 0.0 {
        delay
    } else {
        0.0
    }
}

/// 任务的记录形式（JSON 脚本中的一条任务）
///
/// `command` 可以是命令名（大小写不敏感，`-` 等同于 `_`）或线协议令牌；
/// 由 [`Task`] 转换而来时写出 snake_case 名称。启用 `serde` 后 `Task` 通过它（反）序列化。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskRecord {
    pub command: String,

    #[cfg_attr(
        feature = "serde",
        serde(default, alias = "arguments", skip_serializing_if = "Vec::is_empty")
    )]
    pub args: TaskArgs,

    /// 执行后延时（秒）
    #[cfg_attr(feature = "serde", serde(default))]
    pub delay: f32,
}

impl TryFrom<TaskRecord> for Task {
    type Error = ProtocolError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let command: Command = record.command.parse()?;
        Ok(Task::with_args(command, record.args, record.delay))
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            command: task.command.name().to_string(),
            args: task.arguments.clone(),
            delay: task.delay,
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        Self {
            command: task.command.name().to_string(),
            args: task.arguments,
            delay: task.delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_only_defaults() {
        let task = Task::new(Command::Sit);
        assert_eq!(task.command(), Command::Sit);
        assert!(task.arguments().is_empty());
        assert_eq!(task.delay_secs(), 0.0);
        assert_eq!(task.delay(), Duration::ZERO);
    }

    #[test]
    fn test_command_with_delay() {
        let task = Task::with_delay(Command::Walk, 1.5);
        assert!(task.arguments().is_empty());
        assert_eq!(task.delay_secs(), 1.5);
        assert_eq!(task.delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_full_form() {
        let task = Task::with_args(Command::SetJoints, vec![10, -5, 200], 0.5);
        assert_eq!(task.arguments(), &[10, -5, 200]);
        assert_eq!(task.delay_secs(), 0.5);
    }

    #[test]
    fn test_invalid_delays_clamp_to_zero() {
        assert_eq!(Task::with_delay(Command::Rest, -1.0).delay_secs(), 0.0);
        assert_eq!(Task::with_delay(Command::Rest, f32::NAN).delay_secs(), 0.0);
        assert_eq!(Task::with_delay(Command::Rest, f32::INFINITY).delay_secs(), 0.0);
    }

    #[test]
    fn test_huge_delay_saturates() {
        let task = Task::with_delay(Command::Rest, f32::MAX);
        assert_eq!(task.delay(), Duration::MAX);
    }

    #[test]
    fn test_encode_without_arguments() {
        assert_eq!(Task::new(Command::Walk).encode(), "kwkF\n");
        assert_eq!(Task::with_delay(Command::ShutDown, 3.0).encode(), "d\n");
    }

    #[test]
    fn test_encode_with_arguments() {
        let task = Task::with_args(Command::SetJoints, vec![10, -5, 200], 0.5);
        assert_eq!(task.encode(), "L 10 -5 200\n");

        let extremes =
            Task::with_args(Command::MoveJointSequence, vec![i16::MIN, 0, i16::MAX], 0.0);
        assert_eq!(extremes.encode(), "M -32768 0 32767\n");
    }

    #[test]
    fn test_encode_into_appends() {
        let mut buf = String::from("kbalance\n");
        Task::new(Command::Sit).encode_into(&mut buf);
        assert_eq!(buf, "kbalance\nksit\n");
    }

    #[test]
    fn test_display() {
        let task = Task::with_args(Command::MoveJointsSimultaneous, vec![8, 30], 0.25);
        assert_eq!(task.to_string(), "I 8 30 (move_joints_simultaneous), delay 0.25s");
        assert_eq!(Task::new(Command::Sit).to_string(), "ksit (sit)");
    }

    #[test]
    fn test_from_command() {
        let task: Task = Command::Greeting.into();
        assert_eq!(task, Task::new(Command::Greeting));
    }
}
