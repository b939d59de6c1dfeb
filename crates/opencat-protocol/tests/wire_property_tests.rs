//! 线协议的属性测试
//!
//! 使用 proptest 验证编码格式。

use opencat_protocol::{Command, Task, TaskLine};
use proptest::prelude::*;

fn any_command() -> impl Strategy<Value = Command> {
    (0..Command::COUNT).prop_map(|i| Command::ALL[i])
}

proptest! {
    /// 编码后的行可以被解析回相同的命令和参数
    #[test]
    fn encoded_line_parses_back(
        command in any_command(),
        args in prop::collection::vec(any::<i16>(), 0..16),
        delay in 0.0f32..10.0,
    ) {
        let task = Task::with_args(command, args.clone(), delay);
        let line = TaskLine::parse(&task.encode()).unwrap();
        prop_assert_eq!(line.command, command);
        prop_assert_eq!(line.arguments, args);
    }

    /// 编码结果是恰好一行 ASCII，且以令牌开头
    #[test]
    fn encoded_line_is_single_ascii_line(
        command in any_command(),
        args in prop::collection::vec(any::<i16>(), 0..16),
    ) {
        let encoded = Task::with_args(command, args.clone(), 0.0).encode();
        prop_assert!(encoded.is_ascii());
        prop_assert!(encoded.ends_with('\n'));
        prop_assert_eq!(encoded.matches('\n').count(), 1);
        prop_assert!(encoded.starts_with(command.token()));
        prop_assert_eq!(encoded.trim_end().split(' ').count(), args.len() + 1);
    }

    /// 延时永远非负
    #[test]
    fn delay_is_never_negative(delay in any::<f32>()) {
        let task = Task::with_delay(Command::Walk, delay);
        prop_assert!(task.delay_secs() >= 0.0);
    }
}

#[test]
fn walk_encodes_to_literal_line() {
    assert_eq!(Task::new(Command::Walk).encode(), "kwkF\n");
}

#[test]
fn set_joints_encodes_to_literal_line() {
    let task = Task::with_args(Command::SetJoints, vec![10, -5, 200], 0.5);
    assert_eq!(task.encode(), "L 10 -5 200\n");
}
