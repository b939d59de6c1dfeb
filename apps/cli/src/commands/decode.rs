//! decode 命令
//!
//! 把一行线协议文本（例如串口抓包得到的 `L 10 -5 200`）还原为命令和参数

use anyhow::Result;
use clap::Args;
use opencat_sdk::protocol::TaskLine;

/// 解码参数
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// 线协议文本，多个单词会以空格拼接
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub line: Vec<String>,
}

impl DecodeCommand {
    pub fn execute(&self) -> Result<()> {
        let line = TaskLine::parse(&self.line.join(" "))?;
        println!("{}", describe(&line));
        Ok(())
    }
}

pub fn describe(line: &TaskLine) -> String {
    let command = line.command;
    let mut text = format!(
        "{} [{}] {}: {}",
        command.token(),
        command.category(),
        command.name(),
        command.description()
    );
    if !line.arguments.is_empty() {
        let args: Vec<String> = line.arguments.iter().map(i16::to_string).collect();
        text.push_str(&format!(" (args: {})", args.join(", ")));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencat_sdk::Command;

    #[test]
    fn test_describe_with_args() {
        let line = TaskLine::parse("L 10 -5 200\n").unwrap();
        assert_eq!(line.command, Command::SetJoints);
        let text = describe(&line);
        assert!(text.starts_with("L [control] set_joints: "));
        assert!(text.ends_with("(args: 10, -5, 200)"));
    }

    #[test]
    fn test_describe_without_args() {
        let text = describe(&TaskLine::parse("kwkF").unwrap());
        assert!(text.starts_with("kwkF [gait] walk"));
        assert!(!text.contains("args"));
    }
}
