//! send 命令
//!
//! 下发单个任务并打印响应

use anyhow::Result;
use clap::Args;
use opencat_sdk::{Command, Task};

use crate::config::CliConfig;
use crate::connection::ConnectionArgs;

/// 单任务参数
#[derive(Args, Debug)]
pub struct SendCommand {
    /// 命令名或令牌（如 walk, kwkF, set_joints）
    pub command: Command,

    /// 命令参数（16 位整数）
    #[arg(allow_negative_numbers = true)]
    pub args: Vec<i16>,

    /// 执行后延时（秒）
    #[arg(short, long, default_value_t = 0.0)]
    pub delay: f32,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl SendCommand {
    pub fn task(&self) -> Task {
        Task::with_args(self.command, self.args.clone(), self.delay)
    }

    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let task = self.task();
        let mut robot = self.connection.resolve(config).open()?;

        let response = robot.send_task(&task)?;
        println!("{}", response);
        Ok(())
    }
}
