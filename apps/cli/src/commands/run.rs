//! run 命令
//!
//! 执行 JSON 脚本，逐个任务打印进度

use anyhow::Result;
use clap::Args;
use opencat_sdk::driver::{ChannelProgressHook, ProgressEvent, TaskHook};
use opencat_sdk::{DriverError, Robot, SerialAdapter, Task, TaskOutcome};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crate::config::CliConfig;
use crate::connection::ConnectionArgs;
use crate::script::Script;

/// 脚本执行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 脚本文件路径
    pub script: PathBuf,

    /// 只打印将要发送的行，不打开串口
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl RunCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let script = Script::load(&self.script)?;
        let tasks = script.to_tasks()?;

        println!("📋 Script: {} ({} tasks)", script.name, tasks.len());
        if !script.description.is_empty() {
            println!("    {}", script.description);
        }

        if self.dry_run {
            for (index, task) in tasks.iter().enumerate() {
                println!("  [{}/{}] {}", index + 1, tasks.len(), task);
            }
            return Ok(());
        }

        let mut robot = self.connection.resolve(config).open()?;
        let outcomes = run_with_progress(&mut robot, &tasks)?;

        let total: f64 = outcomes.iter().map(|o| o.elapsed.as_secs_f64()).sum();
        println!("✅ {} tasks completed in {:.2}s", outcomes.len(), total);
        Ok(())
    }
}

/// 执行任务列表，进度通过后台线程打印
///
/// 进度钩子只在执行期间注册，调用方已有的钩子保持不变。
pub fn run_with_progress<A: SerialAdapter>(
    robot: &mut Robot<A>,
    tasks: &[Task],
) -> Result<Vec<TaskOutcome>, DriverError> {
    let (hook, rx) = ChannelProgressHook::new();
    let hook: Arc<dyn TaskHook> = Arc::new(hook);
    robot.hooks_mut().add_callback(hook.clone());

    let printer = thread::spawn(move || {
        for event in rx.iter() {
            println!("{}", format_event(&event));
        }
    });

    let result = robot.send_tasks(tasks);

    // 丢弃钩子后发送端关闭，打印线程随之退出
    robot.hooks_mut().remove_callback(&hook);
    drop(hook);
    if printer.join().is_err() {
        tracing::warn!("Progress printer thread panicked");
    }
    result
}

pub fn format_event(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::Started {
            index,
            total,
            command,
        } => format!("  [{}/{}] {} ...", index + 1, total, command),
        ProgressEvent::Finished {
            index,
            total,
            command,
            response,
            elapsed,
        } => format!(
            "  [{}/{}] {} ✅ {:?} ({:.2}s)",
            index + 1,
            total,
            command,
            response,
            elapsed.as_secs_f64()
        ),
        ProgressEvent::Failed {
            index,
            total,
            command,
            message,
        } => format!("  [{}/{}] {} ❌ {}", index + 1, total, command, message),
    }
}
