//! 任务下发
//!
//! 单个任务：编码 → 写入一行 → 等待任务延时 → 读取一行响应。
//! 批量任务：按顺序逐个下发，遇到第一个失败立即停止。

use crate::error::DriverError;
use crate::hooks::HookManager;
use opencat_protocol::{Command, Task};
use opencat_serial::{DEFAULT_MAX_LINE_LEN, SerialAdapter};
use std::time::{Duration, Instant};

/// `verbose` 时输出 info 级别日志，否则 debug
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// 单个任务的执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    /// 在批量中的下标（从 0 开始）
    pub index: usize,
    pub command: Command,
    /// 机器人响应（已去掉行终止符）
    pub response: String,
    /// 从写入到读完响应的耗时（包含任务延时）
    pub elapsed: Duration,
}

/// 下发单个任务并返回响应
///
/// 写入完成后阻塞等待 `task.delay()`，再读取一行响应。
///
/// # Errors
/// - `DriverError::Transport`: 串口未打开、写入失败、读取失败或超时未收到任何数据
pub fn dispatch<A>(port: &mut A, task: &Task, verbose: bool) -> Result<String, DriverError>
where
    A: SerialAdapter + ?Sized,
{
    let line = task.encode();
    progress!(verbose, "Sending {}", task);

    port.write_line(&line)?;

    let delay = task.delay();
    if !delay.is_zero() {
        spin_sleep::sleep(delay);
    }

    let response = port.read_line(DEFAULT_MAX_LINE_LEN)?;
    progress!(verbose, "Response to {}: {:?}", task.command(), response);
    Ok(response)
}

/// 按顺序下发一批任务
///
/// 任一任务失败时立即返回 `DriverError::Batch`，后续任务不再发送。
/// 空批量直接返回空列表，不访问串口。
pub fn dispatch_all<A>(
    port: &mut A,
    tasks: &[Task],
    verbose: bool,
) -> Result<Vec<TaskOutcome>, DriverError>
where
    A: SerialAdapter + ?Sized,
{
    run_batch(port, tasks, verbose, &HookManager::new())
}

pub(crate) fn run_batch<A>(
    port: &mut A,
    tasks: &[Task],
    verbose: bool,
    hooks: &HookManager,
) -> Result<Vec<TaskOutcome>, DriverError>
where
    A: SerialAdapter + ?Sized,
{
    let total = tasks.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, task) in tasks.iter().enumerate() {
        progress!(verbose, "Task {}/{}: {}", index + 1, total, task);
        hooks.trigger_started(index, total, task);

        let started = Instant::now();
        match dispatch(port, task, verbose) {
            Ok(response) => {
                let outcome = TaskOutcome {
                    index,
                    command: task.command(),
                    response,
                    elapsed: started.elapsed(),
                };
                hooks.trigger_finished(&outcome, total);
                outcomes.push(outcome);
            },
            Err(source) => {
                tracing::warn!(
                    "Batch stopped at task {}/{} ({}): {}",
                    index + 1,
                    total,
                    task.command(),
                    source
                );
                hooks.trigger_failed(index, total, task, &source);
                return Err(DriverError::Batch {
                    index,
                    total,
                    command: task.command(),
                    source: Box::new(source),
                });
            },
        }
    }

    if total > 0 {
        progress!(verbose, "Completed {} tasks", total);
    }
    Ok(outcomes)
}
