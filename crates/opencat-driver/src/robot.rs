//! `Robot`：持有一个串口，按顺序下发任务

use crate::dispatch::{TaskOutcome, dispatch, run_batch};
use crate::error::DriverError;
use crate::hooks::HookManager;
use opencat_protocol::{Command, Task};
use opencat_serial::{SerialAdapter, SerialPortAdapter, Timeout};

/// OpenCat 机器人句柄
///
/// 独占一个串口。所有方法都是阻塞的，任务按调用顺序串行下发。
///
/// # Example
///
/// ```rust
/// use opencat_driver::Robot;
/// use opencat_protocol::{Command, Task};
/// use opencat_serial::MockSerialAdapter;
///
/// let mut robot = Robot::new(MockSerialAdapter::new().echo_tokens()).unwrap();
/// let tasks = [Task::new(Command::Sit), Task::with_delay(Command::Walk, 0.01)];
/// let outcomes = robot.send_tasks(&tasks).unwrap();
/// assert_eq!(outcomes[1].response, "kwkF");
/// ```
pub struct Robot<A: SerialAdapter = SerialPortAdapter> {
    adapter: A,
    hooks: HookManager,
    verbose: bool,
}

impl<A: SerialAdapter> Robot<A> {
    /// 包装一个已打开的串口
    ///
    /// 创建前校验命令目录一致性。
    ///
    /// # Errors
    /// - `DriverError::Protocol`: 命令目录不一致
    pub fn new(adapter: A) -> Result<Self, DriverError> {
        opencat_protocol::verify_catalogue()?;
        Ok(Self {
            adapter,
            hooks: HookManager::new(),
            verbose: false,
        })
    }

    /// 以 info 级别记录每个任务的收发
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// 下发单个任务，返回响应行
    pub fn send_task(&mut self, task: &Task) -> Result<String, DriverError> {
        dispatch(&mut self.adapter, task, self.verbose)
    }

    /// 下发一个无参数、无延时的命令
    pub fn send(&mut self, command: Command) -> Result<String, DriverError> {
        self.send_task(&Task::new(command))
    }

    /// 按顺序下发一批任务，第一个失败时停止
    ///
    /// 已注册的钩子会收到每个任务的开始、完成、失败事件。
    pub fn send_tasks(&mut self, tasks: &[Task]) -> Result<Vec<TaskOutcome>, DriverError> {
        run_batch(&mut self.adapter, tasks, self.verbose, &self.hooks)
    }

    /// 修改串口超时
    pub fn set_timeout(&mut self, timeout: Timeout) -> Result<(), DriverError> {
        self.adapter.set_timeout(timeout)?;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.adapter.is_open()
    }

    /// 钩子管理器（注册进度回调）
    pub fn hooks_mut(&mut self) -> &mut HookManager {
        &mut self.hooks
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// 取回底层串口
    pub fn into_inner(self) -> A {
        self.adapter
    }
}

impl<A: SerialAdapter + std::fmt::Debug> std::fmt::Debug for Robot<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Robot")
            .field("adapter", &self.adapter)
            .field("hooks", &self.hooks)
            .field("verbose", &self.verbose)
            .finish()
    }
}
