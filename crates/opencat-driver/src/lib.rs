//! # OpenCat Driver
//!
//! 驱动层：把任务下发到串口并收集响应。
//!
//! - [`dispatch`] / [`dispatch_all`]: 对任意 [`SerialAdapter`](opencat_serial::SerialAdapter) 下发单个或一批任务
//! - [`Robot`]: 持有串口的高层句柄，支持钩子
//! - [`RobotBuilder`]: 打开真实串口并构建 `Robot`
//! - [`hooks`] / [`progress`]: 批量执行进度回调

mod builder;
mod dispatch;
mod error;
pub mod hooks;
pub mod progress;
mod robot;

pub use builder::RobotBuilder;
pub use dispatch::{TaskOutcome, dispatch, dispatch_all};
pub use error::DriverError;
pub use hooks::{HookManager, TaskHook};
pub use progress::{ChannelProgressHook, ProgressEvent};
pub use robot::Robot;
