//! OpenCat SDK - Petoi OpenCat 四足机器人 Rust SDK
//!
//! 通过串口向 OpenCat 固件下发文本命令。
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 命令目录、任务、线协议编码
//! - **串口层** (`serial`): 串口抽象、超时模型、端口枚举
//! - **驱动层** (`driver`): 任务下发、批量执行、钩子
//!
//! # 快速开始
//!
//! ```no_run
//! use opencat_sdk::prelude::*;
//!
//! opencat_sdk::init_logging();
//!
//! let mut robot = RobotBuilder::new().port("/dev/ttyUSB0").build()?;
//! robot.send_tasks(&[
//!     Task::with_delay(Command::Balance, 1.0),
//!     Task::with_delay(Command::Walk, 2.0),
//!     Task::new(Command::Rest),
//! ])?;
//! # Ok::<(), opencat_sdk::DriverError>(())
//! ```

pub use opencat_driver as driver;
pub use opencat_protocol as protocol;
pub use opencat_serial as serial;

pub mod prelude;

// --- 用户以此为界 ---

pub use protocol::{Command, CommandCategory, ProtocolError, Task};
pub use serial::{PortInfo, SerialAdapter, SerialError, SerialPortAdapter, Timeout, list_ports};
pub use driver::{DriverError, Robot, RobotBuilder, TaskOutcome};

use tracing_subscriber::EnvFilter;

/// 未设置 `RUST_LOG` 时使用的过滤规则
pub const DEFAULT_LOG_FILTER: &str = "opencat=info";

/// 初始化日志（`tracing` + `log` 桥接）
///
/// 过滤规则取自 `RUST_LOG`，未设置时使用 [`DEFAULT_LOG_FILTER`]。
/// 重复调用是安全的：已经安装过全局 subscriber 时什么都不做。
pub fn init_logging() {
    if let Err(e) = try_init_logging(DEFAULT_LOG_FILTER) {
        tracing::debug!("Logging already initialised: {}", e);
    }
}

/// 初始化日志，`default_filter` 在 `RUST_LOG` 未设置时生效
///
/// # Errors
/// 全局 subscriber 或 `log` logger 已被设置。
pub fn try_init_logging(
    default_filter: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 让依赖 `log` 的库（例如 serialport 的后端）也走 tracing
    tracing_log::LogTracer::builder()
        .with_max_level(log::LevelFilter::Trace)
        .init()?;
    Ok(())
}
