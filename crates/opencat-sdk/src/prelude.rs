//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use opencat_sdk::prelude::*;
//! ```

// 协议层
pub use crate::protocol::{Command, CommandCategory, Task};

// 串口层
pub use crate::serial::{SerialAdapter, SerialPortAdapter, Timeout, list_ports};

// 驱动层
pub use crate::driver::{Robot, RobotBuilder, TaskHook, TaskOutcome, dispatch, dispatch_all};

// 错误类型
pub use crate::driver::DriverError;
pub use crate::protocol::ProtocolError;
pub use crate::serial::SerialError;
