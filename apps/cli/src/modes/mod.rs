//! 运行模式
//!
//! - One-shot 模式：每个子命令独立打开串口（见 `commands`）
//! - REPL 模式：交互式 Shell，会话内保持串口连接

pub mod repl;
