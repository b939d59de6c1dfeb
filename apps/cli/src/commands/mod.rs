//! 命令定义和实现

pub mod catalogue;
pub mod config;
pub mod decode;
pub mod loopback;
pub mod ports;
pub mod run;
pub mod send;

pub use catalogue::CommandsCommand;
pub use config::ConfigCommand;
pub use decode::DecodeCommand;
pub use loopback::LoopbackCommand;
pub use run::RunCommand;
pub use send::SendCommand;
