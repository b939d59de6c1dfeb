//! 串口连接参数（命令行参数覆盖配置文件）

use crate::config::CliConfig;
use anyhow::{Context, Result};
use clap::Args;
use opencat_sdk::serial::DEFAULT_BAUD_RATE;
use opencat_sdk::{Robot, RobotBuilder, SerialPortAdapter, Timeout};

/// 连接参数
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// 串口路径（如 /dev/ttyUSB0, COM3；默认自动探测）
    #[arg(short, long)]
    pub port: Option<String>,

    /// 波特率（默认 115200）
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// 读写超时（毫秒，默认 1000）
    #[arg(long)]
    pub timeout_ms: Option<u32>,

    /// 输出每个任务的收发日志
    #[arg(short, long)]
    pub verbose: bool,
}

/// 合并后的连接设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub port: Option<String>,
    pub baud_rate: u32,
    pub timeout: Timeout,
    pub verbose: bool,
}

impl ConnectionArgs {
    /// 命令行参数优先，其次配置文件，最后默认值
    pub fn resolve(&self, config: &CliConfig) -> Connection {
        let timeout = self
            .timeout_ms
            .or(config.timeout_ms)
            .map(Timeout::simple)
            .unwrap_or_default();

        Connection {
            port: self.port.clone().or_else(|| config.port.clone()),
            baud_rate: self.baud.or(config.baud_rate).unwrap_or(DEFAULT_BAUD_RATE),
            timeout,
            verbose: self.verbose || config.verbose,
        }
    }
}

impl Connection {
    /// 打开串口
    pub fn open(&self) -> Result<Robot<SerialPortAdapter>> {
        let mut builder = RobotBuilder::new()
            .baud_rate(self.baud_rate)
            .timeout(self.timeout)
            .verbose(self.verbose);
        if let Some(port) = &self.port {
            builder = builder.port(port.clone());
        }

        let robot = builder.build().with_context(|| match &self.port {
            Some(port) => format!("Failed to open serial port {}", port),
            None => "Failed to auto-detect a serial port (use --port)".to_string(),
        })?;
        tracing::debug!("Connected: {:?}", robot);
        Ok(robot)
    }
}
