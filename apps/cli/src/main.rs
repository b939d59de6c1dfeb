//! # OpenCat CLI
//!
//! Command-line interface for OpenCat robots over a serial port.
//!
//! ### One-shot 模式（推荐用于脚本）
//!
//! ```bash
//! # 配置默认串口
//! opencat-cli config set port /dev/ttyUSB0
//!
//! # 下发单个任务（内部：打开串口 -> 写入 -> 等待 -> 读取响应 -> 关闭）
//! opencat-cli send kwkF --delay 2
//! opencat-cli send L 0 0 30 -p /dev/ttyUSB1
//!
//! # 执行 JSON 脚本
//! opencat-cli run morning.json
//! ```
//!
//! ### REPL 模式（推荐用于调试）
//!
//! ```bash
//! $ opencat-cli shell
//! opencat> balance @1
//! opencat> kwkF @2
//! opencat> rest
//! opencat> exit
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod connection;
mod modes;
mod script;

use commands::{
    CommandsCommand, ConfigCommand, DecodeCommand, LoopbackCommand, RunCommand, SendCommand,
};
use config::CliConfig;
use connection::ConnectionArgs;
use modes::repl::run_repl;

/// OpenCat CLI - 四足机器人命令行工具
#[derive(Parser, Debug)]
#[command(name = "opencat-cli")]
#[command(about = "Command-line interface for OpenCat robot control", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 ~/.config/opencat/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 列出可用串口
    Ports,

    /// 打印命令目录
    Commands {
        #[command(flatten)]
        args: CommandsCommand,
    },

    /// 下发单个任务
    Send {
        #[command(flatten)]
        args: SendCommand,
    },

    /// 执行 JSON 脚本
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 解码一行线协议文本
    Decode {
        #[command(flatten)]
        args: DecodeCommand,
    },

    /// 启动交互式 Shell（REPL 模式）
    Shell {
        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// 串口回环超时演示（需要短接 TX/RX）
    Loopback {
        #[command(flatten)]
        args: LoopbackCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，stdout 只留给命令输出）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("opencat=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => CliConfig::default_path()?,
    };

    match cli.command {
        Commands::Ports => commands::ports::execute(),

        Commands::Commands { args } => args.execute(),

        Commands::Send { args } => args.execute(&CliConfig::load_from(&config_path)?),

        Commands::Run { args } => args.execute(&CliConfig::load_from(&config_path)?),

        Commands::Decode { args } => args.execute(),

        Commands::Shell { connection } => {
            let config = CliConfig::load_from(&config_path)?;
            run_repl(connection.resolve(&config))
        },

        Commands::Loopback { args } => args.execute(),

        Commands::Config(cmd) => cmd.execute(&config_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["opencat-cli", "config", "path", "--config", "/tmp/x.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
        assert!(matches!(cli.command, Commands::Config(ConfigCommand::Path)));
    }

    #[test]
    fn test_shell_accepts_connection_flags() {
        let cli =
            Cli::try_parse_from(["opencat-cli", "shell", "-p", "COM3", "-b", "57600"]).unwrap();
        match cli.command {
            Commands::Shell { connection } => {
                assert_eq!(connection.port.as_deref(), Some("COM3"));
                assert_eq!(connection.baud, Some(57600));
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
