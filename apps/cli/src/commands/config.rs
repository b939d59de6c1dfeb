//! 配置管理命令

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::Path;

use crate::config::CliConfig;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示当前配置
    Show,

    /// 设置配置项（port, baud_rate, timeout_ms, verbose）
    Set {
        key: String,
        value: String,
    },

    /// 清除配置项
    Unset {
        key: String,
    },

    /// 显示配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self, path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                let config = CliConfig::load_from(path)?;
                println!("# {}", path.display());
                print!("{}", toml::to_string_pretty(&config).context("Failed to render config")?);
            },

            ConfigCommand::Set { key, value } => {
                let mut config = CliConfig::load_from(path)?;
                config.set(&key, &value)?;
                config.save_to(path)?;
                println!("✅ {} = {}", key, value);
            },

            ConfigCommand::Unset { key } => {
                let mut config = CliConfig::load_from(path)?;
                config.unset(&key)?;
                config.save_to(path)?;
                println!("✅ {} cleared", key);
            },

            ConfigCommand::Path => {
                println!("{}", path.display());
            },
        }
        Ok(())
    }
}
