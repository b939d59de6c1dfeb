//! CLI 配置文件
//!
//! 默认位置 `~/.config/opencat/config.toml`，命令行参数优先于配置文件。

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 配置目录
pub fn config_dir() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("Cannot determine the user config directory")?;
    path.push("opencat");
    Ok(path)
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 默认串口
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    /// 默认波特率
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baud_rate: Option<u32>,

    /// 读写超时（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u32>,

    /// 默认输出详细日志
    pub verbose: bool,
}

impl CliConfig {
    /// 可设置的配置项
    pub const KEYS: [&'static str; 4] = ["port", "baud_rate", "timeout_ms", "verbose"];

    pub fn default_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// 加载配置；文件不存在时返回默认配置
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// 保存配置（自动创建目录）
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// 按名称设置配置项
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "port" => self.port = Some(value.to_string()),
            "baud_rate" => {
                self.baud_rate = Some(value.parse().context("baud_rate must be an integer")?);
            },
            "timeout_ms" => {
                self.timeout_ms = Some(value.parse().context("timeout_ms must be an integer")?);
            },
            "verbose" => {
                self.verbose = value.parse().context("verbose must be true or false")?;
            },
            _ => bail!("Unknown config key {:?} (expected one of {:?})", key, Self::KEYS),
        }
        Ok(())
    }

    /// 清除配置项，恢复默认值
    pub fn unset(&mut self, key: &str) -> Result<()> {
        match key {
            "port" => self.port = None,
            "baud_rate" => self.baud_rate = None,
            "timeout_ms" => self.timeout_ms = None,
            "verbose" => self.verbose = false,
            _ => bail!("Unknown config key {:?} (expected one of {:?})", key, Self::KEYS),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CliConfig::default();
        config.set("port", "/dev/ttyUSB0").unwrap();
        config.set("baud_rate", "57600").unwrap();
        config.set("verbose", "true").unwrap();
        config.save_to(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("port = \"/dev/ttyUSB0\""), "{}", content);
        assert!(!content.contains("timeout_ms"), "{}", content);

        assert_eq!(CliConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_ms = 250\n").unwrap();

        let config = CliConfig::load_from(&path).unwrap();
        assert_eq!(config.timeout_ms, Some(250));
        assert_eq!(config.port, None);
        assert!(!config.verbose);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = CliConfig::default();
        assert!(config.set("baud_rate", "fast").is_err());
        assert!(config.set("verbose", "maybe").is_err());
        assert!(config.set("colour", "red").is_err());
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_unset() {
        let mut config = CliConfig::default();
        config.set("timeout_ms", "100").unwrap();
        config.unset("timeout_ms").unwrap();
        assert_eq!(config.timeout_ms, None);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "baud_rate = \"fast\"\n").unwrap();
        assert!(CliConfig::load_from(&path).is_err());
    }
}
