//! 脚本系统
//!
//! JSON 脚本：按顺序执行的任务列表。
//!
//! ```json
//! {
//!   "name": "morning",
//!   "description": "stand up and say hi",
//!   "tasks": [
//!     { "command": "balance", "delay": 1.0 },
//!     { "command": "khi", "delay": 2.0 },
//!     { "command": "set_joints", "args": [0, 0, 0, 0, 0, 0, 0, 0, 30, 30, 30, 30, 30, 30, 30, 30], "delay": 1.5 }
//!   ]
//! }
//! ```
//!
//! 每个任务的格式就是 [`TaskRecord`]：`command` 可以是命令名（大小写不敏感，`-` 等同于 `_`）
//! 或线协议令牌，参数也可以写作 `arguments`。

use opencat_sdk::protocol::TaskRecord;
use opencat_sdk::{ProtocolError, Task};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 脚本错误
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid script JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `index` 从 0 开始；显示时使用从 1 开始的序号
    #[error("Task {} has an unknown command {command:?}", .index + 1)]
    UnknownCommand {
        index: usize,
        command: String,
        #[source]
        source: ProtocolError,
    },
}

/// 脚本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub tasks: Vec<TaskRecord>,
}

impl Script {
    /// 加载脚本文件
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 保存脚本文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScriptError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 由任务列表生成脚本（命令使用规范名称）
    pub fn from_tasks(
        name: impl Into<String>,
        description: impl Into<String>,
        tasks: &[Task],
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tasks: tasks.iter().map(TaskRecord::from).collect(),
        }
    }

    /// 解析为任务列表；遇到第一个未知命令时报错
    pub fn to_tasks(&self) -> Result<Vec<Task>, ScriptError> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                Task::try_from(entry.clone()).map_err(|source| ScriptError::UnknownCommand {
                    index,
                    command: entry.command.clone(),
                    source,
                })
            })
            .collect()
    }
}
