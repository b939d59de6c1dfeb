//! commands 命令
//!
//! 打印命令目录

use anyhow::Result;
use clap::Args;
use opencat_sdk::{Command, CommandCategory};
use serde::Serialize;
use std::fmt::Write as _;

/// 目录打印参数
#[derive(Args, Debug)]
pub struct CommandsCommand {
    /// 只显示某一类（control, gait, posture, behavior）
    #[arg(short, long)]
    pub category: Option<CommandCategory>,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

/// JSON 输出条目
#[derive(Debug, Serialize)]
struct CatalogueEntry {
    command: Command,
    token: &'static str,
    description: &'static str,
    category: &'static str,
}

impl From<Command> for CatalogueEntry {
    fn from(command: Command) -> Self {
        Self {
            command,
            token: command.token(),
            description: command.description(),
            category: command.category().name(),
        }
    }
}

impl CommandsCommand {
    pub fn execute(&self) -> Result<()> {
        if self.json {
            println!("{}", render_json(self.category)?);
        } else {
            print!("{}", render_table(self.category));
        }
        Ok(())
    }
}

fn selected(category: Option<CommandCategory>) -> impl Iterator<Item = Command> {
    Command::ALL
        .into_iter()
        .filter(move |command| category.is_none_or(|c| command.category() == c))
}

fn render_json(category: Option<CommandCategory>) -> Result<String> {
    let entries: Vec<CatalogueEntry> = selected(category).map(CatalogueEntry::from).collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

/// 按分类分组的表格
fn render_table(category: Option<CommandCategory>) -> String {
    let mut out = String::new();
    for group in CommandCategory::ALL {
        if category.is_some_and(|c| c != group) {
            continue;
        }
        let _ = writeln!(out, "{}:", group);
        for command in Command::iter_category(group) {
            let _ = writeln!(
                out,
                "  {:<10} {:<26} {}",
                command.token(),
                command.name(),
                command.description()
            );
        }
    }
    out
}
