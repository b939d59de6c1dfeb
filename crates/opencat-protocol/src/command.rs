//! 命令目录
//!
//! OpenCat 固件支持的全部命令，以及每个命令对应的线协议令牌、描述和分类。
//!
//! 令牌、描述、分类都来自 [`Command::spec`] 中同一个穷尽 `match`，
//! 新增枚举变体却不补全目录会直接编译失败。

use crate::ProtocolError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// 命令分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CommandCategory {
    /// 控制命令（关机、陀螺仪、校准、关节、声音等）
    Control,
    /// 步态
    Gait,
    /// 姿态
    Posture,
    /// 行为动作
    Behavior,
}

impl CommandCategory {
    pub const ALL: [CommandCategory; 4] = [
        CommandCategory::Control,
        CommandCategory::Gait,
        CommandCategory::Posture,
        CommandCategory::Behavior,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CommandCategory::Control => "control",
            CommandCategory::Gait => "gait",
            CommandCategory::Posture => "posture",
            CommandCategory::Behavior => "behavior",
        }
    }
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommandCategory {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandCategory::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProtocolError::UnknownCommand(s.to_string()))
    }
}

/// 单个命令的目录条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// snake_case 名称（用于 CLI、脚本和日志）
    pub name: &'static str,
    /// 线协议令牌
    pub token: &'static str,
    /// 可读描述
    pub description: &'static str,
    /// 分类
    pub category: CommandCategory,
}

impl CommandSpec {
    const fn new(
        name: &'static str,
        token: &'static str,
        description: &'static str,
        category: CommandCategory,
    ) -> Self {
        Self {
            name,
            token,
            description,
            category,
        }
    }
}

/// OpenCat 命令
///
/// 判别值从 0 开始连续编号，顺序与固件命令表一致。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum Command {
    // 控制命令
    /// 休息并关闭所有舵机
    ShutDown = 0,
    /// 切换是否使用 IMU 数据
    SwitchGyro,
    /// 暂停运动（与 ShutDown 的区别取决于固件）
    PauseMotion,
    /// 校准模式
    Calibrate,
    /// 切换跌倒恢复
    SwitchRecovering,
    /// 重复上一个技能
    RepeatSkill,
    /// 播放自定义技能
    PlayCustomSkill,
    /// 按顺序移动关节
    MoveJointSequence,
    /// 同时移动多个关节（参数为 索引, 角度 对）
    MoveJointsSimultaneous,
    /// 一次设置全部关节
    SetJoints,
    /// 播放内置旋律
    PlayMelody,
    /// 播放自定义声音
    PlayCustomSound,

    // 步态
    /// 原地踏步
    Stepping,
    Back,
    BackLeft,
    BackRight,
    Crawl,
    CrawlLeft,
    CrawlRight,
    Walk,
    WalkLeft,
    WalkRight,
    Trot,
    TrotLeft,
    TrotRight,
    /// 不推荐使用
    Bound,

    // 姿态
    Balance,
    /// 抬高臀部
    ButtUp,
    /// 校准姿态，便于校准关节
    CalibPose,
    /// 休息（与 ShutDown 的区别取决于固件）
    Rest,
    Sit,
    Sleep,
    Stretch,
    /// 设计新姿态用的模板
    Zero,

    // 行为
    CheckAround,
    Greeting,
    Pee,
    PushUp,
    MimicDeath,
    BackFlip,
}

impl Command {
    /// 命令总数
    pub const COUNT: usize = Command::BackFlip as usize + 1;

    /// 全部命令（按判别值排序）
    ///
    /// 数组长度由最后一个变体推导，漏写或多写条目会编译失败。
    pub const ALL: [Command; Command::COUNT] = [
        Command::ShutDown,
        Command::SwitchGyro,
        Command::PauseMotion,
        Command::Calibrate,
        Command::SwitchRecovering,
        Command::RepeatSkill,
        Command::PlayCustomSkill,
        Command::MoveJointSequence,
        Command::MoveJointsSimultaneous,
        Command::SetJoints,
        Command::PlayMelody,
        Command::PlayCustomSound,
        Command::Stepping,
        Command::Back,
        Command::BackLeft,
        Command::BackRight,
        Command::Crawl,
        Command::CrawlLeft,
        Command::CrawlRight,
        Command::Walk,
        Command::WalkLeft,
        Command::WalkRight,
        Command::Trot,
        Command::TrotLeft,
        Command::TrotRight,
        Command::Bound,
        Command::Balance,
        Command::ButtUp,
        Command::CalibPose,
        Command::Rest,
        Command::Sit,
        Command::Sleep,
        Command::Stretch,
        Command::Zero,
        Command::CheckAround,
        Command::Greeting,
        Command::Pee,
        Command::PushUp,
        Command::MimicDeath,
        Command::BackFlip,
    ];

    /// 获取目录条目
    pub const fn spec(self) -> CommandSpec {
        use CommandCategory::*;

        match self {
            Command::ShutDown => CommandSpec::new("shut_down", "d", "shut down", Control),
            Command::SwitchGyro => CommandSpec::new("switch_gyro", "g", "switch IMU", Control),
            Command::PauseMotion => CommandSpec::new("pause_motion", "p", "pause motion", Control),
            Command::Calibrate => CommandSpec::new("calibrate", "c", "calibrate", Control),
            Command::SwitchRecovering => {
                CommandSpec::new("switch_recovering", "krc", "recovering", Control)
            },
            Command::RepeatSkill => {
                CommandSpec::new("repeat_skill", "T", "repeat custom skill", Control)
            },
            Command::PlayCustomSkill => {
                CommandSpec::new("play_custom_skill", "K", "play custom skill", Control)
            },
            Command::MoveJointSequence => {
                CommandSpec::new("move_joint_sequence", "M", "move joint sequence", Control)
            },
            Command::MoveJointsSimultaneous => CommandSpec::new(
                "move_joints_simultaneous",
                "I",
                "index and set joints",
                Control,
            ),
            Command::SetJoints => CommandSpec::new("set_joints", "L", "set all joints", Control),
            Command::PlayMelody => {
                CommandSpec::new("play_melody", "o", "play built-in melody", Control)
            },
            Command::PlayCustomSound => {
                CommandSpec::new("play_custom_sound", "B", "play custom melody", Control)
            },

            Command::Stepping => CommandSpec::new("stepping", "kvt", "stepping", Gait),
            Command::Back => CommandSpec::new("back", "kbk", "going back", Gait),
            Command::BackLeft => CommandSpec::new("back_left", "kbkL", "going back and left", Gait),
            Command::BackRight => {
                CommandSpec::new("back_right", "kbkR", "going back and right", Gait)
            },
            Command::Crawl => CommandSpec::new("crawl", "kcrF", "crawl", Gait),
            Command::CrawlLeft => CommandSpec::new("crawl_left", "kcrL", "crawl left", Gait),
            Command::CrawlRight => CommandSpec::new("crawl_right", "kcrR", "crawl right", Gait),
            Command::Walk => CommandSpec::new("walk", "kwkF", "walk", Gait),
            Command::WalkLeft => CommandSpec::new("walk_left", "kwkL", "walk left", Gait),
            Command::WalkRight => CommandSpec::new("walk_right", "kwkR", "walk right", Gait),
            Command::Trot => CommandSpec::new("trot", "ktrF", "trot", Gait),
            Command::TrotLeft => CommandSpec::new("trot_left", "ktrL", "trot left", Gait),
            Command::TrotRight => CommandSpec::new("trot_right", "ktrR", "trot right", Gait),
            Command::Bound => CommandSpec::new("bound", "kbdF", "bound", Gait),

            Command::Balance => CommandSpec::new("balance", "kbalance", "balance", Posture),
            Command::ButtUp => CommandSpec::new("butt_up", "kbuttUp", "butt up", Posture),
            Command::CalibPose => {
                CommandSpec::new("calib_pose", "kcalib", "calibration pose", Posture)
            },
            Command::Rest => CommandSpec::new("rest", "krest", "rest", Posture),
            Command::Sit => CommandSpec::new("sit", "ksit", "sit", Posture),
            Command::Sleep => CommandSpec::new("sleep", "ksleep", "sleep", Posture),
            Command::Stretch => CommandSpec::new("stretch", "kstr", "stretch", Posture),
            Command::Zero => CommandSpec::new("zero", "kzero", "zero", Posture),

            Command::CheckAround => {
                CommandSpec::new("check_around", "kck", "check around", Behavior)
            },
            Command::Greeting => CommandSpec::new("greeting", "khi", "greeting", Behavior),
            Command::Pee => CommandSpec::new("pee", "kpee", "pee", Behavior),
            Command::PushUp => CommandSpec::new("push_up", "kpu", "push up", Behavior),
            Command::MimicDeath => CommandSpec::new("mimic_death", "kpd", "mimic death", Behavior),
            Command::BackFlip => CommandSpec::new("back_flip", "kbf", "back flip", Behavior),
        }
    }

    /// 线协议令牌
    pub const fn token(self) -> &'static str {
        self.spec().token
    }

    /// 可读描述
    pub const fn description(self) -> &'static str {
        self.spec().description
    }

    /// snake_case 名称
    pub const fn name(self) -> &'static str {
        self.spec().name
    }

    pub const fn category(self) -> CommandCategory {
        self.spec().category
    }

    /// 数值 ID
    pub fn id(self) -> u8 {
        self.into()
    }

    /// 从数值 ID 构造命令
    pub fn from_id(id: u8) -> Result<Self, ProtocolError> {
        Command::try_from_primitive(id).map_err(|e| ProtocolError::InvalidValue {
            field: "Command".to_string(),
            value: e.number,
        })
    }

    /// 按线协议令牌精确查找（区分大小写）
    pub fn from_token(token: &str) -> Option<Self> {
        Command::ALL.into_iter().find(|command| command.token() == token)
    }

    /// 遍历某个分类下的全部命令
    pub fn iter_category(category: CommandCategory) -> impl Iterator<Item = Command> {
        Command::ALL
            .into_iter()
            .filter(move |command| command.category() == category)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    /// 接受三种写法：线协议令牌（`kwkL`）、snake_case 名称（`walk_left`）、
    /// 大写名称（`WALK_LEFT`）。名称中的 `-` 视同 `_`。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if let Some(command) = Command::from_token(input) {
            return Ok(command);
        }

        let normalized = input.replace('-', "_");
        Command::ALL
            .into_iter()
            .find(|command| command.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| ProtocolError::UnknownCommand(input.to_string()))
    }
}

/// 校验命令目录的一致性
///
/// 检查项：
/// - `Command::ALL` 中的位置与判别值一致，且 ID 连续
/// - 令牌非空、为单个 ASCII 单词、互不重复
/// - 名称互不重复，描述非空
pub fn verify() -> Result<(), ProtocolError> {
    let mut tokens = HashSet::with_capacity(Command::COUNT);
    let mut names = HashSet::with_capacity(Command::COUNT);

    for (position, command) in Command::ALL.into_iter().enumerate() {
        if command.id() as usize != position {
            return Err(ProtocolError::CatalogueInvariant(format!(
                "{:?} has id {} but is listed at position {}",
                command,
                command.id(),
                position
            )));
        }

        let spec = command.spec();
        if spec.token.is_empty()
            || !spec.token.is_ascii()
            || spec.token.contains(|c: char| c.is_ascii_whitespace())
        {
            return Err(ProtocolError::CatalogueInvariant(format!(
                "{:?} has an invalid wire token {:?}",
                command, spec.token
            )));
        }
        if spec.description.is_empty() {
            return Err(ProtocolError::CatalogueInvariant(format!(
                "{:?} has an empty description",
                command
            )));
        }
        if !tokens.insert(spec.token) {
            return Err(ProtocolError::CatalogueInvariant(format!(
                "token {:?} is shared by more than one command",
                spec.token
            )));
        }
        if !names.insert(spec.name) {
            return Err(ProtocolError::CatalogueInvariant(format!(
                "name {:?} is shared by more than one command",
                spec.name
            )));
        }
    }

    if Command::from_id(Command::COUNT as u8).is_ok() {
        return Err(ProtocolError::CatalogueInvariant(format!(
            "id {} decodes to a command past the end of the catalogue",
            Command::COUNT
        )));
    }

    Ok(())
}
