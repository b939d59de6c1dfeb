//! REPL 模式（交互式 Shell）
//!
//! 每行一个任务：`<command> [args..] [@delay]`，例如 `kwkF @2`、`L 0 0 30 @0.5`。
//! 第一次下发任务时才打开串口。

use anyhow::{Context, Result, bail};
use opencat_sdk::{
    Command, CommandCategory, ProtocolError, Robot, SerialAdapter, SerialPortAdapter, Task,
};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::connection::Connection;

/// 解析后的一行输入
#[derive(Debug, Clone, PartialEq)]
pub enum ReplInput {
    Empty,
    Help,
    List(Option<CommandCategory>),
    Status,
    Connect(Option<String>),
    Disconnect,
    Exit,
    Task(Task),
}

/// 解析一行输入
pub fn parse_line(line: &str) -> Result<ReplInput> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(ReplInput::Empty);
    };
    let rest: Vec<&str> = words.collect();

    let input = match head {
        "help" | "?" => ReplInput::Help,
        "list" => ReplInput::List(match rest.first() {
            Some(category) => Some(category.parse::<CommandCategory>()?),
            None => None,
        }),
        "status" => ReplInput::Status,
        "connect" => ReplInput::Connect(rest.first().map(|p| p.to_string())),
        "disconnect" => ReplInput::Disconnect,
        "exit" | "quit" => ReplInput::Exit,
        _ => ReplInput::Task(parse_task(head, &rest)?),
    };
    Ok(input)
}

fn parse_task(head: &str, rest: &[&str]) -> Result<Task> {
    let command: Command = head.parse()?;

    let mut arguments = Vec::with_capacity(rest.len());
    let mut delay = 0.0;
    for (i, word) in rest.iter().enumerate() {
        if let Some(value) = word.strip_prefix('@') {
            if i + 1 != rest.len() {
                bail!("The @delay must come last");
            }
            delay = value
                .parse::<f32>()
                .with_context(|| format!("Invalid delay {:?}", value))?;
            continue;
        }
        let arg = word.parse::<i16>().map_err(|_| ProtocolError::InvalidArgument {
            position: i + 1,
            value: word.to_string(),
        })?;
        arguments.push(arg);
    }
    Ok(Task::with_args(command, arguments, delay))
}

/// REPL 会话（保持串口连接）
pub struct ReplSession {
    connection: Connection,
    robot: Option<Robot<Box<dyn SerialAdapter>>>,
    /// 实际打开的串口（自动探测时由适配器给出）
    port_name: Option<String>,
}

impl ReplSession {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            robot: None,
            port_name: None,
        }
    }

    pub fn status(&self) -> String {
        match (&self.robot, &self.port_name) {
            (Some(robot), Some(port)) if robot.is_open() => format!("connected to {}", port),
            (Some(robot), None) if robot.is_open() => "connected".to_string(),
            (Some(_), _) => "port closed".to_string(),
            (None, _) => "disconnected".to_string(),
        }
    }

    pub fn connect(&mut self, port: Option<String>) -> Result<()> {
        if port.is_some() {
            self.connection.port = port;
        }
        let robot = self.connection.open()?;
        self.attach(robot)?;
        println!("✅ {}", self.status());
        Ok(())
    }

    /// 接管已打开的机器人连接，记录实际的串口名
    fn attach(&mut self, robot: Robot<SerialPortAdapter>) -> Result<()> {
        let verbose = robot.is_verbose();
        let adapter = robot.into_inner();
        let port_name = adapter.name().to_string();
        let adapter: Box<dyn SerialAdapter> = Box::new(adapter);
        self.robot = Some(Robot::new(adapter)?.with_verbose(verbose));
        self.port_name = Some(port_name);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.port_name = None;
        if self.robot.take().is_some() {
            println!("✅ disconnected");
        } else {
            println!("⚠️  not connected");
        }
    }

    /// 下发任务；未连接时先连接
    pub fn send(&mut self, task: &Task) -> Result<String> {
        if self.robot.is_none() {
            self.connect(None)?;
        }
        let robot = self.robot.as_mut().context("not connected")?;
        Ok(robot.send_task(task)?)
    }

    /// 执行一行输入；返回 `false` 表示退出
    pub fn execute(&mut self, input: ReplInput) -> Result<bool> {
        match input {
            ReplInput::Empty => {},
            ReplInput::Help => print_help(),
            ReplInput::List(category) => {
                for command in Command::ALL {
                    if category.is_none_or(|c| command.category() == c) {
                        println!("  {:<10} {}", command.token(), command.name());
                    }
                }
            },
            ReplInput::Status => println!("📊 {}", self.status()),
            ReplInput::Connect(port) => self.connect(port)?,
            ReplInput::Disconnect => self.disconnect(),
            ReplInput::Exit => return Ok(false),
            ReplInput::Task(task) => {
                let response = self.send(&task)?;
                println!("{}", response);
            },
        }
        Ok(true)
    }
}

/// 运行 REPL 模式
pub fn run_repl(connection: Connection) -> Result<()> {
    let mut session = ReplSession::new(connection);
    let mut rl = DefaultEditor::new().context("Failed to initialize readline")?;

    let history_path = crate::config::config_dir().ok().map(|dir| dir.join("history.txt"));
    if let Some(path) = &history_path {
        rl.load_history(path).ok(); // 首次运行没有历史文件
    }

    println!("OpenCat CLI v{} - interactive shell", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for help, 'exit' to quit");
    println!();

    loop {
        match rl.readline("opencat> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                let keep_going = match parse_line(line) {
                    Ok(input) => session.execute(input).unwrap_or_else(|err| {
                        eprintln!("❌ Error: {:#}", err);
                        true
                    }),
                    Err(err) => {
                        eprintln!("❌ {:#}", err);
                        eprintln!("💡 Type 'help' for the syntax, 'list' for commands");
                        true
                    },
                };
                if !keep_going {
                    break;
                }
            },

            // Ctrl+C：放弃当前行
            Err(ReadlineError::Interrupted) => println!("^C"),

            // Ctrl+D：退出
            Err(ReadlineError::Eof) => break,

            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            },
        }
    }

    if let Some(path) = &history_path {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        rl.save_history(path).ok();
    }
    println!("👋 Bye");
    Ok(())
}

fn print_help() {
    println!("Usage:");
    println!("  <command> [args..] [@delay]   send a task, e.g. 'kwkF @2' or 'L 0 0 30 @0.5'");
    println!("                                <command> is a token or a name (walk, back_flip)");
    println!("  list [category]               list commands (control, gait, posture, behavior)");
    println!("  connect [port]                open the serial port");
    println!("  disconnect                    close the serial port");
    println!("  status                        show connection status");
    println!("  help                          show this help");
    println!("  exit / quit                   leave the shell");
    println!();
}
