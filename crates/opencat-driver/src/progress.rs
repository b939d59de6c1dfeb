//! 基于 Channel 的进度钩子
//!
//! 把批量执行的进度事件转发到 channel，由其他线程消费（例如 CLI 打印进度）。
//!
//! ```rust
//! use opencat_driver::progress::{ChannelProgressHook, ProgressEvent};
//! use opencat_driver::hooks::TaskHook;
//! use opencat_protocol::{Command, Task};
//!
//! let (hook, rx) = ChannelProgressHook::new();
//! hook.on_task_started(0, 1, &Task::new(Command::Sit));
//! assert!(matches!(rx.try_recv(), Ok(ProgressEvent::Started { index: 0, .. })));
//! ```

use crate::dispatch::TaskOutcome;
use crate::error::DriverError;
use crate::hooks::TaskHook;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use opencat_protocol::{Command, Task};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// 默认队列容量
const DEFAULT_CAPACITY: usize = 1024;

/// 进度事件
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started {
        index: usize,
        total: usize,
        command: Command,
    },
    Finished {
        index: usize,
        total: usize,
        command: Command,
        response: String,
        elapsed: Duration,
    },
    Failed {
        index: usize,
        total: usize,
        command: Command,
        message: String,
    },
}

/// 进度钩子
///
/// 使用有界队列；队列满时丢弃事件并计数，不阻塞批量执行。
pub struct ChannelProgressHook {
    tx: Sender<ProgressEvent>,
    dropped_events: Arc<AtomicU64>,
}

impl ChannelProgressHook {
    /// 创建钩子和对应的接收端
    #[must_use]
    pub fn new() -> (Self, Receiver<ProgressEvent>) {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = bounded(capacity);
        let hook = Self {
            tx,
            dropped_events: Arc::new(AtomicU64::new(0)),
        };
        (hook, rx)
    }

    /// 丢弃事件计数器
    pub fn dropped_events(&self) -> &Arc<AtomicU64> {
        &self.dropped_events
    }

    fn emit(&self, event: ProgressEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {},
            Err(TrySendError::Full(_)) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
            },
            // 接收端已丢弃，不再有人关心进度
            Err(TrySendError::Disconnected(_)) => {},
        }
    }
}

impl TaskHook for ChannelProgressHook {
    fn on_task_started(&self, index: usize, total: usize, task: &Task) {
        self.emit(ProgressEvent::Started {
            index,
            total,
            command: task.command(),
        });
    }

    fn on_task_finished(&self, outcome: &TaskOutcome, total: usize) {
        self.emit(ProgressEvent::Finished {
            index: outcome.index,
            total,
            command: outcome.command,
            response: outcome.response.clone(),
            elapsed: outcome.elapsed,
        });
    }

    fn on_task_failed(&self, index: usize, total: usize, task: &Task, error: &DriverError) {
        self.emit(ProgressEvent::Failed {
            index,
            total,
            command: task.command(),
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencat_serial::SerialError;

    #[test]
    fn test_events_in_order() {
        let (hook, rx) = ChannelProgressHook::new();
        let task = Task::new(Command::Walk);
        hook.on_task_started(0, 1, &task);
        hook.on_task_finished(
            &TaskOutcome {
                index: 0,
                command: Command::Walk,
                response: "kwkF".to_string(),
                elapsed: Duration::from_millis(1),
            },
            1,
        );

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ProgressEvent::Started { index: 0, total: 1, .. }));
        assert!(matches!(
            &events[1],
            ProgressEvent::Finished { response, .. } if response == "kwkF"
        ));
    }

    #[test]
    fn test_failed_event_carries_message() {
        let (hook, rx) = ChannelProgressHook::new();
        hook.on_task_failed(1, 3, &Task::new(Command::Sit), &SerialError::Timeout.into());
        match rx.try_recv().unwrap() {
            ProgressEvent::Failed {
                index, message, ..
            } => {
                assert_eq!(index, 1);
                assert!(message.contains("timeout"), "{}", message);
            },
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_full_queue_drops_events() {
        let (hook, _rx) = ChannelProgressHook::with_capacity(1);
        let task = Task::new(Command::Sit);
        hook.on_task_started(0, 3, &task);
        hook.on_task_started(1, 3, &task);
        hook.on_task_started(2, 3, &task);
        assert_eq!(hook.dropped_events().load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_disconnected_receiver_is_ignored() {
        let (hook, rx) = ChannelProgressHook::new();
        drop(rx);
        hook.on_task_started(0, 1, &Task::new(Command::Sit));
        assert_eq!(hook.dropped_events().load(Ordering::Relaxed), 0);
    }
}
