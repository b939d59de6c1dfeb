//! 钩子系统（Hook System）
//!
//! 批量执行任务时，在每个任务开始、完成、失败时触发自定义回调，
//! 用于进度显示、日志或录制。
//!
//! # 使用示例
//!
//! ```rust
//! use opencat_driver::hooks::{HookManager, TaskHook};
//! use opencat_driver::progress::ChannelProgressHook;
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//! let (hook, _rx) = ChannelProgressHook::new();
//! hooks.add_callback(Arc::new(hook) as Arc<dyn TaskHook>);
//! assert_eq!(hooks.len(), 1);
//! ```

use crate::dispatch::TaskOutcome;
use crate::error::DriverError;
use opencat_protocol::Task;
use std::sync::Arc;

/// 任务回调 Trait
///
/// 回调在批量执行线程中同步调用，实现应尽快返回；
/// 耗时处理请通过 channel 转交给其他线程（见 [`ChannelProgressHook`](crate::progress::ChannelProgressHook)）。
///
/// 所有方法都有空的默认实现。
pub trait TaskHook: Send + Sync {
    /// 任务即将发送（`index` 从 0 开始）
    fn on_task_started(&self, index: usize, total: usize, task: &Task) {
        let _ = (index, total, task);
    }

    /// 任务已完成并收到响应
    fn on_task_finished(&self, outcome: &TaskOutcome, total: usize) {
        let _ = (outcome, total);
    }

    /// 任务失败；批量执行随后终止
    fn on_task_failed(&self, index: usize, total: usize, task: &Task, error: &DriverError) {
        let _ = (index, total, task, error);
    }
}

/// 钩子管理器
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn TaskHook>>,
}

impl HookManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// 添加回调
    pub fn add_callback(&mut self, callback: Arc<dyn TaskHook>) {
        self.callbacks.push(callback);
    }

    /// 移除指定回调（按 `Arc` 指针比较），返回是否找到
    pub fn remove_callback(&mut self, callback: &Arc<dyn TaskHook>) -> bool {
        let before = self.callbacks.len();
        self.callbacks
            .retain(|existing| !std::ptr::addr_eq(Arc::as_ptr(existing), Arc::as_ptr(callback)));
        self.callbacks.len() != before
    }

    /// 移除所有回调
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    pub(crate) fn trigger_started(&self, index: usize, total: usize, task: &Task) {
        for callback in self.callbacks.iter() {
            callback.on_task_started(index, total, task);
        }
    }

    pub(crate) fn trigger_finished(&self, outcome: &TaskOutcome, total: usize) {
        for callback in self.callbacks.iter() {
            callback.on_task_finished(outcome, total);
        }
    }

    pub(crate) fn trigger_failed(
        &self,
        index: usize,
        total: usize,
        task: &Task,
        error: &DriverError,
    ) {
        for callback in self.callbacks.iter() {
            callback.on_task_failed(index, total, task, error);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for HookManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookManager").field("callbacks", &self.callbacks.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencat_protocol::Command;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingHook {
        started: AtomicUsize,
        finished: AtomicUsize,
        failed: AtomicUsize,
    }

    impl TaskHook for CountingHook {
        fn on_task_started(&self, _index: usize, _total: usize, _task: &Task) {
            self.started.fetch_add(1, Ordering::Relaxed);
        }

        fn on_task_finished(&self, _outcome: &TaskOutcome, _total: usize) {
            self.finished.fetch_add(1, Ordering::Relaxed);
        }

        fn on_task_failed(&self, _i: usize, _t: usize, _task: &Task, _e: &DriverError) {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// 只实现部分方法的回调也能工作
    struct StartOnlyHook(AtomicUsize);

    impl TaskHook for StartOnlyHook {
        fn on_task_started(&self, _index: usize, _total: usize, _task: &Task) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_hook_manager_empty() {
        let hooks = HookManager::new();
        assert!(hooks.is_empty());
        assert_eq!(hooks.len(), 0);
        // 没有回调时触发不做任何事
        hooks.trigger_started(0, 1, &Task::new(Command::Sit));
    }

    #[test]
    fn test_remove_callback_keeps_others() {
        let counting: Arc<dyn TaskHook> = Arc::new(CountingHook::default());
        let start_only: Arc<dyn TaskHook> = Arc::new(StartOnlyHook(AtomicUsize::new(0)));

        let mut hooks = HookManager::new();
        hooks.add_callback(counting.clone());
        hooks.add_callback(start_only.clone());

        assert!(hooks.remove_callback(&start_only));
        assert_eq!(hooks.len(), 1);
        assert!(!hooks.remove_callback(&start_only));
        assert_eq!(Arc::strong_count(&start_only), 1);
        assert_eq!(Arc::strong_count(&counting), 2);
    }

    #[test]
    fn test_trigger_all_callbacks() {
        let counting = Arc::new(CountingHook::default());
        let start_only = Arc::new(StartOnlyHook(AtomicUsize::new(0)));

        let mut hooks = HookManager::new();
        hooks.add_callback(counting.clone());
        hooks.add_callback(start_only.clone());
        assert_eq!(hooks.len(), 2);

        let task = Task::new(Command::Walk);
        let outcome = TaskOutcome {
            index: 0,
            command: Command::Walk,
            response: "kwkF".to_string(),
            elapsed: Duration::from_millis(3),
        };
        hooks.trigger_started(0, 2, &task);
        hooks.trigger_finished(&outcome, 2);
        hooks.trigger_failed(1, 2, &task, &DriverError::NoPortFound);

        assert_eq!(counting.started.load(Ordering::Relaxed), 1);
        assert_eq!(counting.finished.load(Ordering::Relaxed), 1);
        assert_eq!(counting.failed.load(Ordering::Relaxed), 1);
        assert_eq!(start_only.0.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_clear() {
        let mut hooks = HookManager::new();
        hooks.add_callback(Arc::new(CountingHook::default()));
        hooks.clear();
        assert!(hooks.is_empty());
    }
}
