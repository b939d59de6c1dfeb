//! Mock 串口
//!
//! 用于测试的模拟串口，无硬件依赖。
//!
//! 克隆出的句柄共享同一份状态：把一个句柄交给驱动层，测试代码保留另一个句柄检查写入记录。
//!
//! ```rust
//! use opencat_serial::{MockSerialAdapter, SerialAdapter};
//!
//! let mock = MockSerialAdapter::new().echo_tokens();
//! let mut port = mock.clone();
//! port.write_line("kwkF\n").unwrap();
//! assert_eq!(port.read_line(64).unwrap(), "kwkF");
//! assert_eq!(mock.written_lines(), vec!["kwkF\n".to_string()]);
//! ```

use crate::{SerialAdapter, SerialError, Timeout};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 一次写入记录
#[derive(Debug, Clone)]
pub struct MockWrite {
    pub data: Vec<u8>,
    /// 写入完成的时刻
    pub at: Instant,
}

/// 写入后自动生成响应的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Responder {
    /// 不自动响应
    Silent,
    /// 回环：原样返回写入的字节
    Loopback,
    /// 模拟固件：回复命令令牌（第一个单词）加 `\n`
    EchoToken,
}

#[derive(Debug)]
struct MockState {
    open: bool,
    rx: VecDeque<u8>,
    writes: Vec<MockWrite>,
    responder: Responder,
    fail_write_on: Option<usize>,
    fail_read_on: Option<usize>,
    reads: usize,
    timeout: Timeout,
    write_latency: Duration,
}

/// 模拟串口
#[derive(Debug, Clone)]
pub struct MockSerialAdapter {
    state: Arc<Mutex<MockState>>,
}

impl MockSerialAdapter {
    /// 创建已打开、不自动响应的模拟串口
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                open: true,
                rx: VecDeque::new(),
                writes: Vec::new(),
                responder: Responder::Silent,
                fail_write_on: None,
                fail_read_on: None,
                reads: 0,
                timeout: Timeout::default(),
                write_latency: Duration::ZERO,
            })),
        }
    }

    /// 回环模式：写入的数据原样出现在接收端
    pub fn loopback(self) -> Self {
        self.state.lock().responder = Responder::Loopback;
        self
    }

    /// 固件模式：每次写入后回复命令令牌
    pub fn echo_tokens(self) -> Self {
        self.state.lock().responder = Responder::EchoToken;
        self
    }

    /// 每次写入的模拟耗时
    pub fn with_write_latency(self, latency: Duration) -> Self {
        self.state.lock().write_latency = latency;
        self
    }

    /// 第 `n` 次写入（从 1 开始）返回 IO 错误
    pub fn fail_write_on(self, n: usize) -> Self {
        self.state.lock().fail_write_on = Some(n);
        self
    }

    /// 第 `n` 次读取（从 1 开始）返回 IO 错误
    pub fn fail_read_on(self, n: usize) -> Self {
        self.state.lock().fail_read_on = Some(n);
        self
    }

    /// 向接收队列追加一段响应
    pub fn queue_response(&self, response: &str) {
        self.state.lock().rx.extend(response.as_bytes());
    }

    pub fn close(&self) {
        self.state.lock().open = false;
    }

    /// 全部写入记录（只包含成功的写入）
    pub fn writes(&self) -> Vec<MockWrite> {
        self.state.lock().writes.clone()
    }

    /// 全部写入内容（按 UTF-8 解码）
    pub fn written_lines(&self) -> Vec<String> {
        self.state
            .lock()
            .writes
            .iter()
            .map(|w| String::from_utf8_lossy(&w.data).into_owned())
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().writes.len()
    }

    /// 最近一次通过 `set_timeout` 设置的超时
    pub fn timeout(&self) -> Timeout {
        self.state.lock().timeout
    }

    /// 接收队列中尚未读取的字节数
    pub fn pending_rx(&self) -> usize {
        self.state.lock().rx.len()
    }
}

impl Default for MockSerialAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialAdapter for MockSerialAdapter {
    fn write(&mut self, data: &[u8]) -> Result<usize, SerialError> {
        let latency = {
            let state = self.state.lock();
            if !state.open {
                return Err(SerialError::NotOpen);
            }
            if state.fail_write_on == Some(state.writes.len() + 1) {
                return Err(SerialError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "mock write failure",
                )));
            }
            state.write_latency
        };

        if !latency.is_zero() {
            std::thread::sleep(latency);
        }

        let mut state = self.state.lock();
        state.writes.push(MockWrite {
            data: data.to_vec(),
            at: Instant::now(),
        });
        match state.responder {
            Responder::Silent => {},
            Responder::Loopback => state.rx.extend(data),
            Responder::EchoToken => {
                let text = String::from_utf8_lossy(data);
                if let Some(token) = text.split_ascii_whitespace().next() {
                    let reply = format!("{}\n", token);
                    state.rx.extend(reply.as_bytes());
                }
            },
        }
        Ok(data.len())
    }

    fn read(&mut self, max_len: usize) -> Result<Vec<u8>, SerialError> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(SerialError::NotOpen);
        }
        state.reads += 1;
        if state.fail_read_on == Some(state.reads) {
            return Err(SerialError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock read failure",
            )));
        }
        if max_len == 0 {
            return Ok(Vec::new());
        }
        if state.rx.is_empty() {
            return Err(SerialError::Timeout);
        }
        let n = max_len.min(state.rx.len());
        Ok(state.rx.drain(..n).collect())
    }

    fn set_timeout(&mut self, timeout: Timeout) -> Result<(), SerialError> {
        self.state.lock().timeout = timeout;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.lock().open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mock_times_out() {
        let mut mock = MockSerialAdapter::new();
        mock.write_line("ksit\n").unwrap();
        assert!(matches!(mock.read_line(64), Err(SerialError::Timeout)));
        assert_eq!(mock.write_count(), 1);
    }

    #[test]
    fn test_loopback() {
        let mut mock = MockSerialAdapter::new().loopback();
        assert_eq!(mock.write(b"Testing.").unwrap(), 8);
        assert_eq!(mock.read(9).unwrap(), b"Testing.".to_vec());
        assert!(matches!(mock.read(1), Err(SerialError::Timeout)));
    }

    #[test]
    fn test_echo_tokens() {
        let mut mock = MockSerialAdapter::new().echo_tokens();
        mock.write_line("L 10 -5 200\n").unwrap();
        assert_eq!(mock.read_line(64).unwrap(), "L");
    }

    #[test]
    fn test_queued_response() {
        let mut mock = MockSerialAdapter::new();
        mock.queue_response("ready\r\n");
        assert_eq!(mock.read_line(64).unwrap(), "ready");
        assert_eq!(mock.pending_rx(), 0);
    }

    #[test]
    fn test_fail_write_on() {
        let mut mock = MockSerialAdapter::new().fail_write_on(2);
        mock.write_line("d\n").unwrap();
        assert!(matches!(mock.write_line("g\n"), Err(SerialError::Io(_))));
        assert_eq!(mock.written_lines(), vec!["d\n".to_string()]);
    }

    #[test]
    fn test_fail_read_on() {
        let mut mock = MockSerialAdapter::new().fail_read_on(1);
        mock.queue_response("x\n");
        assert!(matches!(mock.read(1), Err(SerialError::Io(_))));
        assert_eq!(mock.read(1).unwrap(), b"x".to_vec());
    }

    #[test]
    fn test_closed_mock() {
        let shared = MockSerialAdapter::new();
        let mut mock = shared.clone();
        shared.close();
        assert!(!mock.is_open());
        assert!(matches!(mock.write(b"d\n"), Err(SerialError::NotOpen)));
    }

    #[test]
    fn test_set_timeout_recorded() {
        let mut mock = MockSerialAdapter::new();
        mock.set_timeout(Timeout::simple(250)).unwrap();
        assert_eq!(mock.timeout(), Timeout::simple(250));
    }
}
