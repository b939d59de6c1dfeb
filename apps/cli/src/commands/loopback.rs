//! loopback 命令
//!
//! 串口超时演示：把 TX 和 RX 短接后运行，观察不同超时配置下读取的字节数。
//!
//! 1. 1000ms 简单超时，读取比写入多 1 个字节（每次都会等满超时）
//! 2. 250ms 超时，读取比写入多 1 个字节
//! 3. 250ms 超时，读取与写入相同的字节数
//! 4. 250ms 超时，读取比写入少 1 个字节（剩余字节留到下一次读取）

use anyhow::{Result, bail};
use clap::Args;
use opencat_sdk::{SerialAdapter, SerialError, SerialPortAdapter, Timeout};
use std::io::{self, Write};

/// 回环演示参数
#[derive(Args, Debug)]
pub struct LoopbackCommand {
    /// 串口路径
    pub port: String,

    /// 波特率
    pub baud: u32,

    /// 测试字符串
    #[arg(default_value = "Testing.")]
    pub text: String,

    /// 每个阶段的迭代次数
    #[arg(short = 'n', long, default_value_t = 10)]
    pub iterations: usize,
}

/// 演示统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopbackStats {
    pub iterations: usize,
    pub bytes_written: usize,
    pub bytes_read: usize,
}

impl LoopbackCommand {
    pub fn execute(&self) -> Result<()> {
        let mut port = SerialPortAdapter::open(&self.port, self.baud, Timeout::simple(1000))?;
        println!(
            "Is the serial port open? {}",
            if port.is_open() { "Yes." } else { "No." }
        );

        let stats = run_loopback(&mut port, &self.text, self.iterations, &mut io::stdout())?;
        tracing::info!(
            "Loopback finished: {} iterations, {} bytes written, {} bytes read",
            stats.iterations,
            stats.bytes_written,
            stats.bytes_read
        );
        Ok(())
    }
}

/// 对任意串口运行四个阶段的回环演示
pub fn run_loopback<A, W>(
    port: &mut A,
    text: &str,
    iterations: usize,
    out: &mut W,
) -> Result<LoopbackStats>
where
    A: SerialAdapter + ?Sized,
    W: Write,
{
    if text.is_empty() {
        bail!("Test string must not be empty");
    }
    let len = text.len();
    let quarter_second = Timeout::new(Timeout::MAX, 250, 0, 250, 0);

    let phases = [
        (
            Some(Timeout::simple(1000)),
            "Timeout == 1000ms, asking for 1 more byte than written.",
            len + 1,
        ),
        (
            Some(quarter_second),
            "Timeout == 250ms, asking for 1 more byte than written.",
            len + 1,
        ),
        (None, "Timeout == 250ms, asking for exactly what was written.", len),
        (None, "Timeout == 250ms, asking for 1 less than was written.", len - 1),
    ];

    let mut stats = LoopbackStats::default();
    for (timeout, title, read_len) in phases {
        if let Some(timeout) = timeout {
            port.set_timeout(timeout)?;
        }
        writeln!(out, "{}", title)?;

        for count in 0..iterations {
            let written = port.write(text.as_bytes())?;
            let read = match port.read(read_len) {
                Ok(bytes) => bytes,
                Err(SerialError::Timeout) => Vec::new(),
                Err(e) => return Err(e.into()),
            };
            writeln!(
                out,
                "Iteration: {}, Bytes written: {}, Bytes read: {}, String read: {}",
                count,
                written,
                read.len(),
                String::from_utf8_lossy(&read)
            )?;

            stats.iterations += 1;
            stats.bytes_written += written;
            stats.bytes_read += read.len();
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencat_sdk::serial::MockSerialAdapter;

    #[test]
    fn test_loopback_demo_on_mock() {
        let mock = MockSerialAdapter::new().loopback();
        let mut port = mock.clone();
        let mut out = Vec::new();

        let stats = run_loopback(&mut port, "Testing.", 2, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(stats.iterations, 8);
        assert_eq!(stats.bytes_written, 64);
        // 前三个阶段读完全部字节，最后阶段每次少读 1 个
        assert_eq!(stats.bytes_read, 6 * 8 + 2 * 7);
        assert_eq!(mock.pending_rx(), 2);

        assert!(text.contains("Timeout == 1000ms, asking for 1 more byte than written."));
        assert!(text.contains(
            "Iteration: 0, Bytes written: 8, Bytes read: 8, String read: Testing."
        ));
        assert!(text.contains(
            "Iteration: 1, Bytes written: 8, Bytes read: 7, String read: .Testin\n"
        ));
        assert_eq!(mock.timeout(), Timeout::new(Timeout::MAX, 250, 0, 250, 0));
    }

    #[test]
    fn test_silent_port_reads_nothing() {
        let mut port = MockSerialAdapter::new();
        let mut out = Vec::new();
        let stats = run_loopback(&mut port, "ab", 1, &mut out).unwrap();
        assert_eq!(stats.bytes_read, 0);
        assert!(String::from_utf8(out).unwrap().contains("Bytes read: 0, String read: \n"));
    }

    #[test]
    fn test_empty_text_rejected() {
        let mut port = MockSerialAdapter::new();
        assert!(run_loopback(&mut port, "", 1, &mut Vec::new()).is_err());
    }
}
