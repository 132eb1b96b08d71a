//! 输出能力
//!
//! 叶子组件通过注入的 [`OutputSink`] 输出文本，而不是直接写标准输出。

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::io::Write;

/// 行结束符约定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// 行结束符文本
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// 输出接收端
pub trait OutputSink: Send + Sync + Debug {
    /// 输出一行，行结束符由实现决定
    fn write_line(&self, line: &str);
}

/// 标准输出
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink {
    line_ending: LineEnding,
}

impl ConsoleSink {
    /// 创建使用指定行结束符的标准输出
    pub fn new(line_ending: LineEnding) -> Self {
        Self { line_ending }
    }
}

impl OutputSink for ConsoleSink {
    fn write_line(&self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        // 标准输出关闭时静默丢弃
        let _ = write!(handle, "{line}{}", self.line_ending.as_str());
        let _ = handle.flush();
    }
}

/// 内存缓冲输出，测试时捕获输出内容
#[derive(Debug, Default)]
pub struct BufferSink {
    line_ending: LineEnding,
    buffer: Mutex<String>,
}

impl BufferSink {
    /// 创建使用指定行结束符的缓冲输出
    pub fn new(line_ending: LineEnding) -> Self {
        Self {
            line_ending,
            buffer: Mutex::new(String::new()),
        }
    }

    /// 已输出的全部内容
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    /// 清空缓冲
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl OutputSink for BufferSink {
    fn write_line(&self, line: &str) {
        let mut buffer = self.buffer.lock();
        buffer.push_str(line);
        buffer.push_str(self.line_ending.as_str());
    }
}
